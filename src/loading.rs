//! External loads and boundary conditions
//!
//! Loads and constraints act on vector [Field]s through local point indices and are
//! scaled by a [StageFunction] of the load parameter `lambda`.

use crate::field::{Field, FieldLength};
use crate::types::{Axis, Error, Result};

/// Linear ramp between two values over a load stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageFunction {
    start: f64,
    end: f64,
}

impl StageFunction {
    /// Create a ramp from `start` at `lambda = 0` to `end` at `lambda = 1`
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// A function with the same value everywhere
    pub fn constant(value: f64) -> Self {
        Self::new(value, value)
    }

    /// Value at `lambda`
    pub fn value(&self, lambda: f64) -> f64 {
        self.start + lambda * (self.end - self.start)
    }
}

/// The vector components a boundary condition acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Components {
    /// x, y, and z
    All,
    /// One component
    Single(Axis),
}

impl Components {
    /// Apply `f` to the selected entries of a 3-vector
    pub fn apply<F: FnMut(&mut f64)>(&self, vector: &mut [f64], mut f: F) {
        match self {
            Components::All => vector.iter_mut().for_each(f),
            Components::Single(axis) => f(&mut vector[axis.index()]),
        }
    }
}

/// Something that contributes an external force
pub trait Loader {
    /// Write the external force at load parameter `lambda` into the owned points of `force`
    fn compute_owned_external_force(&self, lambda: f64, force: &mut Field) -> Result<()>;
}

/// A force density with a fixed direction applied to a set of points
#[derive(Debug, Clone)]
pub struct BodyLoad {
    direction: [f64; 3],
    point_ids: Vec<usize>,
    stage: StageFunction,
}

impl BodyLoad {
    /// Create a body load. `direction` is normalised and must not be zero.
    pub fn new(direction: [f64; 3], point_ids: Vec<usize>, stage: StageFunction) -> Result<Self> {
        let norm = direction.iter().map(|d| d * d).sum::<f64>().sqrt();
        if !norm.is_normal() {
            return Err(Error::InvalidConfiguration(format!(
                "Body load direction {direction:?} has no usable length"
            )));
        }
        Ok(Self {
            direction: direction.map(|d| d / norm),
            point_ids,
            stage,
        })
    }

    /// Unit direction of the load
    pub fn direction(&self) -> [f64; 3] {
        self.direction
    }

    /// Local indices of the loaded points
    pub fn point_ids(&self) -> &[usize] {
        &self.point_ids
    }
}

impl Loader for BodyLoad {
    fn compute_owned_external_force(&self, lambda: f64, force: &mut Field) -> Result<()> {
        check_vector_field(force, &self.point_ids)?;
        let magnitude = self.stage.value(lambda);
        for p in &self.point_ids {
            for (f, d) in force.point_mut(*p).iter_mut().zip(self.direction) {
                *f = magnitude * d;
            }
        }
        Ok(())
    }
}

/// Prescribed values on selected components of selected points
#[derive(Debug, Clone)]
pub struct DirichletBc {
    point_ids: Vec<usize>,
    components: Components,
    stage: StageFunction,
}

impl DirichletBc {
    /// Create a boundary condition
    pub fn new(point_ids: Vec<usize>, components: Components, stage: StageFunction) -> Self {
        Self {
            point_ids,
            components,
            stage,
        }
    }

    /// Fix every component of the given points to zero
    pub fn all_components_fixed(point_ids: Vec<usize>) -> Self {
        Self::new(point_ids, Components::All, StageFunction::constant(0.0))
    }

    /// Local indices of the constrained points
    pub fn point_ids(&self) -> &[usize] {
        &self.point_ids
    }

    /// Constrained components
    pub fn components(&self) -> Components {
        self.components
    }

    /// Zero the constrained components
    pub fn apply_homogeneous_form(&self, field: &mut Field) -> Result<()> {
        self.prescribe(field, 0.0)
    }

    /// Set the constrained components to the stage value at `lambda`
    pub fn apply(&self, lambda: f64, field: &mut Field) -> Result<()> {
        self.prescribe(field, self.stage.value(lambda))
    }

    fn prescribe(&self, field: &mut Field, value: f64) -> Result<()> {
        check_vector_field(field, &self.point_ids)?;
        for p in &self.point_ids {
            self.components.apply(field.point_mut(*p), |v| *v = value);
        }
        Ok(())
    }
}

fn check_vector_field(field: &Field, point_ids: &[usize]) -> Result<()> {
    if field.spec().length() != FieldLength::Vector3d {
        return Err(Error::InvalidConfiguration(format!(
            "Field {} is not a vector field",
            field.spec()
        )));
    }
    if let Some(p) = point_ids.iter().find(|p| **p >= field.len()) {
        return Err(Error::InvalidConfiguration(format!(
            "Point {p} is outside field {} of {} points",
            field.spec(),
            field.len()
        )));
    }
    Ok(())
}
