//! Per-point fields
//!
//! A [Field] stores one scalar or one 3-vector per point, aligned with the local point
//! indices of a [crate::Decomposition].

use std::fmt;

/// Physical meaning of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Force density
    Force,
    /// Displacement
    Displacement,
    /// Velocity
    Velocity,
    /// Acceleration
    Acceleration,
    /// Cell volume
    Volume,
    /// Any other quantity
    Other,
}

/// Number of values stored per point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldLength {
    /// One value
    Scalar,
    /// Three values
    Vector3d,
}

impl FieldLength {
    /// Number of values per point
    pub fn components(self) -> usize {
        match self {
            FieldLength::Scalar => 1,
            FieldLength::Vector3d => 3,
        }
    }
}

/// Description of a field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldSpec {
    kind: FieldKind,
    length: FieldLength,
    label: String,
}

impl FieldSpec {
    /// Create a field description
    pub fn new(kind: FieldKind, length: FieldLength, label: &str) -> Self {
        Self {
            kind,
            length,
            label: label.to_string(),
        }
    }

    /// Physical meaning
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Values per point
    pub fn length(&self) -> FieldLength {
        self.length
    }

    /// Name used in output files
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({:?}, {:?})", self.label, self.kind, self.length)
    }
}

/// Values of a field at a sequence of points
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    spec: FieldSpec,
    values: Vec<f64>,
}

impl Field {
    /// Create a field over `num_points` points, initialised to zero
    pub fn new(spec: FieldSpec, num_points: usize) -> Self {
        let values = vec![0.0; num_points * spec.length().components()];
        Self { spec, values }
    }

    /// Description of the field
    pub fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    /// Set every value
    pub fn set(&mut self, value: f64) {
        self.values.fill(value);
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.values.len() / self.spec.length().components()
    }

    /// Does the field have no points?
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values at point `index`
    pub fn point(&self, index: usize) -> &[f64] {
        let n = self.spec.length().components();
        &self.values[n * index..n * (index + 1)]
    }

    /// Mutable values at point `index`
    pub fn point_mut(&mut self, index: usize) -> &mut [f64] {
        let n = self.spec.length().components();
        &mut self.values[n * index..n * (index + 1)]
    }

    /// All values, point by point
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Mutable access to all values
    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }
}
