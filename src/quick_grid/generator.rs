//! Tensor product point generator

use super::{DomainShape, Spec1D};
use crate::discretization::Discretization;
use crate::types::{Error, Point, Result};
use log::{debug, info};
use std::ops::Range;

/// Generates the points of a 3D tensor product grid and their initial owners.
///
/// Points are enumerated with x varying fastest, then y, then z. Only the cell centres
/// kept by the [DomainShape] receive an id, so ids are always `0..global_count()`.
/// The initial owners slice the id range into contiguous, near-equal chunks; the load
/// balancer later replaces this assignment.
#[derive(Debug, Clone)]
pub struct TensorProductGenerator {
    num_procs: usize,
    specs: [Spec1D; 3],
    shape: DomainShape,
    points: Vec<Point>,
}

impl TensorProductGenerator {
    /// Create a generator for `num_procs` processes
    pub fn new(num_procs: usize, specs: [Spec1D; 3], shape: DomainShape) -> Result<Self> {
        if num_procs == 0 {
            return Err(Error::InvalidConfiguration(
                "The number of processes must be at least one".to_string(),
            ));
        }
        for (spec, name) in specs.iter().zip(["x", "y", "z"]) {
            spec.validate(name)?;
        }
        shape.validate()?;

        let volume = specs.iter().map(|s| s.cell_size()).product::<f64>();
        let [x, y, z] = specs;
        let candidate_count = x.num_cells() * y.num_cells() * z.num_cells();

        let mut coordinates = Vec::with_capacity(candidate_count);
        for k in 0..z.num_cells() {
            let zk = z.coordinate(k);
            for j in 0..y.num_cells() {
                let yj = y.coordinate(j);
                for i in 0..x.num_cells() {
                    let point = [x.coordinate(i), yj, zk];
                    if shape.contains(&point) {
                        coordinates.push(point);
                    }
                }
            }
        }
        if coordinates.is_empty() {
            return Err(Error::InvalidConfiguration(
                "The domain shape does not contain any grid point".to_string(),
            ));
        }
        debug!(
            "Domain shape kept {} of {} candidate points",
            coordinates.len(),
            candidate_count
        );

        let global_count = coordinates.len();
        let points = coordinates
            .into_iter()
            .enumerate()
            .map(|(id, x)| Point::new(id, x, volume, slice_owner(id, global_count, num_procs)))
            .collect();

        Ok(Self {
            num_procs,
            specs,
            shape,
            points,
        })
    }

    /// Number of processes the points are sliced over
    pub fn num_procs(&self) -> usize {
        self.num_procs
    }

    /// Axis specifications
    pub fn specs(&self) -> &[Spec1D; 3] {
        &self.specs
    }

    /// Domain shape
    pub fn shape(&self) -> &DomainShape {
        &self.shape
    }

    /// Total number of points in the domain
    pub fn global_count(&self) -> usize {
        self.points.len()
    }

    /// All points of the domain, ordered by id, tagged with their initial owner
    pub fn candidates(&self) -> &[Point] {
        &self.points
    }

    /// The range of ids initially owned by `rank`
    pub fn slice(&self, rank: usize) -> Range<usize> {
        slice_range(rank, self.points.len(), self.num_procs)
    }

    /// The initial discretization owned by `rank`
    pub fn discretization(&self, rank: usize) -> Result<Discretization> {
        if rank >= self.num_procs {
            return Err(Error::InvalidConfiguration(format!(
                "Rank {rank} is outside a world of {} processes",
                self.num_procs
            )));
        }
        let owned = self.points[self.slice(rank)].to_vec();
        info!(
            "Rank {rank}: generated {} of {} points",
            owned.len(),
            self.global_count()
        );
        Discretization::new(rank, self.num_procs, self.global_count(), owned)
    }
}

/// Contiguous chunk of `0..count` given to `rank`; the first `count % num_procs` ranks get one extra
fn slice_range(rank: usize, count: usize, num_procs: usize) -> Range<usize> {
    let base = count / num_procs;
    let extra = count % num_procs;
    let start = rank * base + rank.min(extra);
    let len = base + usize::from(rank < extra);
    start..start + len
}

fn slice_owner(id: usize, count: usize, num_procs: usize) -> usize {
    let base = count / num_procs;
    let extra = count % num_procs;
    let boundary = extra * (base + 1);
    if id < boundary {
        id / (base + 1)
    } else {
        extra + (id - boundary) / base
    }
}
