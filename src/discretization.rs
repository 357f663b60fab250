//! The points owned by one process

use crate::types::{BoundingBox, Error, Point, Result};

/// The points owned by one process.
///
/// Owned points are kept sorted by global id. Across all processes of a run the owned
/// sets are disjoint and together contain every point exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct Discretization {
    rank: usize,
    num_procs: usize,
    global_count: usize,
    points: Vec<Point>,
}

impl Discretization {
    /// Create the discretization owned by `rank`.
    ///
    /// Fails with [Error::InvalidConfiguration] if `rank` is outside the world or a point
    /// is owned by another process.
    pub fn new(
        rank: usize,
        num_procs: usize,
        global_count: usize,
        mut points: Vec<Point>,
    ) -> Result<Self> {
        if rank >= num_procs {
            return Err(Error::InvalidConfiguration(format!(
                "Rank {rank} is outside a world of {num_procs} processes"
            )));
        }
        if let Some(p) = points.iter().find(|p| p.owner() != rank) {
            return Err(Error::InvalidConfiguration(format!(
                "Point {} is owned by rank {}, not {rank}",
                p.id(),
                p.owner()
            )));
        }
        points.sort_by_key(|p| p.id());
        Ok(Self {
            rank,
            num_procs,
            global_count,
            points,
        })
    }

    /// Rank of the owning process
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Number of processes sharing the domain
    pub fn num_procs(&self) -> usize {
        self.num_procs
    }

    /// Number of points over all processes
    pub fn global_count(&self) -> usize {
        self.global_count
    }

    /// Number of points owned by this process
    pub fn owned_count(&self) -> usize {
        self.points.len()
    }

    /// Owned points, sorted by id
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Global ids of the owned points
    pub fn ids(&self) -> Vec<usize> {
        self.points.iter().map(|p| p.id()).collect()
    }

    /// Coordinates of the owned points
    pub fn coordinates(&self) -> Vec<[f64; 3]> {
        self.points.iter().map(|p| *p.coordinate()).collect()
    }

    /// Local index of the owned point with global id `id`
    pub fn find(&self, id: usize) -> Option<usize> {
        self.points.binary_search_by_key(&id, |p| p.id()).ok()
    }

    /// Box spanned by the owned points
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_coordinates(self.points.iter().map(|p| p.coordinate()))
    }
}
