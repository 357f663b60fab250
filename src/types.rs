//! Types shared by all phases of a decomposition

/// Cartesian axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Axis {
    /// x-axis
    X = 0,
    /// y-axis
    Y = 1,
    /// z-axis
    Z = 2,
}

impl Axis {
    /// All three axes, in order
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Index of the axis into a coordinate triple
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Ownership of a point stored on the local process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// The authoritative copy of the point lives on this process
    Owned,
    /// A ghost point: the owning process and the point's local index on that process
    Ghost(usize, usize),
}

/// A discretization point.
///
/// The coordinate and volume are fixed when the point is generated. The owner changes
/// at most once, when the load balancer assigns the point to its final process.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    id: usize,
    coordinate: [f64; 3],
    volume: f64,
    owner: usize,
}

impl Point {
    /// Create a point
    pub fn new(id: usize, coordinate: [f64; 3], volume: f64, owner: usize) -> Self {
        Self {
            id,
            coordinate,
            volume,
            owner,
        }
    }

    /// Global identifier
    pub fn id(&self) -> usize {
        self.id
    }

    /// Coordinate
    pub fn coordinate(&self) -> &[f64; 3] {
        &self.coordinate
    }

    /// Volume of the cell the point represents
    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Owning process
    pub fn owner(&self) -> usize {
        self.owner
    }

    /// The same point assigned to a new owner
    pub fn with_owner(self, owner: usize) -> Self {
        Self { owner, ..self }
    }
}

/// Squared Euclidean distance between two coordinates
pub fn distance_squared(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx * dx + dy * dy + dz * dz
}

/// An axis-aligned box spanned by a set of points.
///
/// The empty box has `lower = +inf` and `upper = -inf`, contains nothing, and is
/// infinitely far from every point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Lower corner
    pub lower: [f64; 3],
    /// Upper corner
    pub upper: [f64; 3],
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl BoundingBox {
    /// The empty box
    pub fn empty() -> Self {
        Self {
            lower: [f64::INFINITY; 3],
            upper: [f64::NEG_INFINITY; 3],
        }
    }

    /// Smallest box containing all the coordinates
    pub fn from_coordinates<'a>(coordinates: impl IntoIterator<Item = &'a [f64; 3]>) -> Self {
        let mut bounds = Self::empty();
        for x in coordinates {
            bounds.insert(x);
        }
        bounds
    }

    /// Grow the box to contain a coordinate
    pub fn insert(&mut self, x: &[f64; 3]) {
        for (d, value) in x.iter().enumerate() {
            self.lower[d] = self.lower[d].min(*value);
            self.upper[d] = self.upper[d].max(*value);
        }
    }

    /// Is the box empty?
    pub fn is_empty(&self) -> bool {
        (0..3).any(|d| self.lower[d] > self.upper[d])
    }

    /// Width of the box along an axis
    pub fn extent(&self, axis: Axis) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.upper[axis.index()] - self.lower[axis.index()]
        }
    }

    /// The axis along which the box is widest. Ties go to the lowest axis.
    pub fn longest_axis(&self) -> Axis {
        let mut longest = Axis::X;
        for axis in [Axis::Y, Axis::Z] {
            if self.extent(axis) > self.extent(longest) {
                longest = axis;
            }
        }
        longest
    }

    /// Squared distance from a coordinate to the closest point of the box
    pub fn distance_squared(&self, x: &[f64; 3]) -> f64 {
        if self.is_empty() {
            return f64::INFINITY;
        }
        let mut dist = 0.0;
        for (d, value) in x.iter().enumerate() {
            let gap = (self.lower[d] - value).max(value - self.upper[d]).max(0.0);
            dist += gap * gap;
        }
        dist
    }

    /// Flatten into `[lower, upper]` for communication
    pub fn to_array(&self) -> [f64; 6] {
        [
            self.lower[0],
            self.lower[1],
            self.lower[2],
            self.upper[0],
            self.upper[1],
            self.upper[2],
        ]
    }

    /// Rebuild from the layout written by [BoundingBox::to_array]
    pub fn from_slice(data: &[f64]) -> Self {
        assert_eq!(data.len(), 6);
        Self {
            lower: [data[0], data[1], data[2]],
            upper: [data[3], data[4], data[5]],
        }
    }
}

/// Errors raised while building a decomposition
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Bad grid, domain, or process parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// More processes than points to distribute
    #[error("Cannot partition {points} points over {processes} processes")]
    UnderPopulatedPartition {
        /// Number of processes requested
        processes: usize,
        /// Number of points available
        points: usize,
    },
    /// The horizon is not a positive finite number
    #[error("Invalid horizon {0}: the horizon must be positive and finite")]
    InvalidHorizon(f64),
    /// A neighbour id could not be resolved on any process
    #[error("Neighbour {id} is not owned by any process")]
    DanglingReference {
        /// The unresolved global id
        id: usize,
    },
    /// Output could not be written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
