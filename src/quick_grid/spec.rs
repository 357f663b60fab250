//! Axis specification

use crate::types::{Error, Result};

/// Subdivision of one axis into equally sized cells
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spec1D {
    num_cells: usize,
    start: f64,
    length: f64,
}

impl Spec1D {
    /// Split `[start, start + length]` into `num_cells` cells
    pub const fn new(num_cells: usize, start: f64, length: f64) -> Self {
        Self {
            num_cells,
            start,
            length,
        }
    }

    /// Number of cells
    pub fn num_cells(&self) -> usize {
        self.num_cells
    }

    /// Start of the axis
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Length of the axis
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Width of a single cell
    pub fn cell_size(&self) -> f64 {
        self.length / self.num_cells as f64
    }

    /// Coordinate of the centre of cell `i`
    pub fn coordinate(&self, i: usize) -> f64 {
        self.start + self.cell_size() * (i as f64 + 0.5)
    }

    /// Coordinates of all cell centres, in increasing order
    pub fn coordinates(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.num_cells).map(|i| self.coordinate(i))
    }

    pub(crate) fn validate(&self, name: &str) -> Result<()> {
        if self.num_cells == 0 {
            return Err(Error::InvalidConfiguration(format!(
                "{name}-axis must have at least one cell"
            )));
        }
        if !self.length.is_finite() || self.length <= 0.0 {
            return Err(Error::InvalidConfiguration(format!(
                "{name}-axis length must be positive, got {}",
                self.length
            )));
        }
        if !self.start.is_finite() {
            return Err(Error::InvalidConfiguration(format!(
                "{name}-axis start must be finite, got {}",
                self.start
            )));
        }
        Ok(())
    }
}
