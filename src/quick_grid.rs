//! Point generation on tensor product grids
//!
//! The domain is the tensor product of three [Spec1D] axes. Every cell contributes one
//! point at its centre; a [DomainShape] filter decides which cells are kept.

mod generator;
mod shape;
mod spec;

pub use generator::TensorProductGenerator;
pub use shape::DomainShape;
pub use spec::Spec1D;
