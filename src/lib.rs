//! Peridecomp
//!
//! Mesh-free discretization of a 3D domain into points, recursive coordinate bisection
//! load balancing, horizon neighbourhood search, and ghost point exchange for
//! peridynamics simulations.
//!
//! The four phases run in lockstep on every process:
//! [quick_grid] → [balance] → [neighbourhood] → [ghost]. [decomposition::Decomposition]
//! chains them and exposes the result to the physics layer.
#![cfg_attr(feature = "strict", deny(warnings))]
#![warn(missing_docs)]

pub mod balance;
pub mod comm;
pub mod decomposition;
pub mod discretization;
pub mod field;
pub mod ghost;
pub mod io;
pub mod loading;
pub mod neighbourhood;
pub mod quick_grid;
pub mod selection;
pub mod types;

pub use decomposition::{Decomposition, DecompositionOptions};
pub use discretization::Discretization;
pub use types::{Axis, Error, Ownership, Point, Result};
