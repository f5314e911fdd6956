//! Concrete state spaces for the tree planners

pub mod plane;
pub mod grid;

pub use plane::*;
pub use grid::*;
