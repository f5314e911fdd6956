//! Utility modules for rust_rrt

pub mod obstacle_grid;
pub mod visualization;

pub use obstacle_grid::*;
pub use visualization::{Visualizer, PathStyle, PointStyle, colors};
