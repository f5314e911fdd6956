//! RustRRT - sampling based motion planning
//!
//! This crate provides single and bidirectional Rapidly-exploring Random
//! Trees over a pluggable state space, a grid state space with editable
//! obstacles, and path smoothing / waypoint caching for fast replanning.

// Core modules
pub mod common;
pub mod utils;

// Algorithm modules
pub mod state_space;
pub mod path_planning;

// Re-export common types for convenience
pub use common::{Point2D, GridCell};
pub use common::{StateSpace, PathPlanner};
pub use common::{RrtError, RrtResult};
pub use state_space::{PlaneStateSpace, GridStateSpace};
pub use path_planning::{BiRrt, Tree, RrtConfig, NodeId};
