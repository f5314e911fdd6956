//! Error types for rust_rrt

use thiserror::Error;

use crate::path_planning::tree::NodeId;

/// Main error type for the planners.
///
/// An invalid transition met while growing a tree is not an error: growth
/// simply returns `Ok(None)` for that iteration.
#[derive(Debug, Error)]
pub enum RrtError {
    /// Growth or extension was attempted on a tree without a root
    #[error("tree is empty, call setup() before growing it")]
    EmptyTree,
    /// A node handle that does not belong to the tree
    #[error("node {0:?} does not belong to this tree")]
    UnknownNode(NodeId),
    /// Single-tree run() needs a goal state to test proximity against
    #[error("goal state is not set")]
    GoalNotSet,
    /// Invalid parameter
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// Obstacle grid access outside of the grid
    #[error("cell ({x}, {y}) is outside of the {width}x{height} grid")]
    CellOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
    /// The iteration budget ran out before the trees connected
    #[error("no path found after {iterations} iterations")]
    NoPathFound { iterations: usize },
}

/// Result type alias for planner operations
pub type RrtResult<T> = Result<T, RrtError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RrtError::NoPathFound { iterations: 1000 };
        assert_eq!(format!("{}", err), "no path found after 1000 iterations");
    }

    #[test]
    fn test_cell_out_of_bounds_display() {
        let err = RrtError::CellOutOfBounds { x: 40, y: 2, width: 40, height: 30 };
        assert_eq!(format!("{}", err), "cell (40, 2) is outside of the 40x30 grid");
    }
}
