//! Plane with a boolean obstacle grid laid over it

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use rand::Rng;

use crate::common::{Point2D, RrtResult, StateSpace};
use crate::state_space::plane::PlaneStateSpace;
use crate::utils::obstacle_grid::ObstacleGrid;

/// Segment samples taken per cell length during validity checks
const SAMPLES_PER_CELL: f64 = 4.0;

/// Planar state space whose free area is defined by an [`ObstacleGrid`].
///
/// The grid is shared behind a read-write lock: the editing side takes the
/// write lock through [`GridStateSpace::obstacle_grid`], every validity check
/// holds one read lock for its whole duration.
#[derive(Debug, Clone)]
pub struct GridStateSpace {
    plane: PlaneStateSpace,
    obstacle_grid: Arc<RwLock<ObstacleGrid>>,
}

impl GridStateSpace {
    pub fn new(width: f64, height: f64, cells_x: usize, cells_y: usize) -> RrtResult<Self> {
        let grid = ObstacleGrid::new(width, height, cells_x, cells_y)?;
        Self::with_obstacle_grid(Arc::new(RwLock::new(grid)))
    }

    /// Build a space over an existing grid handle
    pub fn with_obstacle_grid(obstacle_grid: Arc<RwLock<ObstacleGrid>>) -> RrtResult<Self> {
        let (width, height) = {
            let grid = obstacle_grid.read().unwrap_or_else(PoisonError::into_inner);
            (grid.width(), grid.height())
        };
        Ok(Self {
            plane: PlaneStateSpace::new(width, height)?,
            obstacle_grid,
        })
    }

    pub fn obstacle_grid(&self) -> &Arc<RwLock<ObstacleGrid>> {
        &self.obstacle_grid
    }

    pub fn plane(&self) -> &PlaneStateSpace {
        &self.plane
    }

    fn read_grid(&self) -> RwLockReadGuard<'_, ObstacleGrid> {
        // a writer panicking mid-edit leaves plain booleans behind, still readable
        self.obstacle_grid.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StateSpace for GridStateSpace {
    type State = Point2D;

    fn random_state<R: Rng + ?Sized>(&self, rng: &mut R) -> Point2D {
        self.plane.random_state(rng)
    }

    fn distance(&self, from: &Point2D, to: &Point2D) -> f64 {
        self.plane.distance(from, to)
    }

    fn state_valid(&self, state: &Point2D) -> bool {
        self.plane.state_valid(state) && !self.read_grid().obstacle_at(state)
    }

    fn transition_valid(&self, from: &Point2D, to: &Point2D) -> bool {
        if !self.plane.transition_valid(from, to) {
            return false;
        }

        let grid = self.read_grid();
        let resolution = grid.cell_width().min(grid.cell_height()) / SAMPLES_PER_CELL;
        let steps = (from.distance(to) / resolution).ceil().max(1.0) as usize;

        (0..=steps).all(|i| {
            let point = from.lerp(to, i as f64 / steps as f64);
            !grid.obstacle_at(&point)
        })
    }

    fn intermediate_state(&self, source: &Point2D, target: &Point2D, step_size: f64) -> Point2D {
        self.plane.intermediate_state(source, target, step_size)
    }
}
