// Obstacle grid for the grid state space
// Boolean occupancy over a width x height rectangle split into cells_x x cells_y cells.

extern crate nalgebra as na;

use crate::common::{GridCell, Point2D, RrtError, RrtResult};

#[derive(Debug, Clone)]
pub struct ObstacleGrid {
    width: f64,
    height: f64,
    // rows are y, columns are x
    occupancy: na::DMatrix<bool>,
}

impl ObstacleGrid {
    pub fn new(width: f64, height: f64, cells_x: usize, cells_y: usize) -> RrtResult<Self> {
        if !(width > 0.0 && height > 0.0) {
            return Err(RrtError::InvalidParameter(format!(
                "grid extent must be positive, got {}x{}",
                width, height
            )));
        }
        if cells_x == 0 || cells_y == 0 {
            return Err(RrtError::InvalidParameter(
                "grid must have at least one cell in each direction".to_string(),
            ));
        }
        Ok(Self {
            width,
            height,
            occupancy: na::DMatrix::from_element(cells_y, cells_x, false),
        })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn cells_x(&self) -> usize {
        self.occupancy.ncols()
    }

    pub fn cells_y(&self) -> usize {
        self.occupancy.nrows()
    }

    pub fn cell_width(&self) -> f64 {
        self.width / self.cells_x() as f64
    }

    pub fn cell_height(&self) -> f64 {
        self.height / self.cells_y() as f64
    }

    /// Cell containing `location`. Coordinates outside the rectangle, and
    /// points lying exactly on its far edges, are clamped to the border cells.
    pub fn grid_square_for_location(&self, location: &Point2D) -> GridCell {
        GridCell::new(
            Self::clamp_index(location.x / self.cell_width(), self.cells_x()),
            Self::clamp_index(location.y / self.cell_height(), self.cells_y()),
        )
    }

    /// Centre of `cell` in continuous coordinates
    pub fn location_for_grid_square(&self, cell: GridCell) -> Point2D {
        Point2D::new(
            (cell.x as f64 + 0.5) * self.cell_width(),
            (cell.y as f64 + 0.5) * self.cell_height(),
        )
    }

    /// Cells outside of the grid count as occupied.
    pub fn is_occupied(&self, cell: GridCell) -> bool {
        self.occupancy.get((cell.y, cell.x)).copied().unwrap_or(true)
    }

    pub fn obstacle_at(&self, location: &Point2D) -> bool {
        self.is_occupied(self.grid_square_for_location(location))
    }

    pub fn set_obstacle(&mut self, cell: GridCell, occupied: bool) -> RrtResult<()> {
        let (width, height) = (self.cells_x(), self.cells_y());
        match self.occupancy.get_mut((cell.y, cell.x)) {
            Some(slot) => {
                *slot = occupied;
                Ok(())
            }
            None => Err(RrtError::CellOutOfBounds { x: cell.x, y: cell.y, width, height }),
        }
    }

    /// Flip the occupancy of `cell`, returning the new value
    pub fn toggle(&mut self, cell: GridCell) -> RrtResult<bool> {
        let occupied = !self.is_occupied(cell);
        self.set_obstacle(cell, occupied)?;
        Ok(occupied)
    }

    pub fn clear(&mut self) {
        self.occupancy.fill(false);
    }

    pub fn occupied_cells(&self) -> Vec<GridCell> {
        let mut cells = Vec::new();
        for y in 0..self.cells_y() {
            for x in 0..self.cells_x() {
                if self.occupancy[(y, x)] {
                    cells.push(GridCell::new(x, y));
                }
            }
        }
        cells
    }

    fn clamp_index(scaled: f64, count: usize) -> usize {
        if scaled <= 0.0 || scaled.is_nan() {
            0
        } else {
            (scaled.floor() as usize).min(count - 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> ObstacleGrid {
        ObstacleGrid::new(800.0, 600.0, 40, 30).unwrap()
    }

    #[test]
    fn test_grid_square_for_location() {
        let grid = grid();
        assert_eq!(grid.grid_square_for_location(&Point2D::new(0.0, 0.0)), GridCell::new(0, 0));
        assert_eq!(grid.grid_square_for_location(&Point2D::new(39.9, 20.0)), GridCell::new(1, 1));
        assert_eq!(grid.grid_square_for_location(&Point2D::new(800.0, 600.0)), GridCell::new(39, 29));
        assert_eq!(grid.grid_square_for_location(&Point2D::new(-5.0, 900.0)), GridCell::new(0, 29));
    }

    #[test]
    fn test_location_round_trips_through_cell() {
        let grid = grid();
        let cell = GridCell::new(12, 7);
        assert_eq!(grid.grid_square_for_location(&grid.location_for_grid_square(cell)), cell);
    }

    #[test]
    fn test_toggle_and_clear() {
        let mut grid = grid();
        let cell = GridCell::new(3, 4);
        assert!(!grid.is_occupied(cell));
        assert!(grid.toggle(cell).unwrap());
        assert!(grid.is_occupied(cell));
        assert!(grid.obstacle_at(&Point2D::new(70.0, 90.0)));
        assert_eq!(grid.occupied_cells(), vec![cell]);
        grid.clear();
        assert!(grid.occupied_cells().is_empty());
    }

    #[test]
    fn test_out_of_range_cells() {
        let mut grid = grid();
        assert!(grid.is_occupied(GridCell::new(40, 0)));
        assert!(matches!(
            grid.set_obstacle(GridCell::new(0, 30), true),
            Err(RrtError::CellOutOfBounds { x: 0, y: 30, .. })
        ));
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(ObstacleGrid::new(800.0, 600.0, 0, 30).is_err());
        assert!(ObstacleGrid::new(-1.0, 600.0, 40, 30).is_err());
    }
}
