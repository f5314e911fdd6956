//! Visualization utilities for rust_rrt
//!
//! Renders trees, obstacle grids, paths and waypoint caches with gnuplot.

use gnuplot::{Figure, Caption, Color, PointSymbol, PointSize, LineWidth, AxesCommon, AutoOption};

use crate::common::{Point2D, StateSpace};
use crate::path_planning::{BiRrt, Tree};
use crate::utils::obstacle_grid::ObstacleGrid;

/// Color palette for consistent styling
pub mod colors {
    pub const BLACK: &str = "#000000";
    pub const RED: &str = "#FF0000";
    pub const GREEN: &str = "#00FF00";
    pub const DARK_GREEN: &str = "#006400";
    pub const BLUE: &str = "#0000FF";
    pub const YELLOW: &str = "#FFFF00";
    pub const GRAY: &str = "#808080";
    pub const LIGHT_GRAY: &str = "#D3D3D3";

    // Semantic colors
    pub const OBSTACLE: &str = BLACK;
    pub const START: &str = RED;
    pub const GOAL: &str = DARK_GREEN;
    pub const PATH: &str = YELLOW;
    pub const START_TREE: &str = GRAY;
    pub const GOAL_TREE: &str = DARK_GREEN;
    pub const SOLUTION: &str = RED;
    pub const WAYPOINT: &str = LIGHT_GRAY;
}

/// Style for path rendering
#[derive(Debug, Clone)]
pub struct PathStyle {
    pub color: String,
    pub line_width: f64,
    pub caption: String,
}

impl PathStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            line_width: 2.0,
            caption: caption.to_string(),
        }
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        Self {
            color: colors::PATH.to_string(),
            line_width: 3.0,
            caption: "Path".to_string(),
        }
    }
}

/// Style for point rendering
#[derive(Debug, Clone)]
pub struct PointStyle {
    pub color: String,
    pub size: f64,
    pub symbol: char,
    pub caption: String,
}

impl PointStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            size: 1.0,
            symbol: 'O',
            caption: caption.to_string(),
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_symbol(mut self, symbol: char) -> Self {
        self.symbol = symbol;
        self
    }
}

/// Main visualizer struct
pub struct Visualizer {
    figure: Figure,
    title: String,
    x_range: Option<(f64, f64)>,
    y_range: Option<(f64, f64)>,
    aspect_ratio: Option<f64>,
}

impl Visualizer {
    /// Create a new visualizer
    pub fn new() -> Self {
        Self {
            figure: Figure::new(),
            title: String::new(),
            x_range: None,
            y_range: None,
            aspect_ratio: Some(1.0),
        }
    }

    /// Set the plot title
    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.title = title.to_string();
        self
    }

    /// Fix both axis ranges to the extent of an obstacle grid
    pub fn set_extent(&mut self, width: f64, height: f64) -> &mut Self {
        self.x_range = Some((0.0, width));
        self.y_range = Some((0.0, height));
        self
    }

    /// Plot a path
    pub fn plot_path(&mut self, path: &[Point2D], style: &PathStyle) -> &mut Self {
        let x: Vec<f64> = path.iter().map(|p| p.x).collect();
        let y: Vec<f64> = path.iter().map(|p| p.y).collect();

        self.figure.axes2d()
            .lines(&x, &y, &[
                Caption(style.caption.as_str()),
                Color(style.color.as_str()),
                LineWidth(style.line_width),
            ]);
        self
    }

    /// Plot occupied cells as squares at their centres
    pub fn plot_obstacle_grid(&mut self, grid: &ObstacleGrid) -> &mut Self {
        let centres: Vec<Point2D> = grid
            .occupied_cells()
            .into_iter()
            .map(|cell| grid.location_for_grid_square(cell))
            .collect();
        let x: Vec<f64> = centres.iter().map(|p| p.x).collect();
        let y: Vec<f64> = centres.iter().map(|p| p.y).collect();

        self.figure.axes2d()
            .points(&x, &y, &[
                Caption("Obstacles"),
                Color(colors::OBSTACLE),
                PointSymbol('S'),
                PointSize(2.0),
            ]);
        self
    }

    /// Plot every edge of a tree
    pub fn plot_tree<S>(&mut self, tree: &Tree<S>, color: &str) -> &mut Self
    where
        S: StateSpace<State = Point2D>,
    {
        let axes = self.figure.axes2d();
        for node in tree.nodes() {
            if let Some(parent) = node.parent() {
                let (from, to) = (tree[parent].state(), node.state());
                axes.lines(&[from.x, to.x], &[from.y, to.y], &[Color(color), LineWidth(1.0)]);
            }
        }
        self
    }

    /// Plot multiple points
    pub fn plot_points(&mut self, points: &[Point2D], style: &PointStyle) -> &mut Self {
        let x: Vec<f64> = points.iter().map(|p| p.x).collect();
        let y: Vec<f64> = points.iter().map(|p| p.y).collect();

        self.figure.axes2d()
            .points(&x, &y, &[
                Caption(style.caption.as_str()),
                Color(style.color.as_str()),
                PointSymbol(style.symbol),
                PointSize(style.size),
            ]);
        self
    }

    /// Plot start position
    pub fn plot_start(&mut self, point: Point2D) -> &mut Self {
        self.plot_points(&[point], &PointStyle::new(colors::START, "Start").with_size(1.5))
    }

    /// Plot goal position
    pub fn plot_goal(&mut self, point: Point2D) -> &mut Self {
        self.plot_points(&[point], &PointStyle::new(colors::GOAL, "Goal").with_size(1.5))
    }

    /// Finalize and show the plot
    pub fn show(&mut self) -> Result<(), String> {
        self.apply_settings();
        self.figure.show().map_err(|e| e.to_string()).map(|_| ())
    }

    /// Save plot to PNG file
    pub fn save_png(&mut self, path: &str, width: u32, height: u32) -> Result<(), String> {
        self.apply_settings();
        self.figure.save_to_png(path, width, height).map_err(|e| e.to_string())
    }

    fn apply_settings(&mut self) {
        let axes = self.figure.axes2d();

        if !self.title.is_empty() {
            axes.set_title(&self.title, &[]);
        }
        axes.set_x_label("X", &[]);
        axes.set_y_label("Y", &[]);

        if let Some((min, max)) = self.x_range {
            axes.set_x_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some((min, max)) = self.y_range {
            axes.set_y_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some(ratio) = self.aspect_ratio {
            axes.set_aspect_ratio(AutoOption::Fix(ratio));
        }
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Draw both trees of a planner with its solution, waypoint cache and the
/// previous (smoothed) path
pub fn plot_birrt<S>(
    birrt: &BiRrt<S>,
    grid: Option<&ObstacleGrid>,
    previous_path: &[Point2D],
    title: &str,
) -> Visualizer
where
    S: StateSpace<State = Point2D>,
{
    let mut vis = Visualizer::new();
    vis.set_title(title);

    if let Some(grid) = grid {
        vis.set_extent(grid.width(), grid.height());
        vis.plot_obstacle_grid(grid);
    }
    vis.plot_tree(birrt.start_tree(), colors::START_TREE);
    vis.plot_tree(birrt.goal_tree(), colors::GOAL_TREE);

    let solution = birrt.get_path();
    if !solution.is_empty() {
        vis.plot_path(&solution, &PathStyle::new(colors::SOLUTION, "Solution").with_line_width(2.0));
    }
    if !previous_path.is_empty() {
        vis.plot_path(previous_path, &PathStyle::default());
    }
    if !birrt.waypoints().is_empty() {
        vis.plot_points(birrt.waypoints(), &PointStyle::new(colors::WAYPOINT, "Waypoints"));
    }
    vis.plot_start(*birrt.start_state());
    vis.plot_goal(*birrt.goal_state());

    vis
}
