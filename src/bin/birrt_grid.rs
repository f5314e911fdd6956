//! Bidirectional RRT on an obstacle grid
//!
//! Replans several times, feeding the previous solution back in as a
//! waypoint cache, the way a control loop would.

use std::sync::Arc;

use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use rust_rrt::common::{GridCell, Point2D, RrtResult};
use rust_rrt::path_planning::{
    first_invalid_segment, smooth_path, waypoints_from_path, BiRrt, RrtConfig,
    DEFAULT_WAYPOINT_CACHE_SIZE,
};
use rust_rrt::state_space::GridStateSpace;
use rust_rrt::utils::visualization::plot_birrt;

const REPLANS: usize = 5;
const STEPS_PER_TICK: usize = 50;

fn run() -> RrtResult<()> {
    let space = Arc::new(GridStateSpace::new(800.0, 600.0, 40, 30)?);
    {
        let mut grid = space.obstacle_grid().write().unwrap_or_else(|e| e.into_inner());
        // wall with a gap near the bottom
        for y in 0..24 {
            grid.set_obstacle(GridCell::new(14, y), true)?;
        }
    }

    let config = RrtConfig {
        goal_bias: 0.1,
        waypoint_bias: 0.4,
        max_iterations: 5000,
        ..Default::default()
    };
    let start = Point2D::new(50.0, 50.0);
    let goal = Point2D::new(400.0, 300.0);
    let mut birrt = BiRrt::new(Arc::clone(&space), start, goal, config)?;

    let mut previous_solution: Vec<Point2D> = Vec::new();
    for round in 0..REPLANS {
        while !birrt.has_solution() && birrt.iteration_count() < birrt.config().max_iterations {
            birrt.step(STEPS_PER_TICK)?;
        }

        if !birrt.has_solution() {
            warn!(round, iterations = birrt.iteration_count(), "no solution found");
            previous_solution.clear();
            birrt.reset_with_waypoints(Vec::new());
            continue;
        }

        previous_solution = birrt.get_path();
        smooth_path(&mut previous_solution, &*space);
        info!(
            round,
            iterations = birrt.iteration_count(),
            raw_length = birrt.solution_length(),
            smoothed_points = previous_solution.len(),
            "solution found"
        );

        if round + 1 < REPLANS {
            let waypoints = waypoints_from_path(&previous_solution, DEFAULT_WAYPOINT_CACHE_SIZE);
            birrt.reset_with_waypoints(waypoints);
        }
    }

    // block the middle of the last path and check that the cache notices
    if previous_solution.len() > 2 {
        let probe = previous_solution[previous_solution.len() / 2];
        let mut grid = space.obstacle_grid().write().unwrap_or_else(|e| e.into_inner());
        let cell = grid.grid_square_for_location(&probe);
        grid.set_obstacle(cell, true)?;
        drop(grid);
        match first_invalid_segment(&previous_solution, &*space) {
            Some(index) => info!(index, "cached path is now blocked"),
            None => warn!("cached path still reported valid"),
        }
    }

    let grid = space.obstacle_grid().read().unwrap_or_else(|e| e.into_inner()).clone();
    let mut vis = plot_birrt(&birrt, Some(&grid), &previous_solution, "Bidirectional RRT");
    let _ = vis.save_png("img/path_planning/birrt_grid_result.png", 800, 600);
    println!("Plot saved to: img/path_planning/birrt_grid_result.png");
    let _ = vis.show();

    Ok(())
}

fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install tracing subscriber: {}", e);
    }

    println!("BiRRT grid planning start!!");
    if let Err(e) = run() {
        println!("Planning failed: {}", e);
    }
    println!("BiRRT grid planning finish!!");
}
