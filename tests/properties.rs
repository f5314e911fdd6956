//! Property tests for tree growth and path post-processing

use std::sync::Arc;

use proptest::prelude::*;

use rust_rrt::common::{GridCell, Point2D, StateSpace};
use rust_rrt::path_planning::{
    down_sample, first_invalid_segment, path_length, smooth_path, RrtConfig, Tree,
};
use rust_rrt::state_space::GridStateSpace;

fn grid_with_obstacles(cells: &[(usize, usize)]) -> Arc<GridStateSpace> {
    let space = GridStateSpace::new(800.0, 600.0, 40, 30).unwrap();
    {
        let mut grid = space.obstacle_grid().write().unwrap();
        for &(x, y) in cells {
            // keep the root cell free
            if (x, y) != (2, 2) {
                grid.set_obstacle(GridCell::new(x, y), true).unwrap();
            }
        }
    }
    Arc::new(space)
}

fn grown_tree(seed: u64, step_size: f64, cells: &[(usize, usize)], iterations: usize) -> Tree<GridStateSpace> {
    let config = RrtConfig { step_size, seed: Some(seed), ..Default::default() };
    let mut tree = Tree::new(grid_with_obstacles(cells), config).unwrap();
    tree.setup(Point2D::new(50.0, 50.0));
    for _ in 0..iterations {
        tree.grow().unwrap();
    }
    tree
}

fn obstacle_cells() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0usize..40, 0usize..30), 0..80)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn edges_are_short_and_valid(
        seed in any::<u64>(),
        step_size in 1.0f64..50.0,
        cells in obstacle_cells(),
    ) {
        let tree = grown_tree(seed, step_size, &cells, 300);
        let space = tree.state_space();
        for node in tree.nodes().iter().skip(1) {
            let parent = node.parent().expect("non-root node without parent");
            let from = tree[parent].state();
            prop_assert!(space.distance(from, node.state()) <= step_size + 1e-9);
            prop_assert!(space.transition_valid(from, node.state()));
        }
    }

    #[test]
    fn parent_chains_match_depth(seed in any::<u64>(), cells in obstacle_cells()) {
        let tree = grown_tree(seed, 10.0, &cells, 300);
        prop_assert!(tree.nodes()[0].parent().is_none());
        for id in tree.node_ids() {
            let chain: Vec<_> = tree.ancestors(id).collect();
            prop_assert_eq!(chain.len(), tree[id].depth() + 1);
            prop_assert!(chain.last().unwrap().parent().is_none());
            prop_assert!(chain.windows(2).all(|w| w[0].depth() == w[1].depth() + 1));
        }
    }

    #[test]
    fn smoothing_shortens_and_is_idempotent(
        seed in any::<u64>(),
        cells in obstacle_cells(),
    ) {
        let tree = grown_tree(seed, 10.0, &cells, 400);
        let space = tree.state_space();
        let last = tree.last_node().unwrap();
        let raw = tree.get_path(last, false);

        let mut smoothed = raw.clone();
        smooth_path(&mut smoothed, &**space);
        prop_assert!(smoothed.len() <= raw.len());
        prop_assert_eq!(smoothed.first(), raw.first());
        prop_assert_eq!(smoothed.last(), raw.last());
        prop_assert!(path_length(&smoothed, &**space) <= path_length(&raw, &**space) + 1e-9);
        prop_assert_eq!(first_invalid_segment(&smoothed, &**space), None);

        let mut twice = smoothed.clone();
        smooth_path(&mut twice, &**space);
        prop_assert_eq!(twice, smoothed);
    }

    #[test]
    fn down_sampling_respects_cap_and_order(len in 0usize..200, cap in 0usize..40) {
        let original: Vec<usize> = (0..len).collect();
        let mut sampled = original.clone();
        down_sample(&mut sampled, cap);

        prop_assert_eq!(sampled.len(), len.min(cap));
        prop_assert!(sampled.windows(2).all(|w| w[0] < w[1]));
        if cap >= 2 && len >= 2 {
            prop_assert_eq!(sampled.first(), Some(&0));
            prop_assert_eq!(sampled.last(), Some(&(len - 1)));
        }
    }
}
