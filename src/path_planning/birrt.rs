//! Bidirectional RRT
//!
//! Grows one tree from the start and one from the goal. Each iteration one
//! tree (alternating) takes a biased random step, then the other tree steps
//! toward the new node. When the new node lies within `goal_max_dist` of the
//! other tree and the gap is a valid transition, the two meeting nodes become
//! the solution.

use std::sync::Arc;

use tracing::{debug, info};

use crate::common::{PathPlanner, RrtError, RrtResult, StateSpace};
use crate::path_planning::path_smoothing::smooth_path;
use crate::path_planning::tree::{check_positive, check_probability, NodeId, RrtConfig, Tree};

/// Meeting point of the two trees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Solution {
    start_node: NodeId,
    goal_node: NodeId,
    // sum of the meeting nodes' depths
    length: usize,
}

/// Bidirectional RRT planner
#[derive(Debug)]
pub struct BiRrt<S: StateSpace> {
    space: Arc<S>,
    config: RrtConfig,
    start_state: S::State,
    goal_state: S::State,
    start_tree: Tree<S>,
    goal_tree: Tree<S>,
    waypoints: Vec<S::State>,
    solution: Option<Solution>,
    iteration_count: usize,
}

impl<S: StateSpace> BiRrt<S> {
    /// Create a planner with both trees planted at `start` and `goal`
    pub fn new(space: Arc<S>, start: S::State, goal: S::State, config: RrtConfig) -> RrtResult<Self> {
        config.validate()?;

        // the goal tree draws from its own stream so the two trees do not mirror each other
        let goal_config = RrtConfig {
            seed: config.seed.map(|seed| seed.wrapping_add(1)),
            ..config.clone()
        };
        let mut start_tree = Tree::new(Arc::clone(&space), config.clone())?;
        let mut goal_tree = Tree::new(Arc::clone(&space), goal_config)?;
        start_tree.set_goal_state(Some(goal));
        goal_tree.set_goal_state(Some(start));
        start_tree.setup(start);
        goal_tree.setup(goal);

        Ok(BiRrt {
            space,
            config,
            start_state: start,
            goal_state: goal,
            start_tree,
            goal_tree,
            waypoints: Vec::new(),
            solution: None,
            iteration_count: 0,
        })
    }

    pub fn state_space(&self) -> &Arc<S> {
        &self.space
    }

    pub fn config(&self) -> &RrtConfig {
        &self.config
    }

    pub fn start_state(&self) -> &S::State {
        &self.start_state
    }

    pub fn goal_state(&self) -> &S::State {
        &self.goal_state
    }

    /// Move the start. The start tree is rebuilt and any solution dropped.
    pub fn set_start_state(&mut self, start: S::State) {
        self.start_state = start;
        self.start_tree.setup(start);
        self.goal_tree.set_goal_state(Some(start));
        self.solution = None;
    }

    /// Move the goal. The goal tree is rebuilt and any solution dropped.
    pub fn set_goal_state(&mut self, goal: S::State) {
        self.goal_state = goal;
        self.goal_tree.setup(goal);
        self.start_tree.set_goal_state(Some(goal));
        self.solution = None;
    }

    pub fn set_step_size(&mut self, step_size: f64) -> RrtResult<()> {
        check_positive("step_size", step_size)?;
        self.start_tree.set_step_size(step_size)?;
        self.goal_tree.set_step_size(step_size)?;
        self.config.step_size = step_size;
        Ok(())
    }

    pub fn set_goal_max_dist(&mut self, goal_max_dist: f64) -> RrtResult<()> {
        check_positive("goal_max_dist", goal_max_dist)?;
        self.start_tree.set_goal_max_dist(goal_max_dist)?;
        self.goal_tree.set_goal_max_dist(goal_max_dist)?;
        self.config.goal_max_dist = goal_max_dist;
        Ok(())
    }

    pub fn set_goal_bias(&mut self, goal_bias: f64) -> RrtResult<()> {
        check_probability("goal_bias", goal_bias)?;
        self.start_tree.set_goal_bias(goal_bias)?;
        self.goal_tree.set_goal_bias(goal_bias)?;
        self.config.goal_bias = goal_bias;
        Ok(())
    }

    pub fn set_waypoint_bias(&mut self, waypoint_bias: f64) -> RrtResult<()> {
        check_probability("waypoint_bias", waypoint_bias)?;
        self.start_tree.set_waypoint_bias(waypoint_bias)?;
        self.goal_tree.set_waypoint_bias(waypoint_bias)?;
        self.config.waypoint_bias = waypoint_bias;
        Ok(())
    }

    pub fn set_max_iterations(&mut self, max_iterations: usize) {
        self.start_tree.set_max_iterations(max_iterations);
        self.goal_tree.set_max_iterations(max_iterations);
        self.config.max_iterations = max_iterations;
    }

    /// Cached interior points of an earlier solution, sampled with
    /// `waypoint_bias`
    pub fn waypoints(&self) -> &[S::State] {
        &self.waypoints
    }

    pub fn set_waypoints(&mut self, waypoints: Vec<S::State>) {
        self.start_tree.set_waypoints(waypoints.clone());
        self.goal_tree.set_waypoints(waypoints.clone());
        self.waypoints = waypoints;
    }

    /// Replant both trees at the current start and goal. Configuration and
    /// the waypoint cache are kept.
    pub fn reset(&mut self) {
        self.start_tree.setup(self.start_state);
        self.goal_tree.setup(self.goal_state);
        self.solution = None;
        self.iteration_count = 0;
    }

    /// `reset` followed by replacing the waypoint cache
    pub fn reset_with_waypoints(&mut self, waypoints: Vec<S::State>) {
        self.reset();
        self.set_waypoints(waypoints);
    }

    /// One growth iteration, alternating which tree leads.
    pub fn grow(&mut self) -> RrtResult<()> {
        let start_leads = self.iteration_count % 2 == 0;
        let connection = {
            let (leader, follower) = if start_leads {
                (&mut self.start_tree, &mut self.goal_tree)
            } else {
                (&mut self.goal_tree, &mut self.start_tree)
            };
            Self::grow_toward_each_other(&*self.space, self.config.goal_max_dist, leader, follower)?
        };

        if let Some((leader_node, follower_node)) = connection {
            if start_leads {
                self.record_solution(leader_node, follower_node);
            } else {
                self.record_solution(follower_node, leader_node);
            }
        }

        self.iteration_count += 1;
        Ok(())
    }

    fn grow_toward_each_other(
        space: &S,
        goal_max_dist: f64,
        leader: &mut Tree<S>,
        follower: &mut Tree<S>,
    ) -> RrtResult<Option<(NodeId, NodeId)>> {
        let new_node = match leader.grow()? {
            Some(id) => id,
            None => return Ok(None),
        };
        let state = *leader[new_node].state();

        follower.extend(&state, None)?;

        Ok(follower.nearest(&state).and_then(|(other, dist)| {
            let reachable =
                dist <= goal_max_dist && space.transition_valid(follower[other].state(), &state);
            if reachable {
                Some((new_node, other))
            } else {
                None
            }
        }))
    }

    fn record_solution(&mut self, start_node: NodeId, goal_node: NodeId) {
        let length = self.start_tree[start_node].depth() + self.goal_tree[goal_node].depth();
        match self.solution {
            Some(current) if current.length <= length => {}
            previous => {
                debug!(
                    iteration = self.iteration_count,
                    length,
                    improved = previous.is_some(),
                    "trees connected"
                );
                self.solution = Some(Solution { start_node, goal_node, length });
            }
        }
    }

    /// Grow `count` times
    pub fn step(&mut self, count: usize) -> RrtResult<()> {
        for _ in 0..count {
            self.grow()?;
        }
        Ok(())
    }

    /// Reset, then grow until the trees connect or `max_iterations` runs out
    pub fn run(&mut self) -> RrtResult<bool> {
        self.reset();
        while !self.has_solution() && self.iteration_count < self.config.max_iterations {
            self.grow()?;
        }
        info!(
            iterations = self.iteration_count,
            start_nodes = self.start_tree.len(),
            goal_nodes = self.goal_tree.len(),
            solved = self.has_solution(),
            "birrt run finished"
        );
        Ok(self.has_solution())
    }

    pub fn has_solution(&self) -> bool {
        self.solution.is_some()
    }

    pub fn start_solution_node(&self) -> Option<NodeId> {
        self.solution.map(|s| s.start_node)
    }

    pub fn goal_solution_node(&self) -> Option<NodeId> {
        self.solution.map(|s| s.goal_node)
    }

    /// Number of tree edges on the current solution, excluding the gap
    /// bridging the two trees
    pub fn solution_length(&self) -> Option<usize> {
        self.solution.map(|s| s.length)
    }

    /// Full path from the start to the goal, empty without a solution
    pub fn get_path(&self) -> Vec<S::State> {
        match self.solution {
            Some(solution) => {
                let mut path = self.start_tree.get_path(solution.start_node, false);
                path.extend(self.goal_tree.get_path(solution.goal_node, true));
                path
            }
            None => Vec::new(),
        }
    }

    /// Growth iterations since the last reset
    pub fn iteration_count(&self) -> usize {
        self.iteration_count
    }

    pub fn start_tree(&self) -> &Tree<S> {
        &self.start_tree
    }

    pub fn goal_tree(&self) -> &Tree<S> {
        &self.goal_tree
    }
}

impl<S: StateSpace> PathPlanner for BiRrt<S> {
    type State = S::State;

    /// Plan from scratch and return the smoothed path
    fn plan(&mut self, start: S::State, goal: S::State) -> RrtResult<Vec<S::State>> {
        self.set_start_state(start);
        self.set_goal_state(goal);
        if !self.run()? {
            return Err(RrtError::NoPathFound { iterations: self.iteration_count });
        }
        let mut path = self.get_path();
        smooth_path(&mut path, &*self.space);
        Ok(path)
    }
}
