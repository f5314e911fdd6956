//! RRT (Rapidly-exploring Random Tree) over an arbitrary state space
//!
//! The tree owns every node in one arena; nodes refer to their parent and
//! children by [`NodeId`]. Growing picks a target (goal, cached waypoint or a
//! random state), steps toward it from the nearest node and keeps the new
//! node only when the state space accepts the transition.

use std::ops::Index;
use std::sync::Arc;

use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::common::{RrtError, RrtResult, StateSpace};

/// Configuration shared by [`Tree`] and [`BiRrt`](crate::path_planning::BiRrt)
#[derive(Debug, Clone)]
pub struct RrtConfig {
    /// Maximum distance covered by one extension
    pub step_size: f64,
    /// Distance under which a state counts as having reached the goal
    pub goal_max_dist: f64,
    /// Probability of extending straight toward the goal (0.0-1.0)
    pub goal_bias: f64,
    /// Probability of extending toward a cached waypoint (0.0-1.0)
    pub waypoint_bias: f64,
    /// Maximum growth iterations for run()
    pub max_iterations: usize,
    /// Random seed (None for random)
    pub seed: Option<u64>,
}

impl Default for RrtConfig {
    fn default() -> Self {
        Self {
            step_size: 10.0,
            goal_max_dist: 12.0,
            goal_bias: 0.0,
            waypoint_bias: 0.0,
            max_iterations: 1000,
            seed: None,
        }
    }
}

impl RrtConfig {
    pub fn validate(&self) -> RrtResult<()> {
        check_positive("step_size", self.step_size)?;
        check_positive("goal_max_dist", self.goal_max_dist)?;
        check_probability("goal_bias", self.goal_bias)?;
        check_probability("waypoint_bias", self.waypoint_bias)?;
        Ok(())
    }

    pub(crate) fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

pub(crate) fn check_positive(name: &str, value: f64) -> RrtResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(RrtError::InvalidParameter(format!("{} must be positive, got {}", name, value)))
    }
}

pub(crate) fn check_probability(name: &str, value: f64) -> RrtResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(RrtError::InvalidParameter(format!("{} must be within 0.0..=1.0, got {}", name, value)))
    }
}

/// Handle of a node inside the [`Tree`] that created it.
///
/// Handles are invalidated by `setup` and `reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Node of an RRT tree
#[derive(Debug, Clone)]
pub struct Node<T> {
    state: T,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    depth: usize,
}

impl<T> Node<T> {
    pub fn state(&self) -> &T {
        &self.state
    }

    /// None only for the root
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Number of ancestors, 0 for the root
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Single direction RRT
#[derive(Debug)]
pub struct Tree<S: StateSpace> {
    space: Arc<S>,
    config: RrtConfig,
    nodes: Vec<Node<S::State>>,
    goal_state: Option<S::State>,
    waypoints: Vec<S::State>,
    rng: StdRng,
}

impl<S: StateSpace> Tree<S> {
    /// Create an empty tree; call `setup` (or `run`) before growing it
    pub fn new(space: Arc<S>, config: RrtConfig) -> RrtResult<Self> {
        config.validate()?;
        let rng = config.rng();
        Ok(Tree {
            space,
            config,
            nodes: Vec::new(),
            goal_state: None,
            waypoints: Vec::new(),
            rng,
        })
    }

    pub fn state_space(&self) -> &Arc<S> {
        &self.space
    }

    pub fn config(&self) -> &RrtConfig {
        &self.config
    }

    pub fn set_step_size(&mut self, step_size: f64) -> RrtResult<()> {
        check_positive("step_size", step_size)?;
        self.config.step_size = step_size;
        Ok(())
    }

    pub fn set_goal_max_dist(&mut self, goal_max_dist: f64) -> RrtResult<()> {
        check_positive("goal_max_dist", goal_max_dist)?;
        self.config.goal_max_dist = goal_max_dist;
        Ok(())
    }

    pub fn set_goal_bias(&mut self, goal_bias: f64) -> RrtResult<()> {
        check_probability("goal_bias", goal_bias)?;
        self.config.goal_bias = goal_bias;
        Ok(())
    }

    pub fn set_waypoint_bias(&mut self, waypoint_bias: f64) -> RrtResult<()> {
        check_probability("waypoint_bias", waypoint_bias)?;
        self.config.waypoint_bias = waypoint_bias;
        Ok(())
    }

    pub fn set_max_iterations(&mut self, max_iterations: usize) {
        self.config.max_iterations = max_iterations;
    }

    pub fn goal_state(&self) -> Option<&S::State> {
        self.goal_state.as_ref()
    }

    pub fn set_goal_state(&mut self, goal: Option<S::State>) {
        self.goal_state = goal;
    }

    pub fn waypoints(&self) -> &[S::State] {
        &self.waypoints
    }

    pub fn set_waypoints(&mut self, waypoints: Vec<S::State>) {
        self.waypoints = waypoints;
    }

    /// Removes all nodes, leaving the tree empty
    pub fn reset(&mut self) {
        self.nodes.clear();
    }

    /// Reset and plant a root at `start`
    pub fn setup(&mut self, start: S::State) {
        self.reset();
        self.nodes.push(Node {
            state: start,
            parent: None,
            children: Vec::new(),
            depth: 0,
        });
    }

    /// Grow until a node reaches the goal or `max_iterations` is exhausted.
    pub fn run(&mut self, start: S::State) -> RrtResult<bool> {
        if self.goal_state.is_none() {
            return Err(RrtError::GoalNotSet);
        }
        self.setup(start);

        for i in 0..self.config.max_iterations {
            if let Some(id) = self.grow()? {
                if self.reached_goal(&self.nodes[id.0].state) {
                    info!(iterations = i + 1, nodes = self.nodes.len(), "rrt reached the goal");
                    return Ok(true);
                }
            }
        }

        info!(iterations = self.config.max_iterations, "rrt exhausted its iteration budget");
        Ok(false)
    }

    /// Whether `state` is within `goal_max_dist` of the goal state
    pub fn reached_goal(&self, state: &S::State) -> bool {
        self.goal_state
            .as_ref()
            .map_or(false, |goal| self.space.distance(state, goal) <= self.config.goal_max_dist)
    }

    /// Pick a target and extend the tree toward it.
    ///
    /// One uniform draw in `[0, 1)` is partitioned cumulatively: below
    /// `goal_bias` the goal is the target, below `goal_bias + waypoint_bias`
    /// a cached waypoint is, otherwise a random state.
    pub fn grow(&mut self) -> RrtResult<Option<NodeId>> {
        if self.nodes.is_empty() {
            return Err(RrtError::EmptyTree);
        }
        let target = self.sample_target();
        self.extend(&target, None)
    }

    fn sample_target(&mut self) -> S::State {
        let r: f64 = self.rng.gen();
        if let Some(goal) = self.goal_state {
            if r < self.config.goal_bias {
                return goal;
            }
        }
        if !self.waypoints.is_empty() && r < self.config.goal_bias + self.config.waypoint_bias {
            let i = self.rng.gen_range(0..self.waypoints.len());
            return self.waypoints[i];
        }
        self.space.random_state(&mut self.rng)
    }

    /// Take one step from `source` (the nearest node when None) toward
    /// `target`. Returns None when the transition is rejected.
    pub fn extend(&mut self, target: &S::State, source: Option<NodeId>) -> RrtResult<Option<NodeId>> {
        if self.nodes.is_empty() {
            return Err(RrtError::EmptyTree);
        }
        let source = match source {
            Some(id) if id.0 < self.nodes.len() => id,
            Some(id) => return Err(RrtError::UnknownNode(id)),
            None => self.nearest(target).ok_or(RrtError::EmptyTree)?.0,
        };

        let from = self.nodes[source.0].state;
        let new_state = self.space.intermediate_state(&from, target, self.config.step_size);
        if !self.space.transition_valid(&from, &new_state) {
            return Ok(None);
        }

        let id = NodeId(self.nodes.len());
        let depth = self.nodes[source.0].depth + 1;
        self.nodes.push(Node {
            state: new_state,
            parent: Some(source),
            children: Vec::new(),
            depth,
        });
        self.nodes[source.0].children.push(id);
        Ok(Some(id))
    }

    /// Closest node to `state` and its distance, None for an empty tree.
    /// Ties go to the node inserted first.
    pub fn nearest(&self, state: &S::State) -> Option<(NodeId, f64)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i), self.space.distance(&node.state, state)))
            .min_by_key(|&(_, dist)| OrderedFloat(dist))
    }

    /// Iterate from `dest` up to the root
    pub fn ancestors(&self, dest: NodeId) -> Ancestors<'_, S::State> {
        Ancestors {
            nodes: &self.nodes,
            next: Some(dest).filter(|id| id.0 < self.nodes.len()),
        }
    }

    /// States from the root to `dest`, or from `dest` to the root when
    /// `reverse` is set
    pub fn get_path(&self, dest: NodeId, reverse: bool) -> Vec<S::State> {
        let mut path: Vec<S::State> = self.ancestors(dest).map(|node| node.state).collect();
        if !reverse {
            path.reverse();
        }
        path
    }

    pub fn get(&self, id: NodeId) -> Option<&Node<S::State>> {
        self.nodes.get(id.0)
    }

    pub fn depth(&self, id: NodeId) -> Option<usize> {
        self.get(id).map(Node::depth)
    }

    pub fn root(&self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(NodeId(0))
        }
    }

    /// Most recently added node
    pub fn last_node(&self) -> Option<NodeId> {
        self.nodes.len().checked_sub(1).map(NodeId)
    }

    /// Handles of all nodes in insertion order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// All nodes in insertion order, root first
    pub fn nodes(&self) -> &[Node<S::State>] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<S: StateSpace> Index<NodeId> for Tree<S> {
    type Output = Node<S::State>;

    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.0]
    }
}

/// Parent chain walk produced by [`Tree::ancestors`]
#[derive(Debug)]
pub struct Ancestors<'a, T> {
    nodes: &'a [Node<T>],
    next: Option<NodeId>,
}

impl<'a, T> Iterator for Ancestors<'a, T> {
    type Item = &'a Node<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        let node = &nodes[self.next?.0];
        self.next = node.parent;
        Some(node)
    }
}
