//! Common traits defining the interfaces the planners are built on

use std::fmt::Debug;

use rand::Rng;

use crate::common::error::RrtResult;

/// Capability set a search space provides to the tree planners.
///
/// The planners never look inside a state; every operation on one goes
/// through this trait, so the same `Tree` and `BiRrt` work for the open
/// plane, the obstacle grid, or any higher dimensional space.
pub trait StateSpace {
    /// A point in the space
    type State: Copy + Debug;

    /// Sample a state from the domain using the injected random source
    fn random_state<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::State;

    /// Metric used to compare states. Only ever compared, so it must
    /// correlate with traversal cost but need not be a strict metric.
    fn distance(&self, from: &Self::State, to: &Self::State) -> f64;

    /// Whether a single state lies inside the domain and outside obstacles
    fn state_valid(&self, _state: &Self::State) -> bool {
        true
    }

    /// Whether moving straight from `from` to `to` stays in the domain and
    /// avoids obstacles
    fn transition_valid(&self, from: &Self::State, to: &Self::State) -> bool;

    /// A state at most `step_size` away from `source` in the direction of
    /// `target`. Returns `target` itself when it is closer than `step_size`.
    fn intermediate_state(
        &self,
        source: &Self::State,
        target: &Self::State,
        step_size: f64,
    ) -> Self::State;
}

/// Trait for planners that produce a whole path in one call
pub trait PathPlanner {
    /// State type of the produced path
    type State;

    /// Plan a path from start to goal
    fn plan(&mut self, start: Self::State, goal: Self::State) -> RrtResult<Vec<Self::State>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    // One dimensional space, enough to check the default methods
    struct Line;

    impl StateSpace for Line {
        type State = f64;

        fn random_state<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
            rng.gen_range(0.0..1.0)
        }

        fn distance(&self, from: &f64, to: &f64) -> f64 {
            (to - from).abs()
        }

        fn transition_valid(&self, _from: &f64, _to: &f64) -> bool {
            true
        }

        fn intermediate_state(&self, source: &f64, target: &f64, step_size: f64) -> f64 {
            if (target - source).abs() <= step_size {
                *target
            } else {
                source + step_size * (target - source).signum()
            }
        }
    }

    #[test]
    fn test_state_space_trait() {
        let space = Line;
        let mut rng = StdRng::seed_from_u64(0);
        let s = space.random_state(&mut rng);
        assert!((0.0..1.0).contains(&s));
        assert!(space.state_valid(&s));
        assert_eq!(space.intermediate_state(&0.0, &5.0, 2.0), 2.0);
        assert_eq!(space.intermediate_state(&0.0, &1.5, 2.0), 1.5);
    }
}
