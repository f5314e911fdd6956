//! Obstacle free rectangle `[0, width] x [0, height]`

use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::common::{Point2D, RrtError, RrtResult, StateSpace};

/// Bounded plane without obstacles
#[derive(Debug, Clone)]
pub struct PlaneStateSpace {
    width: f64,
    height: f64,
    x_dist: Uniform<f64>,
    y_dist: Uniform<f64>,
}

impl PlaneStateSpace {
    pub fn new(width: f64, height: f64) -> RrtResult<Self> {
        if !(width > 0.0 && height > 0.0) || !width.is_finite() || !height.is_finite() {
            return Err(RrtError::InvalidParameter(format!(
                "plane extent must be positive and finite, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            width,
            height,
            x_dist: Uniform::new(0.0, width),
            y_dist: Uniform::new(0.0, height),
        })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

impl StateSpace for PlaneStateSpace {
    type State = Point2D;

    fn random_state<R: Rng + ?Sized>(&self, rng: &mut R) -> Point2D {
        Point2D::new(self.x_dist.sample(rng), self.y_dist.sample(rng))
    }

    fn distance(&self, from: &Point2D, to: &Point2D) -> f64 {
        from.distance(to)
    }

    fn state_valid(&self, state: &Point2D) -> bool {
        (0.0..=self.width).contains(&state.x) && (0.0..=self.height).contains(&state.y)
    }

    fn transition_valid(&self, from: &Point2D, to: &Point2D) -> bool {
        // the rectangle is convex, so the endpoints decide
        self.state_valid(from) && self.state_valid(to)
    }

    fn intermediate_state(&self, source: &Point2D, target: &Point2D, step_size: f64) -> Point2D {
        let delta = target.to_vector() - source.to_vector();
        let norm = delta.norm();
        if norm <= step_size {
            return *target;
        }
        Point2D::from(source.to_vector() + delta * (step_size / norm))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_state_in_bounds() {
        let space = PlaneStateSpace::new(100.0, 50.0).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let s = space.random_state(&mut rng);
            assert!(space.state_valid(&s));
        }
    }

    #[test]
    fn test_intermediate_state() {
        let space = PlaneStateSpace::new(100.0, 100.0).unwrap();
        let source = Point2D::new(10.0, 10.0);

        let step = space.intermediate_state(&source, &Point2D::new(40.0, 50.0), 10.0);
        assert!((space.distance(&source, &step) - 10.0).abs() < 1e-9);
        assert!((step.x - 16.0).abs() < 1e-9);
        assert!((step.y - 18.0).abs() < 1e-9);

        let near = Point2D::new(13.0, 14.0);
        assert_eq!(space.intermediate_state(&source, &near, 10.0), near);
        assert_eq!(space.intermediate_state(&source, &source, 10.0), source);
    }

    #[test]
    fn test_transition_validity() {
        let space = PlaneStateSpace::new(100.0, 100.0).unwrap();
        assert!(space.transition_valid(&Point2D::new(0.0, 0.0), &Point2D::new(100.0, 100.0)));
        assert!(!space.transition_valid(&Point2D::new(50.0, 50.0), &Point2D::new(101.0, 50.0)));
    }

    #[test]
    fn test_invalid_extent() {
        assert!(PlaneStateSpace::new(0.0, 10.0).is_err());
    }
}
