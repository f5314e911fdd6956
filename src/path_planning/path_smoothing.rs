//! Path post-processing: shortcut smoothing and waypoint down-sampling

use itertools::Itertools;
use tracing::trace;

use crate::common::StateSpace;

/// Cap on the waypoint cache carried from one plan to the next
pub const DEFAULT_WAYPOINT_CACHE_SIZE: usize = 15;

/// Sweep limit used by [`smooth_path`]
pub const DEFAULT_SMOOTHING_SWEEPS: usize = 100_000;

/// Shortcut `path` in place until no interior point can be skipped.
///
/// Endpoints are never touched and every segment introduced is a valid
/// transition in `space`.
pub fn smooth_path<S: StateSpace + ?Sized>(path: &mut Vec<S::State>, space: &S) {
    smooth_path_with_budget(path, space, DEFAULT_SMOOTHING_SWEEPS);
}

/// Like [`smooth_path`], but stops after `max_sweeps` sweeps. Returns the
/// number of points removed.
///
/// A sweep tries to bridge every pair of points `span` apart. A successful
/// shortcut restarts from `span = 2`, so a path that ran to completion has no
/// valid shortcut left and smoothing it again leaves it unchanged.
pub fn smooth_path_with_budget<S: StateSpace + ?Sized>(
    path: &mut Vec<S::State>,
    space: &S,
    max_sweeps: usize,
) -> usize {
    let original_len = path.len();
    let mut span = 2;
    let mut sweeps = 0;

    while span < path.len() && sweeps < max_sweeps {
        let mut changed = false;
        let mut i = 0;
        while i + span < path.len() {
            if space.transition_valid(&path[i], &path[i + span]) {
                path.drain(i + 1..i + span);
                changed = true;
            }
            i += 1;
        }
        sweeps += 1;
        span = if changed { 2 } else { span + 1 };
    }

    trace!(sweeps, removed = original_len - path.len(), "smoothed path");
    original_len - path.len()
}

/// Keep at most `max_size` states, evenly spread over the original order.
/// The first and last states survive whenever `max_size >= 2`.
pub fn down_sample<T>(states: &mut Vec<T>, max_size: usize) {
    let len = states.len();
    if len <= max_size {
        return;
    }
    if max_size < 2 {
        states.truncate(max_size);
        return;
    }

    // rounded i * (len - 1) / (max_size - 1); strictly increasing since len > max_size
    let intervals = max_size - 1;
    let keep: Vec<usize> = (0..max_size)
        .map(|i| (i * (len - 1) + intervals / 2) / intervals)
        .collect();

    let mut index = 0;
    let mut next = 0;
    states.retain(|_| {
        let kept = keep.get(next) == Some(&index);
        if kept {
            next += 1;
        }
        index += 1;
        kept
    });
}

/// Interior points of `path` (start and goal dropped), down-sampled to
/// `max_size`, ready to be fed back as the next search's waypoint cache
pub fn waypoints_from_path<T: Clone>(path: &[T], max_size: usize) -> Vec<T> {
    if path.len() <= 2 {
        return Vec::new();
    }
    let mut waypoints = path[1..path.len() - 1].to_vec();
    down_sample(&mut waypoints, max_size);
    waypoints
}

/// Sum of the segment distances along `path`
pub fn path_length<S: StateSpace + ?Sized>(path: &[S::State], space: &S) -> f64 {
    path.iter()
        .tuple_windows()
        .map(|(a, b)| space.distance(a, b))
        .sum()
}

/// Index of the first segment of `path` that `space` no longer accepts,
/// e.g. after obstacles were edited under a cached path
pub fn first_invalid_segment<S: StateSpace + ?Sized>(path: &[S::State], space: &S) -> Option<usize> {
    path.iter()
        .tuple_windows()
        .position(|(a, b)| !space.transition_valid(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{GridCell, Point2D};
    use crate::state_space::{GridStateSpace, PlaneStateSpace};

    fn zigzag() -> Vec<Point2D> {
        (0..10)
            .map(|i| Point2D::new(50.0 + 20.0 * i as f64, if i % 2 == 0 { 100.0 } else { 140.0 }))
            .collect()
    }

    #[test]
    fn test_smooth_open_plane_to_straight_line() {
        let space = PlaneStateSpace::new(800.0, 600.0).unwrap();
        let mut path = zigzag();
        let before = path_length(&path, &space);

        let removed = smooth_path_with_budget(&mut path, &space, 100);
        assert_eq!(removed, 8);
        assert_eq!(path, vec![Point2D::new(50.0, 100.0), Point2D::new(230.0, 140.0)]);
        assert!(path_length(&path, &space) <= before);
    }

    #[test]
    fn test_smooth_keeps_obstacle_detour() {
        let space = GridStateSpace::new(800.0, 600.0, 40, 30).unwrap();
        space
            .obstacle_grid()
            .write()
            .unwrap()
            .set_obstacle(GridCell::new(5, 5), true)
            .unwrap();
        // detour around cell (5, 5) = [100, 120) x [100, 120)
        let mut path = vec![
            Point2D::new(60.0, 110.0),
            Point2D::new(80.0, 110.0),
            Point2D::new(90.0, 140.0),
            Point2D::new(110.0, 140.0),
            Point2D::new(130.0, 140.0),
            Point2D::new(140.0, 110.0),
            Point2D::new(160.0, 110.0),
        ];
        let before = path_length(&path, &space);

        smooth_path(&mut path, &space);
        assert!(path.len() >= 3);
        assert_eq!(path.first(), Some(&Point2D::new(60.0, 110.0)));
        assert_eq!(path.last(), Some(&Point2D::new(160.0, 110.0)));
        assert_eq!(first_invalid_segment(&path, &space), None);
        assert!(path_length(&path, &space) <= before);

        let again = path.clone();
        smooth_path(&mut path, &space);
        assert_eq!(path, again);
    }

    #[test]
    fn test_smooth_short_paths_untouched() {
        let space = PlaneStateSpace::new(10.0, 10.0).unwrap();
        let mut path = vec![Point2D::new(1.0, 1.0), Point2D::new(2.0, 2.0)];
        assert_eq!(smooth_path_with_budget(&mut path, &space, 10), 0);
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_down_sample() {
        let mut values: Vec<u32> = (0..10).collect();
        down_sample(&mut values, 4);
        assert_eq!(values, vec![0, 3, 6, 9]);

        let mut values: Vec<u32> = (0..5).collect();
        down_sample(&mut values, 5);
        assert_eq!(values, vec![0, 1, 2, 3, 4]);

        let mut values: Vec<u32> = (0..5).collect();
        down_sample(&mut values, 1);
        assert_eq!(values, vec![0]);

        down_sample(&mut values, 0);
        assert!(values.is_empty());
    }

    #[test]
    fn test_waypoints_from_path() {
        let path: Vec<u32> = (0..40).collect();
        let waypoints = waypoints_from_path(&path, DEFAULT_WAYPOINT_CACHE_SIZE);
        assert_eq!(waypoints.len(), DEFAULT_WAYPOINT_CACHE_SIZE);
        assert_eq!(waypoints.first(), Some(&1));
        assert_eq!(waypoints.last(), Some(&38));

        assert!(waypoints_from_path(&[1, 2], 15).is_empty());
        assert_eq!(waypoints_from_path(&[1, 2, 3], 15), vec![2]);
    }

    #[test]
    fn test_first_invalid_segment_sees_grid_edits() {
        let space = GridStateSpace::new(800.0, 600.0, 40, 30).unwrap();
        let path = vec![
            Point2D::new(50.0, 50.0),
            Point2D::new(150.0, 50.0),
            Point2D::new(150.0, 250.0),
        ];
        assert_eq!(first_invalid_segment(&path, &space), None);

        let cell = space.obstacle_grid().read().unwrap().grid_square_for_location(&path[2]);
        space.obstacle_grid().write().unwrap().toggle(cell).unwrap();
        assert_eq!(first_invalid_segment(&path, &space), Some(1));
    }
}
