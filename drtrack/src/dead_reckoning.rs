//! Sequential dead-reckoning integration.
//!
//! Reverse runs are handled by a view: every per-row array is reversed, the
//! step taken into view row `v` becomes the step that originally led out of
//! it, and the same forward fold runs with subtracting transitions.

use serde::{Deserialize, Serialize};

use crate::geo::{advance, Direction, GeoPoint};

/// Displacement applied when moving into a row from its predecessor.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Step {
    pub distance_m: f64,
    pub bearing_deg: f64,
}

#[derive(Clone, Debug)]
pub struct Reckoned {
    /// Positions in original row order.
    pub positions: Vec<GeoPoint>,
    /// Running sum of step distances, original row order.
    pub cumulative_2d_m: Vec<f64>,
    pub cumulative_3d_m: Option<Vec<f64>>,
    /// Position reached after the last transition (the track origin in reverse runs).
    pub terminal: GeoPoint,
}

/// Reorder per-row values into processing order.
pub fn to_view<T: Clone>(values: &[T], direction: Direction) -> Vec<T> {
    match direction {
        Direction::Forward => values.to_vec(),
        Direction::Reverse => values.iter().rev().cloned().collect(),
    }
}

/// Steps in processing order. `steps[i]` leads from row `i - 1` to row `i`;
/// `steps[0]` is unused.
pub fn steps_to_view(steps: &[Step], direction: Direction) -> Vec<Step> {
    match direction {
        Direction::Forward => steps.to_vec(),
        Direction::Reverse => {
            let n = steps.len();
            let mut out = Vec::with_capacity(n);
            if n > 0 {
                out.push(Step::default());
                out.extend((1..n).map(|v| steps[n - v]));
            }
            out
        }
    }
}

/// Fold `steps` from `seed`. Returns the seed followed by one position per step.
pub fn integrate_from<I>(seed: GeoPoint, steps: I, direction: Direction, radius_m: f64) -> Vec<GeoPoint>
where
    I: IntoIterator<Item = Step>,
{
    let steps = steps.into_iter();
    let mut out = Vec::with_capacity(steps.size_hint().0 + 1);
    let mut state = seed;
    out.push(state);
    for step in steps {
        state = advance(state, step.distance_m, step.bearing_deg, direction, radius_m);
        out.push(state);
    }
    out
}

/// Uncorrected track from the supplied coordinate, which is the first row when
/// running forward and the last row otherwise.
pub fn reckon(
    steps: &[Step],
    elevation: Option<&[f64]>,
    anchor: GeoPoint,
    direction: Direction,
    radius_m: f64,
) -> Reckoned {
    let view = steps_to_view(steps, direction);
    let positions_view = match view.split_first() {
        Some((_, rest)) => integrate_from(anchor, rest.iter().copied(), direction, radius_m),
        None => Vec::new(),
    };
    let terminal = positions_view.last().copied().unwrap_or(anchor);
    let positions = to_view(&positions_view, direction);

    let mut cumulative_2d_m = Vec::with_capacity(steps.len());
    let mut total = 0.0;
    for (i, step) in steps.iter().enumerate() {
        if i > 0 {
            total += step.distance_m.abs();
        }
        cumulative_2d_m.push(total);
    }

    let cumulative_3d_m = elevation.map(|elev| {
        let mut out = Vec::with_capacity(steps.len());
        let mut total = 0.0;
        for (i, step) in steps.iter().enumerate() {
            if i > 0 {
                let dz = elev[i] - elev[i - 1];
                total += step.distance_m.hypot(dz);
            }
            out.push(total);
        }
        out
    });

    Reckoned {
        positions,
        cumulative_2d_m,
        cumulative_3d_m,
        terminal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{haversine_distance, EARTH_RADIUS_M};
    use approx::assert_relative_eq;

    fn wiggly_steps(n: usize) -> Vec<Step> {
        (0..n)
            .map(|i| Step {
                distance_m: if i == 0 { 0.0 } else { 1.0 + (i % 7) as f64 * 0.3 },
                bearing_deg: (i as f64 * 17.0) % 360.0,
            })
            .collect()
    }

    #[test]
    fn reverse_view_mirrors_steps() {
        let steps = wiggly_steps(4);
        let view = steps_to_view(&steps, Direction::Reverse);
        assert_eq!(view[0], Step::default());
        assert_eq!(view[1], steps[3]);
        assert_eq!(view[3], steps[1]);
    }

    #[test]
    fn forward_then_reverse_returns_to_start() {
        let steps = wiggly_steps(250);
        let start = GeoPoint::new(-70.1, -33.4);
        let forward = reckon(&steps, None, start, Direction::Forward, EARTH_RADIUS_M);
        let end = *forward.positions.last().unwrap();
        assert_eq!(forward.terminal, end);

        let backward = reckon(&steps, None, end, Direction::Reverse, EARTH_RADIUS_M);
        assert_eq!(backward.positions.len(), steps.len());
        assert!(backward.positions[0].max_abs_diff(&start) < 1e-9);
        assert!(backward.terminal.max_abs_diff(&start) < 1e-9);
        for (a, b) in forward.positions.iter().zip(&backward.positions) {
            assert!(a.max_abs_diff(b) < 1e-9);
        }
    }

    #[test]
    fn cumulative_distances_accumulate_steps() {
        let steps = wiggly_steps(10);
        let elevation: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let out = reckon(
            &steps,
            Some(&elevation),
            GeoPoint::new(0.0, 0.0),
            Direction::Forward,
            EARTH_RADIUS_M,
        );
        let expected: f64 = steps[1..].iter().map(|s| s.distance_m).sum();
        assert_relative_eq!(*out.cumulative_2d_m.last().unwrap(), expected, epsilon = 1e-12);
        let cum3 = out.cumulative_3d_m.unwrap();
        assert!(cum3.last().unwrap() > out.cumulative_2d_m.last().unwrap());
        let step_len = haversine_distance(out.positions[0], out.positions[1], EARTH_RADIUS_M);
        assert_relative_eq!(step_len, steps[1].distance_m, epsilon = 1e-6);
    }
}
