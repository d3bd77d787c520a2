//! Verified position correction: per-segment distance and heading factors and
//! re-integration of the corrected track.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::anchors::Candidate;
use crate::dead_reckoning::{integrate_from, Step};
use crate::geo::{haversine_distance, initial_bearing, signed_offset, wrap_degrees, Direction, GeoPoint};

/// Displacements shorter than this are treated as no movement.
const MIN_DISPLACEMENT_M: f64 = 1e-9;
/// Refinement stops once the corrected endpoint is this close to the anchor.
const ENDPOINT_TOLERANCE_DEG: f64 = 1e-11;
const MAX_REFINE_PASSES: usize = 16;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct CorrectionFactors {
    /// Multiplier on every step distance.
    pub distance: f64,
    /// Offset added to every step bearing, degrees in (-180, 180].
    pub heading_deg: f64,
}

impl CorrectionFactors {
    pub const IDENTITY: CorrectionFactors = CorrectionFactors {
        distance: 1.0,
        heading_deg: 0.0,
    };

    /// Factors that map the uncorrected displacement `dr_a -> dr_b` onto the
    /// verified displacement `vp_a -> vp_b`. `None` when the uncorrected track
    /// did not move but the verified positions differ.
    pub fn estimate(
        vp_a: GeoPoint,
        vp_b: GeoPoint,
        dr_a: GeoPoint,
        dr_b: GeoPoint,
        radius_m: f64,
    ) -> Option<Self> {
        let vp_dist = haversine_distance(vp_a, vp_b, radius_m);
        let dr_dist = haversine_distance(dr_a, dr_b, radius_m);
        if dr_dist <= MIN_DISPLACEMENT_M {
            return (vp_dist <= MIN_DISPLACEMENT_M).then_some(Self::IDENTITY);
        }
        let heading_deg = if vp_dist <= MIN_DISPLACEMENT_M {
            0.0
        } else {
            signed_offset(initial_bearing(vp_a, vp_b) - initial_bearing(dr_a, dr_b))
        };
        Some(Self {
            distance: vp_dist / dr_dist,
            heading_deg,
        })
    }

    pub fn apply(&self, step: Step) -> Step {
        Step {
            distance_m: step.distance_m * self.distance,
            bearing_deg: wrap_degrees(step.bearing_deg + self.heading_deg),
        }
    }
}

/// A corrected stretch of the track. Rows are inclusive and the start row is
/// the seeding anchor.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    pub start_row: usize,
    pub end_row: usize,
    pub factors: CorrectionFactors,
    /// False for the tail past the last anchor.
    pub bounded: bool,
    /// Distance between the corrected endpoint and the closing anchor.
    pub endpoint_miss_m: Option<f64>,
}

pub struct CorrectionInput<'a> {
    /// Steps in processing order; `steps[0]` is unused.
    pub steps: &'a [Step],
    /// Uncorrected positions in processing order.
    pub baseline: &'a [GeoPoint],
    pub anchors: &'a [Candidate],
    pub bound: bool,
    pub direction: Direction,
    pub radius_m: f64,
}

/// Per-row correction output; `None` marks rows the correction does not reach.
#[derive(Clone, Debug, Default)]
pub struct Correction {
    pub positions: Vec<Option<GeoPoint>>,
    pub dist_factor: Vec<Option<f64>>,
    pub head_factor: Vec<Option<f64>>,
    pub error_before_m: Vec<Option<f64>>,
    pub error_after_m: Vec<Option<f64>>,
    pub is_anchor: Vec<bool>,
    pub segments: Vec<Segment>,
}

impl Correction {
    /// Convert from processing order to original row order.
    pub fn into_original(mut self, direction: Direction) -> Self {
        if direction == Direction::Forward {
            return self;
        }
        let n = self.positions.len();
        self.positions.reverse();
        self.dist_factor.reverse();
        self.head_factor.reverse();
        self.error_before_m.reverse();
        self.error_after_m.reverse();
        self.is_anchor.reverse();
        self.segments.reverse();
        for segment in &mut self.segments {
            let (start, end) = (segment.start_row, segment.end_row);
            segment.start_row = n - 1 - end;
            segment.end_row = n - 1 - start;
        }
        self
    }
}

/// Correct the track between consecutive anchors. Requires at least two anchors.
pub fn correct(input: &CorrectionInput<'_>) -> Correction {
    let n = input.steps.len();
    let mut out = Correction {
        positions: vec![None; n],
        dist_factor: vec![None; n],
        head_factor: vec![None; n],
        error_before_m: vec![None; n],
        error_after_m: vec![None; n],
        is_anchor: vec![false; n],
        segments: Vec::new(),
    };
    let Some(first) = input.anchors.first() else {
        return out;
    };

    let mut fitted: Vec<(Segment, Vec<GeoPoint>)> = input
        .anchors
        .par_windows(2)
        .map(|pair| fit_segment(input, &pair[0], &pair[1]))
        .collect();

    if !input.bound {
        let last = input.anchors[input.anchors.len() - 1];
        if last.row + 1 < n {
            if let Some(factors) = fitted.last().map(|(seg, _)| seg.factors) {
                let path = integrate_from(
                    last.point,
                    input.steps[last.row + 1..].iter().map(|s| factors.apply(*s)),
                    input.direction,
                    input.radius_m,
                );
                fitted.push((
                    Segment {
                        start_row: last.row,
                        end_row: n - 1,
                        factors,
                        bounded: false,
                        endpoint_miss_m: None,
                    },
                    path,
                ));
            }
        }
    }

    out.positions[first.row] = Some(first.point);
    if let Some((segment, _)) = fitted.first() {
        out.dist_factor[first.row] = Some(segment.factors.distance);
        out.head_factor[first.row] = Some(segment.factors.heading_deg);
    }
    for (segment, path) in &fitted {
        for (offset, point) in path.iter().enumerate().skip(1) {
            let row = segment.start_row + offset;
            out.positions[row] = Some(*point);
            out.dist_factor[row] = Some(segment.factors.distance);
            out.head_factor[row] = Some(segment.factors.heading_deg);
        }
    }

    let mut anchor_points = vec![None; n];
    for anchor in input.anchors {
        anchor_points[anchor.row] = Some(anchor.point);
        out.is_anchor[anchor.row] = true;
    }
    let mut carried: Option<(f64, f64)> = None;
    for row in 0..n {
        let Some(position) = out.positions[row] else {
            continue;
        };
        if let Some(vp) = anchor_points[row] {
            carried = Some((
                haversine_distance(input.baseline[row], vp, input.radius_m),
                haversine_distance(position, vp, input.radius_m),
            ));
        }
        out.error_before_m[row] = carried.map(|(before, _)| before);
        out.error_after_m[row] = carried.map(|(_, after)| after);
    }

    out.segments = fitted.into_iter().map(|(segment, _)| segment).collect();
    out
}

fn fit_segment(input: &CorrectionInput<'_>, from: &Candidate, to: &Candidate) -> (Segment, Vec<GeoPoint>) {
    let steps = &input.steps[from.row + 1..=to.row];
    let integrate = |factors: CorrectionFactors| {
        integrate_from(
            from.point,
            steps.iter().map(|s| factors.apply(*s)),
            input.direction,
            input.radius_m,
        )
    };

    let estimate = CorrectionFactors::estimate(
        from.point,
        to.point,
        input.baseline[from.row],
        input.baseline[to.row],
        input.radius_m,
    );
    let (factors, path) = match estimate {
        Some(initial) => refine(from.point, to.point, initial, integrate),
        None => {
            debug!(
                "rows {}..{}: no uncorrected displacement to scale, leaving segment unscaled",
                from.row, to.row
            );
            let path = integrate(CorrectionFactors::IDENTITY);
            (CorrectionFactors::IDENTITY, path)
        }
    };
    let end = path.last().copied().unwrap_or(from.point);
    let miss = haversine_distance(end, to.point, input.radius_m);
    (
        Segment {
            start_row: from.row,
            end_row: to.row,
            factors,
            bounded: true,
            endpoint_miss_m: Some(miss),
        },
        path,
    )
}

/// Adjust the factors until the re-integrated segment closes on `target`.
/// The spherical step formula makes the first estimate only approximately
/// exact; each pass rescales and rotates by the remaining endpoint error.
fn refine<F>(
    seed: GeoPoint,
    target: GeoPoint,
    initial: CorrectionFactors,
    integrate: F,
) -> (CorrectionFactors, Vec<GeoPoint>)
where
    F: Fn(CorrectionFactors) -> Vec<GeoPoint>,
{
    let target_dist = haversine_distance(seed, target, 1.0);
    let target_bearing = initial_bearing(seed, target);
    let mut factors = initial;
    let mut path = integrate(factors);
    for _ in 0..MAX_REFINE_PASSES {
        let end = path.last().copied().unwrap_or(seed);
        if end.max_abs_diff(&target) <= ENDPOINT_TOLERANCE_DEG {
            break;
        }
        let reached = haversine_distance(seed, end, 1.0);
        if reached <= f64::EPSILON || target_dist <= f64::EPSILON {
            break;
        }
        factors = CorrectionFactors {
            distance: factors.distance * target_dist / reached,
            heading_deg: signed_offset(
                factors.heading_deg + target_bearing - initial_bearing(seed, end),
            ),
        };
        path = integrate(factors);
    }
    (factors, path)
}
