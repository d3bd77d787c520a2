//! Under-sampling of verified positions into correction anchors.
//!
//! All positions handled here are in processing order: rows are view rows and
//! times are elapsed seconds, compared as absolute differences so reverse runs
//! share the same gates.

use ordered_float::OrderedFloat;
use rayon::prelude::*;

use crate::geo::{haversine_distance, GeoPoint};
use crate::params::AnchorMethod;
use crate::vpc::CorrectionFactors;

/// A usable verified position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub row: usize,
    pub point: GeoPoint,
    pub time_s: f64,
}

/// Collect usable verified positions in processing order.
pub fn collect_candidates(verified: &[Option<GeoPoint>], elapsed_s: &[f64]) -> Vec<Candidate> {
    verified
        .iter()
        .zip(elapsed_s)
        .enumerate()
        .filter_map(|(row, (point, &time_s))| {
            point.map(|point| Candidate { row, point, time_s })
        })
        .collect()
}

pub struct SelectionContext<'a> {
    pub candidates: &'a [Candidate],
    /// Uncorrected positions in processing order, indexed by view row.
    pub baseline: &'a [GeoPoint],
    pub bound: bool,
    pub dist_step: usize,
    pub radius_m: f64,
}

impl SelectionContext<'_> {
    fn elapsed(&self, from: usize, to: usize) -> f64 {
        (self.candidates[to].time_s - self.candidates[from].time_s).abs()
    }

    fn distance(&self, from: usize, to: usize) -> f64 {
        haversine_distance(
            self.candidates[from].point,
            self.candidates[to].point,
            self.radius_m,
        )
    }

    fn correction_score(&self, anchor: usize, next: usize, with_heading: bool) -> f64 {
        let a = &self.candidates[anchor];
        let b = &self.candidates[next];
        match CorrectionFactors::estimate(
            a.point,
            b.point,
            self.baseline[a.row],
            self.baseline[b.row],
            self.radius_m,
        ) {
            Some(f) => {
                let heading = if with_heading {
                    f.heading_deg.abs() / 180.0
                } else {
                    0.0
                };
                (f.distance - 1.0).abs() + heading
            }
            None => f64::INFINITY,
        }
    }
}

pub trait AnchorSelector {
    /// Anchor candidates as strictly increasing view rows. Empty when fewer
    /// than two anchors can be formed.
    fn select(&self, ctx: &SelectionContext<'_>) -> Vec<Candidate>;
}

impl AnchorSelector for AnchorMethod {
    fn select(&self, ctx: &SelectionContext<'_>) -> Vec<Candidate> {
        let m = ctx.candidates.len();
        if m < 2 {
            return Vec::new();
        }
        let mut picks: Vec<usize> = match self {
            AnchorMethod::All => (0..m).collect(),
            AnchorMethod::Divide { thresh_t } => {
                let t = (*thresh_t).min(m - 1);
                (0..=t).map(|k| k * m / (t + 1)).collect()
            }
            AnchorMethod::TimeDist { thresh_t, thresh_d } => {
                threshold_walk(ctx, &Thresholds::new(*thresh_t, *thresh_d, DistanceGate::StraightLine))
            }
            AnchorMethod::CumDist { thresh_t, thresh_d } => {
                threshold_walk(ctx, &Thresholds::new(*thresh_t, *thresh_d, DistanceGate::Cumulative))
            }
            AnchorMethod::TimeDistCorrFac {
                thresh_t,
                thresh_d,
                span,
                dist_head_corr,
            } => correction_walk(
                ctx,
                &Thresholds::new(*thresh_t, *thresh_d, DistanceGate::StraightLine),
                *span,
                *dist_head_corr,
            ),
        };
        if ctx.bound {
            picks.push(0);
            picks.push(m - 1);
        }
        picks.sort_unstable();
        picks.dedup();
        if picks.len() < 2 {
            return Vec::new();
        }
        picks.into_iter().map(|k| ctx.candidates[k]).collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DistanceGate {
    StraightLine,
    Cumulative,
}

#[derive(Clone, Copy, Debug)]
struct Thresholds {
    time_s: f64,
    distance_m: f64,
    gate: DistanceGate,
}

impl Thresholds {
    fn new(time_s: f64, distance_m: f64, gate: DistanceGate) -> Self {
        Self {
            time_s,
            distance_m,
            gate,
        }
    }
}

/// Time and distance counters since the last retained anchor. Both reset
/// together when a new anchor is retained, i.e. when a new gate is built.
struct Gate<'c> {
    ctx: &'c SelectionContext<'c>,
    thresholds: Thresholds,
    anchor: usize,
    path_m: f64,
}

impl<'c> Gate<'c> {
    fn new(ctx: &'c SelectionContext<'c>, thresholds: Thresholds, anchor: usize) -> Self {
        Self {
            ctx,
            thresholds,
            anchor,
            path_m: 0.0,
        }
    }

    /// Must be fed strictly increasing candidates after the anchor.
    fn passes(&mut self, k: usize) -> bool {
        let step = self.ctx.dist_step.max(1);
        let on_stride = (k - self.anchor) % step == 0;
        if on_stride && self.thresholds.gate == DistanceGate::Cumulative {
            self.path_m += self.ctx.distance(k - step, k);
        }
        let time_ok =
            self.thresholds.time_s <= 0.0 || self.ctx.elapsed(self.anchor, k) >= self.thresholds.time_s;
        let dist_ok = self.thresholds.distance_m <= 0.0
            || (on_stride
                && match self.thresholds.gate {
                    DistanceGate::StraightLine => {
                        self.ctx.distance(self.anchor, k) >= self.thresholds.distance_m
                    }
                    DistanceGate::Cumulative => self.path_m >= self.thresholds.distance_m,
                });
        time_ok && dist_ok
    }
}

fn threshold_walk(ctx: &SelectionContext<'_>, thresholds: &Thresholds) -> Vec<usize> {
    let m = ctx.candidates.len();
    let mut picks = vec![0];
    let mut anchor = 0;
    loop {
        let mut gate = Gate::new(ctx, *thresholds, anchor);
        match (anchor + 1..m).find(|&k| gate.passes(k)) {
            Some(next) => {
                picks.push(next);
                anchor = next;
            }
            None => break,
        }
    }
    picks
}

fn correction_walk(
    ctx: &SelectionContext<'_>,
    thresholds: &Thresholds,
    span: f64,
    with_heading: bool,
) -> Vec<usize> {
    let m = ctx.candidates.len();
    let mut picks = vec![0];
    let mut anchor = 0;
    loop {
        let mut gate = Gate::new(ctx, *thresholds, anchor);
        let Some(first) = (anchor + 1..m).find(|&k| gate.passes(k)) else {
            break;
        };
        let mut window = vec![first];
        for k in first + 1..m {
            if ctx.elapsed(first, k) > span {
                break;
            }
            if gate.passes(k) {
                window.push(k);
            }
        }
        let best = window
            .par_iter()
            .map(|&k| (OrderedFloat(ctx.correction_score(anchor, k, with_heading)), k))
            .min()
            .map(|(_, k)| k)
            .unwrap_or(first);
        picks.push(best);
        anchor = best;
    }
    picks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{advance, Direction, EARTH_RADIUS_M};

    /// Candidates every second moving east at 1 m/s, baseline identical.
    fn eastward(n: usize) -> (Vec<Candidate>, Vec<GeoPoint>) {
        let mut points = vec![GeoPoint::new(0.0, 10.0)];
        for _ in 1..n {
            let last = *points.last().unwrap();
            points.push(advance(last, 1.0, 90.0, Direction::Forward, EARTH_RADIUS_M));
        }
        let candidates = points
            .iter()
            .enumerate()
            .map(|(row, p)| Candidate {
                row,
                point: *p,
                time_s: row as f64,
            })
            .collect();
        (candidates, points)
    }

    fn ctx<'a>(candidates: &'a [Candidate], baseline: &'a [GeoPoint], bound: bool) -> SelectionContext<'a> {
        SelectionContext {
            candidates,
            baseline,
            bound,
            dist_step: 1,
            radius_m: EARTH_RADIUS_M,
        }
    }

    fn rows(picks: &[Candidate]) -> Vec<usize> {
        picks.iter().map(|c| c.row).collect()
    }

    #[test]
    fn all_keeps_every_candidate() {
        let (c, b) = eastward(7);
        assert_eq!(rows(&AnchorMethod::All.select(&ctx(&c, &b, true))), (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn divide_one_yields_first_middle_last() {
        for m in [5usize, 10, 101] {
            let (c, b) = eastward(m);
            let picks = AnchorMethod::Divide { thresh_t: 1 }.select(&ctx(&c, &b, true));
            assert_eq!(rows(&picks), vec![0, m / 2, m - 1]);
        }
    }

    #[test]
    fn divide_clamps_to_available_candidates() {
        let (c, b) = eastward(4);
        let picks = AnchorMethod::Divide { thresh_t: 50 }.select(&ctx(&c, &b, true));
        assert_eq!(rows(&picks), vec![0, 1, 2, 3]);
    }

    #[test]
    fn time_gate_retains_every_sixty_seconds() {
        let (c, b) = eastward(600);
        let method = AnchorMethod::TimeDist {
            thresh_t: 60.0,
            thresh_d: 0.0,
        };
        let picks = rows(&method.select(&ctx(&c, &b, true)));
        let mut expected: Vec<usize> = (0..600).step_by(60).collect();
        expected.push(599);
        assert_eq!(picks.len(), 11);
        assert_eq!(picks, expected);

        let unbound = rows(&method.select(&ctx(&c, &b, false)));
        assert_eq!(unbound, (0..600).step_by(60).collect::<Vec<_>>());
    }

    #[test]
    fn straight_and_cumulative_gates_differ_on_loops() {
        // Out 10 m east then back west: straight-line distance never exceeds 10 m.
        let mut points = vec![GeoPoint::new(0.0, 0.0)];
        for i in 1..=20 {
            let last = *points.last().unwrap();
            let bearing = if i <= 10 { 90.0 } else { 270.0 };
            points.push(advance(last, 1.0, bearing, Direction::Forward, EARTH_RADIUS_M));
        }
        let c: Vec<Candidate> = points
            .iter()
            .enumerate()
            .map(|(row, p)| Candidate {
                row,
                point: *p,
                time_s: row as f64,
            })
            .collect();
        let straight = AnchorMethod::TimeDist {
            thresh_t: 0.0,
            thresh_d: 15.0,
        }
        .select(&ctx(&c, &points, false));
        assert!(straight.is_empty());

        let cumulative = AnchorMethod::CumDist {
            thresh_t: 0.0,
            thresh_d: 14.5,
        }
        .select(&ctx(&c, &points, false));
        assert_eq!(rows(&cumulative), vec![0, 15]);
    }

    #[test]
    fn distance_gate_respects_stride() {
        let (c, b) = eastward(30);
        let mut context = ctx(&c, &b, false);
        context.dist_step = 4;
        let picks = AnchorMethod::TimeDist {
            thresh_t: 0.0,
            thresh_d: 5.0,
        }
        .select(&context);
        // 5 m is first reached at offset 5, but the stride only looks at offsets 4, 8, ...
        assert_eq!(rows(&picks)[..3], [0, 8, 16]);
    }

    #[test]
    fn correction_factor_walk_prefers_consistent_positions() {
        let (c, b) = eastward(40);
        let mut noisy = c.clone();
        // Perturb the first eligible candidate so its implied factor is poor.
        noisy[10].point = advance(noisy[10].point, 4.0, 0.0, Direction::Forward, EARTH_RADIUS_M);
        let picks = AnchorMethod::TimeDistCorrFac {
            thresh_t: 10.0,
            thresh_d: 0.0,
            span: 3.0,
            dist_head_corr: true,
        }
        .select(&ctx(&noisy, &b, true));
        let rows = rows(&picks);
        assert_eq!(rows[0], 0);
        assert!(rows[1] > 10 && rows[1] <= 13);
        assert_eq!(*rows.last().unwrap(), 39);
    }

    #[test]
    fn too_few_candidates_yield_nothing() {
        let (c, b) = eastward(1);
        assert!(AnchorMethod::All.select(&ctx(&c, &b, true)).is_empty());
    }
}
