//! Dead-reckoning track reconstruction with verified position correction.
//!
//! Headings and speeds are integrated from a known coordinate into an
//! uncorrected track. Sparse verified positions are then under-sampled into
//! anchors, and the track between consecutive anchors is rescaled and rotated
//! so it passes through them.

pub mod anchors;
pub mod current;
pub mod dead_reckoning;
pub mod geo;
pub mod input;
pub mod metrics;
pub mod params;
pub mod preprocess;
pub mod table;
pub mod vpc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub use anchors::{AnchorSelector, Candidate};
pub use geo::{Direction, GeoPoint, EARTH_RADIUS_M};
pub use input::{SensorTable, Series, VerifiedPositions};
pub use params::{list_anchor_methods, AnchorMethod, AnchorMethodInfo, TrackParams, VpcConfig};
pub use table::{Column, Features, TrackRow, TrackTable, Value};
pub use vpc::{CorrectionFactors, Segment};

use anchors::{collect_candidates, SelectionContext};
use dead_reckoning::{reckon, steps_to_view, to_view, Step};
use metrics::{track_metrics, vp_metrics, TrackMetrics, VpMetrics};
use preprocess::Prepared;
use vpc::{correct, Correction, CorrectionInput};

#[derive(Error, Debug)]
pub enum TrackError {
    #[error("invalid timeline at row {row}: {reason}")]
    InvalidTimeline { row: usize, reason: String },
    #[error("{field} has no value to carry forward before its first sample")]
    UndefinedCarryForward { field: &'static str },
    #[error("a correction method was requested but no verified positions were supplied")]
    MissingVerifiedPositions,
    #[error("{field} has {found} rows, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("insufficient data for track reconstruction")]
    InsufficientData,
}

/// Degraded but usable outcomes.
#[derive(Error, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum TrackWarning {
    #[error("{method}: {candidates} usable verified positions gave {anchors} anchors; track left uncorrected")]
    InsufficientAnchors {
        method: String,
        candidates: usize,
        anchors: usize,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackSummary {
    pub rows: usize,
    /// Where the uncorrected integration ended: the last row when outgoing,
    /// the first row otherwise.
    pub terminal_dr_position: GeoPoint,
    pub total_radial_2d_m: f64,
    pub total_radial_3d_m: Option<f64>,
    pub method_id: Option<String>,
    pub usable_verified: usize,
    pub anchors: usize,
    pub segments: Vec<Segment>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackOutcome {
    pub table: TrackTable,
    pub summary: TrackSummary,
    pub warnings: Vec<TrackWarning>,
    pub params_hash: String,
}

/// Reconstruct the track for `table`.
pub fn compute_track(table: &SensorTable, params: &TrackParams) -> Result<TrackOutcome, TrackError> {
    params.validate()?;
    let prepared = preprocess::prepare(table, params.max_speed)?;
    let n = prepared.len();
    let direction = Direction::from_outgoing(params.outgoing);
    let radius = params.earth_radius_m;
    debug!(rows = n, ?direction, "prepared sensor table");

    let integrated = prepared.current.as_ref().map(|c| {
        current::integrate_current(
            &prepared.radial_distance,
            &prepared.heading,
            &c.speed,
            &c.heading,
            &prepared.dt,
        )
    });
    let (distances, bearings) = match integrated.as_ref() {
        Some(track) => (&track.radial_distance, &track.heading),
        None => (&prepared.radial_distance, &prepared.heading),
    };
    let steps: Vec<Step> = distances
        .iter()
        .zip(bearings.iter())
        .map(|(&distance_m, &bearing_deg)| Step {
            distance_m,
            bearing_deg,
        })
        .collect();

    let elevation = prepared.elevation.as_ref().map(|e| e.to_vec());
    let reckoned = reckon(&steps, elevation.as_deref(), params.start, direction, radius);
    debug!(
        terminal_lon = reckoned.terminal.lon,
        terminal_lat = reckoned.terminal.lat,
        "integrated uncorrected track"
    );

    let method = params.vpc.method.as_ref();
    let verified = table
        .verified
        .as_ref()
        .map(|vp| usable_verified(vp, &prepared, params, direction));
    if method.is_some() {
        let raw_present = table
            .verified
            .as_ref()
            .map(|vp| (0..vp.len()).any(|row| vp.get(row).is_some()))
            .unwrap_or(false);
        if !raw_present {
            return Err(TrackError::MissingVerifiedPositions);
        }
    }

    let elapsed_s = prepared.elapsed_s.to_vec();
    let mut warnings = Vec::new();
    let mut correction = None;
    if let (Some(method), Some(verified)) = (method, verified.as_ref()) {
        let vp_view = to_view(verified, direction);
        let elapsed_view = to_view(&elapsed_s, direction);
        let baseline_view = to_view(&reckoned.positions, direction);
        let steps_view = steps_to_view(&steps, direction);

        let candidates = collect_candidates(&vp_view, &elapsed_view);
        let anchors = method.select(&SelectionContext {
            candidates: &candidates,
            baseline: &baseline_view,
            bound: params.vpc.bound,
            dist_step: params.vpc.dist_step,
            radius_m: radius,
        });
        debug!(
            method = method.id(),
            candidates = candidates.len(),
            anchors = anchors.len(),
            "selected anchors"
        );
        if anchors.len() < 2 {
            let warning = TrackWarning::InsufficientAnchors {
                method: method.id().to_string(),
                candidates: candidates.len(),
                anchors: anchors.len(),
            };
            warn!("{}", warning);
            warnings.push(warning);
        } else {
            let fitted = correct(&CorrectionInput {
                steps: &steps_view,
                baseline: &baseline_view,
                anchors: &anchors,
                bound: params.vpc.bound,
                direction,
                radius_m: radius,
            });
            debug!(segments = fitted.segments.len(), "corrected track");
            correction = Some(fitted.into_original(direction));
        }
    }

    let dt = prepared.dt.to_vec();
    let dr_positions: Vec<Option<GeoPoint>> = reckoned.positions.iter().copied().map(Some).collect();
    let dr_metrics = track_metrics(&dr_positions, &dt, elevation.as_deref(), radius);
    let vpc_metrics = correction
        .as_ref()
        .map(|c| track_metrics(&c.positions, &dt, elevation.as_deref(), radius));
    let verified_metrics = verified
        .as_ref()
        .map(|vp| vp_metrics(vp, &elapsed_s, params.vpc.dist_step, radius));

    let features = Features {
        marked_event: prepared.marked_event.is_some(),
        pitch: prepared.pitch.is_some(),
        elevation: prepared.elevation.is_some(),
        current: integrated.is_some(),
        verified: verified.is_some(),
        correction: correction.is_some(),
    };
    let sources = RowSources {
        prepared: &prepared,
        integrated: integrated.as_ref(),
        dr_positions: &reckoned.positions,
        dr_metrics: &dr_metrics,
        correction: correction.as_ref(),
        vpc_metrics: vpc_metrics.as_ref(),
        verified: verified.as_deref(),
        verified_metrics: verified_metrics.as_ref(),
    };
    let rows = (0..n).map(|i| sources.row(i)).collect();

    let summary = TrackSummary {
        rows: n,
        terminal_dr_position: reckoned.terminal,
        total_radial_2d_m: reckoned.cumulative_2d_m.last().copied().unwrap_or(0.0),
        total_radial_3d_m: reckoned
            .cumulative_3d_m
            .as_ref()
            .and_then(|c| c.last().copied()),
        method_id: method.map(|m| m.id().to_string()),
        usable_verified: verified
            .as_ref()
            .map(|vp| vp.iter().flatten().count())
            .unwrap_or(0),
        anchors: correction
            .as_ref()
            .map(|c| c.is_anchor.iter().filter(|&&a| a).count())
            .unwrap_or(0),
        segments: correction
            .as_ref()
            .map(|c| c.segments.clone())
            .unwrap_or_default(),
    };

    Ok(TrackOutcome {
        table: TrackTable { features, rows },
        summary,
        warnings,
        params_hash: params.params_hash_sha256()?,
    })
}

/// Verified positions that may serve as anchors, in original row order. The
/// supplied coordinate is placed at the seed row and survives movement filtering.
fn usable_verified(
    vp: &VerifiedPositions,
    prepared: &Prepared,
    params: &TrackParams,
    direction: Direction,
) -> Vec<Option<GeoPoint>> {
    let n = prepared.len();
    let seed_row = match direction {
        Direction::Forward => 0,
        Direction::Reverse => n - 1,
    };
    (0..n)
        .map(|row| {
            if row == seed_row {
                return Some(params.start);
            }
            let stationary = params.vpc.vp_me
                && prepared
                    .marked_event
                    .as_ref()
                    .map(|me| me[row] <= 0.0)
                    .unwrap_or(false);
            if stationary {
                None
            } else {
                vp.get(row)
            }
        })
        .collect()
}

struct RowSources<'a> {
    prepared: &'a Prepared,
    integrated: Option<&'a current::CurrentTrack>,
    dr_positions: &'a [GeoPoint],
    dr_metrics: &'a TrackMetrics,
    correction: Option<&'a Correction>,
    vpc_metrics: Option<&'a TrackMetrics>,
    verified: Option<&'a [Option<GeoPoint>]>,
    verified_metrics: Option<&'a VpMetrics>,
}

fn pick<T: Copy>(values: Option<&Vec<Option<T>>>, i: usize) -> Option<T> {
    values.and_then(|v| v[i])
}

impl RowSources<'_> {
    fn row(&self, i: usize) -> TrackRow {
        let p = self.prepared;
        let dr = self.dr_positions[i];
        let corrected = self.correction.and_then(|c| c.positions[i]);
        let vpc = self.vpc_metrics;
        let vp = self.verified.and_then(|v| v[i]);
        let vpm = self.verified_metrics;
        TrackRow {
            row: i,
            timestamp: p.timestamps[i],
            elapsed_s: p.elapsed_s[i],
            dt_s: p.dt[i],
            heading_deg: p.heading[i],
            speed: p.speed[i],
            radial_distance_m: p.radial_distance[i],
            marked_event: p.marked_event.as_ref().map(|v| v[i]),
            pitch_deg: p.pitch.as_ref().map(|v| v[i]),
            elevation_m: p.elevation.as_ref().map(|v| v[i]),
            current_speed: p.current.as_ref().map(|c| c.speed[i]),
            current_heading_deg: p.current.as_ref().map(|c| c.heading[i]),
            integrated_heading_deg: self.integrated.map(|c| c.heading[i]),
            integrated_radial_distance_m: self.integrated.map(|c| c.radial_distance[i]),

            dr_lon: dr.lon,
            dr_lat: dr.lat,
            dr_distance_2d_m: self.dr_metrics.distance_2d_m[i].unwrap_or(0.0),
            dr_cum_distance_2d_m: self.dr_metrics.cum_distance_2d_m[i].unwrap_or(0.0),
            dr_dist_from_start_2d_m: self.dr_metrics.dist_from_start_2d_m[i].unwrap_or(0.0),
            dr_speed_2d: self.dr_metrics.speed_2d[i].unwrap_or(0.0),
            dr_distance_3d_m: pick(self.dr_metrics.distance_3d_m.as_ref(), i),
            dr_cum_distance_3d_m: pick(self.dr_metrics.cum_distance_3d_m.as_ref(), i),
            dr_speed_3d: pick(self.dr_metrics.speed_3d.as_ref(), i),

            vpc_lon: corrected.map(|c| c.lon),
            vpc_lat: corrected.map(|c| c.lat),
            dist_corr_factor: self.correction.and_then(|c| c.dist_factor[i]),
            head_corr_factor_deg: self.correction.and_then(|c| c.head_factor[i]),
            error_before_correction_m: self.correction.and_then(|c| c.error_before_m[i]),
            error_after_correction_m: self.correction.and_then(|c| c.error_after_m[i]),
            vpc_distance_2d_m: vpc.and_then(|m| m.distance_2d_m[i]),
            vpc_cum_distance_2d_m: vpc.and_then(|m| m.cum_distance_2d_m[i]),
            vpc_dist_from_start_2d_m: vpc.and_then(|m| m.dist_from_start_2d_m[i]),
            vpc_speed_2d: vpc.and_then(|m| m.speed_2d[i]),
            vpc_distance_3d_m: vpc.and_then(|m| pick(m.distance_3d_m.as_ref(), i)),
            vpc_cum_distance_3d_m: vpc.and_then(|m| pick(m.cum_distance_3d_m.as_ref(), i)),
            vpc_speed_3d: vpc.and_then(|m| pick(m.speed_3d.as_ref(), i)),

            vp_lon: vp.map(|v| v.lon),
            vp_lat: vp.map(|v| v.lat),
            vp_present: self.verified.map(|_| vp.is_some()),
            vp_used: self.correction.map(|c| c.is_anchor[i]),
            vp_count: vpm.map(|m| m.count[i]),
            vp_elapsed_s: vpm.and_then(|m| m.elapsed_s[i]),
            vp_distance_2d_m: vpm.and_then(|m| m.distance_2d_m[i]),
            vp_cum_distance_2d_m: vpm.and_then(|m| m.cum_distance_2d_m[i]),
            vp_speed_2d: vpm.and_then(|m| m.speed_2d[i]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::advance;
    use approx::assert_relative_eq;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn timestamps(n: usize) -> Vec<DateTime<Utc>> {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        (0..n).map(|i| t0 + Duration::seconds(i as i64)).collect()
    }

    fn sensor(n: usize, heading: f64, speed: f64) -> SensorTable {
        SensorTable::new(timestamps(n), vec![heading; n], vec![speed; n])
    }

    /// Verified positions along a track that turns gently while the sensors
    /// report a straight heading.
    fn drifting_truth(n: usize, start: GeoPoint) -> Vec<Option<GeoPoint>> {
        let mut p = start;
        (0..n)
            .map(|i| {
                if i > 0 {
                    let bearing = 10.0 + 0.05 * i as f64;
                    p = advance(p, 1.1, bearing, Direction::Forward, EARTH_RADIUS_M);
                }
                Some(p)
            })
            .collect()
    }

    fn with_method(method: AnchorMethod, bound: bool) -> TrackParams {
        TrackParams {
            vpc: VpcConfig {
                method: Some(method),
                bound,
                ..VpcConfig::default()
            },
            ..TrackParams::default()
        }
    }

    #[test]
    fn straight_line_east() {
        let out = compute_track(&sensor(100, 90.0, 1.0), &TrackParams::default()).unwrap();
        let rows = &out.table.rows;
        assert_eq!(rows.len(), 100);
        assert_eq!(rows[0].dr_lon, 0.0);
        assert!(rows.windows(2).all(|w| w[1].dr_lon > w[0].dr_lon));
        assert!(rows.iter().all(|r| r.dr_lat.abs() < 1e-12));
        assert_relative_eq!(rows[99].dr_dist_from_start_2d_m, 99.0, epsilon = 1e-6);
        assert_relative_eq!(out.summary.total_radial_2d_m, 99.0, epsilon = 1e-9);
        assert!(out.warnings.is_empty());
        assert!(!out.table.columns().contains(&Column::VpcLon));
    }

    #[test]
    fn frozen_movement_holds_position() {
        let mut table = sensor(40, 30.0, 2.0);
        table.marked_event = Some((0..40).map(|i| if (10..=20).contains(&i) { 0.0 } else { 1.0 }).collect());
        let out = compute_track(&table, &TrackParams::default()).unwrap();
        let rows = &out.table.rows;
        for r in &rows[10..=20] {
            assert_eq!(r.dr_position(), rows[9].dr_position());
            assert_eq!(r.speed, 0.0);
        }
        assert_ne!(rows[21].dr_position(), rows[20].dr_position());
    }

    #[test]
    fn current_composition() {
        let mut table = sensor(5, 0.0, 1.0);
        table.current_speed = Some(Series::Scalar(1.0));
        table.current_heading = Some(Series::Scalar(90.0));
        let out = compute_track(&table, &TrackParams::default()).unwrap();
        let row = &out.table.rows[3];
        assert_relative_eq!(row.integrated_heading_deg.unwrap(), 45.0, epsilon = 1e-9);
        assert_relative_eq!(row.integrated_radial_distance_m.unwrap(), 2f64.sqrt(), epsilon = 1e-9);
        assert!(out.table.columns().contains(&Column::IntegratedHeadingDeg));
    }

    #[test]
    fn cumulative_distance_is_monotonic_running_sum() {
        let mut table = sensor(50, 0.0, 1.5);
        table.heading = (0..50).map(|i| (i * 37) as f64).collect();
        let out = compute_track(&table, &TrackParams::default()).unwrap();
        let mut running = 0.0;
        let mut prev = 0.0;
        for r in &out.table.rows {
            running += r.dr_distance_2d_m;
            assert!(r.dr_cum_distance_2d_m >= prev);
            assert_relative_eq!(r.dr_cum_distance_2d_m, running, epsilon = 1e-9);
            prev = r.dr_cum_distance_2d_m;
        }
    }

    #[test]
    fn forward_reverse_round_trip() {
        let mut table = sensor(120, 0.0, 1.0);
        table.heading = (0..120).map(|i| 20.0 + (i as f64 / 7.0).sin() * 60.0).collect();
        table.speed = (0..120).map(|i| 1.0 + (i % 4) as f64 * 0.5).collect();
        let start = GeoPoint::new(-3.2, 51.5);
        let forward = compute_track(
            &table,
            &TrackParams {
                start,
                ..TrackParams::default()
            },
        )
        .unwrap();
        let end = forward.table.rows[119].dr_position();
        let backward = compute_track(
            &table,
            &TrackParams {
                start: end,
                outgoing: false,
                ..TrackParams::default()
            },
        )
        .unwrap();
        assert!(backward.table.rows[0].dr_position().max_abs_diff(&start) < 1e-9);
        assert!(backward.summary.terminal_dr_position.max_abs_diff(&start) < 1e-9);
    }

    #[test]
    fn bounded_anchors_match_verified_positions() {
        let n = 300;
        let start = GeoPoint::new(8.5, 47.3);
        let mut table = sensor(n, 10.0, 1.0);
        table.verified = Some(VerifiedPositions::from_points(&drifting_truth(n, start)));
        let params = TrackParams {
            start,
            ..with_method(
                AnchorMethod::TimeDist {
                    thresh_t: 45.0,
                    thresh_d: 0.0,
                },
                true,
            )
        };
        let out = compute_track(&table, &params).unwrap();
        let anchors: Vec<&TrackRow> = out
            .table
            .rows
            .iter()
            .filter(|r| r.vp_used == Some(true))
            .collect();
        assert_eq!(anchors.len(), out.summary.anchors);
        assert!(anchors.len() > 2);
        assert_eq!(anchors.last().map(|r| r.row), Some(n - 1));
        for r in anchors {
            let vpc = r.vpc_position().unwrap();
            assert!(vpc.max_abs_diff(&r.vp_position().unwrap()) < 1e-6);
        }
        assert!(out.table.rows[n - 1].error_before_correction_m.unwrap() > 1.0);
    }

    #[test]
    fn time_gate_over_ten_minutes() {
        let n = 600;
        let mut table = sensor(n, 10.0, 1.0);
        table.verified = Some(VerifiedPositions::from_points(&drifting_truth(n, GeoPoint::new(0.0, 0.0))));
        let out = compute_track(
            &table,
            &with_method(
                AnchorMethod::TimeDist {
                    thresh_t: 60.0,
                    thresh_d: 0.0,
                },
                true,
            ),
        )
        .unwrap();
        let used: Vec<usize> = out
            .table
            .rows
            .iter()
            .filter(|r| r.vp_used == Some(true))
            .map(|r| r.row)
            .collect();
        let mut expected: Vec<usize> = (0..10).map(|k| k * 60).collect();
        expected.push(599);
        assert_eq!(used, expected);
    }

    #[test]
    fn divide_picks_first_middle_last() {
        let n = 21;
        let mut verified = vec![None; n];
        for row in [0usize, 4, 8, 12, 16, 20] {
            verified[row] = Some(GeoPoint::new(row as f64 * 1e-5, 0.0));
        }
        let mut table = sensor(n, 90.0, 1.0);
        table.verified = Some(VerifiedPositions::from_points(&verified));
        let out = compute_track(&table, &with_method(AnchorMethod::Divide { thresh_t: 1 }, true)).unwrap();
        let used: Vec<usize> = out
            .table
            .rows
            .iter()
            .filter(|r| r.vp_used == Some(true))
            .map(|r| r.row)
            .collect();
        // Six candidates: positions 0, 3 and 5.
        assert_eq!(used, vec![0, 12, 20]);
    }

    #[test]
    fn all_keeps_every_filtered_position_and_is_a_fixed_point() {
        let n = 80;
        let start = GeoPoint::new(1.0, 1.0);
        let mut table = sensor(n, 10.0, 1.0);
        let mut truth = drifting_truth(n, start);
        for row in (3..n).step_by(3) {
            truth[row] = None;
        }
        table.marked_event = Some((0..n).map(|i| if i % 10 == 5 { 0.0 } else { 1.0 }).collect());
        table.verified = Some(VerifiedPositions::from_points(&truth));
        let mut params = TrackParams {
            start,
            ..with_method(AnchorMethod::All, true)
        };
        params.vpc.vp_me = true;
        let first = compute_track(&table, &params).unwrap();
        for r in &first.table.rows {
            let usable = truth[r.row].is_some() && (r.row % 10 != 5 || r.row == 0);
            assert_eq!(r.vp_used, Some(usable || r.row == 0), "row {}", r.row);
            assert_eq!(r.vp_present, Some(usable || r.row == 0));
        }

        let corrected: Vec<Option<GeoPoint>> =
            first.table.rows.iter().map(|r| r.vpc_position()).collect();
        let mut again = table.clone();
        again.verified = Some(VerifiedPositions::from_points(&corrected));
        params.vpc.vp_me = false;
        let second = compute_track(&again, &params).unwrap();
        for (a, b) in first.table.rows.iter().zip(&second.table.rows) {
            let (a, b) = (a.vpc_position().unwrap(), b.vpc_position().unwrap());
            assert!(a.max_abs_diff(&b) < 1e-9);
        }
    }

    #[test]
    fn unbounded_run_corrects_tail() {
        let n = 100;
        let mut table = sensor(n, 10.0, 1.0);
        let mut truth = drifting_truth(n, GeoPoint::new(0.0, 0.0));
        for p in truth.iter_mut().skip(71) {
            *p = None;
        }
        table.verified = Some(VerifiedPositions::from_points(&truth));
        let method = AnchorMethod::TimeDist {
            thresh_t: 35.0,
            thresh_d: 0.0,
        };
        let bounded = compute_track(&table, &with_method(method.clone(), true)).unwrap();
        assert!(bounded.table.rows[90].vpc_lon.is_none());
        let open = compute_track(&table, &with_method(method, false)).unwrap();
        assert!(open.table.rows[99].vpc_lon.is_some());
        assert!(open.summary.segments.last().map(|s| !s.bounded).unwrap_or(false));
    }

    #[test]
    fn lone_seed_degrades_with_warning() {
        let n = 30;
        let mut table = sensor(n, 45.0, 1.0);
        table.marked_event = Some(vec![0.0; n]);
        table.verified = Some(VerifiedPositions::from_points(&drifting_truth(n, GeoPoint::new(0.0, 0.0))));
        let mut params = with_method(AnchorMethod::All, true);
        params.vpc.vp_me = true;
        let out = compute_track(&table, &params).unwrap();
        assert_eq!(
            out.warnings,
            vec![TrackWarning::InsufficientAnchors {
                method: "vpc.all.v1".into(),
                candidates: 1,
                anchors: 0,
            }]
        );
        assert!(out.table.rows.iter().all(|r| r.vpc_lon.is_none()));
        let cols = out.table.columns();
        assert!(cols.contains(&Column::VpPresent));
        assert!(!cols.contains(&Column::VpcLon));
    }

    #[test]
    fn method_without_positions_is_an_error() {
        let table = sensor(10, 0.0, 1.0);
        let err = compute_track(&table, &with_method(AnchorMethod::All, true)).unwrap_err();
        assert!(matches!(err, TrackError::MissingVerifiedPositions));

        let mut empty = sensor(10, 0.0, 1.0);
        empty.verified = Some(VerifiedPositions::from_points(&vec![None; 10]));
        assert!(matches!(
            compute_track(&empty, &with_method(AnchorMethod::All, true)),
            Err(TrackError::MissingVerifiedPositions)
        ));
    }

    #[test]
    fn reverse_correction_seeds_at_last_row() {
        let n = 90;
        let truth = drifting_truth(n, GeoPoint::new(2.0, 40.0));
        let end = truth[n - 1].unwrap();
        let mut table = sensor(n, 10.0, 1.0);
        table.verified = Some(VerifiedPositions::from_points(&truth));
        let params = TrackParams {
            start: end,
            outgoing: false,
            ..with_method(
                AnchorMethod::TimeDist {
                    thresh_t: 30.0,
                    thresh_d: 0.0,
                },
                true,
            )
        };
        let out = compute_track(&table, &params).unwrap();
        let rows = &out.table.rows;
        assert_eq!(rows[n - 1].dr_position(), end);
        assert_eq!(rows[0].vp_used, Some(true));
        assert_eq!(rows[n - 1].vp_used, Some(true));
        let first = rows[0].vpc_position().unwrap();
        assert!(first.max_abs_diff(&truth[0].unwrap()) < 1e-6);
        assert!(out.summary.segments.windows(2).all(|w| w[0].end_row == w[1].start_row));
    }

    #[test]
    fn params_hash_is_attached() {
        let out = compute_track(&sensor(3, 0.0, 1.0), &TrackParams::default()).unwrap();
        assert_eq!(out.params_hash.len(), 64);
        assert_eq!(out.params_hash, TrackParams::default().params_hash_sha256().unwrap());
    }
}
