//! Distances and speeds derived from positions.

use crate::geo::{haversine_distance, GeoPoint};

#[derive(Clone, Debug, Default)]
pub struct TrackMetrics {
    pub distance_2d_m: Vec<Option<f64>>,
    pub cum_distance_2d_m: Vec<Option<f64>>,
    pub dist_from_start_2d_m: Vec<Option<f64>>,
    pub speed_2d: Vec<Option<f64>>,
    pub distance_3d_m: Option<Vec<Option<f64>>>,
    pub cum_distance_3d_m: Option<Vec<Option<f64>>>,
    pub speed_3d: Option<Vec<Option<f64>>>,
}

fn rate(distance: f64, dt: f64) -> f64 {
    if dt > 0.0 {
        distance / dt
    } else {
        0.0
    }
}

/// Per-row metrics for a track whose rows may be missing. Distances are taken
/// between consecutive present rows; the first present row starts at zero.
pub fn track_metrics(
    positions: &[Option<GeoPoint>],
    dt: &[f64],
    elevation: Option<&[f64]>,
    radius_m: f64,
) -> TrackMetrics {
    let n = positions.len();
    let mut out = TrackMetrics {
        distance_2d_m: vec![None; n],
        cum_distance_2d_m: vec![None; n],
        dist_from_start_2d_m: vec![None; n],
        speed_2d: vec![None; n],
        ..TrackMetrics::default()
    };
    let mut distance_3d = elevation.map(|_| vec![None; n]);
    let mut cum_3d = elevation.map(|_| vec![None; n]);
    let mut speed_3d = elevation.map(|_| vec![None; n]);

    let origin = positions.iter().flatten().next().copied();
    let mut cum = 0.0;
    let mut cum3 = 0.0;
    for i in 0..n {
        let Some(here) = positions[i] else {
            continue;
        };
        let prev = if i > 0 { positions[i - 1] } else { None };
        let d = prev.map(|p| haversine_distance(p, here, radius_m)).unwrap_or(0.0);
        cum += d;
        out.distance_2d_m[i] = Some(d);
        out.cum_distance_2d_m[i] = Some(cum);
        out.speed_2d[i] = Some(rate(d, dt[i]));
        out.dist_from_start_2d_m[i] = origin.map(|o| haversine_distance(o, here, radius_m));

        if let (Some(elev), Some(d3v), Some(c3v), Some(s3v)) = (
            elevation,
            distance_3d.as_mut(),
            cum_3d.as_mut(),
            speed_3d.as_mut(),
        ) {
            let dz = if prev.is_some() { elev[i] - elev[i - 1] } else { 0.0 };
            let d3 = d.hypot(dz);
            cum3 += d3;
            d3v[i] = Some(d3);
            c3v[i] = Some(cum3);
            s3v[i] = Some(rate(d3, dt[i]));
        }
    }
    out.distance_3d_m = distance_3d;
    out.cum_distance_3d_m = cum_3d;
    out.speed_3d = speed_3d;
    out
}

#[derive(Clone, Debug, Default)]
pub struct VpMetrics {
    /// Usable verified positions seen up to and including each row.
    pub count: Vec<usize>,
    pub elapsed_s: Vec<Option<f64>>,
    pub distance_2d_m: Vec<Option<f64>>,
    pub cum_distance_2d_m: Vec<Option<f64>>,
    pub speed_2d: Vec<Option<f64>>,
}

/// Verified-position metrics at their native stride: every `dist_step`-th
/// usable position is compared with the one `dist_step` positions earlier.
pub fn vp_metrics(
    verified: &[Option<GeoPoint>],
    elapsed_s: &[f64],
    dist_step: usize,
    radius_m: f64,
) -> VpMetrics {
    let n = verified.len();
    let step = dist_step.max(1);
    let mut out = VpMetrics {
        count: vec![0; n],
        elapsed_s: vec![None; n],
        distance_2d_m: vec![None; n],
        cum_distance_2d_m: vec![None; n],
        speed_2d: vec![None; n],
    };
    let mut seen: Vec<usize> = Vec::new();
    let mut cum = 0.0;
    for row in 0..n {
        if let Some(here) = verified[row] {
            let j = seen.len();
            seen.push(row);
            if j >= step && j % step == 0 {
                let prev_row = seen[j - step];
                if let Some(prev) = verified[prev_row] {
                    let d = haversine_distance(prev, here, radius_m);
                    let elapsed = elapsed_s[row] - elapsed_s[prev_row];
                    cum += d;
                    out.elapsed_s[row] = Some(elapsed);
                    out.distance_2d_m[row] = Some(d);
                    out.cum_distance_2d_m[row] = Some(cum);
                    out.speed_2d[row] = Some(rate(d, elapsed));
                }
            }
        }
        out.count[row] = seen.len();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{advance, Direction, EARTH_RADIUS_M};
    use approx::assert_relative_eq;

    fn line(n: usize) -> Vec<Option<GeoPoint>> {
        let mut p = GeoPoint::new(0.0, 0.0);
        (0..n)
            .map(|i| {
                if i > 0 {
                    p = advance(p, 2.0, 90.0, Direction::Forward, EARTH_RADIUS_M);
                }
                Some(p)
            })
            .collect()
    }

    #[test]
    fn zero_dt_yields_zero_speed() {
        let positions = line(3);
        let m = track_metrics(&positions, &[0.0, 0.0, 2.0], None, EARTH_RADIUS_M);
        assert_eq!(m.speed_2d[1], Some(0.0));
        assert_relative_eq!(m.speed_2d[2].unwrap(), 1.0, epsilon = 1e-9);
        assert!(m.distance_3d_m.is_none());
    }

    #[test]
    fn three_dimensional_distance_includes_climb() {
        let positions = line(2);
        let m = track_metrics(&positions, &[0.0, 1.0], Some(&[0.0, 2.0][..]), EARTH_RADIUS_M);
        let d3 = m.distance_3d_m.unwrap()[1].unwrap();
        assert_relative_eq!(d3, 8f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn missing_rows_are_skipped() {
        let mut positions = line(5);
        positions[0] = None;
        positions[4] = None;
        let m = track_metrics(&positions, &[1.0; 5], None, EARTH_RADIUS_M);
        assert_eq!(m.distance_2d_m[0], None);
        assert_eq!(m.distance_2d_m[1], Some(0.0));
        assert_relative_eq!(m.cum_distance_2d_m[3].unwrap(), 4.0, epsilon = 1e-9);
        assert_relative_eq!(m.dist_from_start_2d_m[3].unwrap(), 4.0, epsilon = 1e-9);
        assert_eq!(m.cum_distance_2d_m[4], None);
    }

    #[test]
    fn vp_distances_follow_stride() {
        let mut verified = line(9);
        verified[3] = None;
        let elapsed: Vec<f64> = (0..9).map(|i| i as f64).collect();
        let m = vp_metrics(&verified, &elapsed, 2, EARTH_RADIUS_M);
        // Usable rows: 0 1 2 4 5 6 7 8 -> stride points at rows 2, 5, 7.
        assert_eq!(m.count, vec![1, 2, 3, 3, 4, 5, 6, 7, 8]);
        assert!(m.distance_2d_m[1].is_none());
        assert_relative_eq!(m.distance_2d_m[2].unwrap(), 4.0, epsilon = 1e-9);
        assert_relative_eq!(m.elapsed_s[5].unwrap(), 3.0);
        assert_relative_eq!(m.distance_2d_m[5].unwrap(), 6.0, epsilon = 1e-9);
        assert_relative_eq!(m.speed_2d[5].unwrap(), 2.0, epsilon = 1e-9);
        assert!(m.distance_2d_m[6].is_none());
        assert_relative_eq!(m.cum_distance_2d_m[7].unwrap(), 14.0, epsilon = 1e-9);
    }
}
