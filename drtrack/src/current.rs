//! Composition of intrinsic motion with an external current (water or air flow).

use ndarray::{Array1, Zip};

use crate::geo::wrap_degrees;

#[derive(Clone, Debug)]
pub struct CurrentTrack {
    pub heading: Array1<f64>,
    pub radial_distance: Array1<f64>,
}

/// Sum two polar displacements given as (distance, compass bearing in degrees).
/// Returns the resultant (distance, bearing).
pub fn compose(distance: f64, bearing: f64, drift: f64, drift_bearing: f64) -> (f64, f64) {
    let (b1, b2) = (bearing.to_radians(), drift_bearing.to_radians());
    let east = distance * b1.sin() + drift * b2.sin();
    let north = distance * b1.cos() + drift * b2.cos();
    (east.hypot(north), wrap_degrees(east.atan2(north).to_degrees()))
}

/// Rows are independent; the current drifts the object even while it is stationary.
pub fn integrate_current(
    radial_distance: &Array1<f64>,
    heading: &Array1<f64>,
    current_speed: &Array1<f64>,
    current_heading: &Array1<f64>,
    dt: &Array1<f64>,
) -> CurrentTrack {
    let n = radial_distance.len();
    let drift = current_speed * dt;
    let mut out_heading = Array1::<f64>::zeros(n);
    let mut out_distance = Array1::<f64>::zeros(n);
    Zip::from(&mut out_distance)
        .and(&mut out_heading)
        .and(radial_distance)
        .and(heading)
        .and(&drift)
        .and(current_heading)
        .for_each(|dist, head, &r, &h, &d, &ch| {
            let (composed, bearing) = compose(r, h, d, ch);
            *dist = composed;
            *head = bearing;
        });
    CurrentTrack {
        heading: out_heading,
        radial_distance: out_distance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn north_motion_with_east_current_runs_north_east() {
        let n = 5;
        let track = integrate_current(
            &Array1::from_elem(n, 1.0),
            &Array1::from_elem(n, 0.0),
            &Array1::from_elem(n, 1.0),
            &Array1::from_elem(n, 90.0),
            &Array1::from_elem(n, 1.0),
        );
        for i in 0..n {
            assert_relative_eq!(track.heading[i], 45.0, epsilon = 1e-9);
            assert_relative_eq!(track.radial_distance[i], 2f64.sqrt(), epsilon = 1e-12);
        }
    }

    #[test]
    fn opposing_current_cancels_motion() {
        let (dist, _) = compose(2.0, 90.0, 2.0, 270.0);
        assert!(dist < 1e-12);
    }

    #[test]
    fn stationary_object_drifts_with_current() {
        let (dist, bearing) = compose(0.0, 10.0, 3.0, 200.0);
        assert_relative_eq!(dist, 3.0, epsilon = 1e-12);
        assert_relative_eq!(bearing, 200.0, epsilon = 1e-9);
    }
}
