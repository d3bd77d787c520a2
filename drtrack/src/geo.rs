//! Spherical-Earth helpers shared by the integrators, the corrector and the
//! distance calculator.

use serde::{Deserialize, Serialize};

/// WGS84 equatorial radius, used as the sphere radius unless overridden.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }

    /// Largest per-axis difference in degrees.
    pub fn max_abs_diff(&self, other: &GeoPoint) -> f64 {
        (self.lon - other.lon).abs().max((self.lat - other.lat).abs())
    }
}

/// Integration direction along the time axis.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    pub fn from_outgoing(outgoing: bool) -> Self {
        if outgoing {
            Direction::Forward
        } else {
            Direction::Reverse
        }
    }
}

/// Normalize an angle into [0, 360).
pub fn wrap_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Normalize an angular offset into (-180, 180].
pub fn signed_offset(deg: f64) -> f64 {
    let wrapped = wrap_degrees(deg);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

pub fn haversine_distance(a: GeoPoint, b: GeoPoint, radius_m: f64) -> f64 {
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();
    let h = (dlat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).max(0.0).sqrt());
    radius_m * c
}

/// Initial great-circle bearing from `a` to `b`, degrees clockwise from north in [0, 360).
pub fn initial_bearing(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let dlon = (b.lon - a.lon).to_radians();
    let y = dlon.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlon.cos();
    wrap_degrees(y.atan2(x).to_degrees())
}

/// Apply one dead-reckoning transition of `distance_m` along `bearing_deg`.
///
/// The longitude increment is scaled by the latitude of the earlier-in-time end
/// of the step, so a reverse step exactly undoes the forward step it mirrors.
pub fn advance(
    from: GeoPoint,
    distance_m: f64,
    bearing_deg: f64,
    direction: Direction,
    radius_m: f64,
) -> GeoPoint {
    let theta = bearing_deg.to_radians();
    let dlat = (distance_m * theta.cos() / radius_m).to_degrees();
    let east_m = distance_m * theta.sin();
    match direction {
        Direction::Forward => {
            let dlon = (east_m / (radius_m * from.lat.to_radians().cos())).to_degrees();
            GeoPoint::new(from.lon + dlon, from.lat + dlat)
        }
        Direction::Reverse => {
            let lat = from.lat - dlat;
            let dlon = (east_m / (radius_m * lat.to_radians().cos())).to_degrees();
            GeoPoint::new(from.lon - dlon, lat)
        }
    }
}
