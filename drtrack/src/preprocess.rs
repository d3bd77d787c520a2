//! Row cleaning: timeline checks, carry-forward fills, speed scaling and
//! movement gating.

use chrono::{DateTime, Utc};
use ndarray::Array1;

use crate::geo::wrap_degrees;
use crate::input::SensorTable;
use crate::TrackError;

#[derive(Clone, Debug)]
pub struct CurrentInputs {
    pub speed: Array1<f64>,
    pub heading: Array1<f64>,
}

#[derive(Clone, Debug)]
pub struct Prepared {
    pub timestamps: Vec<DateTime<Utc>>,
    pub elapsed_s: Array1<f64>,
    pub dt: Array1<f64>,
    pub heading: Array1<f64>,
    /// Scaled, capped and movement-gated speed.
    pub speed: Array1<f64>,
    pub marked_event: Option<Array1<f64>>,
    pub pitch: Option<Array1<f64>>,
    pub elevation: Option<Array1<f64>>,
    pub current: Option<CurrentInputs>,
    /// Horizontal distance covered during each row's dt.
    pub radial_distance: Array1<f64>,
}

impl Prepared {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

pub fn prepare(table: &SensorTable, max_speed: Option<f64>) -> Result<Prepared, TrackError> {
    let n = table.len();
    if n == 0 {
        return Err(TrackError::InsufficientData);
    }
    check_len("heading", n, table.heading.len())?;
    check_len("speed", n, table.speed.len())?;
    check_finite("heading", &table.heading)?;
    check_finite("speed", &table.speed)?;
    if let Some(values) = table.elevation.as_ref() {
        check_len("elevation", n, values.len())?;
        check_finite("elevation", values)?;
    }
    if let Some(values) = table.pitch.as_ref() {
        check_len("pitch", n, values.len())?;
        check_finite("pitch", values)?;
    }
    if let Some(values) = table.marked_event.as_ref() {
        check_len("marked_event", n, values.len())?;
    }
    if let Some(vp) = table.verified.as_ref() {
        check_len("vp_lon", n, vp.lon.len())?;
        check_len("vp_lat", n, vp.lat.len())?;
    }

    let (elapsed_s, dt) = timeline(&table.timestamps)?;

    let multiplier = table.multiplier.fill_forward(n, "multiplier")?;
    let intercept = table.intercept.fill_forward(n, "intercept")?;

    let current = match (table.current_speed.as_ref(), table.current_heading.as_ref()) {
        (Some(speed), Some(heading)) => Some(CurrentInputs {
            speed: Array1::from_vec(speed.fill_forward(n, "current_speed")?),
            heading: Array1::from_vec(heading.fill_forward(n, "current_heading")?)
                .mapv(wrap_degrees),
        }),
        (None, None) => None,
        _ => {
            return Err(TrackError::InvalidParameter(
                "current speed and current heading must be supplied together".into(),
            ))
        }
    };

    let mut speed = Vec::with_capacity(n);
    for i in 0..n {
        let mut scaled = table.speed[i] * multiplier[i] + intercept[i];
        if let Some(cap) = max_speed {
            scaled = scaled.clamp(0.0, cap);
        }
        let moving = table
            .marked_event
            .as_ref()
            .map(|me| me[i] > 0.0)
            .unwrap_or(true);
        speed.push(if moving { scaled } else { 0.0 });
    }
    let speed = Array1::from_vec(speed);

    let pitch = table.pitch.clone().map(Array1::from_vec);
    let mut radial_distance = &speed * &dt;
    if let Some(pitch) = pitch.as_ref() {
        radial_distance = radial_distance * pitch.mapv(|p| p.to_radians().cos());
    }

    Ok(Prepared {
        timestamps: table.timestamps.clone(),
        elapsed_s,
        dt,
        heading: Array1::from_vec(table.heading.clone()).mapv(wrap_degrees),
        speed,
        marked_event: table.marked_event.clone().map(Array1::from_vec),
        pitch,
        elevation: table.elevation.clone().map(Array1::from_vec),
        current,
        radial_distance,
    })
}

fn timeline(timestamps: &[DateTime<Utc>]) -> Result<(Array1<f64>, Array1<f64>), TrackError> {
    let n = timestamps.len();
    let mut elapsed = Vec::with_capacity(n);
    let mut dt = Vec::with_capacity(n);
    let t0 = timestamps[0];
    for (i, ts) in timestamps.iter().enumerate() {
        let since_start = seconds_between(t0, *ts).ok_or(TrackError::InvalidTimeline {
            row: i,
            reason: "elapsed time overflows".into(),
        })?;
        elapsed.push(since_start);
        if i == 0 {
            dt.push(0.0);
            continue;
        }
        let step = seconds_between(timestamps[i - 1], *ts).ok_or(TrackError::InvalidTimeline {
            row: i,
            reason: "time step overflows".into(),
        })?;
        if !step.is_finite() || step < 0.0 {
            return Err(TrackError::InvalidTimeline {
                row: i,
                reason: format!("timestamp goes backwards by {:.6} s", -step),
            });
        }
        dt.push(step);
    }
    Ok((Array1::from_vec(elapsed), Array1::from_vec(dt)))
}

fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> Option<f64> {
    (to - from)
        .num_microseconds()
        .map(|us| us as f64 / 1_000_000.0)
}

fn check_len(field: &'static str, expected: usize, found: usize) -> Result<(), TrackError> {
    if expected != found {
        return Err(TrackError::LengthMismatch {
            field,
            expected,
            found,
        });
    }
    Ok(())
}

fn check_finite(field: &'static str, values: &[f64]) -> Result<(), TrackError> {
    if let Some(row) = values.iter().position(|v| !v.is_finite()) {
        return Err(TrackError::InvalidParameter(format!(
            "{} is not finite at row {}",
            field, row
        )));
    }
    Ok(())
}
