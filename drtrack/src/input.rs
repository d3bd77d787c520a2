//! Aligned sensor table handed to the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;
use crate::TrackError;

/// A per-row input that may be given once for the whole track or row by row with gaps.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum Series {
    Scalar(f64),
    PerRow(Vec<Option<f64>>),
}

impl Series {
    /// Broadcast a scalar, or fill per-row gaps with the last value seen.
    pub fn fill_forward(&self, len: usize, field: &'static str) -> Result<Vec<f64>, TrackError> {
        match self {
            Series::Scalar(value) => {
                if !value.is_finite() {
                    return Err(TrackError::InvalidParameter(format!(
                        "{} scalar must be finite",
                        field
                    )));
                }
                Ok(vec![*value; len])
            }
            Series::PerRow(values) => {
                if values.len() != len {
                    return Err(TrackError::LengthMismatch {
                        field,
                        expected: len,
                        found: values.len(),
                    });
                }
                let mut last: Option<f64> = None;
                let mut out = Vec::with_capacity(len);
                for value in values.iter().copied() {
                    if let Some(v) = value.filter(|v| v.is_finite()) {
                        last = Some(v);
                    }
                    match last {
                        Some(v) => out.push(v),
                        None => return Err(TrackError::UndefinedCarryForward { field }),
                    }
                }
                Ok(out)
            }
        }
    }
}

/// Sparse verified positions aligned to the sensor rows.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct VerifiedPositions {
    pub lon: Vec<Option<f64>>,
    pub lat: Vec<Option<f64>>,
}

impl VerifiedPositions {
    pub fn from_points(points: &[Option<GeoPoint>]) -> Self {
        Self {
            lon: points.iter().map(|p| p.map(|p| p.lon)).collect(),
            lat: points.iter().map(|p| p.map(|p| p.lat)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.lon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lon.is_empty()
    }

    /// Position at `row` when both coordinates are present and finite.
    pub fn get(&self, row: usize) -> Option<GeoPoint> {
        let lon = self.lon.get(row).copied().flatten()?;
        let lat = self.lat.get(row).copied().flatten()?;
        let point = GeoPoint::new(lon, lat);
        point.is_finite().then_some(point)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SensorTable {
    pub timestamps: Vec<DateTime<Utc>>,
    /// Degrees clockwise from north; any range is accepted.
    pub heading: Vec<f64>,
    /// Speed, or a proxy scaled by `multiplier` and `intercept`.
    pub speed: Vec<f64>,
    pub elevation: Option<Vec<f64>>,
    /// Degrees; reduces the horizontal share of each step.
    pub pitch: Option<Vec<f64>>,
    pub current_speed: Option<Series>,
    pub current_heading: Option<Series>,
    pub multiplier: Series,
    pub intercept: Series,
    /// Values <= 0 mark the object as stationary. Absent means always moving.
    pub marked_event: Option<Vec<f64>>,
    pub verified: Option<VerifiedPositions>,
}

impl SensorTable {
    pub fn new(timestamps: Vec<DateTime<Utc>>, heading: Vec<f64>, speed: Vec<f64>) -> Self {
        Self {
            timestamps,
            heading,
            speed,
            elevation: None,
            pitch: None,
            current_speed: None,
            current_heading: None,
            multiplier: Series::Scalar(1.0),
            intercept: Series::Scalar(0.0),
            marked_event: None,
            verified: None,
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_series_broadcasts() {
        let filled = Series::Scalar(2.5).fill_forward(3, "m").unwrap();
        assert_eq!(filled, vec![2.5, 2.5, 2.5]);
    }

    #[test]
    fn per_row_gaps_take_last_value() {
        let series = Series::PerRow(vec![Some(1.0), None, Some(f64::NAN), Some(3.0), None]);
        let filled = series.fill_forward(5, "c").unwrap();
        assert_eq!(filled, vec![1.0, 1.0, 1.0, 3.0, 3.0]);
    }

    #[test]
    fn leading_gap_is_an_error() {
        let series = Series::PerRow(vec![None, Some(1.0)]);
        match series.fill_forward(2, "current_speed") {
            Err(TrackError::UndefinedCarryForward { field }) => assert_eq!(field, "current_speed"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn verified_positions_need_both_coordinates() {
        let vp = VerifiedPositions {
            lon: vec![Some(1.0), Some(2.0), None],
            lat: vec![Some(50.0), None, Some(51.0)],
        };
        assert_eq!(vp.get(0), Some(GeoPoint::new(1.0, 50.0)));
        assert_eq!(vp.get(1), None);
        assert_eq!(vp.get(2), None);
        assert_eq!(vp.get(7), None);
    }
}
