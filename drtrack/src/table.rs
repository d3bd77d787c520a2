//! Output table: one fixed-schema row per input sample plus the list of columns
//! that the supplied inputs and enabled features make meaningful.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct TrackRow {
    pub row: usize,
    pub timestamp: DateTime<Utc>,
    pub elapsed_s: f64,
    pub dt_s: f64,
    pub heading_deg: f64,
    pub speed: f64,
    pub radial_distance_m: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marked_event: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch_deg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_heading_deg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrated_heading_deg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrated_radial_distance_m: Option<f64>,

    pub dr_lon: f64,
    pub dr_lat: f64,
    pub dr_distance_2d_m: f64,
    pub dr_cum_distance_2d_m: f64,
    pub dr_dist_from_start_2d_m: f64,
    pub dr_speed_2d: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dr_distance_3d_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dr_cum_distance_3d_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dr_speed_3d: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_lon: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dist_corr_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_corr_factor_deg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_before_correction_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_after_correction_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_distance_2d_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_cum_distance_2d_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_dist_from_start_2d_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_speed_2d: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_distance_3d_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_cum_distance_3d_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_speed_3d: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vp_lon: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vp_lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vp_present: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vp_used: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vp_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vp_elapsed_s: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vp_distance_2d_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vp_cum_distance_2d_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vp_speed_2d: Option<f64>,
}

impl TrackRow {
    pub fn dr_position(&self) -> GeoPoint {
        GeoPoint::new(self.dr_lon, self.dr_lat)
    }

    pub fn vpc_position(&self) -> Option<GeoPoint> {
        Some(GeoPoint::new(self.vpc_lon?, self.vpc_lat?))
    }

    pub fn vp_position(&self) -> Option<GeoPoint> {
        Some(GeoPoint::new(self.vp_lon?, self.vp_lat?))
    }

    pub fn value(&self, column: Column) -> Value {
        use Column::*;
        let opt = |v: Option<f64>| v.map(Value::Float).unwrap_or(Value::Missing);
        match column {
            Row => Value::Count(self.row),
            Timestamp => Value::Time(self.timestamp),
            ElapsedS => Value::Float(self.elapsed_s),
            DtS => Value::Float(self.dt_s),
            HeadingDeg => Value::Float(self.heading_deg),
            Speed => Value::Float(self.speed),
            RadialDistanceM => Value::Float(self.radial_distance_m),
            MarkedEvent => opt(self.marked_event),
            PitchDeg => opt(self.pitch_deg),
            ElevationM => opt(self.elevation_m),
            CurrentSpeed => opt(self.current_speed),
            CurrentHeadingDeg => opt(self.current_heading_deg),
            IntegratedHeadingDeg => opt(self.integrated_heading_deg),
            IntegratedRadialDistanceM => opt(self.integrated_radial_distance_m),
            DrLon => Value::Float(self.dr_lon),
            DrLat => Value::Float(self.dr_lat),
            DrDistance2dM => Value::Float(self.dr_distance_2d_m),
            DrCumDistance2dM => Value::Float(self.dr_cum_distance_2d_m),
            DrDistFromStart2dM => Value::Float(self.dr_dist_from_start_2d_m),
            DrSpeed2d => Value::Float(self.dr_speed_2d),
            DrDistance3dM => opt(self.dr_distance_3d_m),
            DrCumDistance3dM => opt(self.dr_cum_distance_3d_m),
            DrSpeed3d => opt(self.dr_speed_3d),
            VpcLon => opt(self.vpc_lon),
            VpcLat => opt(self.vpc_lat),
            DistCorrFactor => opt(self.dist_corr_factor),
            HeadCorrFactorDeg => opt(self.head_corr_factor_deg),
            ErrorBeforeCorrectionM => opt(self.error_before_correction_m),
            ErrorAfterCorrectionM => opt(self.error_after_correction_m),
            VpcDistance2dM => opt(self.vpc_distance_2d_m),
            VpcCumDistance2dM => opt(self.vpc_cum_distance_2d_m),
            VpcDistFromStart2dM => opt(self.vpc_dist_from_start_2d_m),
            VpcSpeed2d => opt(self.vpc_speed_2d),
            VpcDistance3dM => opt(self.vpc_distance_3d_m),
            VpcCumDistance3dM => opt(self.vpc_cum_distance_3d_m),
            VpcSpeed3d => opt(self.vpc_speed_3d),
            VpLon => opt(self.vp_lon),
            VpLat => opt(self.vp_lat),
            VpPresent => self.vp_present.map(Value::Flag).unwrap_or(Value::Missing),
            VpUsed => self.vp_used.map(Value::Flag).unwrap_or(Value::Missing),
            VpCount => self.vp_count.map(Value::Count).unwrap_or(Value::Missing),
            VpElapsedS => opt(self.vp_elapsed_s),
            VpDistance2dM => opt(self.vp_distance_2d_m),
            VpCumDistance2dM => opt(self.vp_cum_distance_2d_m),
            VpSpeed2d => opt(self.vp_speed_2d),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    Count(usize),
    Float(f64),
    Flag(bool),
    Time(DateTime<Utc>),
    Missing,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Column {
    Row,
    Timestamp,
    ElapsedS,
    DtS,
    HeadingDeg,
    Speed,
    RadialDistanceM,
    MarkedEvent,
    PitchDeg,
    ElevationM,
    CurrentSpeed,
    CurrentHeadingDeg,
    IntegratedHeadingDeg,
    IntegratedRadialDistanceM,
    DrLon,
    DrLat,
    DrDistance2dM,
    DrCumDistance2dM,
    DrDistFromStart2dM,
    DrSpeed2d,
    DrDistance3dM,
    DrCumDistance3dM,
    DrSpeed3d,
    VpcLon,
    VpcLat,
    DistCorrFactor,
    HeadCorrFactorDeg,
    ErrorBeforeCorrectionM,
    ErrorAfterCorrectionM,
    VpcDistance2dM,
    VpcCumDistance2dM,
    VpcDistFromStart2dM,
    VpcSpeed2d,
    VpcDistance3dM,
    VpcCumDistance3dM,
    VpcSpeed3d,
    VpLon,
    VpLat,
    VpPresent,
    VpUsed,
    VpCount,
    VpElapsedS,
    VpDistance2dM,
    VpCumDistance2dM,
    VpSpeed2d,
}

impl Column {
    pub const ALL: [Column; 45] = [
        Column::Row,
        Column::Timestamp,
        Column::ElapsedS,
        Column::DtS,
        Column::HeadingDeg,
        Column::Speed,
        Column::RadialDistanceM,
        Column::MarkedEvent,
        Column::PitchDeg,
        Column::ElevationM,
        Column::CurrentSpeed,
        Column::CurrentHeadingDeg,
        Column::IntegratedHeadingDeg,
        Column::IntegratedRadialDistanceM,
        Column::DrLon,
        Column::DrLat,
        Column::DrDistance2dM,
        Column::DrCumDistance2dM,
        Column::DrDistFromStart2dM,
        Column::DrSpeed2d,
        Column::DrDistance3dM,
        Column::DrCumDistance3dM,
        Column::DrSpeed3d,
        Column::VpcLon,
        Column::VpcLat,
        Column::DistCorrFactor,
        Column::HeadCorrFactorDeg,
        Column::ErrorBeforeCorrectionM,
        Column::ErrorAfterCorrectionM,
        Column::VpcDistance2dM,
        Column::VpcCumDistance2dM,
        Column::VpcDistFromStart2dM,
        Column::VpcSpeed2d,
        Column::VpcDistance3dM,
        Column::VpcCumDistance3dM,
        Column::VpcSpeed3d,
        Column::VpLon,
        Column::VpLat,
        Column::VpPresent,
        Column::VpUsed,
        Column::VpCount,
        Column::VpElapsedS,
        Column::VpDistance2dM,
        Column::VpCumDistance2dM,
        Column::VpSpeed2d,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Column::Row => "row",
            Column::Timestamp => "timestamp",
            Column::ElapsedS => "elapsed_s",
            Column::DtS => "dt_s",
            Column::HeadingDeg => "heading_deg",
            Column::Speed => "speed",
            Column::RadialDistanceM => "radial_distance_m",
            Column::MarkedEvent => "marked_event",
            Column::PitchDeg => "pitch_deg",
            Column::ElevationM => "elevation_m",
            Column::CurrentSpeed => "current_speed",
            Column::CurrentHeadingDeg => "current_heading_deg",
            Column::IntegratedHeadingDeg => "integrated_heading_deg",
            Column::IntegratedRadialDistanceM => "integrated_radial_distance_m",
            Column::DrLon => "dr_lon",
            Column::DrLat => "dr_lat",
            Column::DrDistance2dM => "dr_distance_2d_m",
            Column::DrCumDistance2dM => "dr_cum_distance_2d_m",
            Column::DrDistFromStart2dM => "dr_dist_from_start_2d_m",
            Column::DrSpeed2d => "dr_speed_2d",
            Column::DrDistance3dM => "dr_distance_3d_m",
            Column::DrCumDistance3dM => "dr_cum_distance_3d_m",
            Column::DrSpeed3d => "dr_speed_3d",
            Column::VpcLon => "vpc_lon",
            Column::VpcLat => "vpc_lat",
            Column::DistCorrFactor => "dist_corr_factor",
            Column::HeadCorrFactorDeg => "head_corr_factor_deg",
            Column::ErrorBeforeCorrectionM => "error_before_correction_m",
            Column::ErrorAfterCorrectionM => "error_after_correction_m",
            Column::VpcDistance2dM => "vpc_distance_2d_m",
            Column::VpcCumDistance2dM => "vpc_cum_distance_2d_m",
            Column::VpcDistFromStart2dM => "vpc_dist_from_start_2d_m",
            Column::VpcSpeed2d => "vpc_speed_2d",
            Column::VpcDistance3dM => "vpc_distance_3d_m",
            Column::VpcCumDistance3dM => "vpc_cum_distance_3d_m",
            Column::VpcSpeed3d => "vpc_speed_3d",
            Column::VpLon => "vp_lon",
            Column::VpLat => "vp_lat",
            Column::VpPresent => "vp_present",
            Column::VpUsed => "vp_used",
            Column::VpCount => "vp_count",
            Column::VpElapsedS => "vp_elapsed_s",
            Column::VpDistance2dM => "vp_distance_2d_m",
            Column::VpCumDistance2dM => "vp_cum_distance_2d_m",
            Column::VpSpeed2d => "vp_speed_2d",
        }
    }

    fn requires(&self) -> Option<Feature> {
        use Column::*;
        match self {
            MarkedEvent => Some(Feature::MarkedEvent),
            PitchDeg => Some(Feature::Pitch),
            ElevationM | DrDistance3dM | DrCumDistance3dM | DrSpeed3d => Some(Feature::Elevation),
            CurrentSpeed | CurrentHeadingDeg | IntegratedHeadingDeg | IntegratedRadialDistanceM => {
                Some(Feature::Current)
            }
            VpcLon | VpcLat | DistCorrFactor | HeadCorrFactorDeg | ErrorBeforeCorrectionM
            | ErrorAfterCorrectionM | VpcDistance2dM | VpcCumDistance2dM | VpcDistFromStart2dM
            | VpcSpeed2d => Some(Feature::Correction),
            VpcDistance3dM | VpcCumDistance3dM | VpcSpeed3d => Some(Feature::CorrectionElevation),
            VpLon | VpLat | VpPresent | VpCount | VpElapsedS | VpDistance2dM | VpCumDistance2dM
            | VpSpeed2d => Some(Feature::Verified),
            VpUsed => Some(Feature::Correction),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Feature {
    MarkedEvent,
    Pitch,
    Elevation,
    Current,
    Verified,
    Correction,
    CorrectionElevation,
}

/// Which optional inputs and stages contributed to the table.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Features {
    pub marked_event: bool,
    pub pitch: bool,
    pub elevation: bool,
    pub current: bool,
    pub verified: bool,
    pub correction: bool,
}

impl Features {
    fn has(&self, feature: Feature) -> bool {
        match feature {
            Feature::MarkedEvent => self.marked_event,
            Feature::Pitch => self.pitch,
            Feature::Elevation => self.elevation,
            Feature::Current => self.current,
            Feature::Verified => self.verified,
            Feature::Correction => self.correction,
            Feature::CorrectionElevation => self.correction && self.elevation,
        }
    }

    pub fn columns(&self) -> Vec<Column> {
        Column::ALL
            .iter()
            .copied()
            .filter(|c| c.requires().map(|f| self.has(f)).unwrap_or(true))
            .collect()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackTable {
    pub features: Features,
    pub rows: Vec<TrackRow>,
}

impl TrackTable {
    pub fn columns(&self) -> Vec<Column> {
        self.features.columns()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
