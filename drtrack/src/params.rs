use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sha2::{Digest, Sha256};

use crate::geo::{GeoPoint, EARTH_RADIUS_M};
use crate::TrackError;

/// Verified-position under-sampling strategy.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "id", content = "params")]
pub enum AnchorMethod {
    #[serde(rename = "vpc.all.v1")]
    All,
    #[serde(rename = "vpc.divide.v1")]
    Divide { thresh_t: usize },
    #[serde(rename = "vpc.time_dist.v1")]
    TimeDist { thresh_t: f64, thresh_d: f64 },
    #[serde(rename = "vpc.cum_dist.v1")]
    CumDist { thresh_t: f64, thresh_d: f64 },
    #[serde(rename = "vpc.time_dist_corr_fac.v1")]
    TimeDistCorrFac {
        thresh_t: f64,
        thresh_d: f64,
        span: f64,
        dist_head_corr: bool,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnchorMethodInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub default_params: JsonValue,
}

impl AnchorMethod {
    pub fn id(&self) -> &'static str {
        match self {
            AnchorMethod::All => "vpc.all.v1",
            AnchorMethod::Divide { .. } => "vpc.divide.v1",
            AnchorMethod::TimeDist { .. } => "vpc.time_dist.v1",
            AnchorMethod::CumDist { .. } => "vpc.cum_dist.v1",
            AnchorMethod::TimeDistCorrFac { .. } => "vpc.time_dist_corr_fac.v1",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AnchorMethod::All => "All",
            AnchorMethod::Divide { .. } => "Divide",
            AnchorMethod::TimeDist { .. } => "Time_Dist",
            AnchorMethod::CumDist { .. } => "Cum.Dist",
            AnchorMethod::TimeDistCorrFac { .. } => "Time_Dist_Corr.Fac",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AnchorMethod::All => "Every usable verified position bounds a correction segment.",
            AnchorMethod::Divide { .. } => {
                "Split the usable verified positions into thresh_t + 1 equal-count groups and anchor at the group boundaries."
            }
            AnchorMethod::TimeDist { .. } => {
                "Retain the next verified position once both elapsed time and straight-line distance since the last anchor pass their thresholds."
            }
            AnchorMethod::CumDist { .. } => {
                "As Time_Dist, but gate on accumulated verified-position path distance."
            }
            AnchorMethod::TimeDistCorrFac { .. } => {
                "Within a span window of Time_Dist-eligible positions, anchor where the implied correction factor is smallest."
            }
        }
    }

    pub fn default_for_id(id: &str) -> Option<Self> {
        match id.trim() {
            "vpc.all.v1" => Some(AnchorMethod::All),
            "vpc.divide.v1" => Some(AnchorMethod::Divide { thresh_t: 1 }),
            "vpc.time_dist.v1" => Some(AnchorMethod::TimeDist {
                thresh_t: 60.0,
                thresh_d: 0.0,
            }),
            "vpc.cum_dist.v1" => Some(AnchorMethod::CumDist {
                thresh_t: 0.0,
                thresh_d: 100.0,
            }),
            "vpc.time_dist_corr_fac.v1" => Some(AnchorMethod::TimeDistCorrFac {
                thresh_t: 60.0,
                thresh_d: 0.0,
                span: 5.0,
                dist_head_corr: false,
            }),
            _ => None,
        }
    }

    pub fn params_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or(JsonValue::Null)
    }

    fn validate(&self) -> Result<(), TrackError> {
        let (thresh_t, thresh_d, span) = match self {
            AnchorMethod::All | AnchorMethod::Divide { .. } => return Ok(()),
            AnchorMethod::TimeDist { thresh_t, thresh_d }
            | AnchorMethod::CumDist { thresh_t, thresh_d } => (*thresh_t, *thresh_d, 0.0),
            AnchorMethod::TimeDistCorrFac {
                thresh_t,
                thresh_d,
                span,
                ..
            } => (*thresh_t, *thresh_d, *span),
        };
        for (label, value) in [("thresh_t", thresh_t), ("thresh_d", thresh_d), ("span", span)] {
            if !value.is_finite() || value < 0.0 {
                return Err(TrackError::InvalidParameter(format!(
                    "{} must be a non-negative number, got {}",
                    label, value
                )));
            }
        }
        Ok(())
    }
}

pub fn list_anchor_methods() -> Vec<AnchorMethodInfo> {
    [
        "vpc.all.v1",
        "vpc.divide.v1",
        "vpc.time_dist.v1",
        "vpc.cum_dist.v1",
        "vpc.time_dist_corr_fac.v1",
    ]
    .iter()
    .filter_map(|id| AnchorMethod::default_for_id(id))
    .map(|method| AnchorMethodInfo {
        id: method.id().to_string(),
        name: method.name().to_string(),
        description: method.description().to_string(),
        default_params: method.params_json(),
    })
    .collect()
}

/// Verified position correction options.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VpcConfig {
    /// `None` reports verified positions without correcting the track.
    pub method: Option<AnchorMethod>,
    /// Constrain the corrected track to end at the last anchor.
    pub bound: bool,
    /// Drop verified positions recorded while the marked event is <= 0.
    pub vp_me: bool,
    /// Stride, in verified positions, for distance gating and VP distances.
    pub dist_step: usize,
}

impl Default for VpcConfig {
    fn default() -> Self {
        Self {
            method: None,
            bound: true,
            vp_me: false,
            dist_step: 1,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrackParams {
    /// Track start when outgoing, track end otherwise.
    pub start: GeoPoint,
    pub outgoing: bool,
    pub max_speed: Option<f64>,
    pub earth_radius_m: f64,
    pub vpc: VpcConfig,
}

impl Default for TrackParams {
    fn default() -> Self {
        Self {
            start: GeoPoint::new(0.0, 0.0),
            outgoing: true,
            max_speed: None,
            earth_radius_m: EARTH_RADIUS_M,
            vpc: VpcConfig::default(),
        }
    }
}

impl TrackParams {
    pub fn validate(&self) -> Result<(), TrackError> {
        if !self.start.is_finite() || self.start.lat.abs() >= 90.0 {
            return Err(TrackError::InvalidParameter(format!(
                "start coordinate ({}, {}) is not a usable position",
                self.start.lon, self.start.lat
            )));
        }
        if !self.earth_radius_m.is_finite() || self.earth_radius_m <= 0.0 {
            return Err(TrackError::InvalidParameter(
                "earth_radius_m must be positive".into(),
            ));
        }
        if let Some(cap) = self.max_speed {
            if !cap.is_finite() || cap < 0.0 {
                return Err(TrackError::InvalidParameter(format!(
                    "max_speed must be a non-negative number, got {}",
                    cap
                )));
            }
        }
        if self.vpc.dist_step == 0 {
            return Err(TrackError::InvalidParameter("dist_step must be >= 1".into()));
        }
        if let Some(method) = self.vpc.method.as_ref() {
            method.validate()?;
        }
        Ok(())
    }

    pub fn params_hash_sha256(&self) -> Result<String, TrackError> {
        let bytes =
            serde_json::to_vec(self).map_err(|e| TrackError::InvalidParameter(e.to_string()))?;
        Ok(sha256_hex(&bytes))
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        use std::fmt::Write;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
