//! Relative intensity: load as a percentage of estimated 1RM

use serde::{Deserialize, Serialize};

use crate::models::ExerciseEstimate;
use crate::round1;

/// `100 × weight / estimated_1rm`. None when there is no usable estimate.
pub fn relative_intensity(weight: f64, estimated_1rm: f64) -> Option<f64> {
  if !estimated_1rm.is_finite() || estimated_1rm <= 0.0 || !weight.is_finite() {
    return None;
  }
  Some(round1(100.0 * weight / estimated_1rm))
}

pub fn relative_intensity_for(weight: f64, estimate: Option<&ExerciseEstimate>) -> Option<f64> {
  estimate.and_then(|e| relative_intensity(weight, e.estimated_1rm))
}

/// ---------------------------------------------------------------------------
/// Intensity Zones
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityZone {
  Light,    // < 60% 1RM
  Moderate, // 60-75%
  Heavy,    // 75-85%
  Maximal,  // >= 85%
}

impl IntensityZone {
  pub fn from_pct(pct: f64) -> Self {
    match pct {
      p if p < 60.0 => IntensityZone::Light,
      p if p < 75.0 => IntensityZone::Moderate,
      p if p < 85.0 => IntensityZone::Heavy,
      _ => IntensityZone::Maximal,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      IntensityZone::Light => "light",
      IntensityZone::Moderate => "moderate",
      IntensityZone::Heavy => "heavy",
      IntensityZone::Maximal => "maximal",
    }
  }
}
