use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where an exercise's 1RM estimate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
pub enum EstimateSource {
  /// Derived from a rep-max performance
  Calculated,
  /// An actual single at maximal effort
  Tested,
  /// Entered by hand
  Manual,
}

impl std::fmt::Display for EstimateSource {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Calculated => write!(f, "calculated"),
      Self::Tested => write!(f, "tested"),
      Self::Manual => write!(f, "manual"),
    }
  }
}

impl std::str::FromStr for EstimateSource {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "calculated" => Ok(Self::Calculated),
      "tested" => Ok(Self::Tested),
      "manual" => Ok(Self::Manual),
      _ => Err(format!("Unknown estimate source: {}", s)),
    }
  }
}

/// One per (user, exercise); the denominator for relative intensity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExerciseEstimate {
  pub exercise_id: String,
  pub estimated_1rm: f64,
  pub source: EstimateSource,
  pub last_updated: DateTime<Utc>,
}
