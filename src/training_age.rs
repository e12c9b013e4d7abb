//! Training age and volume tolerance
//!
//! Time under the bar is bucketed into experience tiers; each tier maps to a
//! multiplier applied to weekly volume landmarks.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    /// < 1 year
    Novice,
    /// 1 to 3 years
    Intermediate,
    /// 3 to 6 years
    Advanced,
    /// > 6 years
    Elite,
}

impl ExperienceLevel {
    pub fn from_years(years: f64) -> Self {
        match years {
            y if y < 1.0 => ExperienceLevel::Novice,
            y if y < 3.0 => ExperienceLevel::Intermediate,
            y if y <= 6.0 => ExperienceLevel::Advanced,
            _ => ExperienceLevel::Elite,
        }
    }

    pub fn volume_tolerance_multiplier(&self) -> f64 {
        match self {
            ExperienceLevel::Novice => 0.85,
            ExperienceLevel::Intermediate => 1.0,
            ExperienceLevel::Advanced => 1.15,
            ExperienceLevel::Elite => 1.25,
        }
    }
}

impl std::fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Novice => write!(f, "novice"),
            Self::Intermediate => write!(f, "intermediate"),
            Self::Advanced => write!(f, "advanced"),
            Self::Elite => write!(f, "elite"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingAgeInfo {
    pub years: u32,
    /// Months past the last whole year
    pub months: u32,
    pub experience_level: ExperienceLevel,
    pub volume_tolerance_multiplier: f64,
}

impl TrainingAgeInfo {
    /// Used when no start date is on file. Landmarks stay unscaled.
    pub fn unknown() -> Self {
        Self {
            years: 0,
            months: 0,
            experience_level: ExperienceLevel::Novice,
            volume_tolerance_multiplier: 1.0,
        }
    }
}

/// Whole calendar months from `start` to `today`
fn months_between(start: NaiveDate, today: NaiveDate) -> u32 {
    let mut months = (today.year() - start.year()) * 12 + today.month() as i32 - start.month() as i32;
    if today.day() < start.day() {
        months -= 1;
    }
    months.max(0) as u32
}

pub fn estimate_training_age(start: Option<NaiveDate>, today: NaiveDate) -> EngineResult<TrainingAgeInfo> {
    let start = match start {
        Some(s) => s,
        None => return Ok(TrainingAgeInfo::unknown()),
    };
    if start > today {
        return Err(EngineError::invalid(format!(
            "training start date {} is after {}",
            start, today
        )));
    }

    let total_months = months_between(start, today);
    let experience_level = ExperienceLevel::from_years(total_months as f64 / 12.0);

    Ok(TrainingAgeInfo {
        years: total_months / 12,
        months: total_months % 12,
        experience_level,
        volume_tolerance_multiplier: experience_level.volume_tolerance_multiplier(),
    })
}

/// Parse a `YYYY-MM-DD` start date as entered on the profile screen
pub fn parse_training_start(raw: &str) -> EngineResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| EngineError::invalid(format!("malformed training start date '{}': {}", raw, e)))
}
