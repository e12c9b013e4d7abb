use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::progression::ProgressionPreferences;

/// Per-user inputs that are not tied to a single workout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
  pub training_start_date: Option<NaiveDate>,
  pub preferences: ProgressionPreferences,
}
