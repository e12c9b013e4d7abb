use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::one_rep_max;

/// A single logged set. Immutable once its workout is marked completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedSet {
  pub weight: f64,
  pub reps: u32,
  /// Rating of perceived exertion, 1-10
  pub rpe: Option<f64>,
  /// Reps in reserve, 0-10 (some loggers record this instead of RPE)
  #[serde(default)]
  pub rir: Option<f64>,
  pub completed: bool,
  pub is_warmup: bool,
}

impl LoggedSet {
  /// Completed, non-warmup working set
  pub fn is_hard_set(&self) -> bool {
    self.completed && !self.is_warmup
  }

  /// Checks the set can be counted.
  ///
  /// A weight of exactly 0 is a bodyweight set and is accepted. Negative or
  /// non-finite weight and zero reps are `InvalidInput`.
  pub fn validate(&self) -> EngineResult<()> {
    if self.weight == 0.0 {
      if self.reps < 1 {
        return Err(EngineError::invalid("reps must be at least 1"));
      }
      return Ok(());
    }
    one_rep_max::validate(self.weight, self.reps)
  }

  /// Load moved in this set (weight x reps)
  pub fn volume(&self) -> f64 {
    self.weight * self.reps as f64
  }
}

/// One exercise inside a workout, with the muscles it primarily trains
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutExercise {
  pub exercise_id: String,
  pub name: String,
  pub primary_muscles: Vec<String>,
  pub sets: Vec<LoggedSet>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedWorkout {
  pub workout_id: i64,
  pub performed_on: NaiveDate,
  pub completed: bool,
  pub exercises: Vec<WorkoutExercise>,
}

/// A set paired with the day it was performed, for e1RM history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatedSet {
  pub performed_on: NaiveDate,
  pub set: LoggedSet,
}
