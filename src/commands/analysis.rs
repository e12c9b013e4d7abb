use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::info;

use crate::analysis::{analyze_weekly_volume, WeeklyVolumeAnalysis, WeeklyVolumeInput};
use crate::db::{
  load_completed_workouts, load_estimates, load_exercise_sets, load_landmark_overrides,
  load_user_profile, AppState,
};
use crate::error::AppError;
use crate::landmarks::{known_muscles, resolve_landmarks, LandmarkSource, VolumeLandmarks};
use crate::plateau::{week_start, weekly_best_series};
use crate::training_age::{estimate_training_age, TrainingAgeInfo};

/// ---------------------------------------------------------------------------
/// Weekly Volume
/// ---------------------------------------------------------------------------

/// Full volume report for the week containing `week_of`
pub async fn weekly_volume_analysis(
  state: &AppState,
  week_of: NaiveDate,
  today: NaiveDate,
) -> Result<WeeklyVolumeAnalysis, AppError> {
  let start = week_start(week_of);
  let end = start + Duration::days(7);
  info!(week_start = %start, "Running weekly volume analysis");

  let workouts = load_completed_workouts(&state.db, start, end).await?;
  let profile = load_user_profile(&state.db).await?;

  let mut input = WeeklyVolumeInput::new(start, today);
  input.estimates = load_estimates(&state.db).await?;
  input.landmark_overrides = load_landmark_overrides(&state.db).await?;
  input.training_start = profile.training_start_date;
  input.plateau_threshold = state.config.plateau_weeks;

  // Plateau history for every exercise trained this week, up to the end of it
  let history_start = start - Duration::weeks(state.config.history_weeks as i64);
  let exercise_ids: BTreeSet<&str> = workouts
    .iter()
    .flat_map(|w| w.exercises.iter())
    .map(|e| e.exercise_id.as_str())
    .collect();

  let mut e1rm_history = BTreeMap::new();
  for exercise_id in exercise_ids {
    let sets: Vec<_> = load_exercise_sets(&state.db, exercise_id, history_start)
      .await?
      .into_iter()
      .filter(|s| s.performed_on < end)
      .collect();
    e1rm_history.insert(exercise_id.to_string(), weekly_best_series(&sets)?);
  }
  input.e1rm_history = e1rm_history;
  input.workouts = workouts;

  let analysis = analyze_weekly_volume(&input)?;

  info!(
    muscles = analysis.summary.muscles_trained,
    alerts = analysis.alerts.len(),
    "Weekly volume analysis complete"
  );

  Ok(analysis)
}

/// ---------------------------------------------------------------------------
/// Training Age & Landmarks
/// ---------------------------------------------------------------------------

pub async fn training_age(state: &AppState, today: NaiveDate) -> Result<TrainingAgeInfo, AppError> {
  let profile = load_user_profile(&state.db).await?;
  let info = estimate_training_age(profile.training_start_date, today)?;
  info!(level = %info.experience_level, "Computed training age");
  Ok(info)
}

#[derive(Debug, Clone, Serialize)]
pub struct MuscleLandmarks {
  pub muscle_group: String,
  pub landmarks: VolumeLandmarks,
  pub source: LandmarkSource,
}

/// Scaled landmarks for every table muscle plus any muscle with an override
pub async fn muscle_landmarks(state: &AppState, today: NaiveDate) -> Result<Vec<MuscleLandmarks>, AppError> {
  let profile = load_user_profile(&state.db).await?;
  let age = estimate_training_age(profile.training_start_date, today)?;
  let overrides = load_landmark_overrides(&state.db).await?;

  let muscles: BTreeSet<String> = known_muscles()
    .map(str::to_string)
    .chain(overrides.keys().cloned())
    .collect();

  let mut result = Vec::with_capacity(muscles.len());
  for muscle in muscles {
    let resolved = resolve_landmarks(&muscle, overrides.get(&muscle), age.volume_tolerance_multiplier)?;
    result.push(MuscleLandmarks {
      muscle_group: muscle,
      landmarks: resolved.landmarks,
      source: resolved.source,
    });
  }

  info!(count = result.len(), multiplier = age.volume_tolerance_multiplier, "Resolved muscle landmarks");
  Ok(result)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
