//! Test utilities and helpers for unit and database tests
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Seeders for exercises, workouts and estimates
//! - Mock data factories for the pure engine
//! - Helper assertions

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::models::{CompletedWorkout, EstimateSource, ExerciseEstimate, LoggedSet, WorkoutExercise};

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// Insert an exercise with its primary muscles
pub async fn seed_exercise(pool: &SqlitePool, id: &str, name: &str, muscles: &[&str]) {
  let muscles_json = serde_json::to_string(muscles).expect("Failed to encode muscles");

  sqlx::query(
    r#"
    INSERT INTO exercises (id, name, primary_muscles)
    VALUES (?1, ?2, ?3)
    "#,
  )
  .bind(id)
  .bind(name)
  .bind(muscles_json)
  .execute(pool)
  .await
  .expect("Failed to seed exercise");
}

/// Insert a workout and its sets. Sets are `(exercise_id, set)` in logging order.
/// Returns the workout id.
pub async fn seed_workout(
  pool: &SqlitePool,
  performed_on: NaiveDate,
  completed: bool,
  sets: &[(&str, LoggedSet)],
) -> i64 {
  let result = sqlx::query("INSERT INTO workouts (performed_on, completed) VALUES (?1, ?2)")
    .bind(performed_on)
    .bind(completed)
    .execute(pool)
    .await
    .expect("Failed to insert test workout");
  let workout_id = result.last_insert_rowid();

  for (i, (exercise_id, set)) in sets.iter().enumerate() {
    sqlx::query(
      r#"
      INSERT INTO workout_sets (
        workout_id, exercise_id, set_index, weight, reps, rpe, rir, completed, is_warmup
      )
      VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
      "#,
    )
    .bind(workout_id)
    .bind(*exercise_id)
    .bind(i as i64)
    .bind(set.weight)
    .bind(set.reps as i64)
    .bind(set.rpe)
    .bind(set.rir)
    .bind(set.completed)
    .bind(set.is_warmup)
    .execute(pool)
    .await
    .expect("Failed to insert test set");
  }

  workout_id
}

/// Seed the singleton profile row
pub async fn seed_user_profile(pool: &SqlitePool, training_start: Option<&str>, model: &str) {
  sqlx::query(
    r#"
    INSERT INTO user_profile (id, training_start_date, progression_model)
    VALUES (1, ?1, ?2)
    ON CONFLICT(id) DO UPDATE SET
      training_start_date = excluded.training_start_date,
      progression_model = excluded.progression_model
    "#,
  )
  .bind(training_start)
  .bind(model)
  .execute(pool)
  .await
  .expect("Failed to seed user profile");
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// Completed working set
pub fn mock_set(weight: f64, reps: u32, rpe: Option<f64>) -> LoggedSet {
  LoggedSet {
    weight,
    reps,
    rpe,
    rir: None,
    completed: true,
    is_warmup: false,
  }
}

/// Exercise whose display name equals its id
pub fn mock_exercise(id: &str, muscles: &[&str], sets: Vec<LoggedSet>) -> WorkoutExercise {
  WorkoutExercise {
    exercise_id: id.to_string(),
    name: id.to_string(),
    primary_muscles: muscles.iter().map(|m| m.to_string()).collect(),
    sets,
  }
}

pub fn mock_workout(id: i64, performed_on: NaiveDate, exercises: Vec<WorkoutExercise>) -> CompletedWorkout {
  CompletedWorkout {
    workout_id: id,
    performed_on,
    completed: true,
    exercises,
  }
}

pub fn mock_estimate(exercise_id: &str, estimated_1rm: f64) -> ExerciseEstimate {
  ExerciseEstimate {
    exercise_id: exercise_id.to_string(),
    estimated_1rm,
    source: EstimateSource::Calculated,
    last_updated: Utc::now(),
  }
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('exercises', 'workouts', 'workout_sets', 'exercise_estimates', 'volume_landmark_overrides', 'user_profile')"
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 6, "Expected 6 tables, got {}", tables.len());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seed_workout_inserts_sets() {
    let pool = setup_test_db().await;
    seed_exercise(&pool, "squat", "Back Squat", &["quads", "glutes"]).await;

    let day = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    let id = seed_workout(
      &pool,
      day,
      true,
      &[("squat", mock_set(140.0, 5, Some(8.0))), ("squat", mock_set(140.0, 5, None))],
    )
    .await;
    assert!(id > 0);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workout_sets WHERE workout_id = ?1")
      .bind(id)
      .fetch_one(&pool)
      .await
      .expect("Failed to count sets");
    assert_eq!(count, 2);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_mock_factories_create_valid_data() {
    let set = mock_set(100.0, 5, None);
    assert!(set.is_hard_set());

    let exercise = mock_exercise("row", &["back"], vec![set]);
    assert_eq!(exercise.name, "row");

    let estimate = mock_estimate("row", 120.0);
    assert_eq!(estimate.source, EstimateSource::Calculated);
  }
}
