//! SQLite access for the inputs the analytics engine needs

use std::collections::BTreeMap;

use chrono::NaiveDate;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::landmarks::{normalize_muscle, VolumeLandmarks};
use crate::models::{
  CompletedWorkout, DatedSet, ExerciseEstimate, LoggedSet, UserProfile, WorkoutExercise,
};
use crate::progression::{ProgressionModel, ProgressionPreferences, RpeTargets};
use crate::training_age::parse_training_start;

pub type DbPool = SqlitePool;

/// Application state holding the database connection pool
pub struct AppState {
  pub db: DbPool,
  pub config: AppConfig,
}

/// Initialize the database connection pool and run migrations
pub async fn initialize_db(config: &AppConfig) -> Result<DbPool, AppError> {
  info!(url = %config.database_url, "Initializing database");

  let pool = SqlitePoolOptions::new()
    .max_connections(config.max_connections)
    .connect(&config.database_url)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  info!("Database initialized successfully");

  Ok(pool)
}

/// ---------------------------------------------------------------------------
/// Row Mapping
/// ---------------------------------------------------------------------------

#[derive(Debug, sqlx::FromRow)]
struct SetRow {
  workout_id: i64,
  performed_on: NaiveDate,
  exercise_id: String,
  exercise_name: String,
  primary_muscles: String,
  weight: f64,
  reps: i64,
  rpe: Option<f64>,
  rir: Option<f64>,
  set_completed: bool,
  is_warmup: bool,
}

impl SetRow {
  fn logged_set(&self) -> Result<LoggedSet, AppError> {
    let reps = u32::try_from(self.reps).map_err(|_| {
      AppError::Corrupt(format!(
        "workout {} has {} reps for {}",
        self.workout_id, self.reps, self.exercise_id
      ))
    })?;
    Ok(LoggedSet {
      weight: self.weight,
      reps,
      rpe: self.rpe,
      rir: self.rir,
      completed: self.set_completed,
      is_warmup: self.is_warmup,
    })
  }
}

fn parse_muscles(exercise_id: &str, raw: &str) -> Result<Vec<String>, AppError> {
  let muscles: Vec<String> = serde_json::from_str(raw).map_err(|e| {
    AppError::Corrupt(format!("primary muscles for {}: {}", exercise_id, e))
  })?;
  Ok(muscles.iter().map(|m| normalize_muscle(m)).collect())
}

const SET_COLUMNS: &str = r#"
  w.id AS workout_id,
  w.performed_on AS performed_on,
  s.exercise_id AS exercise_id,
  e.name AS exercise_name,
  e.primary_muscles AS primary_muscles,
  s.weight AS weight,
  s.reps AS reps,
  s.rpe AS rpe,
  s.rir AS rir,
  s.completed AS set_completed,
  s.is_warmup AS is_warmup
"#;

/// ---------------------------------------------------------------------------
/// Workouts
/// ---------------------------------------------------------------------------

/// Completed workouts performed in `[start, end)`, exercises in logging order
pub async fn load_completed_workouts(
  pool: &DbPool,
  start: NaiveDate,
  end: NaiveDate,
) -> Result<Vec<CompletedWorkout>, AppError> {
  let sql = format!(
    r#"
    SELECT {}
    FROM workouts w
    JOIN workout_sets s ON s.workout_id = w.id
    JOIN exercises e ON e.id = s.exercise_id
    WHERE w.completed = 1 AND w.performed_on >= ?1 AND w.performed_on < ?2
    ORDER BY w.performed_on, w.id, s.set_index
    "#,
    SET_COLUMNS
  );
  let rows: Vec<SetRow> = sqlx::query_as(&sql)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

  let mut workouts: Vec<CompletedWorkout> = Vec::new();
  for row in rows {
    let set = row.logged_set()?;

    let is_new_workout = workouts.last().map_or(true, |w| w.workout_id != row.workout_id);
    if is_new_workout {
      workouts.push(CompletedWorkout {
        workout_id: row.workout_id,
        performed_on: row.performed_on,
        completed: true,
        exercises: Vec::new(),
      });
    }
    let Some(workout) = workouts.last_mut() else {
      continue;
    };

    match workout.exercises.iter_mut().find(|e| e.exercise_id == row.exercise_id) {
      Some(exercise) => exercise.sets.push(set),
      None => workout.exercises.push(WorkoutExercise {
        primary_muscles: parse_muscles(&row.exercise_id, &row.primary_muscles)?,
        exercise_id: row.exercise_id,
        name: row.exercise_name,
        sets: vec![set],
      }),
    }
  }

  debug!(count = workouts.len(), %start, %end, "Loaded completed workouts");
  Ok(workouts)
}

/// Every set logged for an exercise in completed workouts since `since`, oldest first
pub async fn load_exercise_sets(
  pool: &DbPool,
  exercise_id: &str,
  since: NaiveDate,
) -> Result<Vec<DatedSet>, AppError> {
  let sql = format!(
    r#"
    SELECT {}
    FROM workouts w
    JOIN workout_sets s ON s.workout_id = w.id
    JOIN exercises e ON e.id = s.exercise_id
    WHERE w.completed = 1 AND s.exercise_id = ?1 AND w.performed_on >= ?2
    ORDER BY w.performed_on, w.id, s.set_index
    "#,
    SET_COLUMNS
  );
  let rows: Vec<SetRow> = sqlx::query_as(&sql)
    .bind(exercise_id)
    .bind(since)
    .fetch_all(pool)
    .await?;

  rows
    .iter()
    .map(|row| -> Result<DatedSet, AppError> {
      Ok(DatedSet {
        performed_on: row.performed_on,
        set: row.logged_set()?,
      })
    })
    .collect()
}

/// Sets from the most recent completed workout that included the exercise.
/// Empty when the exercise was never performed.
pub async fn load_last_session_sets(pool: &DbPool, exercise_id: &str) -> Result<Vec<DatedSet>, AppError> {
  let sql = format!(
    r#"
    SELECT {}
    FROM workouts w
    JOIN workout_sets s ON s.workout_id = w.id
    JOIN exercises e ON e.id = s.exercise_id
    WHERE s.exercise_id = ?1 AND w.id = (
      SELECT w2.id FROM workouts w2
      JOIN workout_sets s2 ON s2.workout_id = w2.id
      WHERE w2.completed = 1 AND s2.exercise_id = ?1
      ORDER BY w2.performed_on DESC, w2.id DESC
      LIMIT 1
    )
    ORDER BY s.set_index
    "#,
    SET_COLUMNS
  );
  let rows: Vec<SetRow> = sqlx::query_as(&sql).bind(exercise_id).fetch_all(pool).await?;

  rows
    .iter()
    .map(|row| -> Result<DatedSet, AppError> {
      Ok(DatedSet {
        performed_on: row.performed_on,
        set: row.logged_set()?,
      })
    })
    .collect()
}

pub async fn load_exercise_name(pool: &DbPool, exercise_id: &str) -> Result<Option<String>, AppError> {
  let name: Option<String> = sqlx::query_scalar("SELECT name FROM exercises WHERE id = ?1")
    .bind(exercise_id)
    .fetch_optional(pool)
    .await?;
  Ok(name)
}

/// ---------------------------------------------------------------------------
/// Estimates
/// ---------------------------------------------------------------------------

pub async fn load_estimates(pool: &DbPool) -> Result<BTreeMap<String, ExerciseEstimate>, AppError> {
  let rows: Vec<ExerciseEstimate> = sqlx::query_as(
    "SELECT exercise_id, estimated_1rm, source, last_updated FROM exercise_estimates",
  )
  .fetch_all(pool)
  .await?;

  Ok(rows.into_iter().map(|e| (e.exercise_id.clone(), e)).collect())
}

pub async fn load_estimate(pool: &DbPool, exercise_id: &str) -> Result<Option<ExerciseEstimate>, AppError> {
  let row: Option<ExerciseEstimate> = sqlx::query_as(
    "SELECT exercise_id, estimated_1rm, source, last_updated FROM exercise_estimates WHERE exercise_id = ?1",
  )
  .bind(exercise_id)
  .fetch_optional(pool)
  .await?;
  Ok(row)
}

/// Insert or replace the estimate for its exercise
pub async fn upsert_estimate(pool: &DbPool, estimate: &ExerciseEstimate) -> Result<(), AppError> {
  sqlx::query(
    r#"
    INSERT INTO exercise_estimates (exercise_id, estimated_1rm, source, last_updated)
    VALUES (?1, ?2, ?3, ?4)
    ON CONFLICT(exercise_id) DO UPDATE SET
      estimated_1rm = excluded.estimated_1rm,
      source = excluded.source,
      last_updated = excluded.last_updated
    "#,
  )
  .bind(&estimate.exercise_id)
  .bind(estimate.estimated_1rm)
  .bind(estimate.source)
  .bind(estimate.last_updated)
  .execute(pool)
  .await?;

  Ok(())
}

/// ---------------------------------------------------------------------------
/// Landmarks & Profile
/// ---------------------------------------------------------------------------

/// User landmark overrides keyed by normalized muscle id
pub async fn load_landmark_overrides(pool: &DbPool) -> Result<BTreeMap<String, VolumeLandmarks>, AppError> {
  let rows: Vec<(String, i64, i64, i64, i64)> = sqlx::query_as(
    "SELECT muscle_group, mev, mav_low, mav_high, mrv FROM volume_landmark_overrides",
  )
  .fetch_all(pool)
  .await?;

  let mut overrides = BTreeMap::new();
  for (muscle, mev, mav_low, mav_high, mrv) in rows {
    let field = |v: i64| {
      u32::try_from(v).map_err(|_| AppError::Corrupt(format!("landmark {} for {}", v, muscle)))
    };
    let landmarks = VolumeLandmarks::new(field(mev)?, field(mav_low)?, field(mav_high)?, field(mrv)?);
    overrides.insert(normalize_muscle(&muscle), landmarks);
  }
  Ok(overrides)
}

/// Profile row, or defaults when none has been saved
pub async fn load_user_profile(pool: &DbPool) -> Result<UserProfile, AppError> {
  let row: Option<(Option<String>, String, f64, i64, i64, f64, f64)> = sqlx::query_as(
    r#"
    SELECT training_start_date, progression_model, weight_increment,
           rep_range_low, rep_range_high, rpe_target_low, rpe_target_high
    FROM user_profile WHERE id = 1
    "#,
  )
  .fetch_optional(pool)
  .await?;

  let Some((start, model, increment, low, high, rpe_low, rpe_high)) = row else {
    return Ok(UserProfile::default());
  };

  let training_start_date = match start.as_deref().map(str::trim) {
    Some(raw) if !raw.is_empty() => {
      Some(parse_training_start(raw).map_err(|e| AppError::Corrupt(e.to_string()))?)
    }
    _ => None,
  };
  let model: ProgressionModel = model.parse().map_err(AppError::Corrupt)?;
  let reps = |v: i64| u32::try_from(v).map_err(|_| AppError::Corrupt(format!("rep range bound {}", v)));

  Ok(UserProfile {
    training_start_date,
    preferences: ProgressionPreferences {
      model,
      weight_increment: increment,
      rep_range_low: reps(low)?,
      rep_range_high: reps(high)?,
      rpe_targets: RpeTargets {
        low: rpe_low,
        high: rpe_high,
      },
    },
  })
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
