//! Commands for next-session prescriptions, plateau checks and tested maxes

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::info;

use crate::db::{
    load_exercise_name, load_exercise_sets, load_last_session_sets, load_user_profile,
    upsert_estimate, AppState,
};
use crate::error::AppError;
use crate::models::{EstimateSource, ExerciseEstimate, LoggedSet};
use crate::one_rep_max::estimate_one_rep_max;
use crate::plateau::{plateau_info, week_start, weekly_best_series, PlateauInfo};
use crate::progression::{self as engine, ProgressionInput, ProgressionSuggestion};

/// Heaviest working set, more reps breaking ties
fn top_set(sets: &[LoggedSet]) -> Option<&LoggedSet> {
    sets.iter().filter(|s| s.is_hard_set()).max_by(|a, b| {
        a.weight
            .total_cmp(&b.weight)
            .then_with(|| a.reps.cmp(&b.reps))
    })
}

/// Prescribe the next session for an exercise from its last completed session
pub async fn suggest_progression(
    state: &AppState,
    exercise_id: &str,
) -> Result<ProgressionSuggestion, AppError> {
    let last_session: Vec<LoggedSet> = load_last_session_sets(&state.db, exercise_id)
        .await?
        .into_iter()
        .map(|s| s.set)
        .collect();

    let top = top_set(&last_session).ok_or_else(|| {
        AppError::NotFound(format!("completed working set for {}", exercise_id))
    })?;

    let profile = load_user_profile(&state.db).await?;
    let input = ProgressionInput::from_preferences(&profile.preferences, top.weight, top.reps, top.rpe);
    let suggestion = engine::suggest_progression(&input)?;

    info!(
        exercise_id,
        model = %suggestion.model,
        suggested_weight = suggestion.suggested_weight,
        suggested_reps = suggestion.suggested_reps,
        "Suggested progression"
    );

    Ok(suggestion)
}

/// Plateau check over the configured e1RM lookback, ending with the week of `today`
pub async fn plateau_status(
    state: &AppState,
    exercise_id: &str,
    today: NaiveDate,
) -> Result<PlateauInfo, AppError> {
    let this_week = week_start(today);
    let since = this_week - Duration::weeks(state.config.history_weeks as i64);
    let end = this_week + Duration::days(7);
    let sets: Vec<_> = load_exercise_sets(&state.db, exercise_id, since)
        .await?
        .into_iter()
        .filter(|s| s.performed_on < end)
        .collect();
    let series = weekly_best_series(&sets)?;
    let info = plateau_info(&series, state.config.plateau_weeks)?;

    info!(
        exercise_id,
        weeks = series.len(),
        detected = info.detected,
        weeks_stagnant = info.weeks_stagnant,
        "Checked plateau status"
    );

    Ok(info)
}

/// Store the e1RM implied by a tested rep max as the exercise's estimate
pub async fn record_tested_max(
    state: &AppState,
    exercise_id: &str,
    weight: f64,
    reps: u32,
    tested_at: DateTime<Utc>,
) -> Result<ExerciseEstimate, AppError> {
    if load_exercise_name(&state.db, exercise_id).await?.is_none() {
        return Err(AppError::NotFound(format!("exercise {}", exercise_id)));
    }

    let e1rm = estimate_one_rep_max(weight, reps)?;
    let estimate = ExerciseEstimate {
        exercise_id: exercise_id.to_string(),
        estimated_1rm: e1rm.estimated_1rm,
        source: EstimateSource::Tested,
        last_updated: tested_at,
    };
    upsert_estimate(&state.db, &estimate).await?;

    info!(
        exercise_id,
        estimated_1rm = estimate.estimated_1rm,
        formula = ?e1rm.formula_used,
        "Recorded tested max"
    );

    Ok(estimate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::db::load_estimate;
    use crate::progression::ProgressionModel;
    use crate::test_utils::*;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    async fn state() -> AppState {
        AppState {
            db: setup_test_db().await,
            config: AppConfig::default(),
        }
    }

    #[tokio::test]
    async fn test_suggest_progression_uses_top_set_and_profile() {
        // Arrange: double progression, 8-12 reps, top set at the top of the range
        let state = state().await;
        seed_exercise(&state.db, "bench_press", "Bench Press", &["chest"]).await;
        let mut warmup = mock_set(120.0, 12, None);
        warmup.is_warmup = true;
        seed_workout(
            &state.db,
            day(3, 2),
            true,
            &[
                ("bench_press", warmup),
                ("bench_press", mock_set(100.0, 12, Some(8.0))),
                ("bench_press", mock_set(100.0, 10, Some(9.0))),
            ],
        )
        .await;

        // Act
        let suggestion = suggest_progression(&state, "bench_press").await.unwrap();

        // Assert
        assert_eq!(suggestion.model, ProgressionModel::Double);
        assert_eq!(suggestion.current_weight, 100.0);
        assert_eq!(suggestion.current_reps, 12);
        assert_eq!(suggestion.suggested_weight, 102.5);
        assert_eq!(suggestion.suggested_reps, 8);

        teardown_test_db(state.db).await;
    }

    #[tokio::test]
    async fn test_suggest_progression_without_history() {
        let state = state().await;
        let result = suggest_progression(&state, "bench_press").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        teardown_test_db(state.db).await;
    }

    #[tokio::test]
    async fn test_plateau_status_over_history() {
        // Arrange
        let state = state().await;
        seed_exercise(&state.db, "squat", "Back Squat", &["quads"]).await;
        seed_workout(&state.db, day(2, 9), true, &[("squat", mock_set(150.0, 1, None))]).await;
        for d in [day(2, 16), day(2, 25), day(3, 4)] {
            seed_workout(&state.db, d, true, &[("squat", mock_set(155.0, 1, None))]).await;
        }

        // Act
        let info = plateau_status(&state, "squat", day(3, 6)).await.unwrap();

        // Assert
        assert!(info.detected);
        assert_eq!(info.weeks_stagnant, 3);
        assert_eq!(info.last_pr_date, Some(day(2, 16)));
        assert_eq!(info.last_pr_e1rm, Some(155.0));

        teardown_test_db(state.db).await;
    }

    #[tokio::test]
    async fn test_plateau_status_ignores_sets_after_current_week() {
        // Arrange: the same stalled history plus a heavier single the week after today
        let state = state().await;
        seed_exercise(&state.db, "squat", "Back Squat", &["quads"]).await;
        seed_workout(&state.db, day(2, 9), true, &[("squat", mock_set(150.0, 1, None))]).await;
        for d in [day(2, 16), day(2, 25), day(3, 4)] {
            seed_workout(&state.db, d, true, &[("squat", mock_set(155.0, 1, None))]).await;
        }
        seed_workout(&state.db, day(3, 10), true, &[("squat", mock_set(170.0, 1, None))]).await;

        // Act
        let info = plateau_status(&state, "squat", day(3, 6)).await.unwrap();

        // Assert
        assert!(info.detected);
        assert_eq!(info.weeks_stagnant, 3);
        assert_eq!(info.latest_e1rm, Some(155.0));

        teardown_test_db(state.db).await;
    }

    #[tokio::test]
    async fn test_record_tested_max_upserts() {
        // Arrange
        let state = state().await;
        seed_exercise(&state.db, "squat", "Back Squat", &["quads"]).await;

        // Act
        let estimate = record_tested_max(&state, "squat", 225.0, 5, Utc::now()).await.unwrap();

        // Assert
        assert_eq!(estimate.estimated_1rm, 253.1);
        let stored = load_estimate(&state.db, "squat").await.unwrap().unwrap();
        assert_eq!(stored.source, EstimateSource::Tested);
        assert_eq!(stored.estimated_1rm, 253.1);

        let missing = record_tested_max(&state, "deadlift", 200.0, 1, Utc::now()).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));

        let invalid = record_tested_max(&state, "squat", 0.0, 5, Utc::now()).await;
        assert!(matches!(invalid, Err(AppError::Engine(_))));

        teardown_test_db(state.db).await;
    }
}
