//! Weekly per-muscle volume analysis
//!
//! Combines the per-set calculators, landmark resolution and classification into
//! one report for a training week. Everything here is computed from the inputs
//! handed in; nothing is cached between calls.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::effective_reps::effective_reps_for_set;
use crate::error::EngineResult;
use crate::intensity::{relative_intensity, relative_intensity_for, IntensityZone};
use crate::landmarks::{normalize_muscle, resolve_landmarks, LandmarkSource, VolumeLandmarks};
use crate::models::{CompletedWorkout, ExerciseEstimate};
use crate::one_rep_max::derive_estimate;
use crate::plateau::{plateau_info, WeeklyBest, DEFAULT_PLATEAU_WEEKS};
use crate::round1;
use crate::training_age::{estimate_training_age, TrainingAgeInfo};
use crate::volume_status::{classify_volume, VolumeStatus};

/// Sessions per week at which a muscle counts as trained often enough
const OPTIMAL_SESSIONS_PER_WEEK: u32 = 2;

/// ---------------------------------------------------------------------------
/// Inputs
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyVolumeInput {
  /// Monday of the analysed week. Workouts outside the seven days are ignored.
  pub week_start: NaiveDate,
  /// Reference date for training age
  pub today: NaiveDate,
  pub workouts: Vec<CompletedWorkout>,
  /// Keyed by exercise id
  pub estimates: BTreeMap<String, ExerciseEstimate>,
  /// Keyed by muscle id
  pub landmark_overrides: BTreeMap<String, VolumeLandmarks>,
  pub training_start: Option<NaiveDate>,
  /// Weekly best e1RM per exercise id, oldest first
  pub e1rm_history: BTreeMap<String, Vec<WeeklyBest>>,
  pub plateau_threshold: u32,
}

impl WeeklyVolumeInput {
  pub fn new(week_start: NaiveDate, today: NaiveDate) -> Self {
    Self {
      week_start,
      today,
      workouts: Vec::new(),
      estimates: BTreeMap::new(),
      landmark_overrides: BTreeMap::new(),
      training_start: None,
      e1rm_history: BTreeMap::new(),
      plateau_threshold: DEFAULT_PLATEAU_WEEKS,
    }
  }

  fn contains(&self, date: NaiveDate) -> bool {
    date >= self.week_start && date < self.week_start + Duration::days(7)
  }
}

/// Per-muscle accumulator, built fresh for each analysis
#[derive(Debug, Default)]
struct WeeklyMuscleStats {
  hard_sets: u32,
  effective_reps: f64,
  total_volume: f64,
  relative_intensities: Vec<f64>,
  session_dates: BTreeSet<NaiveDate>,
}

impl WeeklyMuscleStats {
  fn average_intensity(&self) -> Option<f64> {
    if self.relative_intensities.is_empty() {
      return None;
    }
    let sum: f64 = self.relative_intensities.iter().sum();
    Some(round1(sum / self.relative_intensities.len() as f64))
  }
}

/// ---------------------------------------------------------------------------
/// Report
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyAnalysis {
  pub sessions_per_week: u32,
  pub optimal: bool,
  pub recommendation: String,
}

impl FrequencyAnalysis {
  fn from_sessions(sessions_per_week: u32) -> Self {
    let optimal = sessions_per_week >= OPTIMAL_SESSIONS_PER_WEEK;
    let recommendation = if optimal {
      format!("Trained {} times this week; frequency is on target", sessions_per_week)
    } else {
      "Trained once this week; add a second session to spread the volume".to_string()
    };
    Self {
      sessions_per_week,
      optimal,
      recommendation,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MuscleVolumeReport {
  pub muscle_group: String,
  pub hard_sets: u32,
  pub effective_reps: f64,
  pub total_volume: f64,
  /// Mean % of e1RM across sets that had an estimate
  pub avg_relative_intensity: Option<f64>,
  pub intensity_zone: Option<IntensityZone>,
  pub landmarks: VolumeLandmarks,
  pub landmark_source: LandmarkSource,
  pub status: VolumeStatus,
  pub percentage_within_range: f64,
  pub recommendation: String,
  pub frequency: FrequencyAnalysis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
  Volume,
  Frequency,
  Plateau,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
  Info,
  Warning,
  Critical,
}

impl AlertSeverity {
  /// 0 = most urgent
  pub fn priority(&self) -> u8 {
    match self {
      AlertSeverity::Critical => 0,
      AlertSeverity::Warning => 1,
      AlertSeverity::Info => 2,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeAlert {
  #[serde(rename = "type")]
  pub alert_type: AlertType,
  pub severity: AlertSeverity,
  pub muscle_group: Option<String>,
  pub message: String,
  pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyVolumeSummary {
  pub total_hard_sets: u32,
  pub total_effective_reps: f64,
  pub total_volume: f64,
  pub muscles_trained: usize,
  pub muscles_below_mev: usize,
  pub muscles_over_mrv: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyVolumeAnalysis {
  pub week_start: NaiveDate,
  pub training_age: TrainingAgeInfo,
  /// Most urgent status first
  pub muscles: Vec<MuscleVolumeReport>,
  /// Critical first, then warning, then info
  pub alerts: Vec<VolumeAlert>,
  pub summary: WeeklyVolumeSummary,
}

/// ---------------------------------------------------------------------------
/// Aggregation
/// ---------------------------------------------------------------------------

/// e1RM for an exercise with no estimate of its own, taken from the first
/// related lift (by exercise id) that has one
fn derived_estimate(input: &WeeklyVolumeInput, exercise_id: &str) -> Option<f64> {
  input.estimates.iter().find_map(|(reference, estimate)| {
    derive_estimate(reference, estimate.estimated_1rm, exercise_id).map(|e1rm| {
      debug!(exercise_id, reference = %reference, e1rm, "Derived e1RM from related lift");
      e1rm
    })
  })
}

fn accumulate(input: &WeeklyVolumeInput) -> EngineResult<BTreeMap<String, WeeklyMuscleStats>> {
  let mut stats: BTreeMap<String, WeeklyMuscleStats> = BTreeMap::new();

  for workout in input.workouts.iter().filter(|w| w.completed) {
    if !input.contains(workout.performed_on) {
      debug!(
        workout_id = workout.workout_id,
        performed_on = %workout.performed_on,
        "Skipping workout outside analysed week"
      );
      continue;
    }

    for exercise in &workout.exercises {
      // Aliases like "lats" and "back" must not double count one set
      let muscles: BTreeSet<String> = exercise
        .primary_muscles
        .iter()
        .map(|m| normalize_muscle(m))
        .filter(|m| !m.is_empty())
        .collect();
      if muscles.is_empty() {
        continue;
      }
      let estimate = input.estimates.get(&exercise.exercise_id);
      let derived = match estimate {
        Some(_) => None,
        None => derived_estimate(input, &exercise.exercise_id),
      };

      for set in exercise.sets.iter().filter(|s| s.is_hard_set()) {
        set.validate()?;
        let effective = effective_reps_for_set(set)?.effective_reps;
        let intensity = match derived {
          Some(e1rm) => relative_intensity(set.weight, e1rm),
          None => relative_intensity_for(set.weight, estimate),
        };

        for muscle in &muscles {
          let entry = stats.entry(muscle.clone()).or_default();
          entry.hard_sets += 1;
          entry.effective_reps += effective;
          entry.total_volume += set.volume();
          if let Some(pct) = intensity {
            entry.relative_intensities.push(pct);
          }
          entry.session_dates.insert(workout.performed_on);
        }
      }
    }
  }

  Ok(stats)
}

fn volume_alerts(report: &MuscleVolumeReport) -> Vec<VolumeAlert> {
  let mut alerts = Vec::new();
  let muscle = &report.muscle_group;

  match report.status {
    VolumeStatus::BelowMev => alerts.push(VolumeAlert {
      alert_type: AlertType::Volume,
      severity: AlertSeverity::Warning,
      muscle_group: Some(muscle.clone()),
      message: format!(
        "{}: {} hard sets is below minimum effective volume ({})",
        muscle, report.hard_sets, report.landmarks.mev
      ),
      recommendation: report.recommendation.clone(),
    }),
    VolumeStatus::OverMrv => alerts.push(VolumeAlert {
      alert_type: AlertType::Volume,
      severity: AlertSeverity::Critical,
      muscle_group: Some(muscle.clone()),
      message: format!(
        "{}: {} hard sets exceeds maximum recoverable volume ({})",
        muscle, report.hard_sets, report.landmarks.mrv
      ),
      recommendation: report.recommendation.clone(),
    }),
    _ => {}
  }

  if !report.frequency.optimal {
    alerts.push(VolumeAlert {
      alert_type: AlertType::Frequency,
      severity: AlertSeverity::Info,
      muscle_group: Some(muscle.clone()),
      message: format!(
        "{} trained in {} session this week",
        muscle, report.frequency.sessions_per_week
      ),
      recommendation: report.frequency.recommendation.clone(),
    });
  }

  alerts
}

fn plateau_alerts(input: &WeeklyVolumeInput) -> EngineResult<Vec<VolumeAlert>> {
  let mut alerts = Vec::new();

  for (exercise_id, series) in &input.e1rm_history {
    let info = plateau_info(series, input.plateau_threshold)?;
    if !info.detected {
      continue;
    }
    let name = input
      .workouts
      .iter()
      .flat_map(|w| w.exercises.iter())
      .find(|e| &e.exercise_id == exercise_id)
      .map(|e| e.name.as_str())
      .unwrap_or(exercise_id.as_str());

    alerts.push(VolumeAlert {
      alert_type: AlertType::Plateau,
      severity: AlertSeverity::Warning,
      muscle_group: None,
      message: format!("{}: no new e1RM best in {} weeks", name, info.weeks_stagnant),
      recommendation: info.suggestion,
    });
  }

  Ok(alerts)
}

pub fn analyze_weekly_volume(input: &WeeklyVolumeInput) -> EngineResult<WeeklyVolumeAnalysis> {
  let training_age = estimate_training_age(input.training_start, input.today)?;
  let multiplier = training_age.volume_tolerance_multiplier;

  let overrides: BTreeMap<String, VolumeLandmarks> = input
    .landmark_overrides
    .iter()
    .map(|(muscle, lm)| (normalize_muscle(muscle), *lm))
    .collect();

  let stats = accumulate(input)?;

  let mut muscles = Vec::with_capacity(stats.len());
  for (muscle, s) in stats {
    let resolved = resolve_landmarks(&muscle, overrides.get(&muscle), multiplier)?;
    if resolved.source == LandmarkSource::GenericFallback {
      warn!(muscle = %muscle, "No landmarks for muscle, using generic values");
    }

    let classification = classify_volume(s.hard_sets, &resolved.landmarks);
    let avg_relative_intensity = s.average_intensity();

    debug!(
      muscle = %muscle,
      hard_sets = s.hard_sets,
      status = %classification.status,
      sessions = s.session_dates.len(),
      "Classified weekly volume"
    );

    muscles.push(MuscleVolumeReport {
      hard_sets: s.hard_sets,
      effective_reps: round1(s.effective_reps),
      total_volume: round1(s.total_volume),
      avg_relative_intensity,
      intensity_zone: avg_relative_intensity.map(IntensityZone::from_pct),
      landmarks: resolved.landmarks,
      landmark_source: resolved.source,
      status: classification.status,
      percentage_within_range: classification.percentage_within_range,
      recommendation: classification.recommendation,
      frequency: FrequencyAnalysis::from_sessions(s.session_dates.len() as u32),
      muscle_group: muscle,
    });
  }

  // Stats come out of the map alphabetically, so a stable sort keeps ties in name order
  muscles.sort_by_key(|m| m.status.severity_rank());

  let mut alerts: Vec<VolumeAlert> = muscles.iter().flat_map(volume_alerts).collect();
  alerts.extend(plateau_alerts(input)?);
  alerts.sort_by_key(|a| a.severity.priority());

  let summary = WeeklyVolumeSummary {
    total_hard_sets: muscles.iter().map(|m| m.hard_sets).sum(),
    total_effective_reps: round1(muscles.iter().map(|m| m.effective_reps).sum()),
    total_volume: round1(muscles.iter().map(|m| m.total_volume).sum()),
    muscles_trained: muscles.len(),
    muscles_below_mev: muscles.iter().filter(|m| m.status == VolumeStatus::BelowMev).count(),
    muscles_over_mrv: muscles.iter().filter(|m| m.status == VolumeStatus::OverMrv).count(),
  };

  Ok(WeeklyVolumeAnalysis {
    week_start: input.week_start,
    training_age,
    muscles,
    alerts,
    summary,
  })
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
