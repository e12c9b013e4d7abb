//! Next-Session Progression Engine
//!
//! Given the last working set for an exercise, prescribe the next session's
//! target load and reps under one of three models:
//! - linear: add load every session
//! - double: add reps up to the top of the range, then add load and reset reps
//! - rpe_based: move load to keep RPE inside a target band
//!
//! `reasoning` is shown to the user verbatim, so every branch names the
//! condition that triggered it.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

// ---------------------------------------------------------------------------
/// Progression Model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionModel {
    Linear,
    #[default]
    Double,
    RpeBased,
}

impl std::fmt::Display for ProgressionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Double => write!(f, "double"),
            Self::RpeBased => write!(f, "rpe_based"),
        }
    }
}

impl std::str::FromStr for ProgressionModel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(Self::Linear),
            "double" => Ok(Self::Double),
            "rpe_based" => Ok(Self::RpeBased),
            _ => Err(format!("Unknown progression model: {}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
/// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RpeTargets {
    pub low: f64,
    pub high: f64,
}

impl Default for RpeTargets {
    fn default() -> Self {
        Self { low: 7.0, high: 9.0 }
    }
}

/// A user's stored progression settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressionPreferences {
    pub model: ProgressionModel,
    pub weight_increment: f64,
    pub rep_range_low: u32,
    pub rep_range_high: u32,
    pub rpe_targets: RpeTargets,
}

impl Default for ProgressionPreferences {
    fn default() -> Self {
        Self {
            model: ProgressionModel::Double,
            weight_increment: 2.5,
            rep_range_low: 8,
            rep_range_high: 12,
            rpe_targets: RpeTargets::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressionInput {
    pub model: ProgressionModel,
    pub last_weight: f64,
    pub last_reps: u32,
    pub rep_range_low: u32,
    pub rep_range_high: u32,
    pub weight_increment: f64,
    pub rpe_targets: RpeTargets,
    pub last_rpe: Option<f64>,
}

impl ProgressionInput {
    /// Combine stored preferences with the last performance
    pub fn from_preferences(
        prefs: &ProgressionPreferences,
        last_weight: f64,
        last_reps: u32,
        last_rpe: Option<f64>,
    ) -> Self {
        Self {
            model: prefs.model,
            last_weight,
            last_reps,
            rep_range_low: prefs.rep_range_low,
            rep_range_high: prefs.rep_range_high,
            weight_increment: prefs.weight_increment,
            rpe_targets: prefs.rpe_targets,
            last_rpe,
        }
    }

    fn validate(&self) -> EngineResult<()> {
        if !self.last_weight.is_finite() || self.last_weight <= 0.0 {
            return Err(EngineError::invalid(format!(
                "last weight must be positive, got {}",
                self.last_weight
            )));
        }
        if self.last_reps < 1 {
            return Err(EngineError::invalid("last reps must be at least 1"));
        }
        if !self.weight_increment.is_finite() || self.weight_increment <= 0.0 {
            return Err(EngineError::invalid(format!(
                "weight increment must be positive, got {}",
                self.weight_increment
            )));
        }
        if self.rep_range_low < 1 || self.rep_range_low > self.rep_range_high {
            return Err(EngineError::invalid(format!(
                "invalid rep range {}-{}",
                self.rep_range_low, self.rep_range_high
            )));
        }
        let RpeTargets { low, high } = self.rpe_targets;
        if !(1.0..=10.0).contains(&low) || !(1.0..=10.0).contains(&high) || low > high {
            return Err(EngineError::invalid(format!("invalid RPE targets {}-{}", low, high)));
        }
        if let Some(rpe) = self.last_rpe {
            if !(1.0..=10.0).contains(&rpe) {
                return Err(EngineError::invalid(format!("RPE must be 1-10, got {}", rpe)));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
/// Suggestion
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionSuggestion {
    pub model: ProgressionModel,
    pub current_weight: f64,
    pub current_reps: u32,
    pub suggested_weight: f64,
    pub suggested_reps: u32,
    pub reasoning: String,
}

/// Propose the next session's target for one exercise
pub fn suggest_progression(input: &ProgressionInput) -> EngineResult<ProgressionSuggestion> {
    input.validate()?;

    let (suggested_weight, suggested_reps, reasoning) = match input.model {
        ProgressionModel::Linear => linear(input),
        ProgressionModel::Double => double(input),
        ProgressionModel::RpeBased => match input.last_rpe {
            Some(rpe) => rpe_based(input, rpe),
            None => {
                let (w, r, reason) = double(input);
                (w, r, format!("No RPE logged last session, so using double progression: {}", reason))
            }
        },
    };

    Ok(ProgressionSuggestion {
        model: input.model,
        current_weight: input.last_weight,
        current_reps: input.last_reps,
        suggested_weight,
        suggested_reps,
        reasoning,
    })
}

fn add_increment(input: &ProgressionInput) -> f64 {
    round_load(input.last_weight + input.weight_increment)
}

/// Kill float noise from repeated increments (e.g. 2.5 kg + 1.25 kg steps)
fn round_load(weight: f64) -> f64 {
    (weight * 100.0).round() / 100.0
}

fn linear(input: &ProgressionInput) -> (f64, u32, String) {
    (
        add_increment(input),
        input.rep_range_low,
        format!(
            "Linear progression: add {} every session regardless of performance.",
            input.weight_increment
        ),
    )
}

fn double(input: &ProgressionInput) -> (f64, u32, String) {
    if input.last_reps < input.rep_range_high {
        (
            input.last_weight,
            input.last_reps + 1,
            format!(
                "Hit {} of {} target reps, so keep the weight and add a rep.",
                input.last_reps, input.rep_range_high
            ),
        )
    } else {
        (
            add_increment(input),
            input.rep_range_low,
            format!(
                "Reached the top of the {}-{} rep range, so add {} and reset to {} reps.",
                input.rep_range_low, input.rep_range_high, input.weight_increment, input.rep_range_low
            ),
        )
    }
}

fn rpe_based(input: &ProgressionInput, rpe: f64) -> (f64, u32, String) {
    let RpeTargets { low, high } = input.rpe_targets;
    if rpe < low {
        (
            add_increment(input),
            input.last_reps,
            format!(
                "Last session was RPE {}, below the {}-{} target, so the load was too easy; add {}.",
                rpe, low, high, input.weight_increment
            ),
        )
    } else if rpe > high {
        let lowered = round_load(input.last_weight - input.weight_increment);
        if lowered <= 0.0 {
            (
                input.last_weight,
                input.last_reps,
                format!(
                    "Last session was RPE {}, above the {}-{} target, but the load cannot drop further; repeat it.",
                    rpe, low, high
                ),
            )
        } else {
            (
                lowered,
                input.last_reps,
                format!(
                    "Last session was RPE {}, above the {}-{} target, so the load was too hard; drop {}.",
                    rpe, low, high, input.weight_increment
                ),
            )
        }
    } else {
        (
            input.last_weight,
            input.last_reps,
            format!(
                "Last session was RPE {}, inside the {}-{} target, so repeat the same weight and reps.",
                rpe, low, high
            ),
        )
    }
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_input(model: ProgressionModel, last_weight: f64, last_reps: u32, last_rpe: Option<f64>) -> ProgressionInput {
        ProgressionInput {
            model,
            last_weight,
            last_reps,
            rep_range_low: 8,
            rep_range_high: 12,
            weight_increment: 2.5,
            rpe_targets: RpeTargets { low: 7.0, high: 9.0 },
            last_rpe,
        }
    }

    #[test]
    fn test_linear_always_adds_weight() {
        let s = suggest_progression(&make_input(ProgressionModel::Linear, 100.0, 5, Some(10.0))).unwrap();
        assert_eq!(s.suggested_weight, 102.5);
        assert_eq!(s.suggested_reps, 8);
        assert!(s.reasoning.contains("regardless of performance"));
        assert_eq!(s.current_weight, 100.0);
        assert_eq!(s.current_reps, 5);
    }

    #[test]
    fn test_double_adds_rep_below_top() {
        let s = suggest_progression(&make_input(ProgressionModel::Double, 60.0, 9, None)).unwrap();
        assert_eq!(s.suggested_weight, 60.0);
        assert_eq!(s.suggested_reps, 10);
        assert!(s.reasoning.contains("add a rep"));
    }

    #[test]
    fn test_double_at_top_adds_weight_and_resets() {
        for top in [12, 13, 20] {
            let s = suggest_progression(&make_input(ProgressionModel::Double, 60.0, top, Some(8.0))).unwrap();
            assert_eq!(s.suggested_weight, 62.5);
            assert_eq!(s.suggested_reps, 8);
            assert!(s.reasoning.contains("top of the 8-12 rep range"));
        }
    }

    #[test]
    fn test_rpe_based_easy_session() {
        let s = suggest_progression(&make_input(ProgressionModel::RpeBased, 80.0, 8, Some(6.0))).unwrap();
        assert_eq!(s.suggested_weight, 82.5);
        assert_eq!(s.suggested_reps, 8);
        assert!(s.reasoning.contains("too easy"));
    }

    #[test]
    fn test_rpe_based_hard_session() {
        let s = suggest_progression(&make_input(ProgressionModel::RpeBased, 80.0, 8, Some(9.5))).unwrap();
        assert_eq!(s.suggested_weight, 77.5);
        assert!(s.reasoning.contains("too hard"));
    }

    #[test]
    fn test_rpe_based_in_band_repeats() {
        for rpe in [7.0, 8.0, 9.0] {
            let s = suggest_progression(&make_input(ProgressionModel::RpeBased, 80.0, 8, Some(rpe))).unwrap();
            assert_eq!(s.suggested_weight, 80.0);
            assert_eq!(s.suggested_reps, 8);
            assert!(s.reasoning.contains("repeat"));
        }
    }

    #[test]
    fn test_rpe_based_without_rpe_uses_double() {
        let s = suggest_progression(&make_input(ProgressionModel::RpeBased, 80.0, 12, None)).unwrap();
        assert_eq!(s.model, ProgressionModel::RpeBased);
        assert_eq!(s.suggested_weight, 82.5);
        assert_eq!(s.suggested_reps, 8);
        assert!(s.reasoning.starts_with("No RPE logged"));
    }

    #[test]
    fn test_rpe_based_cannot_drop_below_zero() {
        let s = suggest_progression(&make_input(ProgressionModel::RpeBased, 2.5, 8, Some(10.0))).unwrap();
        assert_eq!(s.suggested_weight, 2.5);
        assert!(s.reasoning.contains("cannot drop further"));
    }

    #[test]
    fn test_rejects_invalid_input() {
        assert!(suggest_progression(&make_input(ProgressionModel::Linear, 0.0, 5, None)).is_err());
        assert!(suggest_progression(&make_input(ProgressionModel::Linear, 100.0, 0, None)).is_err());

        let mut bad_range = make_input(ProgressionModel::Double, 100.0, 5, None);
        bad_range.rep_range_low = 12;
        bad_range.rep_range_high = 8;
        assert!(suggest_progression(&bad_range).is_err());

        let mut bad_increment = make_input(ProgressionModel::Double, 100.0, 5, None);
        bad_increment.weight_increment = 0.0;
        assert!(suggest_progression(&bad_increment).is_err());

        assert!(suggest_progression(&make_input(ProgressionModel::RpeBased, 100.0, 5, Some(12.0))).is_err());
    }

    #[test]
    fn test_model_round_trips_through_str() {
        for model in [ProgressionModel::Linear, ProgressionModel::Double, ProgressionModel::RpeBased] {
            assert_eq!(model.to_string().parse::<ProgressionModel>().unwrap(), model);
        }
        assert!("wave".parse::<ProgressionModel>().is_err());
    }

    #[test]
    fn test_from_preferences() {
        let prefs = ProgressionPreferences::default();
        let input = ProgressionInput::from_preferences(&prefs, 100.0, 10, Some(8.0));
        assert_eq!(input.model, ProgressionModel::Double);
        assert_eq!(input.rep_range_high, 12);
        assert_eq!(input.weight_increment, 2.5);
    }
}
