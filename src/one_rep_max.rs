//! One-rep max estimation
//!
//! Formula is selected by rep bucket:
//! - 1 rep: the lift itself
//! - 2-5 reps: Brzycki (most accurate close to a true single)
//! - 6-10 reps: mean of Brzycki and Epley
//! - 11+ reps: Epley, with confidence dropping past 15 reps
//!
//! Brzycki divides by (37 - reps), so it is never reached above 10 reps.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::LoggedSet;
use crate::round1;

/// Reps above this are treated as low-confidence estimators
const MAX_RELIABLE_REPS: u32 = 15;

// ---------------------------------------------------------------------------
/// Formula and Confidence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Formula {
    /// A single: weight is the max
    Actual,
    Brzycki,
    /// Mean of Brzycki and Epley
    BrzyckiEpley,
    Epley,
}

impl Formula {
    /// Pick the formula and confidence for a rep count (reps >= 1)
    pub fn for_reps(reps: u32) -> (Self, Confidence) {
        match reps {
            1 => (Formula::Actual, Confidence::High),
            2..=5 => (Formula::Brzycki, Confidence::High),
            6..=10 => (Formula::BrzyckiEpley, Confidence::Medium),
            r if r <= MAX_RELIABLE_REPS => (Formula::Epley, Confidence::Medium),
            _ => (Formula::Epley, Confidence::Low),
        }
    }

    /// Ratio of estimated 1RM to the weight lifted for `reps`
    fn multiplier(&self, reps: u32) -> f64 {
        let r = reps as f64;
        match self {
            Formula::Actual => 1.0,
            Formula::Brzycki => brzycki_factor(r),
            Formula::BrzyckiEpley => (brzycki_factor(r) + epley_factor(r)) / 2.0,
            Formula::Epley => epley_factor(r),
        }
    }
}

impl std::fmt::Display for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Actual => write!(f, "actual"),
            Self::Brzycki => write!(f, "brzycki"),
            Self::BrzyckiEpley => write!(f, "brzycki_epley"),
            Self::Epley => write!(f, "epley"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Brzycki: w × 36 / (37 − r)
fn brzycki_factor(reps: f64) -> f64 {
    36.0 / (37.0 - reps)
}

/// Epley: w × (1 + r/30)
fn epley_factor(reps: f64) -> f64 {
    1.0 + reps / 30.0
}

// ---------------------------------------------------------------------------
/// Estimation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OneRepMaxEstimate {
    pub estimated_1rm: f64,
    pub formula_used: Formula,
    pub confidence: Confidence,
}

/// Positive finite weight and at least one rep
pub(crate) fn validate(weight: f64, reps: u32) -> EngineResult<()> {
    if !weight.is_finite() || weight <= 0.0 {
        return Err(EngineError::invalid(format!(
            "weight must be positive, got {}",
            weight
        )));
    }
    if reps < 1 {
        return Err(EngineError::invalid("reps must be at least 1"));
    }
    Ok(())
}

/// Estimate the 1RM for a single (weight, reps) performance
pub fn estimate_one_rep_max(weight: f64, reps: u32) -> EngineResult<OneRepMaxEstimate> {
    validate(weight, reps)?;

    let (formula, confidence) = Formula::for_reps(reps);
    let estimated_1rm = if formula == Formula::Actual {
        weight
    } else {
        // Rounding must not pull the estimate under the weight actually lifted
        round1(weight * formula.multiplier(reps)).max(weight)
    };

    Ok(OneRepMaxEstimate {
        estimated_1rm,
        formula_used: formula,
        confidence,
    })
}

/// Strongest estimate across the working sets of a slice.
///
/// Only hard sets with a positive load count; bodyweight or zero-rep entries are
/// not rep-max performances and are skipped.
pub fn best_estimate(sets: &[LoggedSet]) -> EngineResult<Option<OneRepMaxEstimate>> {
    let mut best: Option<OneRepMaxEstimate> = None;
    for set in sets.iter().filter(|s| s.is_hard_set() && s.reps >= 1 && s.weight > 0.0) {
        let estimate = estimate_one_rep_max(set.weight, set.reps)?;
        if best.map_or(true, |b| estimate.estimated_1rm > b.estimated_1rm) {
            best = Some(estimate);
        }
    }
    Ok(best)
}

/// Load expected to be liftable for `reps` given an estimated 1RM
pub fn weight_for_reps(estimated_1rm: f64, reps: u32) -> EngineResult<f64> {
    validate(estimated_1rm, reps)?;
    let (formula, _) = Formula::for_reps(reps);
    Ok(round1(estimated_1rm / formula.multiplier(reps)))
}

// ---------------------------------------------------------------------------
/// Lift Ratios
// ---------------------------------------------------------------------------

/// (reference exercise, derived exercise, derived 1RM as a fraction of reference)
static LIFT_RATIOS: &[(&str, &str, f64)] = &[
    ("back_squat", "front_squat", 0.85),
    ("back_squat", "deadlift", 1.20),
    ("bench_press", "incline_bench_press", 0.80),
    ("bench_press", "close_grip_bench_press", 0.90),
    ("bench_press", "overhead_press", 0.65),
    ("deadlift", "romanian_deadlift", 0.70),
];

/// Ratio of `derived` to `reference`, if the pair (or its inverse) is known
pub fn lift_ratio(reference: &str, derived: &str) -> Option<f64> {
    LIFT_RATIOS.iter().find_map(|(from, to, ratio)| {
        if *from == reference && *to == derived {
            Some(*ratio)
        } else if *from == derived && *to == reference {
            Some(1.0 / ratio)
        } else {
            None
        }
    })
}

/// Derive an untested lift's 1RM from a related lift. None when the pair is unknown.
pub fn derive_estimate(reference: &str, reference_1rm: f64, derived: &str) -> Option<f64> {
    if !reference_1rm.is_finite() || reference_1rm <= 0.0 {
        return None;
    }
    lift_ratio(reference, derived).map(|ratio| round1(reference_1rm * ratio))
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------
