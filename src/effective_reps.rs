//! Effective reps: reps weighted by proximity to failure
//!
//! The last (10 - RIR) reps of a set earn full credit. Reps outside that window
//! earn a flat weight that decays linearly with RIR, reaching zero at RIR 6.
//!
//! Only the remainder decays. Window reps keep full credit even far from
//! failure, so a 5-rep set at RPE 4 (RIR 6) still gives 4.0 effective reps:
//! the 4-rep window at full credit plus one rep at zero.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::LoggedSet;
use crate::round1;

/// Assumed when neither RPE nor RIR was logged (RPE 7)
pub const DEFAULT_RIR: f64 = 3.0;

/// RIR at which reps outside the full-credit window stop counting
const ZERO_CREDIT_RIR: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectiveReps {
    pub effective_reps: f64,
    pub total_reps: u32,
}

/// Resolve reps in reserve from whichever exertion measure was logged.
/// RPE takes precedence when both are present.
pub fn resolve_rir(rpe: Option<f64>, rir: Option<f64>) -> EngineResult<f64> {
    if let Some(rpe) = rpe {
        if !(1.0..=10.0).contains(&rpe) {
            return Err(EngineError::invalid(format!("RPE must be 1-10, got {}", rpe)));
        }
        return Ok(10.0 - rpe);
    }
    if let Some(rir) = rir {
        if !(0.0..=10.0).contains(&rir) {
            return Err(EngineError::invalid(format!("RIR must be 0-10, got {}", rir)));
        }
        return Ok(rir);
    }
    Ok(DEFAULT_RIR)
}

pub fn effective_reps(total_reps: u32, rpe: Option<f64>, rir: Option<f64>) -> EngineResult<EffectiveReps> {
    let rir = resolve_rir(rpe, rir)?;
    let total = total_reps as f64;

    let window = (10.0 - rir).max(0.0);
    let full = total.min(window);
    let remainder = total - full;
    let decay = ((ZERO_CREDIT_RIR - rir) / ZERO_CREDIT_RIR).clamp(0.0, 1.0);

    Ok(EffectiveReps {
        effective_reps: round1(full + remainder * decay),
        total_reps,
    })
}

pub fn effective_reps_for_set(set: &LoggedSet) -> EngineResult<EffectiveReps> {
    effective_reps(set.reps, set.rpe, set.rir)
}
