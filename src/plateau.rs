//! Plateau detection over weekly best e1RM
//!
//! A plateau is a run of weeks where the best e1RM failed to beat everything
//! before it. Ties count as stagnant. The count includes the week the standing
//! best was set, so `[300, 305, 305, 305]` is three weeks at 305.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::DatedSet;
use crate::one_rep_max::{best_estimate, weight_for_reps};

pub const DEFAULT_PLATEAU_WEEKS: u32 = 3;

/// Newest value this far below the standing best counts as regression
const REGRESSION_DROP_PCT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeeklyBest {
    /// Monday of the week
    pub period: NaiveDate,
    pub best_e1rm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlateauResult {
    pub plateau: bool,
    pub weeks_stagnant: u32,
    /// Index into the series of the standing best, None for an empty series
    pub last_pr_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlateauInfo {
    pub detected: bool,
    pub weeks_stagnant: u32,
    pub last_pr_date: Option<NaiveDate>,
    pub last_pr_e1rm: Option<f64>,
    pub latest_e1rm: Option<f64>,
    pub regressing: bool,
    pub suggestion: String,
}

/// Monday of the ISO week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Best e1RM per week from dated sets, oldest week first. Weeks with no
/// qualifying set are absent rather than zero.
pub fn weekly_best_series(sets: &[DatedSet]) -> EngineResult<Vec<WeeklyBest>> {
    let mut by_week: BTreeMap<NaiveDate, Vec<crate::models::LoggedSet>> = BTreeMap::new();
    for dated in sets {
        by_week
            .entry(week_start(dated.performed_on))
            .or_default()
            .push(dated.set.clone());
    }

    let mut series = Vec::with_capacity(by_week.len());
    for (period, week_sets) in by_week {
        if let Some(best) = best_estimate(&week_sets)? {
            series.push(WeeklyBest {
                period,
                best_e1rm: best.estimated_1rm,
            });
        }
    }
    Ok(series)
}

pub fn detect_plateau(series: &[WeeklyBest], threshold: u32) -> EngineResult<PlateauResult> {
    if threshold < 1 {
        return Err(EngineError::invalid("plateau threshold must be at least 1 week"));
    }
    if let Some(bad) = series.iter().find(|w| !w.best_e1rm.is_finite()) {
        return Err(EngineError::invalid(format!(
            "non-finite e1RM for week of {}",
            bad.period
        )));
    }
    if series.is_empty() {
        return Ok(PlateauResult {
            plateau: false,
            weeks_stagnant: 0,
            last_pr_index: None,
        });
    }

    // prefix_max[i] = best of series[0..=i]
    let mut prefix_max = Vec::with_capacity(series.len());
    let mut running = f64::NEG_INFINITY;
    for week in series {
        running = running.max(week.best_e1rm);
        prefix_max.push(running);
    }

    // Walk back from the newest week to the latest one that set a new high.
    // The first week is the baseline and always counts as one.
    let n = series.len();
    let mut last_pr = 0;
    for i in (1..n).rev() {
        if series[i].best_e1rm > prefix_max[i - 1] {
            last_pr = i;
            break;
        }
    }

    let weeks_stagnant = if last_pr == n - 1 { 0 } else { (n - last_pr) as u32 };

    Ok(PlateauResult {
        plateau: weeks_stagnant >= threshold,
        weeks_stagnant,
        last_pr_index: Some(last_pr),
    })
}

/// Rep target offered when a plateau calls for a new rep range
const REP_RANGE_SWITCH_REPS: u32 = 5;

/// Load for the new rep range at the standing best, empty if it can't be computed
fn rep_range_hint(pr: Option<WeeklyBest>) -> String {
    pr.and_then(|p| weight_for_reps(p.best_e1rm, REP_RANGE_SWITCH_REPS).ok())
        .map(|load| format!(" Try sets of {} at {:.1}.", REP_RANGE_SWITCH_REPS, load))
        .unwrap_or_default()
}

pub fn plateau_info(series: &[WeeklyBest], threshold: u32) -> EngineResult<PlateauInfo> {
    let result = detect_plateau(series, threshold)?;

    let pr = result.last_pr_index.map(|i| series[i]);
    let latest = series.last().copied();

    let drop_pct = match (pr, latest) {
        (Some(pr), Some(latest)) if pr.best_e1rm > 0.0 => (pr.best_e1rm - latest.best_e1rm) / pr.best_e1rm * 100.0,
        _ => 0.0,
    };
    let regressing = drop_pct > REGRESSION_DROP_PCT;

    let suggestion = if series.len() < 2 {
        "Not enough weekly history to judge progress yet.".to_string()
    } else if result.weeks_stagnant == 0 {
        "New best e1RM this week; keep the current plan.".to_string()
    } else if regressing {
        format!(
            "e1RM is {:.1}% below your best from the week of {}; take a deload week and review sleep and recovery.",
            drop_pct,
            pr.map(|p| p.period.to_string()).unwrap_or_default()
        )
    } else if !result.plateau {
        format!(
            "No new best for {} weeks; keep pushing before changing the plan.",
            result.weeks_stagnant
        )
    } else if result.weeks_stagnant >= threshold + 3 {
        format!(
            "No new best in {} weeks; swap to a close variation or a new rep range for the next block.{}",
            result.weeks_stagnant,
            rep_range_hint(pr)
        )
    } else {
        format!(
            "No new best in {} weeks; try a deload week or change the rep range.{}",
            result.weeks_stagnant,
            rep_range_hint(pr)
        )
    };

    Ok(PlateauInfo {
        detected: result.plateau,
        weeks_stagnant: result.weeks_stagnant,
        last_pr_date: pr.map(|p| p.period),
        last_pr_e1rm: pr.map(|p| p.best_e1rm),
        latest_e1rm: latest.map(|l| l.best_e1rm),
        regressing,
        suggestion,
    })
}
