//! Classify a weekly hard-set count against a muscle's landmarks

use serde::{Deserialize, Serialize};

use crate::landmarks::VolumeLandmarks;
use crate::round1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeStatus {
    BelowMev,
    ApproachingMev,
    /// Target zone
    InMav,
    ApproachingMrv,
    OverMrv,
}

impl VolumeStatus {
    pub fn classify(hard_sets: u32, landmarks: &VolumeLandmarks) -> Self {
        if hard_sets < landmarks.mev {
            VolumeStatus::BelowMev
        } else if hard_sets < landmarks.mav_low {
            VolumeStatus::ApproachingMev
        } else if hard_sets <= landmarks.mav_high {
            VolumeStatus::InMav
        } else if hard_sets <= landmarks.mrv {
            VolumeStatus::ApproachingMrv
        } else {
            VolumeStatus::OverMrv
        }
    }

    /// Report ordering: most urgent first
    pub fn severity_rank(&self) -> u8 {
        match self {
            VolumeStatus::OverMrv => 0,
            VolumeStatus::ApproachingMrv => 1,
            VolumeStatus::BelowMev => 2,
            VolumeStatus::ApproachingMev => 3,
            VolumeStatus::InMav => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VolumeStatus::BelowMev => "below_mev",
            VolumeStatus::ApproachingMev => "approaching_mev",
            VolumeStatus::InMav => "in_mav",
            VolumeStatus::ApproachingMrv => "approaching_mrv",
            VolumeStatus::OverMrv => "over_mrv",
        }
    }
}

impl std::fmt::Display for VolumeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeClassification {
    pub status: VolumeStatus,
    /// Position of hard sets on [MEV, MRV] as 0-100. Values outside that range
    /// mean under- or overshoot.
    pub percentage_within_range: f64,
    pub recommendation: String,
}

fn percentage_within_range(hard_sets: u32, landmarks: &VolumeLandmarks) -> f64 {
    let span = landmarks.mrv as f64 - landmarks.mev as f64;
    if span <= 0.0 {
        return if hard_sets >= landmarks.mrv { 100.0 } else { 0.0 };
    }
    round1((hard_sets as f64 - landmarks.mev as f64) / span * 100.0)
}

fn recommendation(status: VolumeStatus, hard_sets: u32, lm: &VolumeLandmarks) -> String {
    match status {
        VolumeStatus::BelowMev => format!(
            "Add {} sets per week to reach minimum effective volume ({} sets)",
            lm.mev - hard_sets,
            lm.mev
        ),
        VolumeStatus::ApproachingMev => format!(
            "Above MEV; add {} sets to reach the productive range ({}-{} sets)",
            lm.mav_low - hard_sets,
            lm.mav_low,
            lm.mav_high
        ),
        VolumeStatus::InMav => format!(
            "Volume is in the productive range ({}-{} sets); keep it here",
            lm.mav_low, lm.mav_high
        ),
        VolumeStatus::ApproachingMrv => format!(
            "Volume is near your recoverable limit ({} sets); monitor recovery",
            lm.mrv
        ),
        VolumeStatus::OverMrv => format!(
            "{} sets over maximum recoverable volume ({}); reduce volume or schedule a deload",
            hard_sets - lm.mrv,
            lm.mrv
        ),
    }
}

pub fn classify_volume(hard_sets: u32, landmarks: &VolumeLandmarks) -> VolumeClassification {
    let status = VolumeStatus::classify(hard_sets, landmarks);
    VolumeClassification {
        status,
        percentage_within_range: percentage_within_range(hard_sets, landmarks),
        recommendation: recommendation(status, hard_sets, landmarks),
    }
}
