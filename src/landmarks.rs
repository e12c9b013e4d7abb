//! Weekly volume landmarks (MEV / MAV / MRV) per muscle group
//!
//! Defaults come from a fixed table. A user override replaces the table entry
//! for that muscle. Either way the result is scaled by the training-age
//! tolerance multiplier and kept ordered.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

// ---------------------------------------------------------------------------
/// Landmarks
// ---------------------------------------------------------------------------

/// Hard sets per week. Always `mev <= mav_low <= mav_high <= mrv`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeLandmarks {
    pub mev: u32,
    pub mav_low: u32,
    pub mav_high: u32,
    pub mrv: u32,
}

impl VolumeLandmarks {
    pub const fn new(mev: u32, mav_low: u32, mav_high: u32, mrv: u32) -> Self {
        Self {
            mev,
            mav_low,
            mav_high,
            mrv,
        }
    }

    /// Restore ordering by clamping each value up to its predecessor
    pub fn ordered(self) -> Self {
        let mav_low = self.mav_low.max(self.mev);
        let mav_high = self.mav_high.max(mav_low);
        let mrv = self.mrv.max(mav_high);
        Self {
            mev: self.mev,
            mav_low,
            mav_high,
            mrv,
        }
    }

    pub fn is_ordered(&self) -> bool {
        self.mev <= self.mav_low && self.mav_low <= self.mav_high && self.mav_high <= self.mrv
    }

    fn scaled(&self, multiplier: f64) -> Self {
        let scale = |v: u32| (v as f64 * multiplier).round() as u32;
        Self {
            mev: scale(self.mev),
            mav_low: scale(self.mav_low),
            mav_high: scale(self.mav_high),
            mrv: scale(self.mrv),
        }
        .ordered()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkSource {
    UserOverride,
    Default,
    /// Muscle not in the table; generic values used
    GenericFallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLandmarks {
    pub landmarks: VolumeLandmarks,
    pub source: LandmarkSource,
}

// ---------------------------------------------------------------------------
/// Default Table
// ---------------------------------------------------------------------------

pub const GENERIC_LANDMARKS: VolumeLandmarks = VolumeLandmarks::new(6, 10, 16, 20);

static DEFAULT_LANDMARKS: &[(&str, VolumeLandmarks)] = &[
    ("chest", VolumeLandmarks::new(8, 12, 20, 22)),
    ("back", VolumeLandmarks::new(10, 14, 22, 25)),
    ("shoulders", VolumeLandmarks::new(8, 16, 22, 26)),
    ("biceps", VolumeLandmarks::new(8, 14, 20, 26)),
    ("triceps", VolumeLandmarks::new(6, 10, 14, 18)),
    ("quads", VolumeLandmarks::new(8, 12, 18, 20)),
    ("hamstrings", VolumeLandmarks::new(6, 10, 16, 20)),
    ("glutes", VolumeLandmarks::new(0, 4, 12, 16)),
    ("calves", VolumeLandmarks::new(8, 12, 16, 20)),
    ("abs", VolumeLandmarks::new(0, 16, 20, 25)),
    ("traps", VolumeLandmarks::new(0, 12, 20, 26)),
    ("forearms", VolumeLandmarks::new(2, 6, 10, 14)),
];

static MUSCLE_ALIASES: &[(&str, &str)] = &[
    ("pecs", "chest"),
    ("pectorals", "chest"),
    ("lats", "back"),
    ("upper_back", "back"),
    ("rhomboids", "back"),
    ("delts", "shoulders"),
    ("front_delts", "shoulders"),
    ("side_delts", "shoulders"),
    ("rear_delts", "shoulders"),
    ("quadriceps", "quads"),
    ("hams", "hamstrings"),
    ("glute", "glutes"),
    ("core", "abs"),
    ("abdominals", "abs"),
    ("trapezius", "traps"),
];

/// Canonical muscle id: lower-case, `_` separated, aliases folded in
pub fn normalize_muscle(raw: &str) -> String {
    let key: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect();
    MUSCLE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(key)
}

pub fn default_landmarks(muscle: &str) -> Option<VolumeLandmarks> {
    let key = normalize_muscle(muscle);
    DEFAULT_LANDMARKS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, landmarks)| *landmarks)
}

/// Muscle ids present in the default table
pub fn known_muscles() -> impl Iterator<Item = &'static str> {
    DEFAULT_LANDMARKS.iter().map(|(name, _)| *name)
}

// ---------------------------------------------------------------------------
/// Resolution
// ---------------------------------------------------------------------------

pub fn resolve_landmarks(
    muscle: &str,
    user_override: Option<&VolumeLandmarks>,
    multiplier: f64,
) -> EngineResult<ResolvedLandmarks> {
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return Err(EngineError::invalid(format!(
            "volume tolerance multiplier must be positive, got {}",
            multiplier
        )));
    }

    let (base, source) = match (user_override, default_landmarks(muscle)) {
        (Some(custom), _) => (*custom, LandmarkSource::UserOverride),
        (None, Some(table)) => (table, LandmarkSource::Default),
        (None, None) => (GENERIC_LANDMARKS, LandmarkSource::GenericFallback),
    };

    Ok(ResolvedLandmarks {
        landmarks: base.scaled(multiplier),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lookup_unscaled() {
        let r = resolve_landmarks("chest", None, 1.0).unwrap();
        assert_eq!(r.landmarks, VolumeLandmarks::new(8, 12, 20, 22));
        assert_eq!(r.source, LandmarkSource::Default);
    }

    #[test]
    fn test_aliases_and_formatting() {
        assert_eq!(normalize_muscle("Rear Delts"), "shoulders");
        assert_eq!(normalize_muscle("upper-back"), "back");
        assert_eq!(normalize_muscle(" Quads "), "quads");
        assert_eq!(default_landmarks("Lats"), default_landmarks("back"));
    }

    #[test]
    fn test_unknown_muscle_falls_back() {
        let r = resolve_landmarks("serratus", None, 1.0).unwrap();
        assert_eq!(r.landmarks, GENERIC_LANDMARKS);
        assert_eq!(r.source, LandmarkSource::GenericFallback);
    }

    #[test]
    fn test_override_wins_and_is_scaled() {
        let custom = VolumeLandmarks::new(10, 14, 18, 24);
        let r = resolve_landmarks("chest", Some(&custom), 1.25).unwrap();
        assert_eq!(r.source, LandmarkSource::UserOverride);
        // 12.5 → 13, 17.5 → 18, 22.5 → 23, 30
        assert_eq!(r.landmarks, VolumeLandmarks::new(13, 18, 23, 30));
    }

    #[test]
    fn test_novice_scaling() {
        let r = resolve_landmarks("quads", None, 0.85).unwrap();
        // 6.8 → 7, 10.2 → 10, 15.3 → 15, 17
        assert_eq!(r.landmarks, VolumeLandmarks::new(7, 10, 15, 17));
    }

    #[test]
    fn test_unordered_override_is_clamped() {
        let custom = VolumeLandmarks::new(12, 10, 20, 18);
        let r = resolve_landmarks("back", Some(&custom), 1.0).unwrap();
        assert_eq!(r.landmarks, VolumeLandmarks::new(12, 12, 20, 20));
    }

    #[test]
    fn test_ordering_holds_across_multipliers() {
        let muscles: Vec<&str> = known_muscles().chain(["unknown_muscle"]).collect();
        let mut m = 0.5;
        while m <= 2.0 {
            for muscle in &muscles {
                let r = resolve_landmarks(muscle, None, m).unwrap();
                assert!(r.landmarks.is_ordered(), "{} at {}: {:?}", muscle, m, r.landmarks);
            }
            m += 0.05;
        }
    }

    #[test]
    fn test_rejects_bad_multiplier() {
        assert!(resolve_landmarks("chest", None, 0.0).is_err());
        assert!(resolve_landmarks("chest", None, f64::INFINITY).is_err());
    }
}
