//! Host-facing commands: load inputs, run the engine, persist what the caller asked for

pub mod analysis;
pub mod progression;

pub use analysis::{muscle_landmarks, training_age, weekly_volume_analysis, MuscleLandmarks};
pub use progression::{plateau_status, record_tested_max, suggest_progression};
