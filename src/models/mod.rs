pub mod estimate;
pub mod profile;
pub mod workout;

pub use estimate::{EstimateSource, ExerciseEstimate};
pub use profile::UserProfile;
pub use workout::{CompletedWorkout, DatedSet, LoggedSet, WorkoutExercise};
