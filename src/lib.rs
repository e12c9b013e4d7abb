//! Strength-training analytics: e1RM, effective reps, weekly volume against
//! landmarks, training age, progression and plateau detection.
//!
//! The engine modules are pure functions over explicit inputs. `db` and
//! `commands` load those inputs from SQLite and persist tested maxes.

pub mod analysis;
pub mod commands;
pub mod config;
pub mod db;
pub mod effective_reps;
pub mod error;
pub mod intensity;
pub mod landmarks;
pub mod models;
pub mod one_rep_max;
pub mod plateau;
pub mod progression;
pub mod training_age;
pub mod volume_status;

#[cfg(test)]
mod test_utils;

use tracing_subscriber::EnvFilter;

use config::AppConfig;
use db::AppState;
use error::AppError;

/// One decimal place, the precision every reported metric uses
pub(crate) fn round1(x: f64) -> f64 {
  (x * 10.0).round() / 10.0
}

/// Install a fmt subscriber filtered by `RUST_LOG` (default `info`).
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Load configuration, open the database and run migrations
pub async fn connect() -> Result<AppState, AppError> {
  let config = AppConfig::load()?;
  connect_with(config).await
}

pub async fn connect_with(config: AppConfig) -> Result<AppState, AppError> {
  let db = db::initialize_db(&config).await?;
  tracing::info!(plateau_weeks = config.plateau_weeks, "Database ready");
  Ok(AppState { db, config })
}
