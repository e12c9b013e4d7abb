//! Runtime configuration read from the environment

use std::env;
use std::str::FromStr;

use crate::error::AppError;
use crate::plateau::DEFAULT_PLATEAU_WEEKS;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://strength.db?mode=rwc";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_HISTORY_WEEKS: u32 = 12;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
  pub database_url: String,
  pub max_connections: u32,
  /// Weeks without a new best before an exercise counts as plateaued
  pub plateau_weeks: u32,
  /// How far back e1RM history is loaded for plateau detection
  pub history_weeks: u32,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      database_url: DEFAULT_DATABASE_URL.to_string(),
      max_connections: DEFAULT_MAX_CONNECTIONS,
      plateau_weeks: DEFAULT_PLATEAU_WEEKS,
      history_weeks: DEFAULT_HISTORY_WEEKS,
    }
  }
}

fn parse_var<T: FromStr>(var: &str, default: T) -> Result<T, AppError>
where
  T::Err: std::fmt::Display,
{
  match env::var(var) {
    Ok(raw) => raw.trim().parse::<T>().map_err(|e| AppError::Config {
      var: var.to_string(),
      reason: format!("'{}': {}", raw, e),
    }),
    Err(env::VarError::NotPresent) => Ok(default),
    Err(e) => Err(AppError::Config {
      var: var.to_string(),
      reason: e.to_string(),
    }),
  }
}

fn at_least_one(var: &str, value: u32) -> Result<u32, AppError> {
  if value < 1 {
    return Err(AppError::Config {
      var: var.to_string(),
      reason: "must be at least 1".to_string(),
    });
  }
  Ok(value)
}

impl AppConfig {
  /// Read configuration from process environment variables
  pub fn from_env() -> Result<Self, AppError> {
    let database_url = env::var("STRENGTH_DATABASE_URL")
      .ok()
      .filter(|v| !v.trim().is_empty())
      .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

    Ok(Self {
      database_url,
      max_connections: at_least_one(
        "STRENGTH_DB_MAX_CONNECTIONS",
        parse_var("STRENGTH_DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
      )?,
      plateau_weeks: at_least_one(
        "STRENGTH_PLATEAU_WEEKS",
        parse_var("STRENGTH_PLATEAU_WEEKS", DEFAULT_PLATEAU_WEEKS)?,
      )?,
      history_weeks: at_least_one(
        "STRENGTH_HISTORY_WEEKS",
        parse_var("STRENGTH_HISTORY_WEEKS", DEFAULT_HISTORY_WEEKS)?,
      )?,
    })
  }

  /// Load a `.env` file if present, then read the environment
  pub fn load() -> Result<Self, AppError> {
    dotenvy::dotenv().ok();
    Self::from_env()
  }
}
