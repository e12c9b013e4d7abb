//! Error types for the analytics engine and the host layer around it

use serde::Serialize;

/// ---------------------------------------------------------------------------
/// Engine Errors
/// ---------------------------------------------------------------------------

/// The only failure the pure engine raises. Missing estimates or landmarks are
/// expected for new users and degrade by omission or fallback instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
  #[error("Invalid input: {0}")]
  InvalidInput(String),
}

impl EngineError {
  pub fn invalid(msg: impl Into<String>) -> Self {
    EngineError::InvalidInput(msg.into())
  }
}

pub type EngineResult<T> = Result<T, EngineError>;

/// ---------------------------------------------------------------------------
/// Host Errors
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum AppError {
  #[error(transparent)]
  Engine(#[from] EngineError),

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Migration failed: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),

  #[error("Invalid configuration for {var}: {reason}")]
  Config { var: String, reason: String },

  #[error("Not found: {0}")]
  NotFound(String),

  #[error("Corrupt stored data: {0}")]
  Corrupt(String),
}

impl Serialize for AppError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}
