//! Error types for `wlb-core`.

use thiserror::Error;

use crate::level::Level;

#[derive(Debug, Error)]
pub enum Error {
  /// Input rejected before reaching the store; the caller should re-prompt.
  #[error("validation failed: {0}")]
  Validation(String),

  #[error("a parent {0} must be selected")]
  MissingParent(Level),

  #[error("{0} not found")]
  NotFound(String),

  #[error("cannot delete: referenced by children or logs")]
  Dependency,

  #[error("admin role required")]
  Forbidden,

  #[error("duration must be greater than 0 seconds")]
  InvalidDuration,

  #[error("conflict: {0}")]
  Conflict(String),

  /// A backend failure. The message shown to end users is generic; the
  /// source is kept for logging.
  #[error("operation failed")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn store<E>(op: &'static str, err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    tracing::error!(operation = op, error = %err, "store call failed");
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
