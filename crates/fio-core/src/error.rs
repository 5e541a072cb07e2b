//! Error types for `fio-core`.

use thiserror::Error;

use crate::enrich::EnrichError;

#[derive(Debug, Error)]
pub enum Error {
  /// A required field of the request body is missing or empty.
  #[error("validation failed: {0}")]
  Validation(String),

  /// A path or query parameter could not be parsed.
  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  #[error("person not found: {0}")]
  NotFound(i64),

  #[error(transparent)]
  Dependency(#[from] EnrichError),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
