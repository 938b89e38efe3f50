//! Error types for `tally-core`.

use thiserror::Error;

/// The error taxonomy shared by every layer.
///
/// Messages are human-readable and safe to show to the caller, except for
/// [`Error::Internal`], whose source is only ever logged.
#[derive(Debug, Error)]
pub enum Error {
  /// Malformed or out-of-range input; the caller can fix it and resubmit.
  #[error("{0}")]
  Validation(String),

  /// The record does not exist or belongs to a different owner; callers
  /// cannot tell which.
  #[error("{0}")]
  NotFound(String),

  /// The write collides with an existing record, e.g. on a unique key.
  #[error("{0}")]
  Conflict(String),

  /// An aggregation parameter outside its allowed set.
  #[error("{0}")]
  InvalidArgument(String),

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn validation(message: impl Into<String>) -> Self {
    Self::Validation(message.into())
  }

  pub fn not_found(message: impl Into<String>) -> Self {
    Self::NotFound(message.into())
  }

  pub fn conflict(message: impl Into<String>) -> Self {
    Self::Conflict(message.into())
  }

  pub fn invalid_argument(message: impl Into<String>) -> Self {
    Self::InvalidArgument(message.into())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
