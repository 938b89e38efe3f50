//! Error type for `tally-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] tally_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("decimal parse error: {0}")]
  Decimal(#[from] rust_decimal::Error),

  #[error("unknown category in row: {0:?}")]
  UnknownCategory(String),
}

impl Error {
  /// Whether this is a UNIQUE (or other constraint) violation reported by
  /// SQLite.
  pub fn is_constraint_violation(&self) -> bool {
    matches!(
      self,
      Error::Database(tokio_rusqlite::Error::Rusqlite(
        rusqlite::Error::SqliteFailure(e, _)
      )) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
  }
}

impl From<Error> for tally_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(inner) => inner,
      e if e.is_constraint_violation() => {
        tally_core::Error::conflict("A conflicting record already exists.")
      }
      other => tally_core::Error::Internal(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  fn sqlite_failure(code: std::os::raw::c_int) -> Error {
    Error::Database(tokio_rusqlite::Error::Rusqlite(
      rusqlite::Error::SqliteFailure(rusqlite::ffi::Error::new(code), None),
    ))
  }

  #[test]
  fn unique_violation_becomes_conflict() {
    let e = sqlite_failure(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE);
    assert!(e.is_constraint_violation());
    assert!(matches!(tally_core::Error::from(e), tally_core::Error::Conflict(_)));
  }

  #[test]
  fn other_failures_become_internal() {
    let e = sqlite_failure(rusqlite::ffi::SQLITE_BUSY);
    assert!(!e.is_constraint_violation());
    assert!(matches!(tally_core::Error::from(e), tally_core::Error::Internal(_)));
  }

  #[test]
  fn core_errors_pass_through() {
    let e = Error::Core(tally_core::Error::not_found("gone"));
    assert!(matches!(tally_core::Error::from(e), tally_core::Error::NotFound(_)));
  }
}
