//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  /// Never shown to the client; logged when the response is built.
  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<tally_core::Error> for ApiError {
  fn from(e: tally_core::Error) -> Self {
    use tally_core::Error as E;
    match e {
      E::Validation(m) | E::InvalidArgument(m) => ApiError::BadRequest(m),
      E::NotFound(m) => ApiError::NotFound(m),
      E::Conflict(m) => ApiError::Conflict(m),
      E::Internal(source) => ApiError::Internal(source),
    }
  }
}

// Extractor rejections are answered in the same `{"message"}` shape as
// handler errors.

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    ApiError::BadRequest(rejection.body_text())
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    ApiError::BadRequest(rejection.body_text())
  }
}

/// Parse a caller-supplied id; `kind` names it in the error message, e.g.
/// `"User"` gives `Invalid User ID format.`.
pub(crate) fn parse_id(raw: &str, kind: &str) -> Result<Uuid, ApiError> {
  Uuid::parse_str(raw.trim())
    .map_err(|_| ApiError::BadRequest(format!("Invalid {kind} ID format.")))
}

/// Convert a backend error into an [`ApiError`] through the shared taxonomy.
pub(crate) fn store_error<E: Into<tally_core::Error>>(e: E) -> ApiError {
  ApiError::from(e.into())
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Server error.".to_owned())
      }
    };
    (status, Json(json!({ "message": message }))).into_response()
  }
}
