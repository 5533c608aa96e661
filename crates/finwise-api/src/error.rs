//! API error taxonomy and [`axum::response::IntoResponse`] implementation.
//!
//! Upstream and store causes are logged, never echoed to the client.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use finwise_bridge::BridgeError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Malformed or out-of-range input; carries the violated constraints.
  #[error("validation failed")]
  Validation(Vec<String>),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// Missing or invalid session.
  #[error("unauthorized")]
  Unauthorized,

  /// Authenticated, but not the owner of the addressed record.
  #[error("forbidden")]
  Forbidden,

  #[error("not found: {0}")]
  NotFound(String),

  /// The insight sidecar could not be reached or reported a failure.
  #[error("upstream error")]
  Upstream(#[source] BridgeError),

  #[error("store error")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Wrap a backend error for a 500 response.
  pub fn store<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    ApiError::Store(Box::new(e))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::Validation(details) => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "validation failed", "details": details })),
      )
        .into_response(),
      ApiError::BadRequest(message) => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": message })),
      )
        .into_response(),
      ApiError::Unauthorized => (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "authentication required" })),
      )
        .into_response(),
      ApiError::Forbidden => (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": "not the owner of this record" })),
      )
        .into_response(),
      ApiError::NotFound(message) => (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": message })),
      )
        .into_response(),
      ApiError::Upstream(cause) => {
        tracing::warn!(error = %cause, "insight sidecar call failed");
        (
          StatusCode::BAD_GATEWAY,
          Json(json!({ "error": "insight service unavailable" })),
        )
          .into_response()
      }
      ApiError::Store(cause) => {
        tracing::error!(error = %cause, "store operation failed");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "error": "internal error" })),
        )
          .into_response()
      }
    }
  }
}

// ─── Validation helper ───────────────────────────────────────────────────────

/// Collects field-constraint violations so a 400 can report all of them.
#[derive(Debug, Default)]
pub struct Violations(Vec<String>);

impl Violations {
  pub fn require(&mut self, ok: bool, constraint: &str) {
    if !ok {
      self.0.push(constraint.to_string());
    }
  }

  /// `Err(ApiError::Validation)` if anything was violated.
  pub fn finish(self) -> Result<(), ApiError> {
    if self.0.is_empty() {
      Ok(())
    } else {
      Err(ApiError::Validation(self.0))
    }
  }
}
