//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// The stored inputs cannot support a run (e.g. no decision rows).
  #[error("unprocessable: {0}")]
  Unprocessable(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("internal error: {0}")]
  Internal(String),
}

impl ApiError {
  pub fn store<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Self::Store(Box::new(e))
  }
}

impl From<rota_core::Error> for ApiError {
  fn from(e: rota_core::Error) -> Self {
    use rota_core::Error as E;
    match e {
      E::InvalidDate(_) | E::InvalidRange { .. } => Self::BadRequest(e.to_string()),
      E::EmptyDecisionTable => Self::Unprocessable(e.to_string()),
      E::Store(inner) => Self::Store(inner),
      E::Resolve(_) => Self::Internal(e.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Unprocessable(m) => (StatusCode::UNPROCESSABLE_ENTITY, m.clone()),
      ApiError::Store(e) => {
        tracing::warn!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
      ApiError::Internal(m) => {
        tracing::error!(error = %m, "run failed");
        (StatusCode::INTERNAL_SERVER_ERROR, m.clone())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
