//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use fio_core::enrich::EnrichError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("invalid JSON: {0}")]
  InvalidJson(#[from] JsonRejection),

  #[error("invalid query: {0}")]
  InvalidQuery(#[from] QueryRejection),

  #[error(transparent)]
  Service(#[from] fio_core::Error),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    use fio_core::Error as E;
    match self {
      ApiError::InvalidJson(_) | ApiError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
      ApiError::Service(e) => match e {
        E::Validation(_) | E::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        E::NotFound(_) => StatusCode::NOT_FOUND,
        E::Dependency(EnrichError::Unreachable(..)) => StatusCode::SERVICE_UNAVAILABLE,
        E::Dependency(EnrichError::Malformed(..)) | E::Store(_) => {
          StatusCode::INTERNAL_SERVER_ERROR
        }
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = self.to_string();
    if status.is_server_error() {
      tracing::error!(%status, error = %message, "request failed");
    } else {
      tracing::debug!(%status, error = %message, "request rejected");
    }
    (status, Json(json!({ "error": message }))).into_response()
  }
}
