//! Error type and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] paywall_core::Error),

  #[error("backend error: {0}")]
  Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn not_found(slug: &str) -> Self {
    paywall_core::Error::ContentNotFound(format!("post {slug} not found")).into()
  }

  pub fn payment(e: impl std::error::Error) -> Self {
    paywall_core::Error::UpstreamPaymentFailure(e.to_string()).into()
  }

  pub fn backend(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Error::Backend(Box::new(e))
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    use paywall_core::Error as Core;

    let (status, message) = match &self {
      Error::Core(Core::ContentNotFound(m)) => (StatusCode::NOT_FOUND, m.clone()),
      Error::Core(Core::UpstreamPaymentFailure(m)) => {
        tracing::error!(error = %m, "payment provider failure");
        (StatusCode::BAD_GATEWAY, m.clone())
      }
      Error::Core(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
      Error::Backend(e) => {
        tracing::error!(error = %e, "backend failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
