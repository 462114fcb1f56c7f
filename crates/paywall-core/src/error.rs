//! Error types for `paywall-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The identity provider could not be reached or returned garbage. Callers
  /// resolve this to an anonymous session rather than surfacing it.
  #[error("session unavailable: {0}")]
  SessionUnavailable(String),

  #[error("content not found: {0}")]
  ContentNotFound(String),

  #[error("payment provider failure: {0}")]
  UpstreamPaymentFailure(String),

  #[error("invalid publication timestamp: {0:?}")]
  InvalidTimestamp(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
