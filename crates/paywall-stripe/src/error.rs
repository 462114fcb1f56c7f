//! Error type for `paywall-stripe`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// Stripe answered with a non-success status.
  #[error("stripe returned {status}: {message}")]
  Api { status: u16, message: String },

  #[error("stripe response is missing `{0}`")]
  MissingField(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
