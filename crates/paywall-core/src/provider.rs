//! Traits for the external collaborators the gating core consults.
//!
//! Backends (`paywall-store-sqlite`, `paywall-stripe`) implement these; the
//! HTTP layer depends only on the traits.
//!
//! All methods return `Send` futures so implementations can be shared across
//! a multi-threaded tokio runtime behind `axum`.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  content::RawDocument,
  session::{SessionRecord, SessionToken},
};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Authoritative source of session truth.
pub trait SessionProvider: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Look up the session behind `token`. Returns `None` for unknown or
  /// expired tokens.
  fn get_session<'a>(
    &'a self,
    token: &'a SessionToken,
  ) -> impl Future<Output = Result<Option<SessionRecord>, Self::Error>> + Send + 'a;
}

// ─── Content ─────────────────────────────────────────────────────────────────

pub trait ContentProvider: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch a document by exact slug. Returns `None` if not found.
  fn get_document<'a>(
    &'a self,
    slug: &'a str,
  ) -> impl Future<Output = Result<Option<RawDocument>, Self::Error>> + Send + 'a;

  /// All documents, most recently published first.
  fn list_documents(
    &self,
  ) -> impl Future<Output = Result<Vec<RawDocument>, Self::Error>> + Send + '_;
}

// ─── Payment ─────────────────────────────────────────────────────────────────

/// A price as reported by the payment provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
  pub id:          String,
  /// Amount in the currency's minor unit (cents).
  pub unit_amount: i64,
  /// Lowercase ISO 4217 code, e.g. `usd`.
  pub currency:    String,
}

/// Input to [`PaymentProvider::create_checkout_session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
  pub price_id:       String,
  pub customer_email: Option<String>,
  pub success_url:    String,
  pub cancel_url:     String,
}

/// A created checkout session and the hosted page to send the visitor to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
  pub id:  String,
  pub url: String,
}

pub trait PaymentProvider: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn create_checkout_session(
    &self,
    request: CheckoutRequest,
  ) -> impl Future<Output = Result<CheckoutSession, Self::Error>> + Send + '_;

  fn retrieve_price<'a>(
    &'a self,
    price_id: &'a str,
  ) -> impl Future<Output = Result<Price, Self::Error>> + Send + 'a;
}
