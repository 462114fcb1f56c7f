//! Async HTTP client for the Stripe REST API.

use std::time::Duration;

use paywall_core::provider::{
  CheckoutRequest, CheckoutSession, PaymentProvider, Price,
};
use reqwest::{Client, Response};
use serde::Deserialize;
use uuid::Uuid;

use crate::{Error, Result};

/// Connection settings for Stripe.
#[derive(Debug, Clone)]
pub struct StripeConfig {
  pub secret_key: String,
  /// Normally `https://api.stripe.com`; overridable for tests.
  pub api_base:   String,
}

/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct StripeClient {
  client: Client,
  config: StripeConfig,
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct StripePrice {
  id:          String,
  unit_amount: Option<i64>,
  currency:    String,
}

#[derive(Deserialize)]
struct StripeCheckoutSession {
  id:  String,
  url: Option<String>,
}

#[derive(Deserialize)]
struct StripeErrorBody {
  error: StripeErrorDetail,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
  message: Option<String>,
}

// ─── Client ──────────────────────────────────────────────────────────────────

impl StripeClient {
  pub fn new(config: StripeConfig) -> Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/v1{}", self.config.api_base.trim_end_matches('/'), path)
  }

  /// Map a non-success response into [`Error::Api`], keeping Stripe's own
  /// message when the body carries one.
  async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<StripeErrorBody>(&text)
      .ok()
      .and_then(|b| b.error.message)
      .unwrap_or(text);
    Err(Error::Api { status: status.as_u16(), message })
  }
}

impl PaymentProvider for StripeClient {
  type Error = Error;

  /// `POST /v1/checkout/sessions` for a single-price subscription.
  async fn create_checkout_session(
    &self,
    request: CheckoutRequest,
  ) -> Result<CheckoutSession> {
    let mut form = vec![
      ("mode", "subscription".to_string()),
      ("payment_method_types[0]", "card".to_string()),
      ("billing_address_collection", "required".to_string()),
      ("line_items[0][price]", request.price_id),
      ("line_items[0][quantity]", "1".to_string()),
      ("allow_promotion_codes", "true".to_string()),
      ("success_url", request.success_url),
      ("cancel_url", request.cancel_url),
    ];
    if let Some(email) = request.customer_email {
      form.push(("customer_email", email));
    }

    let resp = self
      .client
      .post(self.url("/checkout/sessions"))
      .bearer_auth(&self.config.secret_key)
      .header("Idempotency-Key", Uuid::new_v4().to_string())
      .form(&form)
      .send()
      .await?;

    let session: StripeCheckoutSession = Self::check(resp).await?.json().await?;
    tracing::debug!(checkout_session = %session.id, "created checkout session");
    Ok(CheckoutSession {
      id:  session.id,
      url: session.url.ok_or(Error::MissingField("url"))?,
    })
  }

  /// `GET /v1/prices/{id}`
  async fn retrieve_price(&self, price_id: &str) -> Result<Price> {
    let resp = self
      .client
      .get(self.url(&format!("/prices/{price_id}")))
      .bearer_auth(&self.config.secret_key)
      .send()
      .await?;

    let price: StripePrice = Self::check(resp).await?.json().await?;
    Ok(Price {
      id:          price.id,
      unit_amount: price.unit_amount.ok_or(Error::MissingField("unit_amount"))?,
      currency:    price.currency,
    })
  }
}
