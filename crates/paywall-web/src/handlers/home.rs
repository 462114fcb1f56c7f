//! `GET /` — the subscription product.

use axum::{Json, extract::State};
use paywall_core::{pricing::Product, provider::PaymentProvider};
use serde_json::{Value, json};

use crate::{AppState, Backend, Payments, error::Error};

pub async fn handler<B: Backend, P: Payments>(
  State(state): State<AppState<B, P>>,
) -> Result<Json<Value>, Error> {
  let price = state
    .payments
    .retrieve_price(&state.config.stripe_price_id)
    .await
    .map_err(Error::payment)?;
  Ok(Json(json!({ "product": Product::from_price(&price) })))
}
