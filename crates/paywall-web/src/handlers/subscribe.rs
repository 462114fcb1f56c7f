//! `POST /subscribe` — what the "Subscribe now" button should do.

use axum::{Json, extract::State};
use paywall_core::{
  access::{SubscribeDecision, decide_for_subscribe_action},
  provider::{CheckoutRequest, PaymentProvider},
};
use serde::Serialize;
use tracing::info;

use crate::{
  AppState, Backend, Payments,
  error::Error,
  session::VisitorToken,
};

#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SubscribeResponse {
  /// Start the external sign-in flow.
  SignIn { url: String },
  /// Already subscribed; client navigates locally.
  Navigate { url: String },
  /// Redirect to the provider-hosted checkout page.
  Checkout {
    #[serde(rename = "sessionId")]
    session_id: String,
    url:        String,
  },
}

pub async fn handler<B: Backend, P: Payments>(
  State(state): State<AppState<B, P>>,
  token: VisitorToken,
) -> Result<Json<SubscribeResponse>, Error> {
  let session = state.sessions.interactive(token.token()).await;
  let decision = decide_for_subscribe_action(&session);
  info!(decision = decision.as_ref(), "subscribe requested");

  let response = match decision {
    SubscribeDecision::SignIn => SubscribeResponse::SignIn {
      url: state.config.sign_in_url.clone(),
    },
    SubscribeDecision::NavigateTo(url) => SubscribeResponse::Navigate { url },
    SubscribeDecision::Checkout => {
      let base = state.config.base_url.trim_end_matches('/');
      let checkout = state
        .payments
        .create_checkout_session(CheckoutRequest {
          price_id:       state.config.stripe_price_id.clone(),
          customer_email: session.email().map(str::to_owned),
          success_url:    format!("{base}/posts"),
          cancel_url:     format!("{base}/"),
        })
        .await
        .map_err(Error::payment)?;
      SubscribeResponse::Checkout { session_id: checkout.id, url: checkout.url }
    }
  };
  Ok(Json(response))
}
