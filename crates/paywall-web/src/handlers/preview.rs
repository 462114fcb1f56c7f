//! Handlers for `/posts/preview/{slug}` and its upgrade check.
//!
//! The page itself is public and never redirects. Reconciliation against the
//! authoritative session happens afterwards, through `…/access`.

use axum::{
  Json,
  extract::{Path, State},
  response::Response,
};
use paywall_core::{
  access::decide_for_preview_content,
  content::project,
  provider::ContentProvider,
  session::Session,
};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::{
  AppState, Backend, Payments,
  error::Error,
  handlers::post_response,
  session::VisitorToken,
  upgrade::UpgradeCheck,
};

/// `GET /posts/preview/{slug}`
pub async fn page<B: Backend, P: Payments>(
  State(state): State<AppState<B, P>>,
  Path(slug): Path<String>,
) -> Result<Response, Error> {
  // The preview is the same for every visitor; the session is never read.
  let decision = decide_for_preview_content(&slug, &Session::Anonymous);
  debug!(slug = %slug, decision = decision.as_ref(), "preview requested");

  let doc = state
    .content
    .get_document(&slug)
    .await
    .map_err(Error::backend)?
    .ok_or_else(|| Error::not_found(&slug))?;

  match project(&doc, &decision)? {
    Some(post) => Ok(post_response(post)),
    None => Err(Error::not_found(&slug)),
  }
}

/// `GET /posts/preview/{slug}/access` — `{"navigate": "/posts/<slug>"}` once
/// the visitor holds an active subscription, otherwise `{"navigate": null}`.
///
/// If the client disconnects first, the check is dropped and its result
/// discarded.
pub async fn access<B: Backend, P: Payments>(
  State(state): State<AppState<B, P>>,
  Path(slug): Path<String>,
  VisitorToken(token): VisitorToken,
) -> Json<Value> {
  let outcome = UpgradeCheck::spawn(state.sessions.clone(), token, slug.as_str())
    .settle()
    .await;
  info!(slug = %slug, outcome = outcome.as_ref(), "preview reconciled");
  Json(json!({ "navigate": outcome.navigation() }))
}
