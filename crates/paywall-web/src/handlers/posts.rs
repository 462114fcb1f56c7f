//! Handlers for `/posts` and `/posts/{slug}`.
//!
//! The full-content decision is made before the document is fetched, so a
//! redirect response never carries (or depends on) the body.

use axum::{
  Json,
  extract::{Path, State},
  response::Response,
};
use paywall_core::{
  access::{AccessDecision, decide_for_full_content},
  content::{project, project_summary},
  provider::ContentProvider,
};
use serde_json::{Value, json};
use tracing::info;

use crate::{
  AppState, Backend, Payments,
  error::Error,
  handlers::{post_response, redirect_response},
  session::VisitorToken,
};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /posts`
pub async fn list<B: Backend, P: Payments>(
  State(state): State<AppState<B, P>>,
) -> Result<Json<Value>, Error> {
  let docs = state.content.list_documents().await.map_err(Error::backend)?;
  let posts = docs
    .iter()
    .map(project_summary)
    .collect::<paywall_core::Result<Vec<_>>>()?;
  Ok(Json(json!({ "posts": posts })))
}

// ─── Full ─────────────────────────────────────────────────────────────────────

/// `GET /posts/{slug}`
pub async fn full<B: Backend, P: Payments>(
  State(state): State<AppState<B, P>>,
  Path(slug): Path<String>,
  token: VisitorToken,
) -> Result<Response, Error> {
  let session = state.sessions.resolve(token.token()).await;
  let decision = decide_for_full_content(&slug, &session);
  info!(slug = %slug, decision = decision.as_ref(), "full content requested");

  if let AccessDecision::RedirectTo(destination) = &decision {
    return Ok(redirect_response(destination));
  }

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
