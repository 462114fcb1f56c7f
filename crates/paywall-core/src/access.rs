//! The access-decision engine.
//!
//! Every function here is pure: the session is passed in explicitly and the
//! result depends on nothing else. Redirect targets are built by plain string
//! concatenation; slugs are matched exactly and never normalised or escaped.
//!
//! Only two redirect directions exist:
//!
//! | From | Who | To |
//! |------|-----|----|
//! | `/posts/<slug>` | no active subscription | `/posts/preview/<slug>` |
//! | `/posts/preview/<slug>` | active subscription | `/posts/<slug>` |

use serde::{Deserialize, Serialize};
use strum::AsRefStr;

use crate::session::Session;

/// The member content listing.
pub const POSTS_PATH: &str = "/posts";

pub fn full_path(slug: &str) -> String { format!("{POSTS_PATH}/{slug}") }

pub fn preview_path(slug: &str) -> String {
  format!("{POSTS_PATH}/preview/{slug}")
}

// ─── Decisions ───────────────────────────────────────────────────────────────

/// What a content route should deliver.
#[derive(Debug, Clone, PartialEq, Eq, AsRefStr, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum AccessDecision {
  Full,
  Preview,
  RedirectTo(String),
}

/// What the subscribe action should do next.
#[derive(Debug, Clone, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum SubscribeDecision {
  /// Hand off to the external sign-in flow.
  SignIn,
  /// Already subscribed; go to the listing instead of paying twice.
  NavigateTo(String),
  /// Create a checkout session and send the visitor to the hosted page.
  Checkout,
}

/// Result of reconciling an already-rendered preview against the
/// authoritative session.
#[derive(Debug, Clone, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum PreviewOutcome {
  Stay,
  UpgradeTo(String),
}

impl PreviewOutcome {
  /// Client-side navigation target, if any.
  pub fn navigation(&self) -> Option<&str> {
    match self {
      Self::Stay => None,
      Self::UpgradeTo(path) => Some(path),
    }
  }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

pub fn decide_for_subscribe_action(session: &Session) -> SubscribeDecision {
  if !session.is_authenticated() {
    SubscribeDecision::SignIn
  } else if session.has_active_subscription() {
    SubscribeDecision::NavigateTo(POSTS_PATH.to_owned())
  } else {
    SubscribeDecision::Checkout
  }
}

/// Must be called before the body is fetched so that a non-subscriber's
/// response never carries full text.
pub fn decide_for_full_content(slug: &str, session: &Session) -> AccessDecision {
  if session.has_active_subscription() {
    AccessDecision::Full
  } else {
    AccessDecision::RedirectTo(preview_path(slug))
  }
}

/// The preview is public; the initial render is never gated.
pub fn decide_for_preview_content(
  _slug: &str,
  _session: &Session,
) -> AccessDecision {
  AccessDecision::Preview
}

/// Second phase of the preview page. `authoritative` must come from
/// [`crate::resolver::SessionResolver::resolve`], never from the cache.
pub fn reconcile_preview(slug: &str, authoritative: &Session) -> PreviewOutcome {
  if authoritative.has_active_subscription() {
    PreviewOutcome::UpgradeTo(full_path(slug))
  } else {
    PreviewOutcome::Stay
  }
}
