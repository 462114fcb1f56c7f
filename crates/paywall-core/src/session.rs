//! Session — who the visitor is and whether they hold an active subscription.
//!
//! The gating core never mutates a session. One is produced per request by
//! the [`crate::resolver::SessionResolver`] and then handed by value or
//! reference into each decision function.

use std::fmt;

use serde::{Deserialize, Serialize};

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Opaque identifier of an active subscription. Its structure is never
/// inspected; only its presence matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(String);

impl SubscriptionId {
  /// Returns `None` for an empty identifier, which providers sometimes use in
  /// place of a null.
  pub fn new(id: impl Into<String>) -> Option<Self> {
    let id = id.into();
    if id.trim().is_empty() { None } else { Some(Self(id)) }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for SubscriptionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// The bearer value a visitor presents (cookie or `Authorization` header).
///
/// `Debug` is redacted so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
  pub fn new(token: impl Into<String>) -> Option<Self> {
    let token = token.into();
    if token.is_empty() { None } else { Some(Self(token)) }
  }

  pub fn expose(&self) -> &str { &self.0 }
}

impl fmt::Debug for SessionToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("SessionToken(<redacted>)")
  }
}

// ─── Provider record ─────────────────────────────────────────────────────────

/// What a [`crate::provider::SessionProvider`] knows about a live session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
  pub subject:             String,
  pub email:               Option<String>,
  pub active_subscription: Option<String>,
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// The resolved identity for one decision cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Session {
  Anonymous,
  Authenticated {
    subject:             String,
    email:               Option<String>,
    active_subscription: Option<SubscriptionId>,
  },
}

impl Session {
  pub fn is_authenticated(&self) -> bool {
    matches!(self, Self::Authenticated { .. })
  }

  /// The sole authorization signal.
  pub fn active_subscription(&self) -> Option<&SubscriptionId> {
    match self {
      Self::Anonymous => None,
      Self::Authenticated { active_subscription, .. } => {
        active_subscription.as_ref()
      }
    }
  }

  pub fn has_active_subscription(&self) -> bool {
    self.active_subscription().is_some()
  }

  pub fn email(&self) -> Option<&str> {
    match self {
      Self::Anonymous => None,
      Self::Authenticated { email, .. } => email.as_deref(),
    }
  }
}

impl From<SessionRecord> for Session {
  fn from(r: SessionRecord) -> Self {
    Session::Authenticated {
      subject:             r.subject,
      email:               r.email,
      active_subscription: r.active_subscription.and_then(SubscriptionId::new),
    }
  }
}
