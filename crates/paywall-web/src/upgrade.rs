//! Post-render upgrade from preview to full content.
//!
//! The preview is served without consulting the subscription. Afterwards an
//! [`UpgradeCheck`] re-resolves the session authoritatively on its own task
//! and reconciles:
//!
//! ```text
//! Rendered(Preview) ──(authoritative read)──▶ Stay
//!                                         └─▶ UpgradeTo("/posts/<slug>")
//! ```
//!
//! The task is aborted when the check is dropped, so a result that arrives
//! after the request or page is gone is discarded.

use std::sync::Arc;

use paywall_core::{
  access::{PreviewOutcome, reconcile_preview},
  provider::SessionProvider,
  resolver::SessionResolver,
  session::{Session, SessionToken},
};
use tokio::task::JoinHandle;
use tracing::warn;

pub struct UpgradeCheck {
  slug:   String,
  handle: JoinHandle<Session>,
}

impl UpgradeCheck {
  /// Start the authoritative lookup without waiting for it.
  pub fn spawn<P>(
    resolver: Arc<SessionResolver<P>>,
    token: Option<SessionToken>,
    slug: impl Into<String>,
  ) -> Self
  where
    P: SessionProvider + 'static,
  {
    let handle =
      tokio::spawn(async move { resolver.resolve(token.as_ref()).await });
    Self { slug: slug.into(), handle }
  }

  /// Wait for the lookup and reconcile. There is no timeout; a hung provider
  /// means a hung check, never an upgrade.
  pub async fn settle(mut self) -> PreviewOutcome {
    match (&mut self.handle).await {
      Ok(session) => reconcile_preview(&self.slug, &session),
      Err(e) => {
        warn!(slug = %self.slug, error = %e, "upgrade check did not complete");
        PreviewOutcome::Stay
      }
    }
  }
}

impl Drop for UpgradeCheck {
  fn drop(&mut self) { self.handle.abort(); }
}
