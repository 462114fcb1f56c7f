//! HTTP surface for the paywall.
//!
//! Exposes an axum [`Router`] that gates post content behind an active
//! subscription. Every route returns JSON; rendering is the client's job.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/` | Subscription product and price |
//! | `GET`  | `/posts` | Public listing |
//! | `GET`  | `/posts/{slug}` | Full post, or 307 to the preview |
//! | `GET`  | `/posts/preview/{slug}` | Preview, never redirects |
//! | `GET`  | `/posts/preview/{slug}/access` | Post-render upgrade check |
//! | `POST` | `/subscribe` | Sign-in, listing, or checkout |

pub mod error;
pub mod handlers;
pub mod session;
pub mod upgrade;

pub use error::Error;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
  Router,
  routing::{get, post},
};
use paywall_core::{
  provider::{ContentProvider, PaymentProvider, SessionProvider},
  resolver::SessionResolver,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use handlers::{home, posts, preview, subscribe};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `PAYWALL_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                   String,
  pub port:                   u16,
  /// Public origin, used for checkout success/cancel URLs.
  pub base_url:               String,
  pub store_path:             PathBuf,
  #[serde(default = "default_session_cookie")]
  pub session_cookie:         String,
  #[serde(default = "default_session_cache_ttl_secs")]
  pub session_cache_ttl_secs: u64,
  /// Where anonymous visitors are sent to sign in.
  pub sign_in_url:            String,
  pub stripe_secret_key:      String,
  pub stripe_price_id:        String,
  #[serde(default = "default_stripe_api_base")]
  pub stripe_api_base:        String,
}

fn default_session_cookie() -> String { "paywall_session".to_string() }

fn default_session_cache_ttl_secs() -> u64 { 30 }

fn default_stripe_api_base() -> String { "https://api.stripe.com".to_string() }

// ─── Backends ─────────────────────────────────────────────────────────────────

/// A store that serves both content and sessions.
pub trait Backend:
  ContentProvider + SessionProvider + Clone + Send + Sync + 'static
{
}

impl<T> Backend for T where
  T: ContentProvider + SessionProvider + Clone + Send + Sync + 'static
{
}

pub trait Payments: PaymentProvider + Clone + Send + Sync + 'static {}

impl<T> Payments for T where T: PaymentProvider + Clone + Send + Sync + 'static {}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<B: Backend, P: Payments> {
  pub content:  Arc<B>,
  pub sessions: Arc<SessionResolver<B>>,
  pub payments: Arc<P>,
  pub config:   Arc<ServerConfig>,
}

impl<B: Backend, P: Payments> AppState<B, P> {
  pub fn new(backend: B, payments: P, config: ServerConfig) -> Self {
    let backend = Arc::new(backend);
    let ttl = Duration::from_secs(config.session_cache_ttl_secs);
    Self {
      sessions: Arc::new(SessionResolver::new(backend.clone(), ttl)),
      content:  backend,
      payments: Arc::new(payments),
      config:   Arc::new(config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the paywall.
pub fn router<B: Backend, P: Payments>(state: AppState<B, P>) -> Router {
  Router::new()
    .route("/", get(home::handler::<B, P>))
    .route("/health", get(health))
    .route("/posts", get(posts::list::<B, P>))
    .route("/posts/{slug}", get(posts::full::<B, P>))
    .route("/posts/preview/{slug}", get(preview::page::<B, P>))
    .route("/posts/preview/{slug}/access", get(preview::access::<B, P>))
    .route("/subscribe", post(subscribe::handler::<B, P>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

async fn health() -> &'static str { "ok" }

// ─── Integration tests ────────────────────────────────────────────────────────
