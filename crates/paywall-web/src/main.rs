//! paywall server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered with
//! `PAYWALL_*` environment variables, opens the SQLite store, and serves the
//! paywall over HTTP.
//!
//! # Loading content
//!
//! Documents are written to the store from a JSON array of raw documents:
//!
//! ```sh
//! cargo run -p paywall-web --bin paywall -- --import posts.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use paywall_core::content::RawDocument;
use paywall_store_sqlite::SqliteStore;
use paywall_stripe::{StripeClient, StripeConfig};
use paywall_web::{AppState, ServerConfig};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Subscription paywall server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Import documents from a JSON file into the store and exit.
  #[arg(long, value_name = "FILE")]
  import: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("PAYWALL"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Helper mode: import documents and exit.
  if let Some(path) = cli.import {
    let count = import_documents(&store, &path).await?;
    tracing::info!(count, "imported documents from {path:?}");
    return Ok(());
  }

  let payments = StripeClient::new(StripeConfig {
    secret_key: server_cfg.stripe_secret_key.clone(),
    api_base:   server_cfg.stripe_api_base.clone(),
  })
  .context("failed to build Stripe client")?;

  let state = AppState::new(store, payments, server_cfg.clone());
  let app = paywall_web::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a JSON array of [`RawDocument`]s and upsert each one.
async fn import_documents(store: &SqliteStore, path: &Path) -> anyhow::Result<usize> {
  let text = tokio::fs::read_to_string(path)
    .await
    .with_context(|| format!("failed to read {path:?}"))?;
  let docs: Vec<RawDocument> =
    serde_json::from_str(&text).context("failed to parse documents")?;
  for doc in &docs {
    store
      .put_document(doc)
      .await
      .with_context(|| format!("failed to store document {:?}", doc.slug))?;
  }
  Ok(docs.len())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
