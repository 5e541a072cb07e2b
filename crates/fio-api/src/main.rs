//! fio-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered under
//! `FIO_*` environment variables, opens the SQLite store, loads seed data,
//! repairs the id sequence and serves the JSON API over HTTP.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use fio_api::ServerConfig;
use fio_core::service::PersonService;
use fio_enrich::HttpEnricher;
use fio_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "FIO person enrichment service")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Load `.env` first so it can set `RUST_LOG`.
  let dotenv = dotenvy::dotenv();

  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // A missing `.env` is fine; real environment variables still apply.
  if let Err(e) = dotenv {
    tracing::debug!(error = %e, "no .env file loaded");
  }

  let server_cfg = ServerConfig::load(&cli.config)
    .context("failed to load ServerConfig")?;

  // Open SQLite store; runs the migration if the table is missing.
  let store = SqliteStore::open(&server_cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", server_cfg.store_path))?;

  if let Some(seed_path) = &server_cfg.seed_path {
    store
      .seed_from_file(seed_path)
      .await
      .with_context(|| format!("failed to load seed data from {seed_path:?}"))?;
  }
  store.repair_sequence_or_warn().await;

  let enricher = HttpEnricher::new(server_cfg.enrich_config())
    .context("failed to build HTTP client")?;

  let service = PersonService::new(Arc::new(store), Arc::new(enricher));
  let app = fio_api::router(service);
  let address = server_cfg.bind_addr();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  tracing::info!("server stopped");
  Ok(())
}

/// Resolve on Ctrl-C so in-flight requests can finish before the store is
/// dropped.
async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
}
