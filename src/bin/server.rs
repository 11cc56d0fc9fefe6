//! Search proxy binary.
//!
//! Loads configuration (see [`pricescout::ProxyConfig::load`]), builds the
//! search pipeline and serves until Ctrl+C.

use pricescout::{ProxyConfig, build_pipeline, serve_until};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ProxyConfig::load().map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    // RUST_LOG wins over the configured filter.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&config.logging.filter))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(backend = ?config.backend, "pricescout-server starting");

    let pipeline = build_pipeline(&config)?;

    serve_until(pipeline, &config.server, shutdown_signal())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "pricescout-server exited with error");
            anyhow::anyhow!("pricescout-server failed: {e}")
        })?;

    tracing::info!("pricescout-server shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
