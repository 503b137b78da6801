//! Cardiac Risk Service - Main Entry Point

use anyhow::Context;
use api::{config::AppConfig, init_logging, run_server};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    init_logging(&config.server)?;

    info!("=== Cardiac Risk Service v{} ===", env!("CARGO_PKG_VERSION"));

    run_server(config).await
}
