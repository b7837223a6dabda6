mod config;
mod dates;
mod errors;
mod generation;
mod llm_client;
mod models;
mod render;
mod site;

use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::site::pipeline::{build_site, resolve_llm};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting horoscope site build v{}", env!("CARGO_PKG_VERSION"));

    // Credential policy is checked before any input is read or output written
    let llm = resolve_llm(&config).inspect_err(|e| error!("{e}"))?;
    if let Some(client) = &llm {
        info!("Generation client initialized (model: {})", client.model());
    }

    build_site(&config, llm).await.inspect_err(|e| error!("Build failed: {e}"))?;
    Ok(())
}
