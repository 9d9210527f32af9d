//! AIS relay service - entry point.
//!
//! Connects to the AISStream feed, buffers recent vessel messages, and
//! serves a filtered position snapshot on a polling HTTP endpoint.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// AIS vessel position relay
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via AIS_RELAY_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize TLS crypto provider (must be before any WS connections)
    ais_feed::init_crypto();

    // Load .env before reading any secrets
    dotenvy::dotenv().ok();

    let args = Args::parse();

    ais_relay::init_logging()?;

    info!("Starting AIS relay v{}", env!("CARGO_PKG_VERSION"));

    // Determine config path: CLI arg > AIS_RELAY_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("AIS_RELAY_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");

    let config = ais_relay::AppConfig::load(&config_path)?;
    info!(ws_url = %config.ws_url, port = config.server.port, "Configuration loaded");

    let app = ais_relay::Application::new(config)?;
    app.run().await?;

    Ok(())
}
