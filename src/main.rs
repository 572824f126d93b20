//! # Weather Proxy Main Entry Point
//!
//! This is the main entry point for the Weather Proxy service.

use weather_proxy::{config::ConfigLoader, server::run_server, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from layered env files and variables
    let config_loader = ConfigLoader::new();
    let config = config_loader.load()?;

    telemetry::init_tracing(&config)?;

    tracing::info!(profile = %config.profile, "loaded configuration");
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::debug!(config = %redacted_json, "effective configuration");
    }
    if config.configured_api_key().is_none() {
        tracing::warn!(
            "WEATHERAPP_ID is not set; weather lookups will fail until it is configured"
        );
    }

    // Start the server with the loaded configuration
    run_server(config).await
}
