//! Serve command handler.

use anyhow::Result;
use speechbench_axum::ServerConfig;
use speechbench_core::Settings;

/// Start the HTTP API server, optionally overriding the configured port.
pub async fn execute(settings: &Settings, port: Option<u16>) -> Result<()> {
    let mut config = ServerConfig::from_settings(settings);
    if let Some(port) = port {
        config.port = port;
    }

    speechbench_axum::start_server(settings, config).await
}
