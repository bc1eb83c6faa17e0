//! Application setup and initialization

pub mod routes;
pub mod server;

use crate::constants::SERVICE_NAME;
use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use uniqueizer_core::Config;
use uniqueizer_infra::{init_telemetry, TelemetryConfig};

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    init_telemetry(&TelemetryConfig::new(SERVICE_NAME, config.environment()))
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!("Configuration loaded and validated successfully");

    prepare_directories(&config).await?;

    let state = Arc::new(AppState::new(config.clone()));
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}

/// Create the upload and output directories if they are missing.
pub async fn prepare_directories(config: &Config) -> Result<()> {
    for dir in [&config.processing.upload_dir, &config.processing.output_dir] {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }
    Ok(())
}
