//! Server startup and graceful shutdown

use anyhow::Result;
use axum::Router;
use std::time::Duration;
use uniqueizer_core::Config;
use uniqueizer_processing::StaleFileSweeper;

/// Start the server with graceful shutdown
pub async fn start_server(config: &Config, app: Router) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.server_port());
    tracing::info!(addr = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let sweeper = start_stale_file_sweeper(config);

    tracing::info!(
        max_upload_mb = config.max_upload_size_bytes() / 1024 / 1024,
        video_extensions = %config.processing.video_allowed_extensions.join(","),
        ffmpeg_path = %config.ffmpeg_path(),
        ffmpeg_timeout_secs = config.processing.ffmpeg_timeout_secs,
        max_concurrent_jobs = config.processing.max_concurrent_jobs,
        max_copies = config.processing.max_copies,
        "Server ready and accepting connections"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = sweeper {
        handle.abort();
    }

    Ok(())
}

fn start_stale_file_sweeper(config: &Config) -> Option<tokio::task::JoinHandle<()>> {
    let processing = &config.processing;
    if processing.cleanup_interval_secs == 0 {
        tracing::info!("Stale file sweeper disabled");
        return None;
    }

    tracing::info!(
        interval_secs = processing.cleanup_interval_secs,
        max_age_secs = processing.stale_file_max_age_secs,
        "Stale file sweeper enabled"
    );
    let sweeper = StaleFileSweeper::new(
        vec![processing.upload_dir.clone(), processing.output_dir.clone()],
        Duration::from_secs(processing.stale_file_max_age_secs),
        Duration::from_secs(processing.cleanup_interval_secs),
    );
    Some(sweeper.start())
}

/// Signal handler for graceful shutdown
///
/// Listens for Ctrl+C (SIGINT) and SIGTERM signals to initiate graceful shutdown.
///
/// # Panics
/// - Panics if Ctrl+C signal handler cannot be installed (unrecoverable system error)
/// - On Unix systems, panics if SIGTERM signal handler cannot be installed (unrecoverable system error)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Shutting down gracefully...");
}
