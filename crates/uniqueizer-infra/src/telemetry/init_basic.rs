use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "uniqueizer=debug,tower_http=debug";

/// Subscriber settings
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub service_version: String,
    pub environment: String,
    /// Emit one JSON object per event instead of human-readable lines.
    pub json: bool,
}

impl TelemetryConfig {
    pub fn new(service_name: impl Into<String>, environment: impl Into<String>) -> Self {
        let environment = environment.into();
        let json = matches!(environment.to_lowercase().as_str(), "production" | "prod");
        Self {
            service_name: service_name.into(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            environment,
            json,
        }
    }
}

/// Initialize tracing
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()?;
    }

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = %config.environment,
        json = config.json,
        "Tracing initialized"
    );
    Ok(())
}
