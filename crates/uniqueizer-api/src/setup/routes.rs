//! Route configuration and setup

mod health;

use crate::api_doc::ApiDoc;
use crate::constants::{MULTIPART_OVERHEAD_BYTES, OPENAPI_PATH, PROCESS_PATH};
use crate::error::redact_error_details;
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use uniqueizer_core::Config;
use uniqueizer_infra::{
    request_id_middleware, security_headers_middleware, SecurityHeadersConfig,
};
use utoipa::OpenApi;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    // The handler enforces the exact upload limit while streaming; this only
    // stops bodies that could never fit.
    let body_limit = config
        .max_upload_size_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let http_concurrency_limit = config.base.http_concurrency_limit;
    tracing::info!(
        http_concurrency_limit = http_concurrency_limit,
        body_limit_bytes = body_limit,
        "HTTP limits configured"
    );

    let process_slash = format!("{}/", PROCESS_PATH);

    let app = Router::new()
        .route("/", get(handlers::index::index_page))
        .route(PROCESS_PATH, post(handlers::process::process_video))
        .route(&process_slash, post(handlers::process::process_video))
        .route("/health", get(health::liveness_check))
        .route("/health/ready", get(health::readiness_check))
        .route(OPENAPI_PATH, get(|| async { Json(ApiDoc::openapi()) }))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn_with_state(
            Arc::new(SecurityHeadersConfig::new(config.is_production())),
            security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn_with_state(
            config.is_production(),
            redact_error_details,
        ))
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|_| anyhow::anyhow!("Invalid CORS origin: {}", o))
            })
            .collect::<Result<Vec<_>, _>>()?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}
