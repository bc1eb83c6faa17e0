//! Uniqueizer Infrastructure Library
//!
//! Shared infrastructure for the HTTP service:
//! - Middleware (request ID, security headers)
//! - Telemetry initialization

pub mod middleware;
pub mod telemetry;

// Re-export commonly used types
pub use middleware::{
    request_id_middleware, security_headers_middleware, RequestId, SecurityHeadersConfig,
    REQUEST_ID_HEADER,
};
pub use telemetry::{init_telemetry, TelemetryConfig};
