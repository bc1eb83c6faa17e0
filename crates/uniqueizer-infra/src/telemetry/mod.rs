//! Tracing initialization
//!
//! Installs the global `tracing` subscriber: an `EnvFilter` (overridable
//! through `RUST_LOG`) feeding either the human-readable or the JSON `fmt`
//! layer.

mod init_basic;

pub use init_basic::{init_telemetry, TelemetryConfig};
