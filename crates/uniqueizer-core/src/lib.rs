//! Uniqueizer Core Library
//!
//! Configuration, error types and request models shared by the processing
//! pipeline and the HTTP API.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{BaseConfig, Config, ProcessingConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{ProcessRequest, UniqueizeOptions};
