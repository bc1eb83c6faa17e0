//! Uniqueizer API Library
//!
//! HTTP handlers, error rendering and application setup for the upload
//! service.

mod api_doc;
pub mod constants;
pub mod error;
mod handlers;
pub mod setup;
pub mod state;
mod utils;

pub use api_doc::ApiDoc;
pub use error::{ErrorResponse, HttpAppError};
