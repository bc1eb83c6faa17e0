//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;
use uniqueizer_core::{ProcessRequest, UniqueizeOptions};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Uniqueizer API",
        version = "0.1.0",
        description = "Upload a video and get back one or more copies re-encoded with randomized filter parameters. Several copies are returned as a zip archive."
    ),
    paths(
        handlers::index::index_page,
        handlers::process::process_video,
    ),
    components(schemas(ErrorResponse, ProcessRequest, UniqueizeOptions)),
    tags(
        (name = "process", description = "Video upload and processing")
    )
)]
pub struct ApiDoc;
