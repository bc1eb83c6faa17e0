use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{extract::State, response::Html};
use std::io::ErrorKind;
use std::sync::Arc;
use uniqueizer_core::AppError;

/// Serve the upload page.
#[utoipa::path(
    get,
    path = "/",
    tag = "process",
    responses(
        (status = 200, description = "HTML upload form", body = String, content_type = "text/html"),
        (status = 404, description = "Upload page missing", body = crate::error::ErrorResponse)
    )
)]
pub async fn index_page(State(state): State<Arc<AppState>>) -> Result<Html<String>, HttpAppError> {
    let path = &state.config.base.index_html_path;
    match tokio::fs::read_to_string(path).await {
        Ok(html) => Ok(Html(html)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "Upload page not found");
            Err(AppError::NotFound("Upload page not found".to_string()).into())
        }
        Err(e) => Err(AppError::from(e).into()),
    }
}
