use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::{read_process_form, UploadLimits};
use anyhow::Context;
use axum::{
    body::Body,
    extract::{Extension, Multipart, State},
    http::{header, Response, StatusCode},
};
use futures::StreamExt;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use uniqueizer_core::AppError;
use uniqueizer_infra::RequestId;
use uniqueizer_processing::{CleanupGuard, ProcessedOutput};

#[utoipa::path(
    post,
    path = "/process/",
    tag = "process",
    request_body(
        content = inline(Object),
        content_type = "multipart/form-data",
        description = "`file` plus `num_copies` and the boolean option fields of `ProcessRequest`"
    ),
    responses(
        (status = 200, description = "One processed video (video/mp4) or a zip of all copies (application/zip)"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "No copy could be produced", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, request_id, multipart),
    fields(request_id = %request_id.0.0, operation = "process_video")
)]
pub async fn process_video(
    State(state): State<Arc<AppState>>,
    request_id: Extension<RequestId>,
    multipart: Multipart,
) -> Result<Response<Body>, HttpAppError> {
    let processing = &state.config.processing;
    // Owns every temp file of this request from here on.
    let mut cleanup = CleanupGuard::new();

    let form = read_process_form(
        multipart,
        UploadLimits {
            upload_dir: &processing.upload_dir,
            max_size: processing.max_upload_size_bytes,
            allowed_extensions: &processing.video_allowed_extensions,
        },
        &mut cleanup,
    )
    .await?;
    form.request.validate(processing.max_copies)?;

    tracing::info!(
        filename = %form.names.filename(),
        size_bytes = form.size,
        num_copies = form.request.num_copies,
        options = ?form.request.options,
        "Upload received"
    );

    let plans = state
        .pipeline
        .plan_copies(&form.names, &form.request, &mut rand::rng());

    let output = state
        .pipeline
        .execute(
            &form.path,
            &form.names,
            &form.request.options,
            plans,
            &mut cleanup,
        )
        .await?;

    tracing::info!(
        download_name = %output.download_name,
        copies = output.copies,
        "Processing finished"
    );

    file_response(output, cleanup).await
}

/// Stream `output` to the client. `cleanup` rides along inside the body and
/// deletes the temp files once the body is finished or dropped.
async fn file_response(
    output: ProcessedOutput,
    cleanup: CleanupGuard,
) -> Result<Response<Body>, HttpAppError> {
    let file = tokio::fs::File::open(&output.path)
        .await
        .with_context(|| format!("Failed to open output: {}", output.path.display()))?;
    let content_length = file.metadata().await.ok().map(|m| m.len());

    let body_stream = ReaderStream::new(file).map(move |chunk| {
        let _ = &cleanup;
        chunk
    });

    let content_disposition = content_disposition(&output.download_name);

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, output.content_type)
        .header(header::CONTENT_DISPOSITION, content_disposition.as_str())
        .header(header::CACHE_CONTROL, "no-store");
    if let Some(length) = content_length {
        builder = builder.header(header::CONTENT_LENGTH, length);
    }

    let response = builder
        .body(Body::from_stream(body_stream))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}

/// Attachment header. Non-ASCII names get an ASCII `filename` fallback plus
/// an RFC 5987 `filename*` parameter.
fn content_disposition(download_name: &str) -> String {
    if download_name.is_ascii() {
        return format!("attachment; filename=\"{}\"", download_name);
    }

    let fallback: String = download_name
        .chars()
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        utf8_percent_encode(download_name, NON_ALPHANUMERIC)
    )
}
