//! Multipart parsing for the upload form.

use std::path::{Path, PathBuf};

use anyhow::Context;
use axum::extract::multipart::{Field, Multipart, MultipartError};
use axum::http::StatusCode;
use tokio::io::AsyncWriteExt;
use uniqueizer_core::models::{parse_form_bool, parse_num_copies};
use uniqueizer_core::{AppError, ProcessRequest, UniqueizeOptions};
use uniqueizer_processing::{sanitize_filename, CleanupGuard, UploadNames};

use crate::constants::{FILE_FIELD, NUM_COPIES_FIELD};

/// Limits applied while reading the form.
#[derive(Debug, Clone, Copy)]
pub struct UploadLimits<'a> {
    pub upload_dir: &'a Path,
    pub max_size: usize,
    pub allowed_extensions: &'a [String],
}

/// The stored upload plus the parsed option fields.
#[derive(Debug)]
pub struct UploadedForm {
    pub names: UploadNames,
    pub path: PathBuf,
    pub size: usize,
    pub request: ProcessRequest,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
    }
}

/// Validate file extension
pub fn validate_file_extension(
    names: &UploadNames,
    allowed_extensions: &[String],
) -> Result<String, AppError> {
    let extension = names.extension().unwrap_or_default();

    if !allowed_extensions.contains(&extension) {
        return Err(AppError::InvalidInput(format!(
            "Invalid file extension. Allowed extensions: {}",
            allowed_extensions.join(", ")
        )));
    }

    Ok(extension)
}

/// Copy one multipart field to `path` chunk by chunk, failing once more than
/// `max_size` bytes have arrived.
async fn stream_field_to_file(
    field: &mut Field<'_>,
    path: &Path,
    max_size: usize,
) -> Result<usize, AppError> {
    let mut file = tokio::fs::File::create(path)
        .await
        .with_context(|| format!("Failed to create upload file: {}", path.display()))?;

    let mut written = 0usize;
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        written += chunk.len();
        if written > max_size {
            return Err(AppError::PayloadTooLarge(format!(
                "File size exceeds maximum allowed size of {} MB",
                max_size / 1024 / 1024
            )));
        }
        file.write_all(&chunk)
            .await
            .with_context(|| format!("Failed to write upload file: {}", path.display()))?;
    }

    file.flush()
        .await
        .with_context(|| format!("Failed to flush upload file: {}", path.display()))?;
    Ok(written)
}

/// Read the whole form, storing the `file` field under `limits.upload_dir`.
///
/// The stored path is registered with `cleanup` before the first byte is
/// written, so a rejected or partial upload is removed with the guard.
pub async fn read_process_form(
    mut multipart: Multipart,
    limits: UploadLimits<'_>,
    cleanup: &mut CleanupGuard,
) -> Result<UploadedForm, AppError> {
    let mut request = ProcessRequest::default();
    let mut upload: Option<(UploadNames, PathBuf, usize)> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            FILE_FIELD => {
                if upload.is_some() {
                    return Err(AppError::InvalidInput(
                        "Multiple file fields are not allowed; send exactly one field named 'file'"
                            .to_string(),
                    ));
                }

                let filename = sanitize_filename(field.file_name().unwrap_or_default());
                let names = UploadNames::with_random_prefix(&filename, &mut rand::rng());
                validate_file_extension(&names, limits.allowed_extensions)?;

                let path = names.upload_path(limits.upload_dir);
                cleanup.track(&path);
                let size = stream_field_to_file(&mut field, &path, limits.max_size).await?;
                if size == 0 {
                    return Err(AppError::InvalidInput("Uploaded file is empty".to_string()));
                }

                tracing::debug!(path = %path.display(), size_bytes = size, "Stored upload");
                upload = Some((names, path, size));
            }
            NUM_COPIES_FIELD => {
                let value = field.text().await.map_err(multipart_error)?;
                request.num_copies = parse_num_copies(&value)?;
            }
            flag if UniqueizeOptions::FIELDS.contains(&flag) => {
                let value = field.text().await.map_err(multipart_error)?;
                request.options.set_flag(flag, parse_form_bool(flag, &value)?);
            }
            other => {
                tracing::debug!(field = other, "Ignoring unknown form field");
            }
        }
    }

    let (names, path, size) =
        upload.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;

    Ok(UploadedForm {
        names,
        path,
        size,
        request,
    })
}
