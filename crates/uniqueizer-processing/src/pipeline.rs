//! Per-request job: run the encoder once per copy and package the results.

use std::path::{Path, PathBuf};

use rand::Rng;
use uniqueizer_core::{ProcessRequest, UniqueizeOptions};

use crate::archive::create_zip_archive;
use crate::cleanup::{remove_files, CleanupGuard};
use crate::error::ProcessingError;
use crate::ffmpeg::{build_ffmpeg_args, FFmpegService, FilterParams};
use crate::naming::UploadNames;

pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";
pub const ZIP_CONTENT_TYPE: &str = "application/zip";

/// One planned encoder run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyPlan {
    pub index: u32,
    pub output_path: PathBuf,
    pub params: FilterParams,
}

/// File to send back to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedOutput {
    pub path: PathBuf,
    pub download_name: String,
    pub content_type: &'static str,
    pub copies: usize,
}

#[derive(Clone)]
pub struct UniqueizePipeline {
    ffmpeg: FFmpegService,
    output_dir: PathBuf,
}

impl UniqueizePipeline {
    pub fn new(ffmpeg: FFmpegService, output_dir: PathBuf) -> Self {
        Self { ffmpeg, output_dir }
    }

    pub fn ffmpeg(&self) -> &FFmpegService {
        &self.ffmpeg
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Draw output names and filter parameters for every requested copy.
    ///
    /// All randomness happens here so the async part never holds an RNG.
    pub fn plan_copies<R: Rng + ?Sized>(
        &self,
        names: &UploadNames,
        request: &ProcessRequest,
        rng: &mut R,
    ) -> Vec<CopyPlan> {
        (1..=request.num_copies)
            .map(|index| CopyPlan {
                index,
                output_path: names.copy_path(&self.output_dir, index, rng),
                params: FilterParams::generate(&request.options, rng),
            })
            .collect()
    }

    /// Run every planned copy in order, then package the survivors.
    ///
    /// Every file created along the way is registered with `cleanup`, so the
    /// caller decides when they disappear.
    #[tracing::instrument(skip_all, fields(input = %input.display(), copies = plans.len()))]
    pub async fn execute(
        &self,
        input: &Path,
        names: &UploadNames,
        options: &UniqueizeOptions,
        plans: Vec<CopyPlan>,
        cleanup: &mut CleanupGuard,
    ) -> Result<ProcessedOutput, ProcessingError> {
        let attempted = plans.len() as u32;
        let mut generated = Vec::with_capacity(plans.len());

        for plan in plans {
            let args = build_ffmpeg_args(input, &plan.output_path, options, &plan.params);
            tracing::info!(copy = plan.index, params = ?plan.params, "Running ffmpeg");

            match self.ffmpeg.run(&args).await {
                Ok(()) => {
                    cleanup.track(&plan.output_path);
                    generated.push(plan.output_path);
                }
                Err(e) => {
                    tracing::warn!(copy = plan.index, error = %e, "ffmpeg failed, skipping copy");
                    // The encoder may leave a truncated file behind.
                    remove_files(vec![plan.output_path]).await;
                }
            }
        }

        match generated.len() {
            0 => Err(ProcessingError::NoOutput { attempted }),
            1 => {
                let path = generated.remove(0);
                Ok(ProcessedOutput {
                    path,
                    download_name: names.single_download_name(),
                    content_type: VIDEO_CONTENT_TYPE,
                    copies: 1,
                })
            }
            copies => {
                let archive_path = names.archive_path(&self.output_dir);
                cleanup.track(&archive_path);

                let entries = generated
                    .iter()
                    .map(|path| (path.clone(), names.archive_entry_name(path)))
                    .collect();
                create_zip_archive(entries, archive_path.clone())
                    .await
                    .map_err(ProcessingError::Archive)?;

                tracing::info!(copies, archive = %archive_path.display(), "Packaged copies");
                Ok(ProcessedOutput {
                    path: archive_path,
                    download_name: names.archive_download_name(),
                    content_type: ZIP_CONTENT_TYPE,
                    copies,
                })
            }
        }
    }
}
