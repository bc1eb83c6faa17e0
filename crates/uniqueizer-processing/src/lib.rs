//! Uniqueizer Processing Library
//!
//! Everything between a stored upload and the file handed back to the client:
//! - randomized filter parameters and filter-chain strings
//! - encoder argument lists and the encoder runner
//! - temp-file naming, archive packaging and cleanup
//! - the per-request pipeline tying them together

pub mod archive;
pub mod cleanup;
pub mod error;
pub mod ffmpeg;
pub mod naming;
pub mod pipeline;

pub use archive::create_zip_archive;
pub use cleanup::{remove_files, sweep_stale_files, CleanupGuard, StaleFileSweeper};
pub use error::ProcessingError;
pub use ffmpeg::{build_ffmpeg_args, FFmpegService, FilterParams};
pub use naming::{sanitize_filename, UploadNames};
pub use pipeline::{CopyPlan, ProcessedOutput, UniqueizePipeline};
