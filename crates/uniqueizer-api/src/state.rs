//! Shared application state.

use uniqueizer_core::Config;
use uniqueizer_processing::{FFmpegService, UniqueizePipeline};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: UniqueizePipeline,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let ffmpeg = FFmpegService::new(
            config.ffmpeg_path().to_string(),
            config.ffmpeg_timeout(),
            config.processing.max_concurrent_jobs,
        );
        let pipeline = UniqueizePipeline::new(ffmpeg, config.processing.output_dir.clone());
        Self { config, pipeline }
    }
}
