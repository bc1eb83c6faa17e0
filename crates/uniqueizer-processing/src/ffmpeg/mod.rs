//! External encoder integration

pub mod command;
pub mod filters;
pub mod service;

pub use command::build_ffmpeg_args;
pub use filters::FilterParams;
pub use service::FFmpegService;
