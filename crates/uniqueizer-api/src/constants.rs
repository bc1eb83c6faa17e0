//! API constants

use std::time::Duration;

/// Path of the upload endpoint. Served with and without a trailing slash.
pub const PROCESS_PATH: &str = "/process";

pub const OPENAPI_PATH: &str = "/api/openapi.json";

/// Multipart field carrying the video.
pub const FILE_FIELD: &str = "file";

pub const NUM_COPIES_FIELD: &str = "num_copies";

/// Room on top of the upload limit for boundaries and the option fields.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Readiness check budget for `ffmpeg -version`.
pub const READINESS_TIMEOUT: Duration = Duration::from_secs(5);

pub const SERVICE_NAME: &str = "uniqueizer-api";
