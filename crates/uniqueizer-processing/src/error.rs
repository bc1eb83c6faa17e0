use std::io;

/// Failures while running the encoder or packaging its output
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Failed to spawn encoder '{path}': {source}")]
    Spawn {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Encoder timed out after {0} seconds")]
    Timeout(u64),

    #[error("Encoder exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("I/O error while waiting for encoder: {0}")]
    Io(#[from] io::Error),

    #[error("Encoder pool is closed")]
    PoolClosed,

    #[error("No copies were produced ({attempted} attempted)")]
    NoOutput { attempted: u32 },

    #[error("Failed to package outputs: {0}")]
    Archive(#[source] anyhow::Error),
}
