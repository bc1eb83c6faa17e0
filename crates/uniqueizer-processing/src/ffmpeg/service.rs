//! FFmpegService - runs the external encoder with a timeout and a global
//! concurrency cap.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::process::Command;
use tokio::sync::Semaphore;

use crate::error::ProcessingError;

/// Number of stderr lines kept when the encoder fails.
const STDERR_TAIL_LINES: usize = 20;

#[derive(Clone)]
pub struct FFmpegService {
    ffmpeg_path: String,
    timeout: Duration,
    permits: Arc<Semaphore>,
}

impl FFmpegService {
    pub fn new(ffmpeg_path: String, timeout: Duration, max_concurrent_jobs: usize) -> Self {
        Self {
            ffmpeg_path,
            timeout,
            permits: Arc::new(Semaphore::new(max_concurrent_jobs.max(1))),
        }
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.ffmpeg_path
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Encoder slots currently free.
    pub fn available_slots(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run the encoder once. The child process is killed if it outlives the
    /// configured timeout.
    pub async fn run(&self, args: &[String]) -> Result<(), ProcessingError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| ProcessingError::PoolClosed)?;

        let child = Command::new(&self.ffmpeg_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProcessingError::Spawn {
                path: self.ffmpeg_path.clone(),
                source,
            })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => return Err(ProcessingError::Timeout(self.timeout.as_secs())),
        };

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(ProcessingError::Failed {
            status: output.status.to_string(),
            stderr: stderr_tail(&stderr, STDERR_TAIL_LINES),
        })
    }

    /// First line of `ffmpeg -version`, used by readiness checks.
    pub async fn version(&self) -> Result<String, ProcessingError> {
        let output = Command::new(&self.ffmpeg_path)
            .arg("-version")
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ProcessingError::Spawn {
                path: self.ffmpeg_path.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProcessingError::Failed {
                status: output.status.to_string(),
                stderr: String::new(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string())
    }
}

fn stderr_tail(stderr: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}
