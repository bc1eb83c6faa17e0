//! Temp-file deletion: per-request guards and a periodic stale-file sweep.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::time::interval;

/// Best-effort removal. Missing files are ignored; other failures are logged.
pub async fn remove_files(paths: Vec<PathBuf>) {
    for path in paths {
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!(path = %path.display(), "Removed temporary file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove temporary file")
            }
        }
    }
}

fn remove_files_blocking(paths: Vec<PathBuf>) {
    for path in paths {
        match std::fs::remove_file(&path) {
            Ok(()) => tracing::debug!(path = %path.display(), "Removed temporary file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove temporary file")
            }
        }
    }
}

/// Deletes every tracked path when dropped.
///
/// Handlers move the guard into the response body so the files outlive the
/// transfer and are removed once the body is finished or abandoned.
#[derive(Debug, Default)]
pub struct CleanupGuard {
    paths: Vec<PathBuf>,
}

impl CleanupGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, path: impl Into<PathBuf>) {
        self.paths.push(path.into());
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Stop tracking everything and hand the paths back.
    pub fn disarm(&mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.paths)
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        let paths = self.disarm();
        if paths.is_empty() {
            return;
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(remove_files(paths));
            }
            Err(_) => remove_files_blocking(paths),
        }
    }
}

/// Delete regular files in `dir` whose last modification is at least
/// `max_age` ago. Returns how many were removed.
pub async fn sweep_stale_files(dir: &Path, max_age: Duration) -> Result<usize, anyhow::Error> {
    let mut removed = 0;
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    while let Some(entry) = entries.next_entry().await? {
        let metadata = match entry.metadata().await {
            Ok(metadata) => metadata,
            Err(_) => continue,
        };
        if !metadata.is_file() {
            continue;
        }

        let age = metadata
            .modified()
            .ok()
            .and_then(|modified| modified.elapsed().ok())
            .unwrap_or_default();
        if age < max_age {
            continue;
        }

        let path = entry.path();
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                removed += 1;
                tracing::debug!(path = %path.display(), age_secs = age.as_secs(), "Removed stale file");
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove stale file")
            }
        }
    }

    Ok(removed)
}

/// Periodically removes files left behind by requests that never finished
/// (crashes, aborted connections before the guard was armed).
#[derive(Debug, Clone)]
pub struct StaleFileSweeper {
    dirs: Vec<PathBuf>,
    max_age: Duration,
    every: Duration,
}

impl StaleFileSweeper {
    pub fn new(dirs: Vec<PathBuf>, max_age: Duration, every: Duration) -> Self {
        Self {
            dirs,
            max_age,
            every,
        }
    }

    #[tracing::instrument(skip(self), fields(cleanup.operation = "sweep_stale"))]
    pub async fn sweep_once(&self) -> usize {
        let mut total = 0;
        for dir in &self.dirs {
            match sweep_stale_files(dir, self.max_age).await {
                Ok(count) => total += count,
                Err(e) => {
                    tracing::error!(dir = %dir.display(), error = %e, "Failed to sweep directory")
                }
            }
        }
        total
    }

    /// Start the background sweep loop.
    /// Returns a JoinHandle for graceful shutdown
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut sweep_interval = interval(self.every);

            loop {
                sweep_interval.tick().await;

                let removed = self.sweep_once().await;
                if removed > 0 {
                    tracing::info!(removed, "Stale file sweep completed");
                } else {
                    tracing::debug!("Stale file sweep found nothing to remove");
                }
            }
        })
    }
}
