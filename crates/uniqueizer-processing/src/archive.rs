use anyhow::{Context, Result};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Sanitize filename for archive entry to prevent path traversal.
/// Extracts only the base name (strips path components like `../`).
fn sanitize_archive_filename(filename: &str, fallback: &str) -> String {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .unwrap_or(fallback)
        .to_string()
}

/// Write a ZIP archive at `dest` with one stored entry per `(source, entry_name)`.
///
/// Video data is already compressed, so entries are stored rather than
/// deflated. Runs on the blocking pool.
pub async fn create_zip_archive(entries: Vec<(PathBuf, String)>, dest: PathBuf) -> Result<()> {
    tokio::task::spawn_blocking(move || write_zip(&entries, &dest))
        .await
        .context("ZIP writer task panicked")?
}

fn write_zip(entries: &[(PathBuf, String)], dest: &Path) -> Result<()> {
    use zip::write::{FileOptions, ZipWriter};
    use zip::CompressionMethod;

    let file = File::create(dest)
        .with_context(|| format!("Failed to create archive: {}", dest.display()))?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .unix_permissions(0o644)
        .large_file(true);

    for (index, (source, entry_name)) in entries.iter().enumerate() {
        let safe_name = sanitize_archive_filename(entry_name, &format!("copy_{}", index + 1));

        let mut input = File::open(source)
            .with_context(|| format!("Failed to open file for archiving: {}", source.display()))?;

        zip.start_file(safe_name.as_str(), options)
            .with_context(|| format!("Failed to add file to ZIP: {}", safe_name))?;
        std::io::copy(&mut input, &mut zip)
            .with_context(|| format!("Failed to write file data to ZIP: {}", safe_name))?;
    }

    zip.finish().context("Failed to finalize ZIP archive")?;
    Ok(())
}
