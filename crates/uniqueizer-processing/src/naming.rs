//! Temp-file and download names for one request.
//!
//! Every file a request writes starts with a random numeric prefix so
//! concurrent uploads of the same file name never collide.

use std::path::{Path, PathBuf};

use rand::Rng;

const PREFIX_RANGE: std::ops::RangeInclusive<u32> = 10000..=99999;
const COPY_SUFFIX_RANGE: std::ops::RangeInclusive<u32> = 1000..=9999;
/// Byte budgets for the stored name. With the `<prefix>_` in front and the
/// `_<index>_<suffix>` of a copy, every path component stays under the
/// usual 255-byte file name limit.
const MAX_STEM_BYTES: usize = 200;
const MAX_EXTENSION_BYTES: usize = 32;
const FALLBACK_FILENAME: &str = "upload";

/// Reduce a client-supplied file name to a safe base name.
///
/// Directory components are dropped and anything other than alphanumerics,
/// `.`, `-` and `_` becomes `_`. Long names lose the end of their stem, never
/// the extension.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim();

    let sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.chars().all(|c| c == '.') {
        return FALLBACK_FILENAME.to_string();
    }

    let (stem, extension) = split_extension(&sanitized);
    format!(
        "{}{}",
        truncate_bytes(stem, MAX_STEM_BYTES),
        truncate_bytes(extension, MAX_EXTENSION_BYTES)
    )
}

/// Longest prefix of `s` that fits in `max_bytes` without splitting a char.
fn truncate_bytes(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Split at the last `.` that is not part of a leading run of dots.
/// The extension keeps its dot; `"clip.mp4"` gives `("clip", ".mp4")`.
fn split_extension(filename: &str) -> (&str, &str) {
    let leading_dots = filename.len() - filename.trim_start_matches('.').len();
    match filename[leading_dots..].rfind('.') {
        Some(idx) => filename.split_at(leading_dots + idx),
        None => (filename, ""),
    }
}

/// Names derived from one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadNames {
    prefix: u32,
    filename: String,
    stem: String,
    extension: String,
}

impl UploadNames {
    /// `filename` must already be sanitized.
    pub fn new(filename: &str, prefix: u32) -> Self {
        let (stem, extension) = split_extension(filename);
        Self {
            prefix,
            filename: filename.to_string(),
            stem: stem.to_string(),
            extension: extension.to_string(),
        }
    }

    pub fn with_random_prefix<R: Rng + ?Sized>(filename: &str, rng: &mut R) -> Self {
        Self::new(filename, rng.random_range(PREFIX_RANGE))
    }

    pub fn prefix(&self) -> u32 {
        self.prefix
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Lowercase extension without the dot, if any.
    pub fn extension(&self) -> Option<String> {
        self.extension
            .strip_prefix('.')
            .filter(|e| !e.is_empty())
            .map(|e| e.to_lowercase())
    }

    pub fn upload_path(&self, upload_dir: &Path) -> PathBuf {
        upload_dir.join(format!("{}_{}", self.prefix, self.filename))
    }

    /// Output path for copy `index` (1-based) with a random 4-digit suffix.
    pub fn copy_path<R: Rng + ?Sized>(&self, output_dir: &Path, index: u32, rng: &mut R) -> PathBuf {
        let suffix = rng.random_range(COPY_SUFFIX_RANGE);
        output_dir.join(format!(
            "{}_{}_{}_{}{}",
            self.prefix, self.stem, index, suffix, self.extension
        ))
    }

    pub fn archive_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{}_{}_processed.zip", self.prefix, self.stem))
    }

    /// Entry name inside the archive: the copy's base name without the
    /// request prefix.
    pub fn archive_entry_name(&self, copy_path: &Path) -> String {
        let base = copy_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let prefix = format!("{}_", self.prefix);
        base.strip_prefix(&prefix).unwrap_or(base).to_string()
    }

    pub fn single_download_name(&self) -> String {
        format!("processed_{}", self.filename)
    }

    pub fn archive_download_name(&self) -> String {
        format!("{}_processed.zip", self.stem)
    }
}
