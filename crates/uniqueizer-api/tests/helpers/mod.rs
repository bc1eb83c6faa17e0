//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p uniqueizer-api`. The encoder is
//! replaced by a small shell script, so the processing tests only run on Unix.

#![allow(dead_code)]

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::sleep;
use uniqueizer_api::setup::{self, routes};
use uniqueizer_api::state::AppState;
use uniqueizer_core::Config;

/// Copies the input (`$3`) to the output (last argument) and records the
/// arguments of every run next to itself.
pub const COPYING_ENCODER: &str = r#"#!/bin/sh
if [ "$1" = "-version" ]; then
  echo "ffmpeg version 6.1-stub Copyright (c) 2000-2023"
  exit 0
fi
printf '%s\n' "$*" >> "$(dirname "$0")/encoder_args.log"
for last; do :; done
cp "$3" "$last"
"#;

pub const FAILING_ENCODER: &str = r#"#!/bin/sh
echo "Invalid data found when processing input" >&2
exit 1
"#;

/// Like `COPYING_ENCODER`, but the second copy fails after leaving a partial file.
pub const SECOND_COPY_FAILS_ENCODER: &str = r#"#!/bin/sh
if [ "$1" = "-version" ]; then
  echo "ffmpeg version 6.1-stub"
  exit 0
fi
for last; do :; done
case "$(basename "$last")" in
  *_clip_2_*)
    echo "partial" > "$last"
    exit 1
    ;;
esac
cp "$3" "$last"
"#;

pub const VIDEO_BYTES: &[u8] = b"\x00\x00\x00\x18ftypmp42 not really a video";

pub const INDEX_HTML: &str = "<!DOCTYPE html><html><body><form action=\"/process/\"></form></body></html>";

/// Test application: server plus the temp directory holding every file it touches.
pub struct TestApp {
    pub server: TestServer,
    pub config: Config,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn upload_dir(&self) -> &Path {
        &self.config.processing.upload_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.processing.output_dir
    }

    /// Argument lines recorded by `COPYING_ENCODER`.
    pub fn encoder_runs(&self) -> Vec<String> {
        let log = self._temp_dir.path().join("encoder_args.log");
        std::fs::read_to_string(log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

fn write_encoder(dir: &Path, script: &str) -> PathBuf {
    let path = dir.join("ffmpeg-stub.sh");
    std::fs::write(&path, script).expect("Failed to write encoder stub");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to make encoder stub executable");
    }
    path
}

/// Setup a test app whose encoder is `encoder_script`.
pub async fn setup_test_app(encoder_script: &str) -> TestApp {
    setup_test_app_with(encoder_script, &[]).await
}

/// Like `setup_test_app`, with extra configuration variables.
pub async fn setup_test_app_with(encoder_script: &str, overrides: &[(&str, &str)]) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let root = temp_dir.path();

    let encoder = write_encoder(root, encoder_script);
    let index = root.join("index.html");
    std::fs::write(&index, INDEX_HTML).expect("Failed to write index page");

    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("UPLOAD_DIR".into(), root.join("uploads").display().to_string());
    vars.insert("OUTPUT_DIR".into(), root.join("output").display().to_string());
    vars.insert("FFMPEG_PATH".into(), encoder.display().to_string());
    vars.insert("INDEX_HTML_PATH".into(), index.display().to_string());
    vars.insert("FFMPEG_TIMEOUT_SECS".into(), "10".into());
    vars.insert("CLEANUP_INTERVAL_SECS".into(), "0".into());
    for (key, value) in overrides {
        vars.insert(key.to_string(), value.to_string());
    }

    let config = Config::from_lookup(|key| vars.get(key).cloned()).expect("Invalid test config");
    setup::prepare_directories(&config)
        .await
        .expect("Failed to create test directories");

    let state = Arc::new(AppState::new(config.clone()));
    let router = routes::setup_routes(&config, state).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp {
        server,
        config,
        _temp_dir: temp_dir,
    }
}

/// Upload form for `clip.mp4` with `num_copies` and the given flags set to `true`.
pub fn video_form(num_copies: &str, flags: &[&str]) -> MultipartForm {
    video_form_named("clip.mp4", num_copies, flags)
}

pub fn video_form_named(filename: &str, num_copies: &str, flags: &[&str]) -> MultipartForm {
    let part = Part::bytes(bytes::Bytes::from_static(VIDEO_BYTES))
        .file_name(filename.to_string())
        .mime_type("video/mp4");
    let mut form = MultipartForm::new()
        .add_text("num_copies", num_copies.to_string())
        .add_part("file", part);
    for flag in flags {
        form = form.add_text(flag.to_string(), "true");
    }
    form
}

pub fn list_files(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .map(|entries| entries.filter_map(|e| e.ok()).map(|e| e.path()).collect())
        .unwrap_or_default()
}

/// Poll until `dir` is empty. Deletion runs on a spawned task after the
/// response body is dropped.
pub async fn wait_until_empty(dir: &Path) -> bool {
    for _ in 0..100 {
        if list_files(dir).is_empty() {
            return true;
        }
        sleep(Duration::from_millis(20)).await;
    }
    false
}
