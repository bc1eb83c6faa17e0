//! Configuration module
//!
//! Server and processing settings read from the environment (optionally seeded
//! from a `.env` file). Every setting has a default so the service starts with
//! no configuration at all.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const SERVER_PORT: u16 = 8000;
const HTTP_CONCURRENCY_LIMIT: usize = 1000;
const FFMPEG_TIMEOUT_SECS: u64 = 300;
const MAX_CONCURRENT_JOBS: usize = 2;
const MAX_COPIES: u32 = 20;
const MAX_UPLOAD_SIZE_MB: usize = 500;
const CLEANUP_INTERVAL_SECS: u64 = 600;
const STALE_FILE_MAX_AGE_SECS: u64 = 3600;
const VIDEO_ALLOWED_EXTENSIONS: &str = "mp4,mov,avi,webm,mkv,m4v";

/// HTTP server settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub http_concurrency_limit: usize,
    pub index_html_path: PathBuf,
}

/// Encoder and temp-file settings
#[derive(Clone, Debug)]
pub struct ProcessingConfig {
    pub ffmpeg_path: String,
    pub ffmpeg_timeout_secs: u64,
    pub max_concurrent_jobs: usize,
    pub max_copies: u32,
    pub max_upload_size_bytes: usize,
    pub video_allowed_extensions: Vec<String>,
    pub upload_dir: PathBuf,
    pub output_dir: PathBuf,
    /// 0 disables the periodic sweep of stale temp files.
    pub cleanup_interval_secs: u64,
    pub stale_file_max_age_secs: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub processing: ProcessingConfig,
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_list(value: Option<String>, default: &str) -> Vec<String> {
    value
        .unwrap_or_else(|| default.to_string())
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let server_port = match lookup("PORT") {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => SERVER_PORT,
        };

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port,
            cors_origins,
            environment,
            http_concurrency_limit: parse_or(
                lookup("HTTP_CONCURRENCY_LIMIT"),
                HTTP_CONCURRENCY_LIMIT,
            )
            .max(1),
            index_html_path: lookup("INDEX_HTML_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("static/index.html")),
        };

        let max_upload_size_mb: usize =
            parse_or(lookup("MAX_UPLOAD_SIZE_MB"), MAX_UPLOAD_SIZE_MB);
        let max_upload_size_bytes = max_upload_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| anyhow::anyhow!("MAX_UPLOAD_SIZE_MB is too large"))?;

        let processing = ProcessingConfig {
            ffmpeg_path: lookup("FFMPEG_PATH").unwrap_or_else(|| "ffmpeg".to_string()),
            ffmpeg_timeout_secs: parse_or(lookup("FFMPEG_TIMEOUT_SECS"), FFMPEG_TIMEOUT_SECS),
            max_concurrent_jobs: parse_or(lookup("MAX_CONCURRENT_JOBS"), MAX_CONCURRENT_JOBS),
            max_copies: parse_or(lookup("MAX_COPIES"), MAX_COPIES),
            max_upload_size_bytes,
            video_allowed_extensions: parse_list(
                lookup("VIDEO_ALLOWED_EXTENSIONS"),
                VIDEO_ALLOWED_EXTENSIONS,
            ),
            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads")),
            output_dir: lookup("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("output")),
            cleanup_interval_secs: parse_or(lookup("CLEANUP_INTERVAL_SECS"), CLEANUP_INTERVAL_SECS),
            stale_file_max_age_secs: parse_or(
                lookup("STALE_FILE_MAX_AGE_SECS"),
                STALE_FILE_MAX_AGE_SECS,
            ),
        };

        let config = Config { base, processing };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.processing.ffmpeg_path.trim().is_empty() {
            return Err(anyhow::anyhow!("FFMPEG_PATH must not be empty"));
        }

        if self.processing.ffmpeg_timeout_secs == 0 {
            return Err(anyhow::anyhow!("FFMPEG_TIMEOUT_SECS must be greater than 0"));
        }

        if self.processing.max_concurrent_jobs == 0 {
            return Err(anyhow::anyhow!("MAX_CONCURRENT_JOBS must be greater than 0"));
        }

        if self.processing.max_copies == 0 {
            return Err(anyhow::anyhow!("MAX_COPIES must be greater than 0"));
        }

        if self.processing.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }

        if self.processing.video_allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!(
                "VIDEO_ALLOWED_EXTENSIONS must list at least one extension"
            ));
        }

        if self.processing.upload_dir == self.processing.output_dir {
            return Err(anyhow::anyhow!("UPLOAD_DIR and OUTPUT_DIR must differ"));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.processing.ffmpeg_path
    }

    pub fn ffmpeg_timeout(&self) -> Duration {
        Duration::from_secs(self.processing.ffmpeg_timeout_secs)
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.processing.max_upload_size_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, anyhow::Error> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.server_port(), 8000);
        assert_eq!(config.ffmpeg_path(), "ffmpeg");
        assert_eq!(config.ffmpeg_timeout(), Duration::from_secs(300));
        assert_eq!(config.processing.max_copies, 20);
        assert_eq!(config.max_upload_size_bytes(), 500 * 1024 * 1024);
        assert_eq!(config.processing.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.processing.output_dir, PathBuf::from("output"));
        assert_eq!(config.cors_origins(), &["*".to_string()]);
        assert!(config
            .processing
            .video_allowed_extensions
            .contains(&"mp4".to_string()));
        assert!(!config.is_production());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "9100"),
            ("FFMPEG_PATH", "/opt/ffmpeg/bin/ffmpeg"),
            ("MAX_COPIES", "5"),
            ("VIDEO_ALLOWED_EXTENSIONS", "MP4, mov"),
            ("ENVIRONMENT", "Production"),
            ("CORS_ORIGINS", "https://app.example.com"),
        ])
        .unwrap();
        assert_eq!(config.server_port(), 9100);
        assert_eq!(config.ffmpeg_path(), "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(config.processing.max_copies, 5);
        assert_eq!(
            config.processing.video_allowed_extensions,
            vec!["mp4".to_string(), "mov".to_string()]
        );
        assert!(config.is_production());
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        assert!(config_from(&[("PORT", "not-a-port")]).is_err());
    }

    #[test]
    fn test_unparseable_numbers_fall_back_to_defaults() {
        let config = config_from(&[("FFMPEG_TIMEOUT_SECS", "soon")]).unwrap();
        assert_eq!(config.processing.ffmpeg_timeout_secs, 300);
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        assert!(config_from(&[("MAX_COPIES", "0")]).is_err());
        assert!(config_from(&[("MAX_CONCURRENT_JOBS", "0")]).is_err());
        assert!(config_from(&[("FFMPEG_TIMEOUT_SECS", "0")]).is_err());
    }

    #[test]
    fn test_wildcard_cors_rejected_in_production() {
        assert!(config_from(&[("ENVIRONMENT", "prod")]).is_err());
    }

    #[test]
    fn test_oversized_upload_limit_is_rejected() {
        let huge = usize::MAX.to_string();
        let err = config_from(&[("MAX_UPLOAD_SIZE_MB", huge.as_str())]).unwrap_err();
        assert!(err.to_string().contains("MAX_UPLOAD_SIZE_MB"));
        assert_eq!(
            config_from(&[("MAX_UPLOAD_SIZE_MB", "2")])
                .unwrap()
                .max_upload_size_bytes(),
            2 * 1024 * 1024
        );
    }

    #[test]
    fn test_validate_rejects_shared_directories() {
        assert!(config_from(&[("UPLOAD_DIR", "tmp"), ("OUTPUT_DIR", "tmp")]).is_err());
    }
}
