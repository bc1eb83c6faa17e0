//! Per-request processing options submitted with the upload form.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

/// Perturbations to apply to each generated copy.
///
/// The `randomize_*` flags only take effect when `do_uniqueize` is set;
/// `do_audio_antitranscribe` works on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UniqueizeOptions {
    pub do_uniqueize: bool,
    pub do_audio_antitranscribe: bool,
    pub randomize_resolution: bool,
    pub randomize_volume: bool,
    pub randomize_gamma: bool,
    pub randomize_saturation: bool,
    pub randomize_brightness: bool,
}

impl UniqueizeOptions {
    /// Form field names accepted as boolean flags.
    pub const FIELDS: [&'static str; 7] = [
        "do_uniqueize",
        "do_audio_antitranscribe",
        "randomize_resolution",
        "randomize_volume",
        "randomize_gamma",
        "randomize_saturation",
        "randomize_brightness",
    ];

    /// Set the flag named by a form field. Returns `false` for unknown names.
    pub fn set_flag(&mut self, field: &str, value: bool) -> bool {
        let flag = match field {
            "do_uniqueize" => &mut self.do_uniqueize,
            "do_audio_antitranscribe" => &mut self.do_audio_antitranscribe,
            "randomize_resolution" => &mut self.randomize_resolution,
            "randomize_volume" => &mut self.randomize_volume,
            "randomize_gamma" => &mut self.randomize_gamma,
            "randomize_saturation" => &mut self.randomize_saturation,
            "randomize_brightness" => &mut self.randomize_brightness,
            _ => return false,
        };
        *flag = value;
        true
    }
}

/// Parsed non-file part of the upload form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProcessRequest {
    pub num_copies: u32,
    #[serde(flatten)]
    pub options: UniqueizeOptions,
}

impl Default for ProcessRequest {
    fn default() -> Self {
        Self {
            num_copies: 1,
            options: UniqueizeOptions::default(),
        }
    }
}

impl ProcessRequest {
    /// Reject copy counts outside `1..=max_copies`.
    pub fn validate(&self, max_copies: u32) -> Result<(), AppError> {
        if self.num_copies == 0 {
            return Err(AppError::InvalidInput(
                "num_copies must be at least 1".to_string(),
            ));
        }
        if self.num_copies > max_copies {
            return Err(AppError::InvalidInput(format!(
                "num_copies must not exceed {}",
                max_copies
            )));
        }
        Ok(())
    }
}

/// Parse an HTML form boolean (`true`/`false`, `1`/`0`, `on`/`off`, `yes`/`no`).
pub fn parse_form_bool(field: &str, value: &str) -> Result<bool, AppError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" | "" => Ok(false),
        other => Err(AppError::InvalidInput(format!(
            "Invalid boolean for '{}': '{}'",
            field, other
        ))),
    }
}

pub fn parse_num_copies(value: &str) -> Result<u32, AppError> {
    let trimmed = value.trim();
    let parsed: i64 = trimmed.parse().map_err(|_| {
        AppError::InvalidInput(format!("num_copies must be an integer, got '{}'", trimmed))
    })?;
    // Negative counts are clamped to 0 and rejected by `ProcessRequest::validate`.
    Ok(parsed.clamp(0, u32::MAX as i64) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_form_bool_accepts_common_spellings() {
        for value in ["true", "TRUE", "1", "on", "Yes"] {
            assert!(parse_form_bool("do_uniqueize", value).unwrap(), "{}", value);
        }
        for value in ["false", "0", "off", "no", ""] {
            assert!(!parse_form_bool("do_uniqueize", value).unwrap(), "{}", value);
        }
    }

    #[test]
    fn test_parse_form_bool_rejects_garbage() {
        let err = parse_form_bool("randomize_gamma", "maybe").unwrap_err();
        assert!(err.to_string().contains("randomize_gamma"));
    }

    #[test]
    fn test_parse_num_copies() {
        assert_eq!(parse_num_copies(" 3 ").unwrap(), 3);
        assert_eq!(parse_num_copies("-2").unwrap(), 0);
        assert!(parse_num_copies("three").is_err());
    }

    #[test]
    fn test_set_flag_by_field_name() {
        let mut options = UniqueizeOptions::default();
        for field in UniqueizeOptions::FIELDS {
            assert!(options.set_flag(field, true));
        }
        assert!(options.do_uniqueize && options.randomize_brightness);
        assert!(!options.set_flag("file", true));
    }

    #[test]
    fn test_validate_copy_bounds() {
        let mut request = ProcessRequest::default();
        assert!(request.validate(20).is_ok());

        request.num_copies = 0;
        assert!(request.validate(20).is_err());

        request.num_copies = 21;
        assert!(request.validate(20).is_err());
    }
}
