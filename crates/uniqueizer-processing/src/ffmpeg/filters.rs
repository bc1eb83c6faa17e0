//! Randomized perturbation parameters and the filter chains built from them.

use rand::Rng;
use serde::Serialize;
use uniqueizer_core::UniqueizeOptions;

const SIZE_PERCENT_RANGE: std::ops::RangeInclusive<u32> = 100..=110;
const VOLUME_PERCENT_RANGE: std::ops::RangeInclusive<u32> = 100..=110;
const GAMMA_PERCENT_RANGE: std::ops::RangeInclusive<u32> = 90..=100;
const SATURATION_PERCENT_RANGE: std::ops::RangeInclusive<u32> = 100..=115;
const BRIGHTNESS_HUNDREDTHS_RANGE: std::ops::RangeInclusive<u32> = 0..=10;

/// Inverts the right channel so speech-to-text and audio fingerprinting
/// see a phase-cancelled mix.
pub const ANTI_TRANSCRIBE_PAN: &str = "pan=stereo|c0=FL|c1=-1*FR";

const NOISE_FILTER: &str = "noise=alls=1:allf=t";
const SAR_FILTER: &str = "setsar=1";

/// Numeric parameters for one generated copy.
///
/// Percentages are interpolated as `{value}/100` expressions so the encoder
/// evaluates the ratio itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterParams {
    pub size_percent: u32,
    pub volume_percent: u32,
    pub gamma_percent: u32,
    pub saturation_percent: u32,
    pub brightness_hundredths: u32,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            size_percent: 100,
            volume_percent: 100,
            gamma_percent: 100,
            saturation_percent: 100,
            brightness_hundredths: 0,
        }
    }
}

impl FilterParams {
    /// Draw parameters for one copy. Disabled flags keep their neutral value.
    pub fn generate<R: Rng + ?Sized>(options: &UniqueizeOptions, rng: &mut R) -> Self {
        let neutral = Self::default();
        if !options.do_uniqueize {
            return neutral;
        }

        Self {
            size_percent: if options.randomize_resolution {
                rng.random_range(SIZE_PERCENT_RANGE)
            } else {
                neutral.size_percent
            },
            volume_percent: if options.randomize_volume {
                rng.random_range(VOLUME_PERCENT_RANGE)
            } else {
                neutral.volume_percent
            },
            gamma_percent: if options.randomize_gamma {
                rng.random_range(GAMMA_PERCENT_RANGE)
            } else {
                neutral.gamma_percent
            },
            saturation_percent: if options.randomize_saturation {
                rng.random_range(SATURATION_PERCENT_RANGE)
            } else {
                neutral.saturation_percent
            },
            brightness_hundredths: if options.randomize_brightness {
                rng.random_range(BRIGHTNESS_HUNDREDTHS_RANGE)
            } else {
                neutral.brightness_hundredths
            },
        }
    }

    pub fn brightness(&self) -> f64 {
        f64::from(self.brightness_hundredths) / 100.0
    }

    /// Video filters (`-vf`). Empty unless uniqueizing.
    pub fn video_filters(&self, options: &UniqueizeOptions) -> Vec<String> {
        let mut filters = Vec::new();
        if !options.do_uniqueize {
            return filters;
        }

        if options.randomize_resolution {
            // Keep both dimensions even; most encoders reject odd sizes.
            filters.push(format!("scale=ceil(iw*{}/100/2)*2:-2", self.size_percent));
        }

        filters.push(format!(
            "eq=gamma={}/100:saturation={}/100:brightness={}",
            self.gamma_percent,
            self.saturation_percent,
            self.brightness()
        ));
        filters.push(NOISE_FILTER.to_string());
        filters.push(SAR_FILTER.to_string());
        filters
    }

    /// Audio filters (`-af`).
    pub fn audio_filters(&self, options: &UniqueizeOptions) -> Vec<String> {
        let mut filters = Vec::new();

        if options.do_uniqueize && options.randomize_volume {
            filters.push(format!("volume={}/100", self.volume_percent));
        }

        if options.do_audio_antitranscribe {
            filters.push(ANTI_TRANSCRIBE_PAN.to_string());
        }

        filters
    }
}
