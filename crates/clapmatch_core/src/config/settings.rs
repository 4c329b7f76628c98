//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Every field carries a serde default so a partial file loads cleanly.

use serde::{Deserialize, Serialize};

use crate::alignment::{AlignConfig, FilterbankParams, DEFAULT_MAX_DURATION_S, DEFAULT_SAMPLE_RATE};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Analysis settings.
    #[serde(default)]
    pub analysis: AnalysisSettings,

    /// External decoder settings.
    #[serde(default)]
    pub decode: DecodeSettings,
}

impl Settings {
    /// Convert the settings into an engine configuration.
    pub fn align_config(&self) -> AlignConfig {
        AlignConfig {
            sample_rate: self.analysis.sample_rate_hz,
            max_duration_s: self.analysis.max_duration_s,
            correlation_window_frames: self.analysis.correlation_window_frames,
            window_len: self.analysis.window_length_samples,
            fft_size: self.analysis.fft_size,
            nceps: self.analysis.cepstral_coefficients,
            filterbank: FilterbankParams::default(),
            ffmpeg_path: self.decode.ffmpeg_path.clone(),
        }
    }
}

/// Alignment analysis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Analysis sample rate in Hz.
    #[serde(default = "default_sample_rate")]
    pub sample_rate_hz: u32,

    /// Maximum duration analyzed per source, in seconds.
    #[serde(default = "default_max_duration")]
    pub max_duration_s: f64,

    /// Correlation window size in feature frames.
    #[serde(default = "default_correlation_window")]
    pub correlation_window_frames: usize,

    /// Analysis window length in samples.
    #[serde(default = "default_window_length")]
    pub window_length_samples: usize,

    /// FFT size in samples.
    #[serde(default = "default_fft_size")]
    pub fft_size: usize,

    /// Cepstral coefficients retained per frame.
    #[serde(default = "default_cepstral_coefficients")]
    pub cepstral_coefficients: usize,
}

fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

fn default_max_duration() -> f64 {
    DEFAULT_MAX_DURATION_S
}

fn default_correlation_window() -> usize {
    1000
}

fn default_window_length() -> usize {
    256
}

fn default_fft_size() -> usize {
    512
}

fn default_cepstral_coefficients() -> usize {
    13
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            sample_rate_hz: default_sample_rate(),
            max_duration_s: default_max_duration(),
            correlation_window_frames: default_correlation_window(),
            window_length_samples: default_window_length(),
            fft_size: default_fft_size(),
            cepstral_coefficients: default_cepstral_coefficients(),
        }
    }
}

/// External decoder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodeSettings {
    /// Name or path of the ffmpeg binary to invoke.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

impl Default for DecodeSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_defaults() {
        let settings = Settings::default();
        let config = settings.align_config();

        assert_eq!(config.sample_rate, 8000);
        assert_eq!(config.max_duration_s, 900.0);
        assert_eq!(config.correlation_window_frames, 1000);
        assert_eq!(config.window_len, 256);
        assert_eq!(config.fft_size, 512);
        assert_eq!(config.nceps, 13);
        assert_eq!(config.ffmpeg_path, "ffmpeg");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let toml_str = r#"
            [analysis]
            sample_rate_hz = 16000
        "#;

        let settings: Settings = toml::from_str(toml_str).unwrap();

        assert_eq!(settings.analysis.sample_rate_hz, 16000);
        assert_eq!(settings.analysis.fft_size, 512);
        assert_eq!(settings.decode.ffmpeg_path, "ffmpeg");
    }

    #[test]
    fn settings_round_trip_through_toml() {
        let mut settings = Settings::default();
        settings.analysis.max_duration_s = 120.0;
        settings.decode.ffmpeg_path = "/usr/local/bin/ffmpeg".to_string();

        let serialized = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&serialized).unwrap();

        assert_eq!(parsed.analysis.max_duration_s, 120.0);
        assert_eq!(parsed.decode.ffmpeg_path, "/usr/local/bin/ffmpeg");
    }
}
