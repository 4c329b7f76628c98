//! Offset resolution.
//!
//! Orchestrates the alignment pipeline: decode both inputs, dither,
//! extract and standardize features, slide the shorter sequence along the
//! longer one, and convert the best lag into a signed offset in seconds
//! with a z-score confidence.

use std::path::Path;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::alignment::correlate::cross_correlate;
use crate::alignment::decode::{decode_audio, DEFAULT_MAX_DURATION_S, DEFAULT_SAMPLE_RATE};
use crate::alignment::dither::ensure_non_zero;
use crate::alignment::filterbank::{Filterbank, FilterbankParams};
use crate::alignment::mfcc::{extract, hop_size};
use crate::alignment::standardize::standardize;
use crate::alignment::types::{AlignError, AlignResult, OffsetResult, Waveform};

/// Fixed dither seed. Repeated calls on identical inputs give identical
/// results; callers needing independent perturbations go through
/// [`crate::alignment::dither::ensure_non_zero`] with their own RNG.
const DITHER_SEED: u64 = 0x5EED_0001;

/// Configuration for offset resolution.
#[derive(Debug, Clone)]
pub struct AlignConfig {
    /// Analysis sample rate in Hz.
    pub sample_rate: u32,
    /// Maximum duration decoded from each source, in seconds.
    pub max_duration_s: f64,
    /// Correlation window size in feature frames.
    pub correlation_window_frames: usize,
    /// Analysis window length in samples.
    pub window_len: usize,
    /// FFT size; at least the window length.
    pub fft_size: usize,
    /// Cepstral coefficients retained per frame.
    pub nceps: usize,
    /// Filterbank spacing parameters.
    pub filterbank: FilterbankParams,
    /// Name or path of the ffmpeg binary.
    pub ffmpeg_path: String,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            max_duration_s: DEFAULT_MAX_DURATION_S,
            correlation_window_frames: 1000,
            window_len: 256,
            fft_size: 512,
            nceps: 13,
            filterbank: FilterbankParams::default(),
            ffmpeg_path: "ffmpeg".to_string(),
        }
    }
}

impl AlignConfig {
    /// Frame advance in samples implied by the window length.
    pub fn hop(&self) -> usize {
        hop_size(self.window_len)
    }

    /// Validate all numeric parameters.
    ///
    /// Called before any decoding so bad configuration fails fast.
    pub fn validate(&self) -> AlignResult<()> {
        if self.sample_rate == 0 {
            return Err(AlignError::config("sample rate must be positive"));
        }
        if self.max_duration_s <= 0.0 {
            return Err(AlignError::config("maximum duration must be positive"));
        }
        if self.correlation_window_frames == 0 {
            return Err(AlignError::config(
                "correlation window must be at least one frame",
            ));
        }
        if self.window_len == 0 {
            return Err(AlignError::config("window length must be positive"));
        }
        if self.fft_size < self.window_len {
            return Err(AlignError::config(format!(
                "FFT size {} is smaller than window length {}",
                self.fft_size, self.window_len
            )));
        }
        if self.nceps == 0 || self.nceps > self.filterbank.filter_count() {
            return Err(AlignError::config(format!(
                "cepstral coefficient count {} must be in 1..={}",
                self.nceps,
                self.filterbank.filter_count()
            )));
        }
        // Exercises the same checks the extractor will rely on.
        Filterbank::build(self.sample_rate, self.fft_size, &self.filterbank)?;
        Ok(())
    }
}

/// Find the offset between two recordings of the same event.
///
/// Decodes both inputs at the configured rate, trimmed to the configured
/// duration, then runs the in-memory pipeline. The returned offset is
/// signed: positive means `path_b` starts later than `path_a`.
///
/// Returns the soft `(0, 0)` outcome when the correlation window does not
/// fit within the available frames (short or non-overlapping clips are a
/// normal occurrence, not a program error). All other failures propagate
/// as hard errors.
pub fn find_offset(path_a: &Path, path_b: &Path, config: &AlignConfig) -> AlignResult<OffsetResult> {
    config.validate()?;

    let wave_a = decode_audio(
        path_a,
        config.sample_rate,
        config.max_duration_s,
        &config.ffmpeg_path,
    )?;
    let wave_b = decode_audio(
        path_b,
        config.sample_rate,
        config.max_duration_s,
        &config.ffmpeg_path,
    )?;

    align_waveforms(wave_a, wave_b, config)
}

/// Run the alignment pipeline on two already-decoded waveforms.
///
/// Same contract as [`find_offset`] from the dither guard onward. Takes
/// ownership of both waveforms; they are released once features have been
/// extracted.
pub fn align_waveforms(
    mut wave_a: Waveform,
    mut wave_b: Waveform,
    config: &AlignConfig,
) -> AlignResult<OffsetResult> {
    config.validate()?;

    if wave_a.sample_rate != wave_b.sample_rate {
        return Err(AlignError::config(format!(
            "sample rate mismatch: {} vs {}",
            wave_a.sample_rate, wave_b.sample_rate
        )));
    }
    let sample_rate = wave_a.sample_rate;

    let mut rng = SmallRng::seed_from_u64(DITHER_SEED);
    ensure_non_zero(&mut wave_a, &mut rng);
    ensure_non_zero(&mut wave_b, &mut rng);

    let features_a = extract(
        &wave_a,
        config.window_len,
        config.fft_size,
        config.nceps,
        &config.filterbank,
    )?;
    let features_b = extract(
        &wave_b,
        config.window_len,
        config.fft_size,
        config.nceps,
        &config.filterbank,
    )?;
    drop(wave_a);
    drop(wave_b);

    let std_a = standardize(&features_a)?;
    let std_b = standardize(&features_b)?;

    // The correlator wants the longer sequence first. Swapping flips the
    // sign of the reported offset.
    let (longer, shorter, sign) = if std_a.frames() >= std_b.frames() {
        (&std_a, &std_b, 1.0)
    } else {
        (&std_b, &std_a, -1.0)
    };

    let correlation = cross_correlate(longer, shorter, config.correlation_window_frames);

    if correlation.is_empty() {
        tracing::warn!(
            "correlation window of {} frames does not fit in {} frames; no alignment computed",
            config.correlation_window_frames,
            longer.frames()
        );
        return Ok(OffsetResult::none());
    }

    let (peak_lag, peak_value) = correlation
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, &v)| (i, v))
        .unwrap_or((0, 0.0));

    let score = peak_z_score(&correlation, peak_value);

    let hop_seconds = config.hop() as f64 / sample_rate as f64;
    let offset_seconds = sign * peak_lag as f64 * hop_seconds;

    tracing::info!(
        "alignment peak at lag {} of {}: offset {:+.3}s, score {:.2}",
        peak_lag,
        correlation.len(),
        offset_seconds,
        score
    );

    Ok(OffsetResult {
        offset_seconds,
        score,
    })
}

/// Z-score of the peak against the whole correlation curve.
///
/// A flat curve (zero standard deviation, e.g. a single candidate lag)
/// has no meaningful score; report 0.0 rather than NaN.
fn peak_z_score(correlation: &[f64], peak_value: f64) -> f64 {
    let n = correlation.len() as f64;
    let mean = correlation.iter().sum::<f64>() / n;
    let variance = correlation.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    if std_dev > 0.0 {
        (peak_value - mean) / std_dev
    } else {
        0.0
    }
}
