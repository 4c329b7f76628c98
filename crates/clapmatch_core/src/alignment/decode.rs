//! FFmpeg decode adapter.
//!
//! Produces a bounded-length, fixed-sample-rate, mono waveform from an
//! arbitrary audio container by delegating to an external `ffmpeg` binary.
//! The decoded PCM passes through a uniquely-named temporary file that is
//! removed on every exit path, success or failure.

use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::alignment::types::{AlignError, AlignResult, Waveform};

/// Default sample rate for alignment analysis.
///
/// 8 kHz is sufficient for speech/transient alignment while keeping the
/// feature pipeline cheap.
pub const DEFAULT_SAMPLE_RATE: u32 = 8000;

/// Default maximum duration decoded from each source, in seconds.
pub const DEFAULT_MAX_DURATION_S: f64 = 900.0;

/// Decode a source file to a mono waveform at the target sample rate.
///
/// The audio is:
/// - Converted to mono (channel downmix)
/// - Resampled to the target sample rate
/// - Truncated to at most `max_duration_s` seconds
/// - Written as raw 16-bit PCM to a scoped temporary file, then loaded
///   and scaled into `[-1, 1)`
///
/// # Arguments
/// * `input_path` - Path to the input media file
/// * `sample_rate` - Target sample rate for analysis
/// * `max_duration_s` - Maximum duration to decode in seconds
/// * `ffmpeg_path` - Name or path of the ffmpeg binary to invoke
///
/// # Returns
/// The decoded waveform. Any decode failure, including an empty result,
/// is an [`AlignError::Decode`] for this input.
pub fn decode_audio(
    input_path: &Path,
    sample_rate: u32,
    max_duration_s: f64,
    ffmpeg_path: &str,
) -> AlignResult<Waveform> {
    if !input_path.exists() {
        return Err(AlignError::decode(input_path, "source file not found"));
    }

    // Unique temp path per invocation; deleted when `pcm_file` drops,
    // on every exit path out of this function.
    let pcm_file = tempfile::Builder::new()
        .prefix("clapmatch_")
        .suffix(".pcm")
        .tempfile()?;

    let mut cmd = Command::new(ffmpeg_path);
    cmd.arg("-y") // Overwrite the pre-created temp file
        .arg("-i")
        .arg(input_path)
        .arg("-vn") // No video
        .arg("-ac")
        .arg("1") // Mono
        .arg("-ar")
        .arg(sample_rate.to_string())
        .arg("-t")
        .arg(format!("{:.3}", max_duration_s))
        .arg("-f")
        .arg("s16le") // Raw 16-bit PCM, little endian
        .arg("-acodec")
        .arg("pcm_s16le")
        .arg(pcm_file.path());

    cmd.stderr(Stdio::null()).stdout(Stdio::null());

    tracing::debug!("Running FFmpeg: {:?}", cmd);

    let status = cmd
        .status()
        .map_err(|e| AlignError::decode(input_path, format!("failed to spawn ffmpeg: {}", e)))?;

    if !status.success() {
        return Err(AlignError::decode(
            input_path,
            format!("ffmpeg exited with code: {:?}", status.code()),
        ));
    }

    let bytes = fs::read(pcm_file.path())?;
    let samples = bytes_to_samples(&bytes);

    if samples.is_empty() {
        return Err(AlignError::decode(input_path, "no audio samples decoded"));
    }

    tracing::debug!(
        "Decoded {} samples ({:.2}s) from {}",
        samples.len(),
        samples.len() as f64 / sample_rate as f64,
        input_path.display()
    );

    Ok(Waveform::new(samples, sample_rate))
}

/// Convert raw s16le bytes to f64 samples in `[-1, 1)`.
fn bytes_to_samples(bytes: &[u8]) -> Vec<f64> {
    bytes
        .chunks_exact(2)
        .map(|chunk| {
            let arr: [u8; 2] = chunk.try_into().unwrap();
            i16::from_le_bytes(arr) as f64 / 32768.0
        })
        .collect()
}
