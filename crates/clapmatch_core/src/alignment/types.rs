//! Core types for audio alignment.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Mono audio decoded from a source file.
#[derive(Debug, Clone)]
pub struct Waveform {
    /// Audio samples as f64 in `[-1, 1)`.
    pub samples: Vec<f64>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl Waveform {
    /// Create a new waveform from samples.
    pub fn new(samples: Vec<f64>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Get the number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the waveform has no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Row-major 2-D matrix of per-frame feature vectors.
///
/// Rows are analysis frames, columns are cepstral coefficient indices.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    data: Vec<f64>,
    frames: usize,
    coeffs: usize,
}

impl FeatureMatrix {
    /// Create a zero-filled matrix.
    pub fn zeros(frames: usize, coeffs: usize) -> Self {
        Self {
            data: vec![0.0; frames * coeffs],
            frames,
            coeffs,
        }
    }

    /// Build a matrix from a flat row-major buffer.
    ///
    /// # Panics
    /// Panics if `data.len() != frames * coeffs`.
    pub fn from_rows(data: Vec<f64>, frames: usize, coeffs: usize) -> Self {
        assert_eq!(
            data.len(),
            frames * coeffs,
            "feature buffer size mismatch: expected {} x {} = {}, got {}",
            frames,
            coeffs,
            frames * coeffs,
            data.len()
        );
        Self {
            data,
            frames,
            coeffs,
        }
    }

    /// Number of frames (rows).
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Number of coefficients per frame (columns).
    pub fn coeffs(&self) -> usize {
        self.coeffs
    }

    /// Get one frame's coefficients.
    pub fn row(&self, frame: usize) -> &[f64] {
        let start = frame * self.coeffs;
        &self.data[start..start + self.coeffs]
    }

    /// Get one frame's coefficients mutably.
    pub fn row_mut(&mut self, frame: usize) -> &mut [f64] {
        let start = frame * self.coeffs;
        &mut self.data[start..start + self.coeffs]
    }

    /// Get a single coefficient value.
    pub fn at(&self, frame: usize, coeff: usize) -> f64 {
        self.data[frame * self.coeffs + coeff]
    }

    /// Check whether every value in the matrix is finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}

/// Result of aligning two recordings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OffsetResult {
    /// Signed offset in seconds. Positive means the second input starts
    /// later than the first.
    pub offset_seconds: f64,
    /// Confidence as the z-score of the best correlation value against the
    /// full correlation curve. Values below [`OffsetResult::LOW_CONFIDENCE`]
    /// are not statistically distinguishable from noise.
    pub score: f64,
}

impl OffsetResult {
    /// Score below which callers should treat the alignment as not found.
    pub const LOW_CONFIDENCE: f64 = 1.0;

    /// The soft "no alignment could be computed" outcome.
    ///
    /// Returned when the correlation window does not fit within the
    /// available frames. Deliberately a value, not an error: short or
    /// non-overlapping clips are a normal occurrence.
    pub fn none() -> Self {
        Self {
            offset_seconds: 0.0,
            score: 0.0,
        }
    }

    /// Whether the score clears the low-confidence threshold.
    pub fn is_confident(&self) -> bool {
        self.score >= Self::LOW_CONFIDENCE
    }
}

/// Error types for alignment operations.
#[derive(Debug, thiserror::Error)]
pub enum AlignError {
    /// External decode failed or produced an empty/corrupt waveform.
    #[error("decode failed for '{path}': {message}")]
    Decode { path: String, message: String },

    /// Invalid numeric configuration, rejected before any decoding.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A feature column had zero variance during standardization.
    #[error("signal too uniform to align: coefficient {coeff} has zero variance")]
    DegenerateSignal { coeff: usize },

    /// IO error while handling temporary decode artifacts.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AlignError {
    /// Create a decode error for the given source path.
    pub fn decode(path: &Path, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Type alias for alignment results.
pub type AlignResult<T> = Result<T, AlignError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waveform_reports_duration() {
        let wave = Waveform::new(vec![0.0; 4000], 8000);
        assert!((wave.duration_secs() - 0.5).abs() < 1e-12);
        assert_eq!(wave.len(), 4000);
        assert!(!wave.is_empty());
    }

    #[test]
    fn feature_matrix_row_access_is_row_major() {
        let mut m = FeatureMatrix::zeros(3, 2);
        m.row_mut(1)[0] = 5.0;
        m.row_mut(1)[1] = 7.0;

        assert_eq!(m.row(0), &[0.0, 0.0]);
        assert_eq!(m.row(1), &[5.0, 7.0]);
        assert_eq!(m.at(1, 1), 7.0);
        assert_eq!(m.frames(), 3);
        assert_eq!(m.coeffs(), 2);
    }

    #[test]
    #[should_panic(expected = "feature buffer size mismatch")]
    fn feature_matrix_rejects_wrong_buffer_size() {
        FeatureMatrix::from_rows(vec![0.0; 5], 2, 3);
    }

    #[test]
    fn offset_result_none_is_zero_zero() {
        let r = OffsetResult::none();
        assert_eq!(r.offset_seconds, 0.0);
        assert_eq!(r.score, 0.0);
        assert!(!r.is_confident());
    }

    #[test]
    fn errors_carry_context() {
        let e = AlignError::decode(Path::new("/tmp/a.mov"), "ffmpeg exited with code 1");
        assert!(e.to_string().contains("/tmp/a.mov"));

        let e = AlignError::DegenerateSignal { coeff: 3 };
        assert!(e.to_string().contains("coefficient 3"));
    }
}
