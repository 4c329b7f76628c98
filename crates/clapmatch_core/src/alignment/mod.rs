//! Audio alignment engine.
//!
//! Detects the time offset between two recordings of the same event
//! (e.g. a camera's scratch track and a separate field recorder) so the
//! two can be synchronized on a timeline.
//!
//! # Architecture
//!
//! The pipeline is a chain of pure stages that the resolver composes:
//!
//! 1. **Decode** (`decode`): FFmpeg decodes each source to a bounded,
//!    mono, fixed-rate waveform through a scoped temporary file.
//!
//! 2. **Dither** (`dither`): a vanishing perturbation keeps the log
//!    energies finite for silent stretches.
//!
//! 3. **Features** (`mfcc` + `filterbank`): framed, windowed, transformed
//!    and decorrelated into one cepstral vector per frame.
//!
//! 4. **Standardize** (`standardize`): each coefficient column rescaled to
//!    zero mean and unit variance.
//!
//! 5. **Correlate** (`correlate`): the shorter feature sequence slides
//!    along the longer one, scoring every candidate lag.
//!
//! 6. **Resolve** (`resolver`): best lag converted to signed seconds with
//!    a z-score confidence.
//!
//! # Usage
//!
//! ```no_run
//! use std::path::Path;
//! use clapmatch_core::alignment::{find_offset, AlignConfig};
//!
//! let config = AlignConfig::default();
//! let result = find_offset(
//!     Path::new("camera.mov"),
//!     Path::new("recorder.wav"),
//!     &config,
//! )?;
//!
//! if result.is_confident() {
//!     println!("shift the recorder track by {:+.3}s", result.offset_seconds);
//! }
//! # Ok::<(), clapmatch_core::alignment::AlignError>(())
//! ```

mod correlate;
mod decode;
mod dither;
mod filterbank;
mod mfcc;
mod resolver;
mod standardize;
pub mod types;

// Re-export main types from the types module
pub use types::{AlignError, AlignResult, FeatureMatrix, OffsetResult, Waveform};

// Re-export decoding
pub use decode::{decode_audio, DEFAULT_MAX_DURATION_S, DEFAULT_SAMPLE_RATE};

// Re-export the dither guard
pub use dither::ensure_non_zero;

// Re-export filterbank construction
pub use filterbank::{Filterbank, FilterbankParams};

// Re-export feature extraction
pub use mfcc::{extract, hop_size};

// Re-export standardization
pub use standardize::standardize;

// Re-export correlation
pub use correlate::cross_correlate;

// Re-export the resolver
pub use resolver::{align_waveforms, find_offset, AlignConfig};
