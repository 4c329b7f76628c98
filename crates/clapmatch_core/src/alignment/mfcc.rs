//! MFCC feature extraction.
//!
//! Frames the waveform with half-window hop, applies a Hamming window,
//! takes the FFT magnitude spectrum, condenses it through the triangular
//! filterbank, and decorrelates the log energies with an orthonormal
//! DCT-II. One feature vector per frame.

use std::f64::consts::PI;

use rustfft::{num_complex::Complex, FftPlanner};

use crate::alignment::filterbank::{Filterbank, FilterbankParams};
use crate::alignment::types::{AlignError, AlignResult, FeatureMatrix, Waveform};

/// Extract a feature matrix from a dithered waveform.
///
/// Frames advance by `window_len / 2` samples. A waveform shorter than one
/// window still yields one zero-padded frame, so downstream
/// standardization always has at least one row.
///
/// # Arguments
/// * `waveform` - Dithered mono waveform
/// * `window_len` - Analysis window length in samples
/// * `fft_size` - FFT size; frames are zero-padded up to this length
/// * `nceps` - Number of cepstral coefficients retained per frame
/// * `fb_params` - Filterbank spacing parameters
pub fn extract(
    waveform: &Waveform,
    window_len: usize,
    fft_size: usize,
    nceps: usize,
    fb_params: &FilterbankParams,
) -> AlignResult<FeatureMatrix> {
    if window_len == 0 {
        return Err(AlignError::config("window length must be positive"));
    }
    if fft_size < window_len {
        return Err(AlignError::config(format!(
            "FFT size {} is smaller than window length {}",
            fft_size, window_len
        )));
    }
    if nceps == 0 || nceps > fb_params.filter_count() {
        return Err(AlignError::config(format!(
            "cepstral coefficient count {} must be in 1..={}",
            nceps,
            fb_params.filter_count()
        )));
    }
    if waveform.is_empty() {
        // Precondition violation, same class as a bad numeric parameter:
        // the decode adapter never produces an empty waveform.
        return Err(AlignError::config(
            "waveform must contain at least one sample",
        ));
    }

    let filterbank = Filterbank::build(waveform.sample_rate, fft_size, fb_params)?;
    let window = hamming_window(window_len);
    let hop = hop_size(window_len);

    let samples = &waveform.samples;
    let frame_count = samples.len().div_ceil(hop).max(1);

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(fft_size);

    let mut data = Vec::with_capacity(frame_count * nceps);
    let mut buffer: Vec<Complex<f64>> = vec![Complex::new(0.0, 0.0); fft_size];

    for frame in 0..frame_count {
        let start = frame * hop;
        let available = window_len.min(samples.len() - start);

        // Window the slice, zero-padding the final partial frame.
        buffer.fill(Complex::new(0.0, 0.0));
        for i in 0..available {
            buffer[i] = Complex::new(samples[start + i] * window[i], 0.0);
        }

        fft.process(&mut buffer);

        let spectrum: Vec<f64> = buffer.iter().map(|c| c.norm()).collect();
        let energies = filterbank.apply(&spectrum);

        // Strictly positive thanks to the dither guard.
        let log_energies: Vec<f64> = energies.iter().map(|&e| e.ln()).collect();

        data.extend(dct_ortho(&log_energies, nceps));
    }

    Ok(FeatureMatrix::from_rows(data, frame_count, nceps))
}

/// Frame advance for a given window length.
pub fn hop_size(window_len: usize) -> usize {
    (window_len / 2).max(1)
}

/// Hamming window of the given length.
fn hamming_window(len: usize) -> Vec<f64> {
    if len == 1 {
        return vec![1.0];
    }
    (0..len)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / (len - 1) as f64).cos())
        .collect()
}

/// Orthonormal DCT-II, retaining the first `nceps` coefficients.
fn dct_ortho(input: &[f64], nceps: usize) -> Vec<f64> {
    let n = input.len() as f64;
    (0..nceps)
        .map(|k| {
            let sum: f64 = input
                .iter()
                .enumerate()
                .map(|(i, &x)| x * (PI * k as f64 * (2.0 * i as f64 + 1.0) / (2.0 * n)).cos())
                .sum();
            let scale = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
            scale * sum
        })
        .collect()
}
