//! Triangular filterbank construction.
//!
//! Filter band edges are spaced linearly in the low band and geometrically
//! above it. Each triangle is normalized to unit area over its span, with
//! peak height `2 / (edge_high - edge_low)`.

use serde::{Deserialize, Serialize};

use crate::alignment::types::{AlignError, AlignResult};

/// Band-edge spacing parameters for the filterbank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterbankParams {
    /// Lowest band edge in Hz.
    pub low_freq: f64,
    /// Spacing between linearly-spaced edges in Hz.
    pub linear_step: f64,
    /// Ratio between consecutive logarithmically-spaced edges.
    pub log_ratio: f64,
    /// Number of linearly-spaced filters.
    pub linear_count: usize,
    /// Number of logarithmically-spaced filters.
    pub log_count: usize,
}

impl Default for FilterbankParams {
    fn default() -> Self {
        Self {
            low_freq: 400.0 / 3.0,
            linear_step: 200.0 / 3.0,
            log_ratio: 1.0711703,
            linear_count: 13,
            log_count: 27,
        }
    }
}

impl FilterbankParams {
    /// Total number of filters.
    pub fn filter_count(&self) -> usize {
        self.linear_count + self.log_count
    }
}

/// A bank of triangular frequency-weighting filters.
///
/// Immutable once constructed. Rows span all `fft_size` bins, where bin `i`
/// corresponds to `i / fft_size * sample_rate` Hz.
#[derive(Debug, Clone)]
pub struct Filterbank {
    /// Row-major weights, `filter_count` rows of `bin_count` columns.
    weights: Vec<f64>,
    filter_count: usize,
    bin_count: usize,
    /// Band-edge frequencies, `filter_count + 2` entries, strictly increasing.
    edges: Vec<f64>,
}

impl Filterbank {
    /// Build a filterbank for the given sample rate and FFT size.
    ///
    /// Pure function of its numeric parameters. Invalid parameters are an
    /// [`AlignError::Config`].
    pub fn build(sample_rate: u32, fft_size: usize, params: &FilterbankParams) -> AlignResult<Self> {
        if sample_rate == 0 {
            return Err(AlignError::config("sample rate must be positive"));
        }
        if fft_size == 0 {
            return Err(AlignError::config("FFT size must be positive"));
        }
        if params.linear_count == 0 {
            return Err(AlignError::config(
                "filterbank needs at least one linearly-spaced filter",
            ));
        }
        if params.low_freq <= 0.0 || params.linear_step <= 0.0 {
            return Err(AlignError::config(
                "filterbank frequencies must be positive",
            ));
        }
        if params.log_ratio <= 1.0 {
            return Err(AlignError::config(
                "filterbank log spacing ratio must exceed 1.0",
            ));
        }

        let filter_count = params.filter_count();
        let edge_count = filter_count + 2;

        // Linear edges first, then geometric growth from the last linear edge.
        let mut edges = Vec::with_capacity(edge_count);
        for i in 0..params.linear_count {
            edges.push(params.low_freq + i as f64 * params.linear_step);
        }
        let pivot = edges[edges.len() - 1];
        for i in 1..=(edge_count - edges.len()) {
            edges.push(pivot * params.log_ratio.powi(i as i32));
        }

        let bin_hz = sample_rate as f64 / fft_size as f64;
        let mut weights = vec![0.0; filter_count * fft_size];

        for filter in 0..filter_count {
            let low = edges[filter];
            let center = edges[filter + 1];
            let high = edges[filter + 2];
            let height = 2.0 / (high - low);

            let row = &mut weights[filter * fft_size..(filter + 1) * fft_size];
            for (bin, weight) in row.iter_mut().enumerate() {
                let freq = bin as f64 * bin_hz;
                if freq >= low && freq < center {
                    *weight = height * (freq - low) / (center - low);
                } else if freq >= center && freq < high {
                    *weight = height * (high - freq) / (high - center);
                }
            }
        }

        Ok(Self {
            weights,
            filter_count,
            bin_count: fft_size,
            edges,
        })
    }

    /// Number of filters (rows).
    pub fn filter_count(&self) -> usize {
        self.filter_count
    }

    /// Number of frequency bins (columns).
    pub fn bin_count(&self) -> usize {
        self.bin_count
    }

    /// One filter's weights over all bins.
    pub fn row(&self, filter: usize) -> &[f64] {
        let start = filter * self.bin_count;
        &self.weights[start..start + self.bin_count]
    }

    /// Band-edge frequencies in Hz, `filter_count + 2` entries.
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Condense a magnitude spectrum into per-filter energies.
    ///
    /// `spectrum` must have `bin_count` entries.
    pub fn apply(&self, spectrum: &[f64]) -> Vec<f64> {
        debug_assert_eq!(spectrum.len(), self.bin_count);
        (0..self.filter_count)
            .map(|filter| {
                self.row(filter)
                    .iter()
                    .zip(spectrum.iter())
                    .map(|(w, s)| w * s)
                    .sum()
            })
            .collect()
    }
}
