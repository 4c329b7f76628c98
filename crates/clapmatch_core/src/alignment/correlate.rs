//! Feature-space cross-correlation.
//!
//! Slides one standardized feature sequence against the other and scores
//! every candidate lag. No I/O, no side effects.

use crate::alignment::types::FeatureMatrix;

/// Correlate two standardized feature sequences over all candidate lags.
///
/// `a` must be the longer sequence (callers swap arguments if needed).
/// For each lag `k` the overlapping frames of `a[k..k+window]` and
/// `b[..window]` are multiplied element-wise, summed over the frame axis
/// into one accumulator per coefficient, and the Euclidean norm of those
/// sums is the lag's score.
///
/// Returns one non-negative score per lag, `a.frames() - window + 1` in
/// total. If the window does not fit within `a` there is no valid lag to
/// test and the result is empty; the caller must treat that as "no
/// alignment found", not as an error.
pub fn cross_correlate(a: &FeatureMatrix, b: &FeatureMatrix, window: usize) -> Vec<f64> {
    debug_assert_eq!(a.coeffs(), b.coeffs(), "coefficient count mismatch");
    debug_assert!(a.frames() >= b.frames(), "longer sequence must come first");

    if window == 0 || window > a.frames() {
        return vec![];
    }

    let lag_count = a.frames() - window + 1;
    let span = window.min(b.frames());
    let coeffs = a.coeffs();

    let mut scores = Vec::with_capacity(lag_count);
    let mut sums = vec![0.0; coeffs];

    for lag in 0..lag_count {
        sums.fill(0.0);
        for t in 0..span {
            let a_row = a.row(lag + t);
            let b_row = b.row(t);
            for c in 0..coeffs {
                sums[c] += a_row[c] * b_row[c];
            }
        }
        scores.push(sums.iter().map(|s| s * s).sum::<f64>().sqrt());
    }

    scores
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::alignment::types::FeatureMatrix;

    fn random_matrix(frames: usize, coeffs: usize, seed: u64) -> FeatureMatrix {
        let mut rng = SmallRng::seed_from_u64(seed);
        let data: Vec<f64> = (0..frames * coeffs)
            .map(|_| rng.gen_range(-1.0..1.0))
            .collect();
        FeatureMatrix::from_rows(data, frames, coeffs)
    }

    #[test]
    fn returns_one_score_per_lag() {
        let a = random_matrix(100, 4, 1);
        let b = random_matrix(80, 4, 2);

        let scores = cross_correlate(&a, &b, 30);

        assert_eq!(scores.len(), 100 - 30 + 1);
        assert!(scores.iter().all(|&s| s >= 0.0));
    }

    #[test]
    fn returns_empty_when_window_does_not_fit() {
        let a = random_matrix(20, 4, 3);
        let b = random_matrix(10, 4, 4);

        assert!(cross_correlate(&a, &b, 21).is_empty());
        assert!(cross_correlate(&a, &b, 0).is_empty());
    }

    #[test]
    fn window_equal_to_frames_gives_single_lag() {
        let a = random_matrix(25, 4, 5);
        let b = random_matrix(25, 4, 6);

        let scores = cross_correlate(&a, &b, 25);

        assert_eq!(scores.len(), 1);
    }

    #[test]
    fn embedded_segment_peaks_at_its_lag() {
        let a = random_matrix(200, 6, 7);

        // b is a copy of a's frames 40..100.
        let window = 60;
        let embed_at = 40;
        let mut data = Vec::new();
        for f in embed_at..embed_at + window {
            data.extend_from_slice(a.row(f));
        }
        let b = FeatureMatrix::from_rows(data, window, 6);

        let scores = cross_correlate(&a, &b, window);

        let (peak_lag, _) = scores
            .iter()
            .enumerate()
            .max_by(|(_, x), (_, y)| x.partial_cmp(y).unwrap())
            .unwrap();

        assert_eq!(peak_lag, embed_at);
    }

    #[test]
    fn short_second_sequence_still_scores_all_lags() {
        let a = random_matrix(100, 4, 8);
        let b = random_matrix(20, 4, 9); // Shorter than the window

        let scores = cross_correlate(&a, &b, 50);

        // Lag count comes from the longer sequence; the product just runs
        // over the frames b actually has.
        assert_eq!(scores.len(), 100 - 50 + 1);
        assert!(scores.iter().all(|&s| s.is_finite()));
    }
}
