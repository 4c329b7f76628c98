//! Feature standardization.
//!
//! Rescales each coefficient column to zero mean and unit standard
//! deviation across all frames of one signal, so the cross-correlation
//! compares spectral shape rather than absolute level.

use crate::alignment::types::{AlignError, AlignResult, FeatureMatrix};

/// Standardize every column of a feature matrix.
///
/// A column with zero variance (a constant coefficient across every frame,
/// possible for a near-silent or perfectly periodic signal) is an
/// [`AlignError::DegenerateSignal`], never a NaN or infinite output.
pub fn standardize(features: &FeatureMatrix) -> AlignResult<FeatureMatrix> {
    let frames = features.frames();
    let coeffs = features.coeffs();
    let mut out = FeatureMatrix::zeros(frames, coeffs);

    for coeff in 0..coeffs {
        let mean = (0..frames).map(|f| features.at(f, coeff)).sum::<f64>() / frames as f64;
        let variance = (0..frames)
            .map(|f| {
                let d = features.at(f, coeff) - mean;
                d * d
            })
            .sum::<f64>()
            / frames as f64;
        let std_dev = variance.sqrt();

        if std_dev == 0.0 {
            return Err(AlignError::DegenerateSignal { coeff });
        }

        for frame in 0..frames {
            out.row_mut(frame)[coeff] = (features.at(frame, coeff) - mean) / std_dev;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix_from(rows: &[&[f64]]) -> FeatureMatrix {
        let coeffs = rows[0].len();
        let data: Vec<f64> = rows.iter().flat_map(|r| r.iter().copied()).collect();
        FeatureMatrix::from_rows(data, rows.len(), coeffs)
    }

    #[test]
    fn columns_have_zero_mean_unit_std() {
        let m = matrix_from(&[
            &[1.0, 10.0, -3.0],
            &[2.0, 20.0, 5.0],
            &[3.0, 15.0, 0.5],
            &[4.0, 40.0, -7.0],
        ]);

        let std = standardize(&m).unwrap();

        for coeff in 0..std.coeffs() {
            let mean: f64 =
                (0..std.frames()).map(|f| std.at(f, coeff)).sum::<f64>() / std.frames() as f64;
            let var: f64 = (0..std.frames())
                .map(|f| std.at(f, coeff).powi(2))
                .sum::<f64>()
                / std.frames() as f64;

            assert!(mean.abs() < 1e-12, "column {} mean {}", coeff, mean);
            assert!((var - 1.0).abs() < 1e-12, "column {} variance {}", coeff, var);
        }
    }

    #[test]
    fn constant_column_is_degenerate() {
        let m = matrix_from(&[&[1.0, 5.0], &[2.0, 5.0], &[3.0, 5.0]]);

        let err = standardize(&m).unwrap_err();

        assert!(matches!(err, AlignError::DegenerateSignal { coeff: 1 }));
    }

    #[test]
    fn single_frame_matrix_is_degenerate() {
        // One frame means every column is constant by definition.
        let m = matrix_from(&[&[1.0, 2.0]]);

        assert!(matches!(
            standardize(&m),
            Err(AlignError::DegenerateSignal { coeff: 0 })
        ));
    }

    #[test]
    fn output_is_finite_for_varied_input() {
        let m = matrix_from(&[&[0.001, -0.002], &[1000.0, 2000.0], &[-50.0, 3.0]]);

        let std = standardize(&m).unwrap();

        assert!(std.is_finite());
        assert_eq!(std.frames(), 3);
        assert_eq!(std.coeffs(), 2);
    }
}
