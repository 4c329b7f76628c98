//! Dither guard.
//!
//! Perturbs every sample by a vanishing random amount so the log-energy
//! step in feature extraction never sees an exact zero.

use rand::Rng;

use crate::alignment::types::Waveform;

/// Perturbation magnitude. Orders of magnitude below one LSB of 16-bit
/// PCM, so feature output is unchanged within floating-point tolerance.
const DITHER_AMPLITUDE: f64 = 1e-10;

/// Add a strictly positive perturbation in `(0, 1e-10]` to every sample,
/// in place.
///
/// Uses the caller's RNG instance; the engine never touches process-wide
/// random state. Seed the RNG for reproducible output.
pub fn ensure_non_zero<R: Rng>(waveform: &mut Waveform, rng: &mut R) {
    for sample in &mut waveform.samples {
        // 1.0 - [0, 1) keeps the perturbation strictly positive, so an
        // exact-zero sample cannot stay exactly zero.
        *sample += (1.0 - rng.gen::<f64>()) * DITHER_AMPLITUDE;
    }
}
