//! Biquad Filter Implementation (IIR 2nd Order)
//!
//! The normalized coefficient tuple shared by every filter design in the crate,
//! and the per-channel history that runs it.
//!
//! # Design Notes
//! - Coefficients and history are kept in `f64`; the poles of a 20 Hz cut at
//!   96 kHz sit too close to the unit circle for `f32`
//! - Coefficient updates never touch the history
//! - All operations are safe for the audio thread (no allocations)

use std::f64::consts::PI;

/// Normalized second-order section: `a0` is folded into the other terms.
///
/// `H(z) = (b0 + b1 z^-1 + b2 z^-2) / (1 + a1 z^-1 + a2 z^-2)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl Default for Coefficients {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Coefficients {
    /// Pass-through section.
    pub const IDENTITY: Coefficients = Coefficients {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Build from raw transfer function terms, dividing everything by `a0`.
    pub fn from_raw(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> Self {
        // divide rather than scale by 1/a0 so b0 == a0 normalizes to exactly 1.0
        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }

    /// Magnitude of the frequency response at `freq` Hz.
    pub fn magnitude_at(&self, freq: f64, sample_rate: f64) -> f64 {
        let w = 2.0 * PI * freq / sample_rate;
        let (sin_w, cos_w) = w.sin_cos();
        let (sin_2w, cos_2w) = (2.0 * w).sin_cos();

        let num_re = self.b0 + self.b1 * cos_w + self.b2 * cos_2w;
        let num_im = -(self.b1 * sin_w + self.b2 * sin_2w);
        let den_re = 1.0 + self.a1 * cos_w + self.a2 * cos_2w;
        let den_im = -(self.a1 * sin_w + self.a2 * sin_2w);

        ((num_re * num_re + num_im * num_im) / (den_re * den_re + den_im * den_im)).sqrt()
    }
}

/// Filter history for one channel (transposed direct form II).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Biquad {
    z1: f64,
    z2: f64,
}

impl Biquad {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a single sample
    #[inline]
    pub fn process(&mut self, input: f32, c: &Coefficients) -> f32 {
        let x = input as f64;
        let out = c.b0 * x + self.z1;

        self.z1 = c.b1 * x - c.a1 * out + self.z2;
        self.z2 = c.b2 * x - c.a2 * out;

        out as f32
    }

    /// Explicitly clear filter delay state.
    ///
    /// This is NOT called by coefficient updates.
    #[inline]
    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }

    #[inline]
    pub fn is_cleared(&self) -> bool {
        self.z1 == 0.0 && self.z2 == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_passes_samples_through() {
        let mut bq = Biquad::new();
        for &x in &[0.0f32, 1.0, -0.5, 0.25, 0.75] {
            assert_eq!(bq.process(x, &Coefficients::IDENTITY), x);
        }
        assert!(bq.is_cleared());
    }

    #[test]
    fn from_raw_normalizes_by_a0() {
        let c = Coefficients::from_raw(2.0, 4.0, 6.0, 2.0, 1.0, 0.5);
        assert_eq!(c.b0, 1.0);
        assert_eq!(c.b1, 2.0);
        assert_eq!(c.b2, 3.0);
        assert_eq!(c.a1, 0.5);
        assert_eq!(c.a2, 0.25);
    }

    #[test]
    fn matching_numerator_and_denominator_normalize_to_identity() {
        // (1.0 / 1.9) * 1.9 rounds to 0.9999999999999999
        let a0 = 1.9;
        let c = Coefficients::from_raw(a0, -1.9, 0.95, a0, -1.9, 0.95);
        assert_eq!(c.b0, 1.0);
        assert_eq!(c.b1, c.a1);
        assert_eq!(c.b2, c.a2);
    }

    #[test]
    fn one_pole_average_has_unity_dc_gain() {
        // y[n] = 0.5 x[n] + 0.5 x[n-1]
        let c = Coefficients {
            b0: 0.5,
            b1: 0.5,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
        };
        assert!((c.magnitude_at(0.0, 48000.0) - 1.0).abs() < 1e-12);
        assert!(c.magnitude_at(24000.0, 48000.0) < 1e-9);

        let mut bq = Biquad::new();
        assert_eq!(bq.process(1.0, &c), 0.5);
        assert_eq!(bq.process(1.0, &c), 1.0);
        assert!(!bq.is_cleared());

        bq.reset();
        assert!(bq.is_cleared());
    }
}
