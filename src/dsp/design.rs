//! Coefficient design for the three bands.
//!
//! Pure functions from user-facing values to [`CoefficientSet`]s. Nothing here
//! allocates, so designs can be recomputed on the audio thread every block.
//!
//! Inputs are assumed valid: `sample_rate > 0`, `0 < freq < sample_rate / 2`
//! and `q > 0`. Clamping happens in [`ChainSettings::clamped_for`].
//!
//! [`ChainSettings::clamped_for`]: crate::params::ChainSettings::clamped_for

use std::f64::consts::PI;

use super::biquad::Coefficients;
use crate::params::Slope;

/// Most second-order sections a cut band can hold (order 8).
pub const MAX_SECTIONS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutKind {
    /// Removes content below the cutoff (the low-cut band).
    HighPass,
    /// Removes content above the cutoff (the high-cut band).
    LowPass,
}

/// Ordered, fixed-capacity list of second-order sections applied in series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoefficientSet {
    sections: [Coefficients; MAX_SECTIONS],
    len: usize,
}

impl Default for CoefficientSet {
    fn default() -> Self {
        Self::new()
    }
}

impl CoefficientSet {
    pub fn new() -> Self {
        Self {
            sections: [Coefficients::IDENTITY; MAX_SECTIONS],
            len: 0,
        }
    }

    pub fn single(section: Coefficients) -> Self {
        let mut set = Self::new();
        set.push(section);
        set
    }

    /// Append a section. Sections past [`MAX_SECTIONS`] are dropped.
    pub fn push(&mut self, section: Coefficients) {
        debug_assert!(self.len < MAX_SECTIONS, "coefficient set is full");
        if self.len < MAX_SECTIONS {
            self.sections[self.len] = section;
            self.len += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[Coefficients] {
        &self.sections[..self.len]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coefficients> {
        self.as_slice().iter()
    }

    /// Combined magnitude of all sections in series.
    pub fn magnitude_at(&self, freq: f64, sample_rate: f64) -> f64 {
        self.iter()
            .map(|c| c.magnitude_at(freq, sample_rate))
            .product()
    }
}

/// RBJ peaking EQ.
///
/// Linear gain is `10^(dB/20)` and the cookbook `A` is its square root, so at
/// 0 dB numerator and denominator come out identical and the section is an
/// exact pass-through.
pub fn peak_coefficients(sample_rate: f32, freq: f32, q: f32, gain_db: f32) -> CoefficientSet {
    let gain = 10.0_f64.powf(gain_db as f64 / 20.0);
    let a = gain.sqrt();
    let w0 = 2.0 * PI * freq as f64 / sample_rate as f64;
    let alpha = w0.sin() / (2.0 * q as f64);
    let c2 = -2.0 * w0.cos();

    CoefficientSet::single(Coefficients::from_raw(
        1.0 + alpha * a,
        c2,
        1.0 - alpha * a,
        1.0 + alpha / a,
        c2,
        1.0 - alpha / a,
    ))
}

/// N-th order Butterworth filter as `N / 2` cascaded second-order sections.
///
/// Section `k` realizes the analog prototype pole pair at angle
/// `theta = pi * (2k + 1) / (2N)` (damping `2 sin(theta)`), mapped to the
/// z-plane with a bilinear transform around the pre-warped cutoff. Sections
/// come out in ascending `k`. `order` is clamped to 2..=8 and odd orders round
/// up to the next even order.
pub fn butterworth_sections(
    kind: CutKind,
    cutoff: f32,
    sample_rate: f32,
    order: usize,
) -> CoefficientSet {
    let pairs = order.clamp(2, 2 * MAX_SECTIONS).div_ceil(2);
    let n = (2 * pairs) as f64;

    let wc = (PI * cutoff as f64 / sample_rate as f64).tan();
    let wc2 = wc * wc;

    let mut set = CoefficientSet::new();
    for k in 0..pairs {
        let theta = PI * (2 * k + 1) as f64 / (2.0 * n);
        let damping = 2.0 * theta.sin();

        let a0 = 1.0 + damping * wc + wc2;
        let a1 = 2.0 * (wc2 - 1.0);
        let a2 = 1.0 - damping * wc + wc2;

        let section = match kind {
            CutKind::LowPass => Coefficients::from_raw(wc2, 2.0 * wc2, wc2, a0, a1, a2),
            CutKind::HighPass => Coefficients::from_raw(1.0, -2.0, 1.0, a0, a1, a2),
        };
        set.push(section);
    }
    set
}

/// Butterworth cut for a slope selection (12 dB/oct per section).
pub fn cut_coefficients(kind: CutKind, cutoff: f32, sample_rate: f32, slope: Slope) -> CoefficientSet {
    butterworth_sections(kind, cutoff, sample_rate, slope.order())
}
