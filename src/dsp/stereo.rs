//! Stereo Processing Unit
//!
//! Two [`MonoChain`]s sharing one parameter set. Coefficients are designed
//! once per block and installed into both chains, so left and right always
//! run identical filters while keeping their own history.
//!
//! # Lifecycle
//! - Unprepared (after `new`): `update_filters` and `process` leave buffers
//!   untouched
//! - Prepared (after `prepare`): both may be called every block, in that order
//!
//! Nothing here allocates, blocks or does I/O once prepared.

use crate::dsp::chain::{CutBand, MonoChain};
use crate::dsp::design::{cut_coefficients, peak_coefficients, CutKind};
use crate::eq_log;
use crate::params::ChainSettings;

#[derive(Debug, Clone, Default)]
pub struct StereoProcessor {
    left: MonoChain,
    right: MonoChain,
    sample_rate: f32,
    max_block_size: usize,
    prepared: bool,
}

impl StereoProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new stream. Always re-initializes both chains, clearing history.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize) {
        self.left.prepare(sample_rate, max_block_size);
        self.right.prepare(sample_rate, max_block_size);
        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size;
        self.prepared = sample_rate > 0.0;
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    /// Design the filters for `settings` and install them into both chains.
    ///
    /// Call once per block, before [`process`](Self::process).
    pub fn update_filters(&mut self, settings: &ChainSettings) {
        if !self.prepared {
            eq_log!("update_filters before prepare, ignored");
            return;
        }

        let s = settings.clamped_for(self.sample_rate);
        let peak = peak_coefficients(self.sample_rate, s.peak_freq, s.peak_quality, s.peak_gain_db);
        let low_cut = cut_coefficients(
            CutKind::HighPass,
            s.low_cut_freq,
            self.sample_rate,
            s.low_cut_slope,
        );
        let high_cut = cut_coefficients(
            CutKind::LowPass,
            s.high_cut_freq,
            self.sample_rate,
            s.high_cut_slope,
        );

        if self.left.active_sections(CutBand::LowCut) != low_cut.len()
            || self.left.active_sections(CutBand::HighCut) != high_cut.len()
        {
            eq_log!(
                "cut sections: low {} high {}",
                low_cut.len(),
                high_cut.len()
            );
        }

        for chain in [&mut self.left, &mut self.right] {
            chain.update_low_cut(&low_cut);
            chain.update_peak(&peak);
            chain.update_high_cut(&high_cut);
        }
    }

    /// Filter one block in place. Each channel only ever sees its own history.
    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        if !self.prepared {
            return;
        }
        self.left.process(left);
        self.right.process(right);
    }

    /// Mono layouts run through the left chain only.
    pub fn process_mono(&mut self, samples: &mut [f32]) {
        if !self.prepared {
            return;
        }
        self.left.process(samples);
    }

    /// Clear filter history on both channels, keeping the current filters.
    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }

    pub fn left(&self) -> &MonoChain {
        &self.left
    }

    pub fn right(&self) -> &MonoChain {
        &self.right
    }

    /// Magnitude of the currently installed response at `freq` Hz.
    pub fn magnitude_at(&self, freq: f32) -> f32 {
        if !self.prepared {
            return 1.0;
        }
        self.left.magnitude_at(freq as f64) as f32
    }
}
