//! Mono filter chain: LowCut[0..3] -> Peak -> HighCut[0..3].
//!
//! Positions are fixed. A cut band of slope index `n` runs its first `n + 1`
//! slots; the rest stay bypassed.

#[cfg(test)]
use crate::dsp::biquad::Coefficients;
use crate::dsp::design::{CoefficientSet, MAX_SECTIONS};
use crate::dsp::stage::FilterStage;

/// Cascade slots per cut band.
pub const CASCADE_SLOTS: usize = MAX_SECTIONS;

/// Low cut slots, the peak, high cut slots.
pub const STAGE_COUNT: usize = 2 * CASCADE_SLOTS + 1;

const PEAK_INDEX: usize = CASCADE_SLOTS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutBand {
    LowCut,
    HighCut,
}

impl CutBand {
    pub fn position(self, slot: usize) -> ChainPosition {
        match self {
            CutBand::LowCut => ChainPosition::LowCut(slot),
            CutBand::HighCut => ChainPosition::HighCut(slot),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainPosition {
    LowCut(usize),
    Peak,
    HighCut(usize),
}

impl ChainPosition {
    /// Index into the stage array. Cascade slots must be below [`CASCADE_SLOTS`].
    pub fn index(self) -> usize {
        match self {
            ChainPosition::LowCut(slot) => {
                debug_assert!(slot < CASCADE_SLOTS, "low cut slot {slot} out of range");
                slot
            }
            ChainPosition::Peak => PEAK_INDEX,
            ChainPosition::HighCut(slot) => {
                debug_assert!(slot < CASCADE_SLOTS, "high cut slot {slot} out of range");
                PEAK_INDEX + 1 + slot
            }
        }
    }
}

/// Nine filter stages in series, with history for a single channel.
#[derive(Debug, Clone)]
pub struct MonoChain {
    stages: [FilterStage; STAGE_COUNT],
    sample_rate: f32,
    max_block_size: usize,
}

impl Default for MonoChain {
    fn default() -> Self {
        Self::new()
    }
}

impl MonoChain {
    pub fn new() -> Self {
        let mut stages = [FilterStage::new(); STAGE_COUNT];
        for band in [CutBand::LowCut, CutBand::HighCut] {
            for slot in 0..CASCADE_SLOTS {
                stages[band.position(slot).index()].set_bypassed(true);
            }
        }
        Self {
            stages,
            sample_rate: 0.0,
            max_block_size: 0,
        }
    }

    /// Put every stage back to its initial state for a new stream.
    ///
    /// The stages live inline, so this never allocates.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize) {
        *self = Self::new();
        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size;
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    pub fn update_peak(&mut self, set: &CoefficientSet) {
        if let Some(section) = set.as_slice().first() {
            self.stages[PEAK_INDEX].set_coefficients(*section);
        }
    }

    pub fn update_low_cut(&mut self, set: &CoefficientSet) {
        self.update_cut(CutBand::LowCut, set);
    }

    pub fn update_high_cut(&mut self, set: &CoefficientSet) {
        self.update_cut(CutBand::HighCut, set);
    }

    fn update_cut(&mut self, band: CutBand, set: &CoefficientSet) {
        for slot in 0..CASCADE_SLOTS {
            self.stages[band.position(slot).index()].set_bypassed(true);
        }

        for (slot, section) in set.iter().take(CASCADE_SLOTS).enumerate() {
            let stage = &mut self.stages[band.position(slot).index()];
            stage.set_coefficients(*section);
            stage.set_bypassed(false);
        }
    }

    /// Filter `samples` in place, strictly in temporal order.
    pub fn process(&mut self, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            let mut x = *sample;
            for stage in self.stages.iter_mut() {
                x = stage.process_sample(x);
            }
            *sample = x;
        }
    }

    /// Clear the history of every stage, keeping coefficients and bypass state.
    pub fn reset(&mut self) {
        for stage in self.stages.iter_mut() {
            stage.reset();
        }
    }

    pub fn stage(&self, position: ChainPosition) -> &FilterStage {
        &self.stages[position.index()]
    }

    pub fn active_sections(&self, band: CutBand) -> usize {
        (0..CASCADE_SLOTS)
            .filter(|&slot| !self.stage(band.position(slot)).is_bypassed())
            .count()
    }

    /// Combined magnitude of the non-bypassed stages.
    pub fn magnitude_at(&self, freq: f64) -> f64 {
        self.stages
            .iter()
            .filter(|stage| !stage.is_bypassed())
            .map(|stage| stage.coefficients().magnitude_at(freq, self.sample_rate as f64))
            .product()
    }

    #[cfg(test)]
    pub(crate) fn coefficients_at(&self, position: ChainPosition) -> Coefficients {
        *self.stage(position).coefficients()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::design::{cut_coefficients, peak_coefficients, CutKind};
    use crate::params::Slope;

    const SR: f32 = 48000.0;

    fn prepared() -> MonoChain {
        let mut chain = MonoChain::new();
        chain.prepare(SR, 512);
        chain
    }

    #[test]
    fn positions_map_to_fixed_indices() {
        assert_eq!(ChainPosition::LowCut(0).index(), 0);
        assert_eq!(ChainPosition::LowCut(3).index(), 3);
        assert_eq!(ChainPosition::Peak.index(), 4);
        assert_eq!(ChainPosition::HighCut(0).index(), 5);
        assert_eq!(ChainPosition::HighCut(3).index(), 8);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "low cut slot 4 out of range")]
    fn low_cut_slot_past_the_cascade_is_rejected() {
        // would otherwise alias the peak stage
        let _ = ChainPosition::LowCut(CASCADE_SLOTS).index();
    }

    #[test]
    #[should_panic]
    fn high_cut_slot_past_the_cascade_is_rejected() {
        let chain = prepared();
        let _ = chain.stage(ChainPosition::HighCut(CASCADE_SLOTS));
    }

    #[test]
    fn fresh_chain_is_transparent() {
        let mut chain = prepared();
        assert_eq!(chain.active_sections(CutBand::LowCut), 0);
        assert_eq!(chain.active_sections(CutBand::HighCut), 0);
        assert!(!chain.stage(ChainPosition::Peak).is_bypassed());

        let mut samples = [0.1f32, -0.4, 0.9, 0.0, -1.0];
        let copy = samples;
        chain.process(&mut samples);
        assert_eq!(samples, copy);
    }

    #[test]
    fn slope_activates_exactly_n_plus_one_sections() {
        let mut chain = prepared();
        for slope in Slope::ALL {
            let low = cut_coefficients(CutKind::HighPass, 100.0, SR, slope);
            let high = cut_coefficients(CutKind::LowPass, 8000.0, SR, slope);
            chain.update_low_cut(&low);
            chain.update_high_cut(&high);

            for band in [CutBand::LowCut, CutBand::HighCut] {
                assert_eq!(chain.active_sections(band), slope.index() + 1);
                for slot in slope.index() + 1..CASCADE_SLOTS {
                    assert!(chain.stage(band.position(slot)).is_bypassed());
                }
            }
        }
    }

    #[test]
    fn slot_n_receives_section_n() {
        let mut chain = prepared();
        let low = cut_coefficients(CutKind::HighPass, 100.0, SR, Slope::Slope48);
        chain.update_low_cut(&low);
        for (slot, section) in low.iter().enumerate() {
            assert_eq!(chain.coefficients_at(ChainPosition::LowCut(slot)), *section);
        }
        // sections of an 8th order design all differ, so a repeated slot would show up here
        assert_ne!(
            chain.coefficients_at(ChainPosition::LowCut(0)),
            chain.coefficients_at(ChainPosition::LowCut(3))
        );
    }

    #[test]
    fn shrinking_the_slope_bypasses_trailing_slots() {
        let mut chain = prepared();
        chain.update_high_cut(&cut_coefficients(CutKind::LowPass, 5000.0, SR, Slope::Slope48));
        chain.update_high_cut(&cut_coefficients(CutKind::LowPass, 5000.0, SR, Slope::Slope12));
        assert_eq!(chain.active_sections(CutBand::HighCut), 1);
        assert!(chain.stage(ChainPosition::HighCut(1)).is_bypassed());
    }

    #[test]
    fn installed_chain_matches_designed_response() {
        let mut chain = prepared();
        let low = cut_coefficients(CutKind::HighPass, 80.0, SR, Slope::Slope24);
        let peak = peak_coefficients(SR, 1000.0, 2.0, 6.0);
        let high = cut_coefficients(CutKind::LowPass, 12000.0, SR, Slope::Slope36);
        chain.update_low_cut(&low);
        chain.update_peak(&peak);
        chain.update_high_cut(&high);

        for &freq in &[40.0f64, 1000.0, 15000.0] {
            let expected = low.magnitude_at(freq, SR as f64)
                * peak.magnitude_at(freq, SR as f64)
                * high.magnitude_at(freq, SR as f64);
            assert!((chain.magnitude_at(freq) - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn reset_keeps_configuration() {
        let mut chain = prepared();
        chain.update_low_cut(&cut_coefficients(CutKind::HighPass, 200.0, SR, Slope::Slope24));
        let mut samples = [1.0f32; 64];
        chain.process(&mut samples);

        chain.reset();
        assert_eq!(chain.active_sections(CutBand::LowCut), 2);
        assert!(chain.stage(ChainPosition::LowCut(0)).history().is_cleared());
    }
}
