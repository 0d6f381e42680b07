use crate::dsp::biquad::{Biquad, Coefficients};

/// What a stage does with its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageMode {
    /// Input is forwarded unchanged and history stays frozen.
    Bypass,
    /// Input runs through the installed coefficients.
    Biquad,
}

/// One slot of a filter chain: a coefficient tuple, the channel history that
/// runs it and a bypass switch.
///
/// The coefficients survive bypassing, and replacing them leaves the history
/// alone so live parameter changes stay click-free.
#[derive(Debug, Clone, Copy)]
pub struct FilterStage {
    coefficients: Coefficients,
    history: Biquad,
    mode: StageMode,
}

impl Default for FilterStage {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterStage {
    pub fn new() -> Self {
        Self {
            coefficients: Coefficients::IDENTITY,
            history: Biquad::new(),
            mode: StageMode::Biquad,
        }
    }

    /// Replace the active tuple. Only call between blocks.
    #[inline]
    pub fn set_coefficients(&mut self, coefficients: Coefficients) {
        self.coefficients = coefficients;
    }

    #[inline]
    pub fn coefficients(&self) -> &Coefficients {
        &self.coefficients
    }

    #[inline]
    pub fn set_bypassed(&mut self, bypassed: bool) {
        self.mode = if bypassed {
            StageMode::Bypass
        } else {
            StageMode::Biquad
        };
    }

    #[inline]
    pub fn is_bypassed(&self) -> bool {
        self.mode == StageMode::Bypass
    }

    #[inline]
    pub fn mode(&self) -> StageMode {
        self.mode
    }

    #[inline]
    pub fn process_sample(&mut self, input: f32) -> f32 {
        match self.mode {
            StageMode::Bypass => input,
            StageMode::Biquad => self.history.process(input, &self.coefficients),
        }
    }

    pub fn reset(&mut self) {
        self.history.reset();
    }

    #[cfg(test)]
    pub(crate) fn history(&self) -> &Biquad {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::design::{butterworth_sections, CutKind};

    fn low_pass() -> Coefficients {
        butterworth_sections(CutKind::LowPass, 1000.0, 48000.0, 2).as_slice()[0]
    }

    #[test]
    fn new_stage_is_an_active_identity() {
        let mut stage = FilterStage::new();
        assert!(!stage.is_bypassed());
        assert_eq!(stage.mode(), StageMode::Biquad);
        assert_eq!(*stage.coefficients(), Coefficients::IDENTITY);
        assert_eq!(stage.process_sample(0.3), 0.3);
    }

    #[test]
    fn coefficient_change_keeps_history() {
        let mut stage = FilterStage::new();
        stage.set_coefficients(low_pass());
        for _ in 0..32 {
            stage.process_sample(1.0);
        }
        let before = *stage.history();
        assert!(!before.is_cleared());

        stage.set_coefficients(
            butterworth_sections(CutKind::LowPass, 2000.0, 48000.0, 2).as_slice()[0],
        );
        let after = *stage.history();
        assert_eq!(before, after);
    }

    #[test]
    fn bypass_forwards_input_and_freezes_history() {
        let mut stage = FilterStage::new();
        stage.set_coefficients(low_pass());
        for _ in 0..16 {
            stage.process_sample(0.5);
        }
        let frozen = *stage.history();

        stage.set_bypassed(true);
        for &x in &[1.0f32, -1.0, 0.25] {
            assert_eq!(stage.process_sample(x), x);
        }
        assert_eq!(*stage.history(), frozen);
        assert_eq!(*stage.coefficients(), low_pass());

        stage.set_bypassed(false);
        assert_ne!(stage.process_sample(1.0), 1.0);
    }

    #[test]
    fn reset_clears_history_only() {
        let mut stage = FilterStage::new();
        stage.set_coefficients(low_pass());
        stage.process_sample(1.0);
        stage.reset();
        assert!(stage.history().is_cleared());
        assert_eq!(*stage.coefficients(), low_pass());
    }
}
