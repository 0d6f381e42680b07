mod debug;
pub mod dsp;
mod editor;
pub mod params;

use crate::dsp::StereoProcessor;
use crate::params::{EqParams, ParameterSource};
use nih_plug::prelude::*;
use nih_plug_vizia::ViziaState;
use std::sync::Arc;

pub use crate::params::{AtomicChainSettings, ChainSettings, Slope};

/// Work pushed off the audio thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EqTask {
    /// Forward queued real-time log messages to the `log` facade.
    DrainEventLog,
}

// -----------------------------------------------------------------------------
// PLUGIN STRUCT
// -----------------------------------------------------------------------------
struct SimpleEq {
    params: Arc<EqParams>,
    editor_state: Arc<ViziaState>,
    processor: StereoProcessor,
    #[cfg(feature = "debug")]
    samples_since_drain: usize,
}

impl Default for SimpleEq {
    fn default() -> Self {
        Self {
            params: Arc::new(EqParams::default()),
            editor_state: editor::default_state(),
            processor: StereoProcessor::new(),
            #[cfg(feature = "debug")]
            samples_since_drain: 0,
        }
    }
}

impl Plugin for SimpleEq {
    const NAME: &'static str = "SimpleEQ";
    const VENDOR: &'static str = "SimpleEQ";
    const URL: &'static str = "";
    const EMAIL: &'static str = "";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            ..AudioIOLayout::const_default()
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            ..AudioIOLayout::const_default()
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;
    // Parameters are read once per block.
    const SAMPLE_ACCURATE_AUTOMATION: bool = false;

    type SysExMessage = ();
    type BackgroundTask = EqTask;

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        debug::init();

        std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.processor
                .prepare(buffer_config.sample_rate, buffer_config.max_buffer_size as usize);
            self.processor.update_filters(&self.params.snapshot());
            #[cfg(feature = "debug")]
            {
                self.samples_since_drain = 0;
            }

            log::info!(
                "SimpleEQ prepared: {} Hz, max block {}, {} channel(s)",
                buffer_config.sample_rate,
                buffer_config.max_buffer_size,
                audio_io_layout
                    .main_output_channels
                    .map(NonZeroU32::get)
                    .unwrap_or(0)
            );

            self.processor.is_prepared()
        }))
        .unwrap_or(false)
    }

    fn editor(&mut self, _async_executor: AsyncExecutor<Self>) -> Option<Box<dyn Editor>> {
        editor::create(self.params.clone(), self.editor_state.clone())
    }

    fn task_executor(&mut self) -> TaskExecutor<Self> {
        Box::new(|task| match task {
            EqTask::DrainEventLog => {
                debug::drain();
            }
        })
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.process_internal(buffer, context)
        }))
        .unwrap_or(ProcessStatus::Normal)
    }

    fn reset(&mut self) {
        self.processor.reset();
    }
}

impl SimpleEq {
    fn process_internal(
        &mut self,
        buffer: &mut Buffer,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        // one snapshot per block, designed and installed before any sample runs
        let settings = self.params.snapshot();
        self.processor.update_filters(&settings);

        match buffer.as_slice() {
            [left, right, ..] => self.processor.process(left, right),
            [mono] => self.processor.process_mono(mono),
            [] => {}
        }

        #[cfg(feature = "debug")]
        if self.drain_due(buffer.samples()) {
            _context.execute_background(EqTask::DrainEventLog);
        }

        ProcessStatus::Normal
    }

    /// Count processed samples; true once about a second of audio has gone by.
    #[cfg(feature = "debug")]
    fn drain_due(&mut self, samples: usize) -> bool {
        self.samples_since_drain += samples;
        if self.samples_since_drain as f32 >= self.processor.sample_rate() {
            self.samples_since_drain = 0;
            true
        } else {
            false
        }
    }
}

impl ClapPlugin for SimpleEq {
    const CLAP_ID: &'static str = "com.simpleeq.simple-eq";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("Three band equalizer with low cut, peak and high cut");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Equalizer,
        ClapFeature::Stereo,
        ClapFeature::Mono,
    ];
}

impl Vst3Plugin for SimpleEq {
    const VST3_CLASS_ID: [u8; 16] = *b"SimpleEqDspCore1";
    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Eq];
}

nih_export_clap!(SimpleEq);
nih_export_vst3!(SimpleEq);

#[cfg(all(test, feature = "debug"))]
mod tests {
    use super::*;

    #[test]
    fn event_log_drain_is_scheduled_once_per_second() {
        let mut eq = SimpleEq::default();
        eq.processor.prepare(48000.0, 512);

        let due: Vec<bool> = (0..200).map(|_| eq.drain_due(512)).collect();
        // 48000 / 512 = 93.75 blocks per second
        assert_eq!(due.iter().filter(|&&d| d).count(), 2);
        assert!(due[93]);
        assert!(!due[92]);
        assert!(due[187]);
    }
}
