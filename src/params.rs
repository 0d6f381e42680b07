//! Parameters and the per-block snapshot handed to the DSP core.
//!
//! The audio thread never reads parameters field by field while processing.
//! It takes one [`ChainSettings`] per block from a [`ParameterSource`]; both
//! sources here are lock-free.

use nih_plug::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;

pub const MIN_FREQ_HZ: f32 = 20.0;
pub const MAX_FREQ_HZ: f32 = 20_000.0;
pub const MIN_GAIN_DB: f32 = -24.0;
pub const MAX_GAIN_DB: f32 = 24.0;
pub const MIN_QUALITY: f32 = 0.1;
pub const MAX_QUALITY: f32 = 10.0;

/// Highest usable frequency as a fraction of the sample rate.
const NYQUIST_GUARD: f32 = 0.49;

/// Skew for the frequency knobs, so the lower decades get most of the travel.
const FREQ_SKEW: f32 = 0.25;

// =============================================================================
// SLOPE
// =============================================================================

/// Cut filter steepness. Index `n` runs `n + 1` second-order sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Enum)]
pub enum Slope {
    #[default]
    #[serde(rename = "12 db/Oct")]
    #[name = "12 db/Oct"]
    Slope12,
    #[serde(rename = "24 db/Oct")]
    #[name = "24 db/Oct"]
    Slope24,
    #[serde(rename = "36 db/Oct")]
    #[name = "36 db/Oct"]
    Slope36,
    #[serde(rename = "48 db/Oct")]
    #[name = "48 db/Oct"]
    Slope48,
}

impl Slope {
    pub const ALL: [Slope; 4] = [Slope::Slope12, Slope::Slope24, Slope::Slope36, Slope::Slope48];

    pub fn index(self) -> usize {
        match self {
            Slope::Slope12 => 0,
            Slope::Slope24 => 1,
            Slope::Slope36 => 2,
            Slope::Slope48 => 3,
        }
    }

    /// Indices past the last choice saturate to 48 dB/oct.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }

    /// Number of cascaded second-order sections.
    pub fn sections(self) -> usize {
        self.index() + 1
    }

    /// Butterworth order.
    pub fn order(self) -> usize {
        2 * self.sections()
    }

    pub fn db_per_octave(self) -> u32 {
        12 * self.sections() as u32
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Immutable read of every parameter, taken once per processing block.
///
/// Missing fields in a serialized document fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainSettings {
    pub low_cut_freq: f32,
    pub high_cut_freq: f32,
    pub peak_freq: f32,
    pub peak_gain_db: f32,
    pub peak_quality: f32,
    pub low_cut_slope: Slope,
    pub high_cut_slope: Slope,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            low_cut_freq: MIN_FREQ_HZ,
            high_cut_freq: MAX_FREQ_HZ,
            peak_freq: 750.0,
            peak_gain_db: 0.0,
            peak_quality: 1.0,
            low_cut_slope: Slope::Slope12,
            high_cut_slope: Slope::Slope12,
        }
    }
}

impl ChainSettings {
    /// Clamp every field into its declared range, keeping frequencies strictly
    /// below Nyquist for `sample_rate`. NaN fields land on the lower bound.
    pub fn clamped_for(&self, sample_rate: f32) -> Self {
        let ceiling = (sample_rate * NYQUIST_GUARD).min(MAX_FREQ_HZ);
        let floor = MIN_FREQ_HZ.min(ceiling);
        let freq = |hz: f32| bound(hz, floor, ceiling);

        Self {
            low_cut_freq: freq(self.low_cut_freq),
            high_cut_freq: freq(self.high_cut_freq),
            peak_freq: freq(self.peak_freq),
            peak_gain_db: bound(self.peak_gain_db, MIN_GAIN_DB, MAX_GAIN_DB),
            peak_quality: bound(self.peak_quality, MIN_QUALITY, MAX_QUALITY),
            low_cut_slope: self.low_cut_slope,
            high_cut_slope: self.high_cut_slope,
        }
    }
}

// `f32::clamp` panics on inverted or NaN bounds; this never does.
fn bound(value: f32, lo: f32, hi: f32) -> f32 {
    value.max(lo).min(hi)
}

/// Anything the audio thread can take a [`ChainSettings`] from without blocking.
pub trait ParameterSource {
    fn snapshot(&self) -> ChainSettings;
}

impl<T: ParameterSource + ?Sized> ParameterSource for Arc<T> {
    fn snapshot(&self) -> ChainSettings {
        (**self).snapshot()
    }
}

// =============================================================================
// PLUGIN PARAMETERS
// =============================================================================

#[derive(Params)]
pub struct EqParams {
    #[id = "lowcut_freq"]
    pub low_cut_freq: FloatParam,

    #[id = "highcut_freq"]
    pub high_cut_freq: FloatParam,

    #[id = "peak_freq"]
    pub peak_freq: FloatParam,

    #[id = "peak_gain"]
    pub peak_gain: FloatParam,

    #[id = "peak_quality"]
    pub peak_quality: FloatParam,

    #[id = "lowcut_slope"]
    pub low_cut_slope: EnumParam<Slope>,

    #[id = "highcut_slope"]
    pub high_cut_slope: EnumParam<Slope>,
}

fn format_db(v: f32) -> String {
    format!("{:.1} dB", v)
}

fn format_quality(v: f32) -> String {
    format!("{:.2}", v)
}

fn frequency_param(name: &str, default: f32) -> FloatParam {
    FloatParam::new(
        name,
        default,
        FloatRange::Skewed {
            min: MIN_FREQ_HZ,
            max: MAX_FREQ_HZ,
            factor: FREQ_SKEW,
        },
    )
    .with_step_size(1.0)
    .with_value_to_string(formatters::v2s_f32_hz_then_khz(1))
    .with_string_to_value(formatters::s2v_f32_hz_then_khz())
}

impl Default for EqParams {
    fn default() -> Self {
        let defaults = ChainSettings::default();

        Self {
            low_cut_freq: frequency_param("LowCut Freq", defaults.low_cut_freq),
            high_cut_freq: frequency_param("HighCut Freq", defaults.high_cut_freq),
            peak_freq: frequency_param("Peak Freq", defaults.peak_freq),

            peak_gain: FloatParam::new(
                "Peak Gain",
                defaults.peak_gain_db,
                FloatRange::Linear {
                    min: MIN_GAIN_DB,
                    max: MAX_GAIN_DB,
                },
            )
            .with_step_size(0.5)
            .with_value_to_string(Arc::new(format_db)),

            peak_quality: FloatParam::new(
                "Peak Quality",
                defaults.peak_quality,
                FloatRange::Linear {
                    min: MIN_QUALITY,
                    max: MAX_QUALITY,
                },
            )
            .with_step_size(0.05)
            .with_value_to_string(Arc::new(format_quality)),

            low_cut_slope: EnumParam::new("LowCut Slope", defaults.low_cut_slope),
            high_cut_slope: EnumParam::new("HighCut Slope", defaults.high_cut_slope),
        }
    }
}

impl ParameterSource for EqParams {
    fn snapshot(&self) -> ChainSettings {
        ChainSettings {
            low_cut_freq: self.low_cut_freq.value(),
            high_cut_freq: self.high_cut_freq.value(),
            peak_freq: self.peak_freq.value(),
            peak_gain_db: self.peak_gain.value(),
            peak_quality: self.peak_quality.value(),
            low_cut_slope: self.low_cut_slope.value(),
            high_cut_slope: self.high_cut_slope.value(),
        }
    }
}

// =============================================================================
// STANDALONE ATOMIC STORE
// =============================================================================

/// Lock-free parameter store for driving the core without the plugin wrapper.
///
/// Every field is its own atomic, so a reader racing a writer can see a mix of
/// old and new fields, but never a torn value and never a blocked audio thread.
#[derive(Debug)]
pub struct AtomicChainSettings {
    low_cut_freq: AtomicU32,
    high_cut_freq: AtomicU32,
    peak_freq: AtomicU32,
    peak_gain_db: AtomicU32,
    peak_quality: AtomicU32,
    low_cut_slope: AtomicU8,
    high_cut_slope: AtomicU8,
}

impl Default for AtomicChainSettings {
    fn default() -> Self {
        Self::new(ChainSettings::default())
    }
}

impl AtomicChainSettings {
    pub fn new(initial: ChainSettings) -> Self {
        Self {
            low_cut_freq: AtomicU32::new(initial.low_cut_freq.to_bits()),
            high_cut_freq: AtomicU32::new(initial.high_cut_freq.to_bits()),
            peak_freq: AtomicU32::new(initial.peak_freq.to_bits()),
            peak_gain_db: AtomicU32::new(initial.peak_gain_db.to_bits()),
            peak_quality: AtomicU32::new(initial.peak_quality.to_bits()),
            low_cut_slope: AtomicU8::new(initial.low_cut_slope.index() as u8),
            high_cut_slope: AtomicU8::new(initial.high_cut_slope.index() as u8),
        }
    }

    pub fn store(&self, settings: &ChainSettings) {
        store_f32(&self.low_cut_freq, settings.low_cut_freq);
        store_f32(&self.high_cut_freq, settings.high_cut_freq);
        store_f32(&self.peak_freq, settings.peak_freq);
        store_f32(&self.peak_gain_db, settings.peak_gain_db);
        store_f32(&self.peak_quality, settings.peak_quality);
        self.low_cut_slope
            .store(settings.low_cut_slope.index() as u8, Ordering::Relaxed);
        self.high_cut_slope
            .store(settings.high_cut_slope.index() as u8, Ordering::Relaxed);
    }

    pub fn set_peak_gain_db(&self, gain_db: f32) {
        store_f32(&self.peak_gain_db, gain_db);
    }
}

impl ParameterSource for AtomicChainSettings {
    fn snapshot(&self) -> ChainSettings {
        ChainSettings {
            low_cut_freq: load_f32(&self.low_cut_freq),
            high_cut_freq: load_f32(&self.high_cut_freq),
            peak_freq: load_f32(&self.peak_freq),
            peak_gain_db: load_f32(&self.peak_gain_db),
            peak_quality: load_f32(&self.peak_quality),
            low_cut_slope: Slope::from_index(self.low_cut_slope.load(Ordering::Relaxed) as usize),
            high_cut_slope: Slope::from_index(self.high_cut_slope.load(Ordering::Relaxed) as usize),
        }
    }
}

#[inline]
fn store_f32(cell: &AtomicU32, value: f32) {
    cell.store(value.to_bits(), Ordering::Relaxed);
}

#[inline]
fn load_f32(cell: &AtomicU32) -> f32 {
    f32::from_bits(cell.load(Ordering::Relaxed))
}
