pub mod biquad;
pub mod chain;
pub mod design;
pub mod stage;
pub mod stereo;

pub use biquad::{Biquad, Coefficients};
pub use chain::{ChainPosition, CutBand, MonoChain};
pub use design::{butterworth_sections, cut_coefficients, peak_coefficients, CoefficientSet, CutKind};
pub use stage::{FilterStage, StageMode};
pub use stereo::StereoProcessor;
