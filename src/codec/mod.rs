//! Phase Codec: raw samples <-> oscillator phases
//!
//! Every input channel (image luminance, text characters, synthetic waveforms)
//! is mapped onto a phase so that the same network can hold all of them.
//! Decoding is total: a phase that falls outside a channel's window comes back
//! as [`Decoded::Noise`] instead of an error.

pub mod image;
pub mod text;
pub mod waveform;

pub use self::image::ImageCodec;
pub use self::text::TextCodec;
pub use self::waveform::WaveformCodec;

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::fmt;

/// Input channel that owns a region of the composite phase vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Image,
    Text,
    Waveform,
}

impl Modality {
    pub fn name(&self) -> &'static str {
        match self {
            Modality::Image => "image",
            Modality::Text => "text",
            Modality::Waveform => "waveform",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of decoding one phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decoded<T> {
    /// The phase sits inside the channel's decoding window
    Value(T),
    /// The phase cannot be interpreted by this channel
    Noise,
}

impl<T> Decoded<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Decoded::Value(v) => Some(v),
            Decoded::Noise => None,
        }
    }

    pub fn is_noise(&self) -> bool {
        matches!(self, Decoded::Noise)
    }
}

/// Wrap any finite phase into [0, 2π)
pub fn normalize_phase(phase: f64) -> f64 {
    let wrapped = phase % TAU;
    let wrapped = if wrapped < 0.0 { wrapped + TAU } else { wrapped };
    // -ε + 2π rounds up to exactly 2π
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Bidirectional mapping between one channel's raw samples and phases
pub trait PhaseCodec {
    type Sample;

    const MODALITY: Modality;

    fn encode(sample: Self::Sample) -> f64;

    fn decode(phase: f64) -> Decoded<Self::Sample>;

    fn encode_all<I>(samples: I) -> Vec<f64>
    where
        I: IntoIterator<Item = Self::Sample>,
    {
        samples.into_iter().map(Self::encode).collect()
    }

    fn decode_all(phases: &[f64]) -> Vec<Decoded<Self::Sample>> {
        phases.iter().map(|&p| Self::decode(p)).collect()
    }
}
