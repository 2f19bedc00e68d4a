//! Text channel: printable ASCII on the window [0.2, 6.0]
//!
//! The window stays clear of the 0/2π seam, so a node that drifts across the
//! wrap point reads as noise instead of as a valid character.

use super::{normalize_phase, Decoded, Modality, PhaseCodec};

pub const FIRST_PRINTABLE: u8 = 32;
pub const LAST_PRINTABLE: u8 = 126;

const PRINTABLE_SPAN: f64 = (LAST_PRINTABLE - FIRST_PRINTABLE) as f64;
const PHASE_OFFSET: f64 = 0.2;
const PHASE_SPAN: f64 = 5.8;

/// Phases below this read as empty slots
pub const NOISE_FLOOR: f64 = 0.1;

/// Glyph used when a slot decodes to noise
pub const NOISE_GLYPH: char = '·';

pub struct TextCodec;

impl PhaseCodec for TextCodec {
    type Sample = u8;

    const MODALITY: Modality = Modality::Text;

    fn encode(code: u8) -> f64 {
        let code = code.clamp(FIRST_PRINTABLE, LAST_PRINTABLE);
        let ratio = (code - FIRST_PRINTABLE) as f64 / PRINTABLE_SPAN;
        PHASE_OFFSET + ratio * PHASE_SPAN
    }

    fn decode(phase: f64) -> Decoded<u8> {
        if !phase.is_finite() {
            return Decoded::Noise;
        }
        let phase = normalize_phase(phase);
        if phase < NOISE_FLOOR {
            return Decoded::Noise;
        }

        let ratio = (phase - PHASE_OFFSET) / PHASE_SPAN;
        let code = (FIRST_PRINTABLE as f64 + ratio * PRINTABLE_SPAN).round();
        if code < FIRST_PRINTABLE as f64 || code > LAST_PRINTABLE as f64 {
            Decoded::Noise
        } else {
            Decoded::Value(code as u8)
        }
    }
}

/// Encode `text` into exactly `len` phases.
///
/// Characters outside printable ASCII are clamped into range. Unused slots
/// are left at phase 0, which decodes as an empty slot.
pub fn encode_str(text: &str, len: usize) -> Vec<f64> {
    let mut phases = vec![0.0; len];
    for (slot, ch) in phases.iter_mut().zip(text.chars()) {
        let code = u8::try_from(u32::from(ch)).unwrap_or(LAST_PRINTABLE);
        *slot = TextCodec::encode(code);
    }
    phases
}

/// Decode phases into a string, one char per slot
pub fn decode_str(phases: &[f64]) -> String {
    phases
        .iter()
        .map(|&p| match TextCodec::decode(p) {
            Decoded::Value(code) => char::from(code),
            Decoded::Noise => NOISE_GLYPH,
        })
        .collect()
}
