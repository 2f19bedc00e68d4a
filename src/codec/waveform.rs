//! Waveform channel: synthetic samples written straight onto [0, π]
//!
//! This channel is write-only in the harness. Samples are synthesized as
//! phases from the sample index alone; the decode below exists so that
//! decoding stays total across every modality.

use super::{normalize_phase, Decoded, Modality, PhaseCodec};
use std::f64::consts::{PI, TAU};

/// Partials of the synthetic waveform as (cycles per buffer, weight, phase offset)
const PARTIALS: [(f64, f64, f64); 2] = [(3.0, 0.6, 0.0), (7.0, 0.4, 0.5)];

/// Tolerance above π before a phase is treated as outside the window
const WINDOW_EPSILON: f64 = 1e-9;

pub struct WaveformCodec;

impl PhaseCodec for WaveformCodec {
    /// Amplitude in [-1, 1]
    type Sample = f64;

    const MODALITY: Modality = Modality::Waveform;

    fn encode(amplitude: f64) -> f64 {
        let amplitude = if amplitude.is_finite() {
            amplitude.clamp(-1.0, 1.0)
        } else {
            0.0
        };
        (amplitude + 1.0) * 0.5 * PI
    }

    fn decode(phase: f64) -> Decoded<f64> {
        if !phase.is_finite() {
            return Decoded::Noise;
        }
        let phase = normalize_phase(phase);
        if phase > PI + WINDOW_EPSILON {
            return Decoded::Noise;
        }
        Decoded::Value((2.0 * phase / PI - 1.0).clamp(-1.0, 1.0))
    }
}

/// Deterministic amplitude of sample `index` in a buffer of `len` samples
pub fn sample(index: usize, len: usize) -> f64 {
    let t = index as f64 / len.max(1) as f64;
    PARTIALS
        .iter()
        .map(|&(cycles, weight, offset)| weight * (TAU * cycles * t + offset).sin())
        .sum()
}

/// Synthesize `len` waveform phases, all within [0, π]
pub fn synthesize(len: usize) -> Vec<f64> {
    WaveformCodec::encode_all((0..len).map(|i| sample(i, len)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesized_phases_stay_on_half_circle() {
        let phases = synthesize(256);
        assert_eq!(phases.len(), 256);
        assert!(phases.iter().all(|&p| (0.0..=PI).contains(&p)));
        // not a flat line
        let max = phases.iter().cloned().fold(f64::MIN, f64::max);
        let min = phases.iter().cloned().fold(f64::MAX, f64::min);
        assert!(max - min > 1.0);
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        assert_eq!(synthesize(64), synthesize(64));
        assert!(synthesize(0).is_empty());
    }

    #[test]
    fn test_amplitude_round_trip() {
        for amp in [-1.0, -0.5, 0.0, 0.25, 1.0] {
            let back = WaveformCodec::decode(WaveformCodec::encode(amp)).value().unwrap();
            assert!((back - amp).abs() < 1e-12);
        }
    }

    #[test]
    fn test_outside_window_is_noise() {
        assert!(WaveformCodec::decode(1.5 * PI).is_noise());
        assert!(WaveformCodec::decode(f64::NAN).is_noise());
        assert!(!WaveformCodec::decode(PI).is_noise());
    }
}
