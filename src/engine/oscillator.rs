//! Oscillator: one phase node of the resonance network
//!
//! Phase dynamics per node (zero natural frequency, so learned states are
//! static attractors):
//!
//! dθᵢ/dt = (1/C) Σ sⱼ·sin(θⱼ(t - τⱼ) - θᵢ - φⱼ) + s_ext·sin(θ_ext - θᵢ)
//!
//! Where:
//! - sⱼ, φⱼ, τⱼ = strength, learned phase offset and delay of synapse j
//! - C = fan-in of the node
//! - θ_ext, s_ext = optional external drive

use crate::codec::normalize_phase;
use crate::engine::constants::*;
use std::collections::VecDeque;

/// Tunables of the reference engine
#[derive(Debug, Clone)]
pub struct EngineParams {
    /// Coupling clamp applied during online learning
    pub learning_clamp: f64,

    /// Coupling clamp applied after imprinting
    pub imprint_clamp: f64,

    /// Relaxation of strength toward zero while learning
    pub strength_decay: f64,

    /// Peak-to-peak jitter added to every phase each step
    pub jitter: f64,

    /// Strength of a freshly wired or reset synapse
    pub initial_strength: f64,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            learning_clamp: LEARNING_CLAMP,
            imprint_clamp: IMPRINT_CLAMP,
            strength_decay: STRENGTH_DECAY,
            jitter: DEFAULT_JITTER,
            initial_strength: INITIAL_STRENGTH,
        }
    }
}

impl EngineParams {
    pub fn is_valid(&self) -> bool {
        self.learning_clamp > 0.0
            && self.imprint_clamp > 0.0
            && self.strength_decay >= 0.0
            && self.jitter >= 0.0
            && self.initial_strength.is_finite()
    }
}

/// Delayed, weighted connection from another node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Synapse {
    pub source: usize,
    pub strength: f64,
    pub phase_offset: f64,
    pub delay_steps: usize,
}

/// External forcing term on one node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drive {
    pub phase: f64,
    pub strength: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Oscillator {
    pub synapses: Vec<Synapse>,
    pub drive: Option<Drive>,
}

impl Oscillator {
    pub fn new(synapses: Vec<Synapse>) -> Self {
        Self {
            synapses,
            drive: None,
        }
    }

    pub fn set_drive(&mut self, phase: f64, strength: f64) {
        self.drive = Some(Drive {
            phase: normalize_phase(phase),
            strength,
        });
    }

    pub fn clear_drive(&mut self) {
        self.drive = None;
    }

    /// Phase of the synapse's source node `delay_steps` ago
    fn presynaptic(history: &[VecDeque<f64>], synapse: &Synapse) -> Option<f64> {
        history.get(synapse.source)?.get(synapse.delay_steps).copied()
    }

    /// Mean pull of the incoming synapses on phase `theta`
    pub fn coupling_force(&self, theta: f64, history: &[VecDeque<f64>]) -> f64 {
        if self.synapses.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .synapses
            .iter()
            .filter_map(|syn| {
                Self::presynaptic(history, syn)
                    .map(|past| syn.strength * (past - theta - syn.phase_offset).sin())
            })
            .sum();
        total / self.synapses.len() as f64
    }

    pub fn drive_force(&self, theta: f64) -> f64 {
        match self.drive {
            Some(drive) => drive.strength * (drive.phase - theta).sin(),
            None => 0.0,
        }
    }

    /// Hebbian update: offsets chase the observed phase difference, strengths
    /// chase the alignment
    pub fn learn(
        &mut self,
        theta: f64,
        history: &[VecDeque<f64>],
        learning_rate: f64,
        params: &EngineParams,
    ) {
        for synapse in &mut self.synapses {
            let Some(past) = Self::presynaptic(history, synapse) else {
                continue;
            };
            let diff = past - theta - synapse.phase_offset;
            synapse.phase_offset = normalize_phase(synapse.phase_offset + learning_rate * diff.sin());

            let alignment = diff.cos();
            synapse.strength +=
                (alignment - params.strength_decay * synapse.strength) * learning_rate;
            synapse.strength = synapse
                .strength
                .clamp(-params.learning_clamp, params.learning_clamp);
        }
    }

    /// Add the current phase relationship to every synapse as a vector sum
    pub fn imprint(&mut self, theta: f64, history: &[VecDeque<f64>], strength: f64, clamp: f64) {
        for synapse in &mut self.synapses {
            let Some(past) = Self::presynaptic(history, synapse) else {
                continue;
            };
            let diff = past - theta;

            let re = synapse.strength * synapse.phase_offset.cos() + strength * diff.cos();
            let im = synapse.strength * synapse.phase_offset.sin() + strength * diff.sin();

            synapse.strength = re.hypot(im).clamp(0.0, clamp);
            synapse.phase_offset = normalize_phase(im.atan2(re));
        }
    }

    /// Coupling energy of this node, normalized by fan-in
    pub fn energy(&self, theta: f64, history: &[VecDeque<f64>]) -> f64 {
        if self.synapses.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .synapses
            .iter()
            .filter_map(|syn| {
                Self::presynaptic(history, syn)
                    .map(|past| -syn.strength * (past - theta - syn.phase_offset).cos())
            })
            .sum();
        total / self.synapses.len() as f64
    }

    pub fn reset_synapses(&mut self, initial_strength: f64) {
        for synapse in &mut self.synapses {
            synapse.strength = initial_strength;
            synapse.phase_offset = 0.0;
        }
    }
}
