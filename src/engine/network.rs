//! ResonanceNetwork: sparse delayed phase-oscillator network with Hebbian imprinting
//!
//! Current phases live in one contiguous buffer so the harness can read the
//! whole state as a borrowed slice without copying.

use crate::codec::normalize_phase;
use crate::engine::constants::*;
use crate::engine::{EngineParams, Oscillator, PhaseEngine, Synapse};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::f64::consts::TAU;

pub struct ResonanceNetwork {
    /// Per-node drive and incoming synapses
    pub oscillators: Vec<Oscillator>,

    /// Current phase of every node, in [0, 2π)
    phases: Vec<f64>,

    /// Recent phases per node, most recent first
    history: Vec<VecDeque<f64>>,

    /// Engine tunables
    pub params: EngineParams,

    history_len: usize,

    rng: StdRng,

    /// Simulated time
    pub current_time: f64,

    /// Steps taken since construction
    pub total_steps: u64,
}

impl ResonanceNetwork {
    /// Create a network of `size` nodes keeping `history_len` past phases per node
    pub fn new(size: usize, history_len: usize) -> Self {
        Self::with_seed(size, history_len, DEFAULT_SEED)
    }

    pub fn with_seed(size: usize, history_len: usize, seed: u64) -> Self {
        Self::with_params(size, history_len, EngineParams::default(), seed)
    }

    pub fn with_params(size: usize, history_len: usize, params: EngineParams, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let delay_steps = DEFAULT_DELAY_STEPS.min(history_len);

        let phases: Vec<f64> = (0..size).map(|_| rng.gen::<f64>() * TAU).collect();
        let history = phases
            .iter()
            .map(|&p| VecDeque::from(vec![p; history_len + 1]))
            .collect();

        let oscillators = (0..size)
            .map(|i| {
                if size < 2 {
                    return Oscillator::default();
                }
                let synapses = (0..CONNECTIONS_PER_NODE)
                    .map(|_| {
                        let mut source = rng.gen_range(0..size);
                        if source == i {
                            source = (source + 1) % size;
                        }
                        Synapse {
                            source,
                            strength: params.initial_strength,
                            phase_offset: 0.0,
                            delay_steps,
                        }
                    })
                    .collect();
                Oscillator::new(synapses)
            })
            .collect();

        Self {
            oscillators,
            phases,
            history,
            params,
            history_len,
            rng,
            current_time: 0.0,
            total_steps: 0,
        }
    }

    pub fn history_len(&self) -> usize {
        self.history_len
    }

    pub fn get_phase(&self, index: usize) -> Option<f64> {
        self.phases.get(index).copied()
    }

    /// Average absolute coupling strength over all synapses
    pub fn mean_coupling_strength(&self) -> f64 {
        let (sum, count) = self
            .oscillators
            .iter()
            .flat_map(|o| o.synapses.iter())
            .fold((0.0, 0usize), |(s, c), syn| (s + syn.strength.abs(), c + 1));
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }

    /// Number of nodes currently under an external drive
    pub fn driven_count(&self) -> usize {
        self.oscillators.iter().filter(|o| o.drive.is_some()).count()
    }

    fn fill_history(&mut self, index: usize) {
        let phase = self.phases[index];
        for past in self.history[index].iter_mut() {
            *past = phase;
        }
    }
}

impl PhaseEngine for ResonanceNetwork {
    fn size(&self) -> usize {
        self.phases.len()
    }

    fn step(&mut self, dt: f64, learning_rate: f64) {
        let mut next = Vec::with_capacity(self.phases.len());
        for (i, osc) in self.oscillators.iter().enumerate() {
            let theta = self.phases[i];
            let force = osc.coupling_force(theta, &self.history) + osc.drive_force(theta);
            let jitter = (self.rng.gen::<f64>() - 0.5) * self.params.jitter;
            next.push(normalize_phase(theta + force * dt + jitter));
        }

        if learning_rate > 0.0 {
            for (i, osc) in self.oscillators.iter_mut().enumerate() {
                osc.learn(self.phases[i], &self.history, learning_rate, &self.params);
            }
        }

        self.phases.copy_from_slice(&next);
        for (past, &phase) in self.history.iter_mut().zip(&self.phases) {
            past.push_front(phase);
            past.truncate(self.history_len + 1);
        }

        self.current_time += dt;
        self.total_steps += 1;
    }

    fn shake(&mut self) {
        self.clear_drives();
        for i in 0..self.phases.len() {
            self.phases[i] = self.rng.gen::<f64>() * TAU;
            self.fill_history(i);
        }
    }

    fn drive_node(&mut self, index: usize, phase: f64, strength: f64) {
        if let Some(osc) = self.oscillators.get_mut(index) {
            osc.set_drive(phase, strength);
        }
    }

    fn clear_drives(&mut self) {
        for osc in &mut self.oscillators {
            osc.clear_drive();
        }
    }

    fn set_phase(&mut self, index: usize, phase: f64) {
        if index < self.phases.len() {
            self.phases[index] = normalize_phase(phase);
            self.fill_history(index);
        }
    }

    fn imprint(&mut self, strength: f64) {
        let clamp = self.params.imprint_clamp;
        for (i, osc) in self.oscillators.iter_mut().enumerate() {
            osc.imprint(self.phases[i], &self.history, strength, clamp);
        }
    }

    fn reset_connectivity(&mut self) {
        let initial = self.params.initial_strength;
        for osc in &mut self.oscillators {
            osc.reset_synapses(initial);
        }
    }

    fn phases(&self) -> &[f64] {
        &self.phases
    }

    fn energy(&self) -> f64 {
        if self.phases.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .oscillators
            .iter()
            .zip(&self.phases)
            .map(|(osc, &theta)| osc.energy(theta, &self.history))
            .sum();
        total / self.phases.len() as f64
    }
}
