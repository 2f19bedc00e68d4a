//! Engine boundary: the oscillator simulation the recall controller drives
//!
//! The controller only ever talks to an engine through [`PhaseEngine`].
//! [`ResonanceNetwork`] is the in-process reference engine used by the
//! command-line harness and the tests.

pub mod network;
pub mod oscillator;

pub use network::ResonanceNetwork;
pub use oscillator::{Drive, EngineParams, Oscillator, Synapse};

/// Core constants for the reference engine
pub mod constants {
    /// Fan-in of every node
    pub const CONNECTIONS_PER_NODE: usize = 40;

    /// Axonal delay, in steps, read from the node history
    pub const DEFAULT_DELAY_STEPS: usize = 2;

    /// Coupling strength of a fresh synapse
    pub const INITIAL_STRENGTH: f64 = 0.01;

    /// Bound on coupling strength during online learning
    pub const LEARNING_CLAMP: f64 = 1.5;

    /// Bound on coupling strength after imprinting
    pub const IMPRINT_CLAMP: f64 = 10.0;

    /// Relaxation of coupling strength toward zero during learning
    pub const STRENGTH_DECAY: f64 = 1.0;

    /// Peak-to-peak phase jitter added every step
    pub const DEFAULT_JITTER: f64 = 0.005;

    /// Seed used when none is configured
    pub const DEFAULT_SEED: u64 = 9999;
}

/// Operations the harness needs from an oscillator simulation.
///
/// Phases handed in may be any finite value; engines wrap them as they see fit.
pub trait PhaseEngine {
    /// Number of nodes
    fn size(&self) -> usize;

    /// Advance one step. `learning_rate = 0` disables online weight adaptation.
    fn step(&mut self, dt: f64, learning_rate: f64);

    /// Randomize all phases and drop every drive
    fn shake(&mut self);

    /// Force node `index` toward `phase` with `strength` until cleared
    fn drive_node(&mut self, index: usize, phase: f64, strength: f64);

    fn clear_drives(&mut self);

    /// Instantaneous override of one node, bypassing the dynamics
    fn set_phase(&mut self, index: usize, phase: f64);

    /// One-shot consolidation of the current state into connectivity
    fn imprint(&mut self, strength: f64);

    /// Forget all learned structure
    fn reset_connectivity(&mut self);

    fn clear_patterns(&mut self) {
        self.reset_connectivity();
    }

    /// Current phase of every node.
    ///
    /// The slice borrows the engine, so it cannot be held across the next step.
    fn phases(&self) -> &[f64];

    /// Coupling energy per node; lower means the state sits deeper in a learned basin
    fn energy(&self) -> f64 {
        0.0
    }

    /// Drive every node toward the matching entry of `pattern`
    fn drive_pattern(&mut self, pattern: &[f64], strength: f64) {
        for (index, &phase) in pattern.iter().enumerate().take(self.size()) {
            self.drive_node(index, phase, strength);
        }
    }

    /// Set every node to the matching entry of `pattern`
    fn load_phases(&mut self, pattern: &[f64]) {
        for (index, &phase) in pattern.iter().enumerate().take(self.size()) {
            self.set_phase(index, phase);
        }
    }
}
