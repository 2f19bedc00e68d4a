// src/constants.rs

/// Default side length of the square image grid (32x32 = 1024 oscillators)
pub const GRID_SIZE: usize = 32;

/// Default number of phase slots reserved for the text channel
pub const TEXT_LEN: usize = 32;

/// Default number of phase slots reserved for the synthetic waveform channel
pub const WAVEFORM_LEN: usize = 64;

/// Default simulation time step handed to the engine
pub const DEFAULT_DT: f64 = 0.05;

/// Default per-node history length requested from the engine
pub const MAX_HISTORY: usize = 10;

/// One display refresh at ~60 Hz
pub const FRAME_INTERVAL_MS: u64 = 16;

/// Knobs for the store animation (brief forcing, then consolidation)
pub mod store {
    pub const DRIVE_STRENGTH: f64 = 2.0;
    pub const ANIMATION_STEPS: usize = 50;
    pub const SUBSTEPS: usize = 5;
    pub const IMPRINT_STRENGTH: f64 = 1.0;
}

/// Knobs for sustained-cueing recall
pub mod recall {
    pub const DRIVE_STRENGTH: f64 = 5.0;
    pub const MAX_STEPS: usize = 200;
    pub const SUBSTEPS: usize = 3;
    pub const CONVERGENCE_THRESHOLD: f64 = 0.95;
}

/// Knobs for previewing a cue on the network before it is stored
pub mod present {
    pub const DRIVE_STRENGTH: f64 = 10.0;
    pub const STEPS: usize = 20;
}
