//! Free-recall verification of the reference engine
//!
//! Imprint two random patterns, knock every `noise_stride`-th node of the
//! first one off by `noise_offset`, and let the network settle with no drive.
//! The overlap with the first pattern at the end is the verdict.

use crate::engine::{PhaseEngine, ResonanceNetwork};
use crate::similarity::mean_alignment;
use anyhow::{ensure, Result};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone)]
pub struct FreeRecallCheck {
    pub size: usize,
    pub history_len: usize,
    pub seed: u64,
    pub noise_stride: usize,
    pub noise_offset: f64,
    pub steps: usize,
    pub dt: f64,
    /// Overlap needed to pass
    pub threshold: f64,
}

impl Default for FreeRecallCheck {
    fn default() -> Self {
        Self {
            size: 4096, // 64x64
            history_len: 0,
            seed: crate::engine::constants::DEFAULT_SEED,
            noise_stride: 10,
            noise_offset: 3.0,
            steps: 50,
            dt: 0.1,
            threshold: 0.95,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FreeRecallReport {
    pub nodes: usize,
    pub patterns: usize,
    pub corrupted: usize,
    pub steps: usize,
    pub cue_overlap: f64,
    pub final_overlap: f64,
    pub threshold: f64,
    pub passed: bool,
}

impl FreeRecallCheck {
    pub fn run(&self) -> Result<FreeRecallReport> {
        ensure!(self.size >= 2, "verification needs at least two nodes");
        ensure!(self.noise_stride > 0, "noise stride must be positive");
        ensure!(self.dt > 0.0, "dt must be positive");

        let mut net = ResonanceNetwork::with_seed(self.size, self.history_len, self.seed);

        net.shake();
        let pattern_a = net.phases().to_vec();
        net.imprint(1.0);

        net.shake();
        net.imprint(1.0);

        let cue: Vec<f64> = pattern_a
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if i % self.noise_stride == 0 {
                    p + self.noise_offset
                } else {
                    *p
                }
            })
            .collect();
        net.load_phases(&cue);
        let cue_overlap = mean_alignment(net.phases(), &pattern_a)?;

        for _ in 0..self.steps {
            net.step(self.dt, 0.0);
        }
        let final_overlap = mean_alignment(net.phases(), &pattern_a)?;
        let passed = final_overlap > self.threshold;

        info!(
            "Free recall over {} nodes: overlap {:.4} -> {:.4} ({})",
            self.size,
            cue_overlap,
            final_overlap,
            if passed { "pass" } else { "fail" }
        );

        Ok(FreeRecallReport {
            nodes: self.size,
            patterns: 2,
            corrupted: self.size.div_ceil(self.noise_stride),
            steps: self.steps,
            cue_overlap,
            final_overlap,
            threshold: self.threshold,
            passed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupted_cue_settles_back() {
        let check = FreeRecallCheck {
            size: 512,
            history_len: 10,
            steps: 200,
            ..Default::default()
        };
        let report = check.run().unwrap();
        assert_eq!(report.corrupted, 52);
        assert!(report.final_overlap > report.cue_overlap);
        assert!(report.final_overlap > 0.9, "overlap {}", report.final_overlap);
    }

    #[test]
    fn test_invalid_checks_rejected() {
        let tiny = FreeRecallCheck {
            size: 1,
            ..Default::default()
        };
        assert!(tiny.run().is_err());

        let no_stride = FreeRecallCheck {
            noise_stride: 0,
            ..Default::default()
        };
        assert!(no_stride.run().is_err());
    }

    #[test]
    fn test_report_serializes() {
        let report = FreeRecallCheck {
            size: 64,
            steps: 5,
            ..Default::default()
        }
        .run()
        .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["nodes"], 64);
        assert!(json["passed"].is_boolean());
    }
}
