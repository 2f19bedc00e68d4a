use crate::assembler::StateLayout;
use crate::codec::Modality;
use crate::constants;
use crate::engine::constants::DEFAULT_SEED;
use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub engine: EngineKnobs,
    pub layout: LayoutKnobs,
    pub store: StoreKnobs,
    pub recall: RecallKnobs,
    pub present: PresentKnobs,
    pub display: DisplayKnobs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineKnobs {
    pub history_len: usize, // e.g., 10
    pub dt: f64,            // e.g., 0.05
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutKnobs {
    pub grid_rows: usize,    // e.g., 32
    pub grid_cols: usize,    // e.g., 32
    pub text_len: usize,     // 0 disables the text region
    pub waveform_len: usize, // 0 disables the waveform region
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreKnobs {
    pub drive_strength: f64,   // e.g., 2.0 (visual feedback only)
    pub animation_steps: usize, // e.g., 50
    pub substeps: usize,        // e.g., 5 per frame
    pub imprint_strength: f64,  // e.g., 1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecallKnobs {
    pub drive_strength: f64, // e.g., 5.0 (re-asserted every step)
    pub max_steps: usize,    // e.g., 200
    pub substeps: usize,     // e.g., 3 per frame
    pub threshold: f64,      // e.g., 0.95
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentKnobs {
    pub drive_strength: f64, // e.g., 10.0
    pub steps: usize,        // e.g., 20
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayKnobs {
    pub frame_interval_ms: u64, // e.g., 16 (~60 Hz)
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            engine: EngineKnobs::default(),
            layout: LayoutKnobs::default(),
            store: StoreKnobs::default(),
            recall: RecallKnobs::default(),
            present: PresentKnobs::default(),
            display: DisplayKnobs::default(),
        }
    }
}

impl Default for EngineKnobs {
    fn default() -> Self {
        Self {
            history_len: constants::MAX_HISTORY,
            dt: constants::DEFAULT_DT,
            seed: DEFAULT_SEED,
        }
    }
}

impl Default for LayoutKnobs {
    fn default() -> Self {
        Self {
            grid_rows: constants::GRID_SIZE,
            grid_cols: constants::GRID_SIZE,
            text_len: constants::TEXT_LEN,
            waveform_len: constants::WAVEFORM_LEN,
        }
    }
}

impl Default for StoreKnobs {
    fn default() -> Self {
        Self {
            drive_strength: constants::store::DRIVE_STRENGTH,
            animation_steps: constants::store::ANIMATION_STEPS,
            substeps: constants::store::SUBSTEPS,
            imprint_strength: constants::store::IMPRINT_STRENGTH,
        }
    }
}

impl Default for RecallKnobs {
    fn default() -> Self {
        Self {
            drive_strength: constants::recall::DRIVE_STRENGTH,
            max_steps: constants::recall::MAX_STEPS,
            substeps: constants::recall::SUBSTEPS,
            threshold: constants::recall::CONVERGENCE_THRESHOLD,
        }
    }
}

impl Default for PresentKnobs {
    fn default() -> Self {
        Self {
            drive_strength: constants::present::DRIVE_STRENGTH,
            steps: constants::present::STEPS,
        }
    }
}

impl Default for DisplayKnobs {
    fn default() -> Self {
        Self {
            frame_interval_ms: constants::FRAME_INTERVAL_MS,
        }
    }
}

impl LayoutKnobs {
    pub fn image_len(&self) -> usize {
        self.grid_rows * self.grid_cols
    }

    pub fn total_len(&self) -> usize {
        self.image_len() + self.text_len + self.waveform_len
    }

    /// Image, then text, then waveform, back to back
    pub fn build(&self) -> Result<StateLayout> {
        StateLayout::contiguous(&[
            (Modality::Image, self.image_len()),
            (Modality::Text, self.text_len),
            (Modality::Waveform, self.waveform_len),
        ])
    }
}

impl HarnessConfig {
    /// Read a TOML config; a missing file yields the defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Node count of the engine this config describes
    pub fn engine_size(&self) -> usize {
        self.layout.total_len()
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.engine.dt > 0.0, "engine.dt must be positive");
        ensure!(
            self.layout.image_len() > 0,
            "layout.grid_rows and layout.grid_cols must be positive"
        );
        ensure!(
            self.store.drive_strength > 0.0 && self.store.imprint_strength > 0.0,
            "store strengths must be positive"
        );
        ensure!(
            self.store.animation_steps > 0 && self.store.substeps > 0,
            "store.animation_steps and store.substeps must be positive"
        );
        ensure!(self.recall.drive_strength > 0.0, "recall.drive_strength must be positive");
        ensure!(
            self.recall.max_steps > 0 && self.recall.substeps > 0,
            "recall.max_steps and recall.substeps must be positive"
        );
        ensure!(
            self.recall.threshold > 0.0 && self.recall.threshold <= 1.0,
            "recall.threshold must be in (0, 1]"
        );
        ensure!(self.present.drive_strength > 0.0, "present.drive_strength must be positive");
        ensure!(
            self.display.frame_interval_ms > 0,
            "display.frame_interval_ms must be positive"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = HarnessConfig::default();
        config.validate().unwrap();
        assert_eq!(config.engine_size(), 32 * 32 + 32 + 64);
        assert_eq!(config.recall.max_steps, 200);
        assert_eq!(config.recall.threshold, 0.95);
    }

    #[test]
    fn test_layout_matches_engine_size() {
        let config = HarnessConfig::default();
        let layout = config.layout.build().unwrap();
        assert_eq!(layout.total_len(), config.engine_size());
        assert_eq!(layout.region(Modality::Text).unwrap().start, 1024);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = HarnessConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, HarnessConfig::default());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("harness.toml");
        fs::write(
            &path,
            "[recall]\nmax_steps = 90\nthreshold = 0.9\n\n[layout]\ntext_len = 0\n",
        )
        .unwrap();

        let config = HarnessConfig::load(&path).unwrap();
        assert_eq!(config.recall.max_steps, 90);
        assert_eq!(config.recall.threshold, 0.9);
        assert_eq!(config.recall.substeps, constants::recall::SUBSTEPS);
        assert_eq!(config.layout.text_len, 0);
        assert!(config.layout.build().unwrap().region(Modality::Text).is_none());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[recall]\nthreshold = 1.5\n").unwrap();
        assert!(HarnessConfig::load(&path).is_err());

        let mut config = HarnessConfig::default();
        config.recall.substeps = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = HarnessConfig::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: HarnessConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
