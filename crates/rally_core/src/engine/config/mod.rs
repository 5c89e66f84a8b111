//! # Engine Configuration
//!
//! All tuning constants of the analysis pipeline live here and are passed
//! explicitly to every component. There is no global configuration.
//!
//! ## Usage
//! ```rust
//! use rally_core::engine::config::EngineConfig;
//!
//! let config = EngineConfig::default();
//! let aggressive = EngineConfig::aggressive();
//! let from_env = EngineConfig::from_env_or_default();
//! ```
//!
//! ## Environment Variables
//!
//! - `RALLY_ENGINE_PROFILE`: Select preset (aggressive, conservative, default)

mod scoring_config;
mod segmentation_config;
mod thresholds_config;

pub use scoring_config::{PathConfig, ScoringWeights};
pub use segmentation_config::SegmentationConfig;
pub use thresholds_config::{RationaleThresholds, ThresholdsConfig};

use crate::error::{RallyError, Result};
use serde::{Deserialize, Serialize};
use std::env;

pub const PROFILE_ENV_VAR: &str = "RALLY_ENGINE_PROFILE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub segmentation: SegmentationConfig,
    pub thresholds: ThresholdsConfig,
    pub scoring: ScoringWeights,
    pub path: PathConfig,
    /// Attached to result metadata.
    pub engine_version: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            segmentation: SegmentationConfig::default(),
            thresholds: ThresholdsConfig::default(),
            scoring: ScoringWeights::default(),
            path: PathConfig::default(),
            engine_version: crate::VERSION.to_string(),
        }
    }
}

impl EngineConfig {
    /// Favors pressure-building targets and tolerates more risk.
    pub fn aggressive() -> Self {
        Self {
            thresholds: ThresholdsConfig::aggressive(),
            scoring: ScoringWeights::aggressive(),
            ..Self::default()
        }
    }

    /// Punishes risk and exposure harder.
    pub fn conservative() -> Self {
        Self {
            thresholds: ThresholdsConfig::conservative(),
            scoring: ScoringWeights::conservative(),
            ..Self::default()
        }
    }

    /// Preset by name; unknown names fall back to the default preset.
    pub fn from_profile(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "aggressive" => Self::aggressive(),
            "conservative" => Self::conservative(),
            "" | "default" => Self::default(),
            other => {
                log::warn!("Unknown engine profile '{}', using default", other);
                Self::default()
            }
        }
    }

    /// Load from `RALLY_ENGINE_PROFILE` or use default.
    pub fn from_env_or_default() -> Self {
        Self::from_profile(&env::var(PROFILE_ENV_VAR).unwrap_or_default())
    }

    /// Full config from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| RallyError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_engine_version(mut self, version: impl Into<String>) -> Self {
        self.engine_version = version.into();
        self
    }

    /// Rejects values that would break the range invariants of the output.
    pub fn validate(&self) -> Result<()> {
        let seg = &self.segmentation;
        if !(0.0..=180.0).contains(&seg.reversal_angle_deg) {
            return Err(RallyError::InvalidConfig(format!(
                "reversal_angle_deg out of range: {}",
                seg.reversal_angle_deg
            )));
        }
        if !(0.0..=1.0).contains(&seg.net_line_y) {
            return Err(RallyError::InvalidConfig(format!(
                "net_line_y out of range: {}",
                seg.net_line_y
            )));
        }
        if seg.speed_norm <= 0.0 || seg.height_norm <= 0.0 {
            return Err(RallyError::InvalidConfig(
                "speed_norm and height_norm must be positive".to_string(),
            ));
        }
        let th = &self.thresholds;
        if th.time_pressure_scale_ms <= 0.0 || th.recovery_reference_ms <= 0.0 {
            return Err(RallyError::InvalidConfig(
                "time scales must be positive".to_string(),
            ));
        }
        let w = &self.scoring;
        if [w.movement, w.open_court, w.risk, w.angle].iter().any(|v| *v < 0.0) {
            return Err(RallyError::InvalidConfig(
                "scoring weights must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}
