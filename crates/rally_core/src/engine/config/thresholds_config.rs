//! Centralized thresholds for rally state, scoring gates and rationale.
//!
//! | Category | Description |
//! |----------|-------------|
//! | Pressure | Attack/defense gates used by scoring and confidence |
//! | Timing | Time scales behind pressure and recovery |
//! | Rationale | Materiality cut-offs for reported factors |

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdsConfig {
    /// Above this pressure, shot risk is subtracted from the score.
    pub pressure_attack: f64,
    /// Above this pressure, confidence is reduced.
    pub pressure_defense: f64,
    /// Pressure strictly above this marks a key moment.
    pub key_moment: f64,
    /// Recovery quality below this counts as poor.
    pub poor_recovery: f64,
    /// Inter-shot gap (ms) at which time pressure halves.
    pub time_pressure_scale_ms: f64,
    /// Recovery window (ms) that maps to recovery quality 1.0.
    pub recovery_reference_ms: f64,
    pub rationale: RationaleThresholds,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            pressure_attack: 0.4,
            pressure_defense: 0.7,
            key_moment: 0.7,
            poor_recovery: 0.3,
            time_pressure_scale_ms: 800.0,
            recovery_reference_ms: 1200.0,
            rationale: RationaleThresholds::default(),
        }
    }
}

impl ThresholdsConfig {
    /// Tighter gates: risk counts earlier, confidence drops earlier.
    pub fn conservative() -> Self {
        Self {
            pressure_attack: 0.3,
            pressure_defense: 0.6,
            ..Self::default()
        }
    }

    /// Looser gates: risk only counts when clearly rushed.
    pub fn aggressive() -> Self {
        Self {
            pressure_attack: 0.55,
            pressure_defense: 0.8,
            ..Self::default()
        }
    }
}

/// A factor is only reported in the rationale once it crosses its cut-off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RationaleThresholds {
    pub movement_pressure: f64,
    pub open_court: f64,
    pub closed_court: f64,
    pub shot_risk: f64,
    pub angle_exposure: f64,
}

impl Default for RationaleThresholds {
    fn default() -> Self {
        Self {
            movement_pressure: 0.5,
            open_court: 0.8,
            closed_court: 0.1,
            shot_risk: 0.4,
            angle_exposure: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_order_gates() {
        let c = ThresholdsConfig::conservative();
        let d = ThresholdsConfig::default();
        let a = ThresholdsConfig::aggressive();
        assert!(c.pressure_attack < d.pressure_attack);
        assert!(d.pressure_attack < a.pressure_attack);
        assert!(c.pressure_defense < a.pressure_defense);
    }
}
