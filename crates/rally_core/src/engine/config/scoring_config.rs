use serde::{Deserialize, Serialize};

/// Weights of the candidate score:
/// `base + movement·w1 + open_court·w2 − risk·w3 − angle·w4`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub base_score: f64,
    /// w1
    pub movement: f64,
    /// w2
    pub open_court: f64,
    /// w3 (only applied above the attack pressure gate)
    pub risk: f64,
    /// w4
    pub angle: f64,
    /// Share of zone distance inside the movement factor.
    pub distance_share: f64,
    /// Share of opponent momentum inside the movement factor.
    pub momentum_share: f64,
    /// Open-court score bonus for corner targets.
    pub corner_bonus: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            base_score: 50.0,
            movement: 20.0,
            open_court: 25.0,
            risk: 30.0,
            angle: 10.0,
            distance_share: 0.7,
            momentum_share: 0.3,
            corner_bonus: 0.2,
        }
    }
}

impl ScoringWeights {
    pub fn aggressive() -> Self {
        Self {
            movement: 25.0,
            risk: 20.0,
            ..Self::default()
        }
    }

    pub fn conservative() -> Self {
        Self {
            movement: 15.0,
            risk: 40.0,
            angle: 15.0,
            ..Self::default()
        }
    }
}

/// Shape of generated flight paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Height at contact (mid-level).
    pub contact_height: f64,
    /// Height at landing (low).
    pub landing_height: f64,
    /// Arc peak above the baseline for a height factor of 1.0.
    pub max_peak: f64,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            contact_height: 0.5,
            landing_height: 0.05,
            max_peak: 0.5,
        }
    }
}
