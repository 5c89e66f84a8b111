use serde::{Deserialize, Serialize};

/// Shot segmentation and classification tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Turn between consecutive steps (degrees) that counts as a hit.
    pub reversal_angle_deg: f64,
    /// Net position on the normalized `y` axis.
    pub net_line_y: f64,
    /// Sample gap (ms) treated as a tracking break between shots.
    pub max_gap_ms: f64,
    /// Decision points closer than this (ms) to the previous one are dropped.
    pub min_shot_interval_ms: f64,
    /// Pose hints snap to a sample within this distance (ms).
    pub pose_snap_tolerance_ms: f64,
    /// Ground speed (court units / s) that maps to speed proxy 1.0.
    pub speed_norm: f64,
    /// Chord deviation (court units) that maps to height proxy 1.0.
    pub height_norm: f64,

    // === Classification ===
    pub smash_speed: f64,
    pub drive_speed: f64,
    pub slow_speed: f64,
    pub high_arc: f64,
    pub flat_arc: f64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            reversal_angle_deg: 100.0,
            net_line_y: 0.5,
            max_gap_ms: 800.0,
            min_shot_interval_ms: 120.0,
            pose_snap_tolerance_ms: 100.0,
            speed_norm: 2.5,
            height_norm: 0.2,
            smash_speed: 0.6,
            drive_speed: 0.35,
            slow_speed: 0.2,
            high_arc: 0.35,
            flat_arc: 0.15,
        }
    }
}

impl SegmentationConfig {
    /// Cosine of the reversal angle; a step pair whose cosine falls below
    /// this is a direction reversal.
    pub fn reversal_cos(&self) -> f64 {
        self.reversal_angle_deg.to_radians().cos()
    }
}
