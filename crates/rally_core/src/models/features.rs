//! Per-shot quantitative features.

use super::rally::RallyState;
use super::ZoneId;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Features of one shot, combined with the rally state at that shot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShotFeatures {
    pub contact_zone: ZoneId,
    pub landing_zone: ZoneId,
    /// 0.0 ..= 1.0
    pub shuttle_speed_proxy: f64,
    /// 0.0 ..= 1.0
    pub shuttle_height_proxy: f64,
    /// Path length of the opponent inside the shot window (court units).
    pub opponent_movement_distance: f64,
    /// Turn between the opponent's first and last movement inside the window,
    /// 0.0 (straight) ..= 1.0 (full reversal).
    pub opponent_direction_change: f64,
    /// Unit vector of the opponent's net motion inside the window.
    pub opponent_heading: Option<(f64, f64)>,
    /// 0.0 (no time to reset) ..= 1.0 (comfortable)
    pub recovery_quality: f64,
    pub rally_state: RallyState,
}
