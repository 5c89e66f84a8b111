//! Tactical rally state, one per shot index.

use super::ZoneId;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tactical posture of the hitting player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Attack,
    #[default]
    Neutral,
    Defense,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Attack, Phase::Neutral, Phase::Defense];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Attack => "attack",
            Phase::Neutral => "neutral",
            Phase::Defense => "defense",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who currently dictates the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum Initiative {
    Us,
    Them,
    #[default]
    Unknown,
}

/// Derived tactical state at a shot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RallyState {
    pub phase: Phase,
    pub initiative: Initiative,
    /// 0.0 (relaxed) ..= 1.0 (rushed)
    pub pressure: f64,
    /// Ascending zone ids judged undefended.
    pub open_court_zones: Vec<ZoneId>,
    /// Milliseconds
    pub timestamp: f64,
}

impl RallyState {
    pub fn is_open(&self, zone: ZoneId) -> bool {
        self.open_court_zones.contains(&zone)
    }
}
