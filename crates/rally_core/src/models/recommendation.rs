//! Scored shot recommendations.

use super::shot::ShotType;
use super::ZoneId;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One point of a suggested flight path. `height` is relative, 0.0 = floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PathPoint {
    pub x: f64,
    pub y: f64,
    pub height: f64,
}

/// Factor behind a recommendation score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RationaleKind {
    MovementPressure,
    OpenCourt,
    ShotRisk,
    AngleExposure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RationaleEntry {
    #[serde(rename = "type")]
    pub kind: RationaleKind,
    pub description: String,
    /// Signed: positive helped the score, negative hurt it. -1.0 ..= 1.0
    pub impact: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShotRecommendation {
    /// Opaque
    pub id: String,
    pub shot_type: ShotType,
    pub target_zone: ZoneId,
    pub path_polyline: Vec<PathPoint>,
    /// 0.0 ..= 100.0
    pub score: f64,
    pub rationale: Vec<RationaleEntry>,
    /// 0.5 ..= 1.0
    pub confidence: f64,
}
