//! Aggregate rally analysis output.

use super::features::ShotFeatures;
use super::rally::Phase;
use super::recommendation::ShotRecommendation;
use super::shot::{ShotSegment, ShotType};
use crate::error::Fallback;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShotAnalysis {
    pub shot: ShotSegment,
    pub features: ShotFeatures,
    pub recommendations: Vec<ShotRecommendation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShotTypeCount {
    pub shot_type: ShotType,
    pub count: usize,
}

/// Whole-rally motion statistics, speeds in court units per second.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrajectoryStats {
    /// Sample indices where vertical motion changes sign.
    pub direction_changes: Vec<usize>,
    pub average_speed: f64,
    pub max_speed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RallySummary {
    pub total_shots: usize,
    pub dominant_phase: Phase,
    pub average_pressure: f64,
    /// Shot indices whose pressure exceeded the key-moment threshold.
    pub key_moments: Vec<usize>,
    pub shot_type_counts: Vec<ShotTypeCount>,
    pub trajectory: TrajectoryStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    pub processed_at: DateTime<Utc>,
    pub engine_version: String,
    pub processing_time_ms: f64,
    /// Degradations applied because optional context was missing.
    pub fallbacks: Vec<Fallback>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RallyAnalysisResult {
    pub session_id: String,
    pub rally_id: String,
    pub shots: Vec<ShotAnalysis>,
    pub summary: RallySummary,
    pub metadata: AnalysisMetadata,
}
