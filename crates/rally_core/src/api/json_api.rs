//! JSON boundary.
//!
//! Requests are validated here so the engine only ever sees well-formed
//! input: finite numbers, coordinates inside the unit court, and
//! non-decreasing timestamps. Everything past validation is infallible.

use crate::engine::{AnalysisTracer, EngineConfig, IdGenerator, RallyAnalyzer, RallyInput};
use crate::error::{RallyError, Result};
use crate::models::{PositionSample, RallyAnalysisResult, ShotRecommendation, TrajectoryPoint};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRallyRequest {
    pub session_id: String,
    pub trajectory: Vec<TrajectoryPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pose_timestamps: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opponent_positions: Option<Vec<PositionSample>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_positions: Option<Vec<PositionSample>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CourtPosition {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShotQueryRequest {
    pub trajectory: Vec<TrajectoryPoint>,
    /// Negative values are accepted and select no shot.
    pub shot_index: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opponent_position: Option<CourtPosition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShotQueryResponse {
    pub shot_index: i64,
    /// Empty when `shot_index` is negative or past the last detected shot.
    pub recommendations: Vec<ShotRecommendation>,
}

fn invalid(message: impl Into<String>) -> RallyError {
    RallyError::InvalidInput(message.into())
}

fn validate_coordinate(field: &str, index: usize, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(invalid(format!("{field}[{index}] is not a finite number")));
    }
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid(format!("{field}[{index}] = {value} is outside 0..=1")));
    }
    Ok(())
}

/// Positions in the unit court, timestamps finite and non-decreasing.
fn validate_samples(field: &str, samples: &[TrajectoryPoint]) -> Result<()> {
    let mut previous = f64::NEG_INFINITY;
    for (i, sample) in samples.iter().enumerate() {
        validate_coordinate(&format!("{field}.x"), i, sample.x)?;
        validate_coordinate(&format!("{field}.y"), i, sample.y)?;
        if !sample.timestamp.is_finite() {
            return Err(invalid(format!("{field}[{i}].timestamp is not a finite number")));
        }
        if sample.timestamp < previous {
            return Err(invalid(format!(
                "{field}[{i}].timestamp {} goes back in time (previous {})",
                sample.timestamp, previous
            )));
        }
        previous = sample.timestamp;
    }
    Ok(())
}

impl AnalyzeRallyRequest {
    pub fn validate(&self) -> Result<()> {
        if self.session_id.trim().is_empty() {
            return Err(invalid("sessionId must not be empty"));
        }
        validate_samples("trajectory", &self.trajectory)?;
        if let Some(poses) = &self.pose_timestamps {
            if let Some(i) = poses.iter().position(|t| !t.is_finite()) {
                return Err(invalid(format!("poseTimestamps[{i}] is not a finite number")));
            }
        }
        if let Some(samples) = &self.opponent_positions {
            validate_samples("opponentPositions", samples)?;
        }
        if let Some(samples) = &self.player_positions {
            validate_samples("playerPositions", samples)?;
        }
        Ok(())
    }

    pub fn as_input(&self) -> RallyInput<'_> {
        RallyInput {
            session_id: &self.session_id,
            trajectory: &self.trajectory,
            pose_timestamps: self.pose_timestamps.as_deref(),
            opponent_positions: self.opponent_positions.as_deref(),
            player_positions: self.player_positions.as_deref(),
        }
    }
}

impl ShotQueryRequest {
    pub fn validate(&self) -> Result<()> {
        validate_samples("trajectory", &self.trajectory)?;
        if let Some(p) = self.opponent_position {
            validate_coordinate("opponentPosition.x", 0, p.x)?;
            validate_coordinate("opponentPosition.y", 0, p.y)?;
        }
        Ok(())
    }
}

/// Parses, validates and analyzes a rally; returns the serialized
/// `RallyAnalysisResult`. Pipeline events go to `tracer`.
pub fn analyze_rally_json(
    request_json: &str,
    config: &EngineConfig,
    ids: &mut dyn IdGenerator,
    tracer: Box<dyn AnalysisTracer>,
) -> Result<String> {
    let request: AnalyzeRallyRequest = serde_json::from_str(request_json)?;
    if let Err(e) = request.validate() {
        tracing::warn!(session_id = %request.session_id, error = %e, "rejected analyze request");
        return Err(e);
    }

    let analyzer = RallyAnalyzer::new(config.clone()).with_tracer(tracer);
    let result = analyzer.analyze_rally(&request.as_input(), ids);
    tracing::info!(
        session_id = %result.session_id,
        rally_id = %result.rally_id,
        shots = result.summary.total_shots,
        fallbacks = result.metadata.fallbacks.len(),
        "rally analyzed"
    );

    serde_json::to_string(&result).map_err(|e| RallyError::Serialization(e.to_string()))
}

/// Single-shot query; returns a serialized `ShotQueryResponse`.
pub fn recommend_shot_json(
    request_json: &str,
    config: &EngineConfig,
    ids: &mut dyn IdGenerator,
    tracer: Box<dyn AnalysisTracer>,
) -> Result<String> {
    let request: ShotQueryRequest = serde_json::from_str(request_json)?;
    if let Err(e) = request.validate() {
        tracing::warn!(shot_index = request.shot_index, error = %e, "rejected shot query");
        return Err(e);
    }

    let analyzer = RallyAnalyzer::new(config.clone()).with_tracer(tracer);
    let recommendations = match usize::try_from(request.shot_index) {
        Ok(index) => analyzer.generate_recommendations_for_shot(
            &request.trajectory,
            index,
            request.opponent_position.map(|p| (p.x, p.y)),
            ids,
        ),
        Err(_) => Vec::new(),
    };
    if recommendations.is_empty() {
        tracing::info!(shot_index = request.shot_index, "shot index out of range");
    }

    let response = ShotQueryResponse { shot_index: request.shot_index, recommendations };
    serde_json::to_string(&response).map_err(|e| RallyError::Serialization(e.to_string()))
}

/// JSON Schema of `RallyAnalysisResult`.
pub fn analysis_result_schema() -> Result<serde_json::Value> {
    let schema = schemars::schema_for!(RallyAnalysisResult);
    serde_json::to_value(schema).map_err(|e| RallyError::Serialization(e.to_string()))
}
