use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised at the JSON boundary.
///
/// The engine itself never fails on well-typed input; these only cover
/// malformed requests and configuration.
#[derive(Error, Debug)]
pub enum RallyError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl RallyError {
    /// Caller-side problems the client can fix by resending.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RallyError::InvalidInput(_) | RallyError::Deserialization(_)
        )
    }
}

impl From<serde_json::Error> for RallyError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            RallyError::Deserialization(err.to_string())
        } else {
            RallyError::Serialization(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, RallyError>;

/// Graceful degradation applied during an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Fallback {
    /// Fewer than two trajectory points; zero shots produced.
    InsufficientData,
    /// No opponent samples; corner zones assumed open, zero opponent movement.
    MissingOpponentContext,
    /// No pose timestamps; segmentation used the trajectory only.
    MissingPoseContext,
    /// No player samples; recovery quality from timing only.
    MissingPlayerContext,
}

impl Fallback {
    pub fn as_str(&self) -> &'static str {
        match self {
            Fallback::InsufficientData => "insufficient_data",
            Fallback::MissingOpponentContext => "missing_opponent_context",
            Fallback::MissingPoseContext => "missing_pose_context",
            Fallback::MissingPlayerContext => "missing_player_context",
        }
    }
}
