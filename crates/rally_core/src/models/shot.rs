//! Shot segments produced by the segmenter.

use super::trajectory::TrajectoryPoint;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Shot classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShotType {
    Clear,
    Drop,
    Smash,
    Drive,
    Net,
    Lift,
    Serve,
    Push,
    #[default]
    Unknown,
}

impl ShotType {
    /// Declaration order; summaries tally in this order.
    pub const ALL: [ShotType; 9] = [
        ShotType::Clear,
        ShotType::Drop,
        ShotType::Smash,
        ShotType::Drive,
        ShotType::Net,
        ShotType::Lift,
        ShotType::Serve,
        ShotType::Push,
        ShotType::Unknown,
    ];

    /// Shots that take the initiative (put the opponent under pressure).
    pub fn is_attacking(&self) -> bool {
        matches!(self, ShotType::Smash | ShotType::Drop | ShotType::Net)
    }

    /// Shots that buy time at the cost of initiative.
    pub fn is_defensive(&self) -> bool {
        matches!(self, ShotType::Clear | ShotType::Lift | ShotType::Push)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShotType::Clear => "clear",
            ShotType::Drop => "drop",
            ShotType::Smash => "smash",
            ShotType::Drive => "drive",
            ShotType::Net => "net",
            ShotType::Lift => "lift",
            ShotType::Serve => "serve",
            ShotType::Push => "push",
            ShotType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ShotType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of the net the hitting player stands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlayerSide {
    /// `y < 0.5`
    Near,
    /// `y >= 0.5`
    Far,
}

impl PlayerSide {
    pub fn from_y(y: f64, net_line: f64) -> Self {
        if y < net_line {
            PlayerSide::Near
        } else {
            PlayerSide::Far
        }
    }
}

/// One hit: a contiguous slice of the rally trajectory with a classified type.
///
/// Segments are never edited in place; reclassification builds a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShotSegment {
    pub shot_index: usize,
    #[serde(rename = "type")]
    pub shot_type: ShotType,
    pub start_time: f64,
    pub end_time: f64,
    /// At least two points, ordered and contiguous in the source trajectory.
    pub trajectory_slice: Vec<TrajectoryPoint>,
    pub player: PlayerSide,
}

impl ShotSegment {
    /// Contact point (first sample of the slice).
    pub fn contact_point(&self) -> Option<&TrajectoryPoint> {
        self.trajectory_slice.first()
    }

    /// Landing point (last sample of the slice).
    pub fn landing_point(&self) -> Option<&TrajectoryPoint> {
        self.trajectory_slice.last()
    }

    pub fn duration_ms(&self) -> f64 {
        (self.end_time - self.start_time).max(0.0)
    }

    /// Copy of this segment with a different type; slice and index are kept.
    pub fn with_type(&self, shot_type: ShotType) -> Self {
        Self { shot_type, ..self.clone() }
    }
}
