//! Data model shared by every engine component and the JSON boundary.

pub mod features;
pub mod rally;
pub mod recommendation;
pub mod result;
pub mod shot;
pub mod trajectory;

pub use features::ShotFeatures;
pub use rally::{Initiative, Phase, RallyState};
pub use recommendation::{PathPoint, RationaleEntry, RationaleKind, ShotRecommendation};
pub use result::{
    AnalysisMetadata, RallyAnalysisResult, RallySummary, ShotAnalysis, ShotTypeCount,
    TrajectoryStats,
};
pub use shot::{PlayerSide, ShotSegment, ShotType};
pub use trajectory::{PositionSample, TrajectoryPoint};

/// Court zone id, `0..=8` on the 3x3 grid.
pub type ZoneId = u8;
