pub mod analyzer; // Pipeline orchestration and summary
pub mod config; // Tuning presets
pub mod debug_logger; // Caller-supplied trace sink
pub mod features;
pub mod ids;
pub mod rally_state; // Phase / initiative / pressure state machine
pub mod recommendation;
pub mod scoring; // Multi-factor candidate scoring with rationale
pub mod segmenter;
pub mod zones; // 3x3 court grid, adjacency and distance tables

pub use analyzer::{count_shot_types, RallyAnalyzer, RallyInput};
pub use config::EngineConfig;
pub use debug_logger::{AnalysisTracer, LogTracer, NoopTracer, RecordingTracer, TraceEvent};
pub use features::{opponent_motion, FeatureExtractor, OpponentMotion};
pub use ids::{IdGenerator, SeededIdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use rally_state::{
    find_key_moments, get_average_pressure, get_dominant_phase, RallyStateMachine,
};
pub use recommendation::{
    candidate_target_zones, generate_shot_path, get_viable_shot_types, viable_shot_types_at,
    RecommendationGenerator,
};
pub use scoring::{Candidate, CandidateScore, ScoreBreakdown, ScoringEngine};
pub use segmenter::{
    estimate_shuttle_height, estimate_shuttle_speed, trajectory_stats, Segmentation, ShotContext,
    ShotSegmenter,
};
pub use zones::{
    court_depth, depth_from_net, position_to_zone, zone_to_position, CourtDepth, ZoneTable,
};
