//! # rally_core - Badminton Rally Analysis Engine
//!
//! Turns a tracked shuttle trajectory into discrete shots, a phase-aware
//! tactical state per shot, and three scored, explained shot
//! recommendations per shot.
//!
//! ## Features
//! - Deterministic output for identical input (ids aside)
//! - Graceful degradation when opponent, pose or player context is missing
//! - Explicit configuration presets, no global state
//! - JSON API with JSON Schema for the result records
//!
//! ## Usage
//! ```rust
//! use rally_core::engine::{RallyAnalyzer, RallyInput, SequentialIdGenerator};
//! use rally_core::models::TrajectoryPoint;
//!
//! let trajectory = vec![
//!     TrajectoryPoint::new(0.5, 0.2, 0.0),
//!     TrajectoryPoint::new(0.5, 0.5, 500.0),
//!     TrajectoryPoint::new(0.5, 0.85, 1500.0),
//! ];
//! let analyzer = RallyAnalyzer::default();
//! let mut ids = SequentialIdGenerator::new("rec");
//! let result = analyzer.analyze_rally(&RallyInput::new("session", &trajectory), &mut ids);
//! assert!(result.summary.total_shots >= 1);
//! ```

// Doc formatting lints - purely cosmetic
#![allow(clippy::doc_lazy_continuation)]
// Pipeline entry points take the full per-shot context
#![allow(clippy::too_many_arguments)]
// Loop style - index math mirrors the geometry
#![allow(clippy::needless_range_loop)]

pub mod api;
pub mod engine;
pub mod error;
pub mod models;

/// Engine version attached to result metadata by default.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export main API functions
pub use api::{
    analysis_result_schema, analyze_rally_json, recommend_shot_json, AnalyzeRallyRequest,
    ShotQueryRequest,
};
pub use error::{Fallback, RallyError, Result};

// Re-export engine entry points
pub use engine::{AnalysisTracer, EngineConfig, IdGenerator, RallyAnalyzer, RallyInput};
