//! Rally Analyzer
//!
//! Top-level pipeline: segmentation -> rally states -> features ->
//! recommendations -> summary. Stateless between calls; the only
//! non-reproducible outputs are ids (from the caller's generator) and the
//! wall-clock metadata.

use super::config::EngineConfig;
use super::debug_logger::{AnalysisTracer, NoopTracer, TraceEvent};
use super::features::FeatureExtractor;
use super::ids::IdGenerator;
use super::rally_state::{
    find_key_moments, get_average_pressure, get_dominant_phase, RallyStateMachine,
};
use super::recommendation::RecommendationGenerator;
use super::segmenter::{trajectory_stats, ShotSegmenter};
use super::zones::ZoneTable;
use crate::error::Fallback;
use crate::models::{
    AnalysisMetadata, PositionSample, RallyAnalysisResult, RallySummary, ShotRecommendation,
    ShotSegment, ShotType, ShotTypeCount, TrajectoryPoint,
};
use chrono::Utc;
use std::time::Instant;

/// Borrowed inputs for one rally.
#[derive(Debug, Clone, Copy)]
pub struct RallyInput<'a> {
    pub session_id: &'a str,
    pub trajectory: &'a [TrajectoryPoint],
    pub pose_timestamps: Option<&'a [f64]>,
    pub opponent_positions: Option<&'a [PositionSample]>,
    pub player_positions: Option<&'a [PositionSample]>,
}

impl<'a> RallyInput<'a> {
    pub fn new(session_id: &'a str, trajectory: &'a [TrajectoryPoint]) -> Self {
        Self {
            session_id,
            trajectory,
            pose_timestamps: None,
            opponent_positions: None,
            player_positions: None,
        }
    }

    pub fn with_pose_timestamps(mut self, pose_timestamps: &'a [f64]) -> Self {
        self.pose_timestamps = Some(pose_timestamps);
        self
    }

    pub fn with_opponent_positions(mut self, samples: &'a [PositionSample]) -> Self {
        self.opponent_positions = Some(samples);
        self
    }

    pub fn with_player_positions(mut self, samples: &'a [PositionSample]) -> Self {
        self.player_positions = Some(samples);
        self
    }
}

pub struct RallyAnalyzer {
    config: EngineConfig,
    zones: &'static ZoneTable,
    tracer: Box<dyn AnalysisTracer>,
}

impl RallyAnalyzer {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            zones: ZoneTable::standard(),
            tracer: Box::new(NoopTracer),
        }
    }

    pub fn with_tracer(mut self, tracer: Box<dyn AnalysisTracer>) -> Self {
        self.tracer = tracer;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Full analysis of one rally. Never fails: missing context degrades to
    /// trajectory-only heuristics and is listed in `metadata.fallbacks`.
    pub fn analyze_rally(
        &self,
        input: &RallyInput<'_>,
        ids: &mut dyn IdGenerator,
    ) -> RallyAnalysisResult {
        let started = Instant::now();
        let rally_id = ids.next_id();

        let pose = non_empty(input.pose_timestamps);
        let opponent = non_empty(input.opponent_positions);
        let player = non_empty(input.player_positions);

        let mut fallbacks = Vec::new();
        if input.trajectory.len() < 2 {
            fallbacks.push(Fallback::InsufficientData);
        }
        if opponent.is_none() {
            fallbacks.push(Fallback::MissingOpponentContext);
        }
        if pose.is_none() {
            fallbacks.push(Fallback::MissingPoseContext);
        }
        if player.is_none() {
            fallbacks.push(Fallback::MissingPlayerContext);
        }
        if self.tracer.enabled() {
            for &fallback in &fallbacks {
                self.tracer.record(TraceEvent::Fallback { fallback });
            }
        }

        let segmentation =
            ShotSegmenter::new(&self.config.segmentation).segment(input.trajectory, pose);
        if self.tracer.enabled() {
            self.tracer.record(TraceEvent::Segmented {
                points: input.trajectory.len(),
                decision_points: segmentation.decision_points.clone(),
                shots: segmentation.shots.len(),
            });
        }
        let shots = segmentation.shots;

        let machine = self.state_machine();
        let states = machine.compute_all_rally_states(&shots, opponent);
        if self.tracer.enabled() {
            for (i, state) in states.iter().enumerate() {
                self.tracer.record(TraceEvent::StateComputed {
                    shot_index: i,
                    phase: state.phase,
                    pressure: state.pressure,
                });
            }
        }

        let features =
            FeatureExtractor::new(&self.config).extract_all(&shots, &states, opponent, player);
        let generator =
            RecommendationGenerator::new(&self.config, self.zones, self.tracer.as_ref());
        let analyses = generator.generate_per_shot_analysis(&shots, &states, &features, ids);

        let summary = RallySummary {
            total_shots: shots.len(),
            dominant_phase: get_dominant_phase(&states),
            average_pressure: get_average_pressure(&states),
            key_moments: find_key_moments(&states, self.config.thresholds.key_moment),
            shot_type_counts: count_shot_types(&shots),
            trajectory: trajectory_stats(input.trajectory),
        };

        RallyAnalysisResult {
            session_id: input.session_id.to_string(),
            rally_id,
            shots: analyses,
            summary,
            metadata: AnalysisMetadata {
                processed_at: Utc::now(),
                engine_version: self.config.engine_version.clone(),
                processing_time_ms: started.elapsed().as_secs_f64() * 1000.0,
                fallbacks,
            },
        }
    }

    /// Recommendations for a single shot of a trajectory, for interactive
    /// re-queries. An out-of-range index gives an empty list.
    pub fn generate_recommendations_for_shot(
        &self,
        trajectory: &[TrajectoryPoint],
        shot_index: usize,
        opponent_position: Option<(f64, f64)>,
        ids: &mut dyn IdGenerator,
    ) -> Vec<ShotRecommendation> {
        let shots = ShotSegmenter::new(&self.config.segmentation).segment_shots(trajectory, None);
        let Some(shot) = shots.get(shot_index) else {
            return Vec::new();
        };

        let state = self.state_machine().compute_rally_state(&shots, shot_index, opponent_position);
        let next_start = shots.get(shot_index + 1).map(|s| s.start_time);
        let features = FeatureExtractor::new(&self.config)
            .extract_features(shot, &state, None, None, next_start);

        RecommendationGenerator::new(&self.config, self.zones, self.tracer.as_ref())
            .generate_recommendations(shot, &features, &state, ids)
    }

    fn state_machine(&self) -> RallyStateMachine<'_> {
        RallyStateMachine::new(self.zones, &self.config.thresholds)
            .with_net_line(self.config.segmentation.net_line_y)
    }
}

impl Default for RallyAnalyzer {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

fn non_empty<T>(values: Option<&[T]>) -> Option<&[T]> {
    values.filter(|v| !v.is_empty())
}

/// Tally per shot type, in declaration order, zero counts omitted.
pub fn count_shot_types(shots: &[ShotSegment]) -> Vec<ShotTypeCount> {
    ShotType::ALL
        .iter()
        .map(|&shot_type| ShotTypeCount {
            shot_type,
            count: shots.iter().filter(|s| s.shot_type == shot_type).count(),
        })
        .filter(|c| c.count > 0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::debug_logger::RecordingTracer;
    use crate::engine::ids::SequentialIdGenerator;
    use crate::models::Phase;

    fn p(x: f64, y: f64, t: f64) -> TrajectoryPoint {
        TrajectoryPoint::new(x, y, t)
    }

    /// Clear from the near baseline, then a smash back.
    fn rally() -> Vec<TrajectoryPoint> {
        vec![
            p(0.50, 0.10, 0.0),
            p(0.52, 0.25, 150.0),
            p(0.55, 0.40, 300.0),
            p(0.58, 0.60, 450.0),
            p(0.60, 0.80, 600.0),
            p(0.62, 0.92, 750.0),
            p(0.60, 0.70, 850.0),
            p(0.55, 0.45, 950.0),
            p(0.50, 0.25, 1050.0),
            p(0.45, 0.10, 1150.0),
        ]
    }

    #[test]
    fn test_empty_trajectory_is_neutral() {
        let analyzer = RallyAnalyzer::default();
        let mut ids = SequentialIdGenerator::new("id");
        let result = analyzer.analyze_rally(&RallyInput::new("s", &[]), &mut ids);
        assert_eq!(result.summary.total_shots, 0);
        assert_eq!(result.summary.dominant_phase, Phase::Neutral);
        assert_eq!(result.summary.average_pressure, 0.5);
        assert!(result.summary.key_moments.is_empty());
        assert!(result.shots.is_empty());
        assert!(result.metadata.fallbacks.contains(&Fallback::InsufficientData));
        assert_eq!(result.session_id, "s");
        assert_eq!(result.rally_id, "id-0001");
    }

    #[test]
    fn test_full_rally_produces_recommendations() {
        let analyzer = RallyAnalyzer::default();
        let mut ids = SequentialIdGenerator::new("id");
        let trajectory = rally();
        let result = analyzer.analyze_rally(&RallyInput::new("s", &trajectory), &mut ids);

        assert!(result.summary.total_shots >= 1);
        assert_eq!(result.shots.len(), result.summary.total_shots);
        for shot in &result.shots {
            assert_eq!(shot.recommendations.len(), 3);
        }
        let counted: usize = result.summary.shot_type_counts.iter().map(|c| c.count).sum();
        assert_eq!(counted, result.summary.total_shots);
        assert_eq!(result.metadata.engine_version, crate::VERSION);
    }

    #[test]
    fn test_slow_arc_higher_than_fast_drive() {
        let analyzer = RallyAnalyzer::default();
        let mut ids = SequentialIdGenerator::new("id");

        // Same endpoints; the slow shot bows 0.15 off the straight line.
        let arc = vec![p(0.5, 0.2, 0.0), p(0.65, 0.5, 500.0), p(0.5, 0.85, 1500.0)];
        let flat = vec![p(0.5, 0.2, 0.0), p(0.5, 0.5, 100.0), p(0.5, 0.85, 300.0)];
        let arc_result = analyzer.analyze_rally(&RallyInput::new("s", &arc), &mut ids);
        let flat_result = analyzer.analyze_rally(&RallyInput::new("s", &flat), &mut ids);

        assert_eq!(arc_result.summary.total_shots, 1);
        assert_eq!(flat_result.summary.total_shots, 1);
        let arc_features = &arc_result.shots[0].features;
        let flat_features = &flat_result.shots[0].features;

        assert!((arc_features.shuttle_height_proxy - 0.75).abs() < 1e-9);
        assert_eq!(flat_features.shuttle_height_proxy, 0.0);
        assert!(arc_features.shuttle_height_proxy > flat_features.shuttle_height_proxy);
        assert!(flat_features.shuttle_speed_proxy > arc_features.shuttle_speed_proxy);
    }

    #[test]
    fn test_fallbacks_reflect_context() {
        let analyzer = RallyAnalyzer::default();
        let mut ids = SequentialIdGenerator::new("id");
        let trajectory = rally();
        let opponent = vec![p(0.5, 0.8, 0.0), p(0.3, 0.8, 600.0)];
        let poses = vec![600.0];
        let input = RallyInput::new("s", &trajectory)
            .with_opponent_positions(&opponent)
            .with_pose_timestamps(&poses);
        let result = analyzer.analyze_rally(&input, &mut ids);
        assert_eq!(result.metadata.fallbacks, vec![Fallback::MissingPlayerContext]);

        let bare = analyzer.analyze_rally(&RallyInput::new("s", &trajectory), &mut ids);
        assert_eq!(
            bare.metadata.fallbacks,
            vec![
                Fallback::MissingOpponentContext,
                Fallback::MissingPoseContext,
                Fallback::MissingPlayerContext
            ]
        );
    }

    #[test]
    fn test_deterministic_apart_from_ids_and_clock() {
        let analyzer = RallyAnalyzer::default();
        let trajectory = rally();
        let input = RallyInput::new("s", &trajectory);
        let mut a = analyzer.analyze_rally(&input, &mut SequentialIdGenerator::new("a"));
        let mut b = analyzer.analyze_rally(&input, &mut SequentialIdGenerator::new("b"));

        let stamp = a.metadata.processed_at;
        for result in [&mut a, &mut b] {
            result.rally_id.clear();
            for shot in &mut result.shots {
                for rec in &mut shot.recommendations {
                    rec.id.clear();
                }
            }
            result.metadata.processed_at = stamp;
            result.metadata.processing_time_ms = 0.0;
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_shot_query() {
        let analyzer = RallyAnalyzer::default();
        let mut ids = SequentialIdGenerator::new("id");
        let trajectory = rally();
        let recs =
            analyzer.generate_recommendations_for_shot(&trajectory, 0, Some((0.5, 0.8)), &mut ids);
        assert_eq!(recs.len(), 3);
        assert!(analyzer
            .generate_recommendations_for_shot(&trajectory, 99, None, &mut ids)
            .is_empty());
        assert!(analyzer
            .generate_recommendations_for_shot(&[], 0, None, &mut ids)
            .is_empty());
    }

    #[test]
    fn test_tracer_records_pipeline() {
        let tracer = RecordingTracer::new();
        let analyzer = RallyAnalyzer::default().with_tracer(Box::new(tracer.clone()));
        let mut ids = SequentialIdGenerator::new("id");
        let trajectory = rally();
        let result = analyzer.analyze_rally(&RallyInput::new("s", &trajectory), &mut ids);

        let events = tracer.events();
        assert!(events.iter().any(|e| matches!(e, TraceEvent::Segmented { .. })));
        let states = events
            .iter()
            .filter(|e| matches!(e, TraceEvent::StateComputed { .. }))
            .count();
        assert_eq!(states, result.summary.total_shots);
        assert!(tracer.candidate_count() >= 3 * result.summary.total_shots);
    }

    #[test]
    fn test_count_shot_types_skips_zeroes() {
        let analyzer = RallyAnalyzer::default();
        let trajectory = rally();
        let shots =
            ShotSegmenter::new(&analyzer.config().segmentation).segment_shots(&trajectory, None);
        let counts = count_shot_types(&shots);
        assert!(counts.iter().all(|c| c.count > 0));
        assert_eq!(counts.iter().map(|c| c.count).sum::<usize>(), shots.len());
        let serves = counts.iter().find(|c| c.shot_type == ShotType::Serve).map(|c| c.count);
        assert_eq!(serves, Some(1));
    }
}
