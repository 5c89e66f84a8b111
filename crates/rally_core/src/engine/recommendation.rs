//! Recommendation Generator
//!
//! Builds a bounded candidate set per shot (viable shot types x up to five
//! target zones), scores it and keeps the top three, each with a flight path
//! for display.

use super::config::{EngineConfig, PathConfig};
use super::debug_logger::{AnalysisTracer, TraceEvent};
use super::ids::IdGenerator;
use super::scoring::{Candidate, CandidateScore, ScoringEngine};
use super::zones::{all_zones, court_depth, zone_depth, zone_to_position, CourtDepth, ZoneTable};
use crate::models::{
    PathPoint, Phase, RallyState, ShotAnalysis, ShotFeatures, ShotRecommendation, ShotSegment,
    ShotType, ZoneId,
};

/// Recommendations returned per shot.
pub const TOP_RECOMMENDATIONS: usize = 3;
/// Target zones considered per shot.
pub const MAX_TARGET_ZONES: usize = 5;
/// Samples per flight path, endpoints included.
pub const PATH_POINTS: usize = 7;

/// Relative arc of each shot type; clears highest, drives flattest.
pub fn height_factor(shot_type: ShotType) -> f64 {
    match shot_type {
        ShotType::Clear => 1.0,
        ShotType::Lift => 0.9,
        ShotType::Serve => 0.6,
        ShotType::Drop => 0.4,
        ShotType::Unknown => 0.3,
        ShotType::Net => 0.2,
        ShotType::Push => 0.15,
        ShotType::Smash => 0.1,
        ShotType::Drive => 0.05,
    }
}

fn phase_repertoire(phase: Phase) -> &'static [ShotType] {
    match phase {
        Phase::Attack => &[
            ShotType::Smash,
            ShotType::Drop,
            ShotType::Net,
            ShotType::Push,
            ShotType::Drive,
        ],
        Phase::Neutral => &[
            ShotType::Clear,
            ShotType::Drop,
            ShotType::Drive,
            ShotType::Net,
            ShotType::Lift,
            ShotType::Push,
        ],
        Phase::Defense => &[
            ShotType::Clear,
            ShotType::Lift,
            ShotType::Drive,
            ShotType::Push,
            ShotType::Net,
        ],
    }
}

fn playable_from(depth: CourtDepth, shot_type: ShotType) -> bool {
    match depth {
        CourtDepth::Front => matches!(
            shot_type,
            ShotType::Net | ShotType::Push | ShotType::Lift | ShotType::Drive
        ),
        CourtDepth::Mid | CourtDepth::Back => matches!(
            shot_type,
            ShotType::Smash | ShotType::Clear | ShotType::Drop | ShotType::Drive
        ),
    }
}

/// Phase repertoire filtered by where the shuttle is struck. Never empty.
///
/// Only the zone is known here, so the depth is the coarse one from
/// [`zone_depth`]: the net row plays front, both baseline rows play back.
pub fn get_viable_shot_types(phase: Phase, contact_zone: ZoneId) -> Vec<ShotType> {
    viable_shot_types_at(phase, zone_depth(contact_zone))
}

/// Phase repertoire filtered by contact depth measured from the net.
pub fn viable_shot_types_at(phase: Phase, depth: CourtDepth) -> Vec<ShotType> {
    let repertoire = phase_repertoire(phase);
    let viable: Vec<ShotType> = repertoire
        .iter()
        .copied()
        .filter(|&t| playable_from(depth, t))
        .collect();
    if viable.is_empty() {
        repertoire.to_vec()
    } else {
        viable
    }
}

/// Open zones first (in their given order), then the rest ascending, capped.
pub fn candidate_target_zones(open_court_zones: &[ZoneId]) -> Vec<ZoneId> {
    let mut targets: Vec<ZoneId> = Vec::with_capacity(MAX_TARGET_ZONES);
    for zone in open_court_zones.iter().copied().chain(all_zones()) {
        if targets.len() == MAX_TARGET_ZONES {
            break;
        }
        if !targets.contains(&zone) && (zone as usize) < super::zones::ZONE_COUNT {
            targets.push(zone);
        }
    }
    targets
}

/// Horizontal straight line from the contact point to the target centre with
/// a parabolic height profile.
pub fn generate_shot_path(
    contact: (f64, f64),
    target_zone: ZoneId,
    shot_type: ShotType,
    path: &PathConfig,
) -> Vec<PathPoint> {
    let (x0, y0) = contact;
    let (x1, y1) = zone_to_position(target_zone);
    let peak = path.max_peak * height_factor(shot_type);
    let last = (PATH_POINTS - 1) as f64;

    (0..PATH_POINTS)
        .map(|i| {
            let t = i as f64 / last;
            let base = path.contact_height + (path.landing_height - path.contact_height) * t;
            PathPoint {
                x: x0 + (x1 - x0) * t,
                y: y0 + (y1 - y0) * t,
                height: base + peak * 4.0 * t * (1.0 - t),
            }
        })
        .collect()
}

pub struct RecommendationGenerator<'a> {
    config: &'a EngineConfig,
    scoring: ScoringEngine<'a>,
    tracer: &'a dyn AnalysisTracer,
}

impl<'a> RecommendationGenerator<'a> {
    pub fn new(
        config: &'a EngineConfig,
        zones: &'a ZoneTable,
        tracer: &'a dyn AnalysisTracer,
    ) -> Self {
        Self {
            config,
            scoring: ScoringEngine::new(zones, config),
            tracer,
        }
    }

    /// Top three recommendations for one shot, best first.
    pub fn generate_recommendations(
        &self,
        shot: &ShotSegment,
        features: &ShotFeatures,
        rally_state: &RallyState,
        ids: &mut dyn IdGenerator,
    ) -> Vec<ShotRecommendation> {
        let shot_types = match shot.contact_point() {
            Some(p) => viable_shot_types_at(
                rally_state.phase,
                court_depth(p.y, self.config.segmentation.net_line_y),
            ),
            None => get_viable_shot_types(rally_state.phase, features.contact_zone),
        };
        let targets = candidate_target_zones(&rally_state.open_court_zones);

        let candidates: Vec<Candidate> = shot_types
            .iter()
            .flat_map(|&shot_type| {
                targets
                    .iter()
                    .map(move |&target_zone| Candidate { shot_type, target_zone })
            })
            .collect();

        let ranked = self
            .scoring
            .score_and_rank_recommendations(&candidates, features, rally_state);

        if self.tracer.enabled() {
            for scored in &ranked {
                self.tracer.record(TraceEvent::CandidateScored {
                    shot_index: shot.shot_index,
                    shot_type: scored.candidate.shot_type,
                    target_zone: scored.candidate.target_zone,
                    score: scored.score,
                    confidence: scored.confidence,
                });
            }
        }

        let contact = shot
            .contact_point()
            .map(|p| p.position())
            .unwrap_or_else(|| zone_to_position(features.contact_zone));

        ranked
            .into_iter()
            .take(TOP_RECOMMENDATIONS)
            .map(|scored| self.to_recommendation(scored, contact, ids))
            .collect()
    }

    /// Recommendations for every shot, paired index by index.
    pub fn generate_per_shot_analysis(
        &self,
        shots: &[ShotSegment],
        rally_states: &[RallyState],
        features: &[ShotFeatures],
        ids: &mut dyn IdGenerator,
    ) -> Vec<ShotAnalysis> {
        shots
            .iter()
            .zip(rally_states)
            .zip(features)
            .map(|((shot, state), f)| ShotAnalysis {
                shot: shot.clone(),
                features: f.clone(),
                recommendations: self.generate_recommendations(shot, f, state, ids),
            })
            .collect()
    }

    fn to_recommendation(
        &self,
        scored: CandidateScore,
        contact: (f64, f64),
        ids: &mut dyn IdGenerator,
    ) -> ShotRecommendation {
        let Candidate { shot_type, target_zone } = scored.candidate;
        ShotRecommendation {
            id: ids.next_id(),
            shot_type,
            target_zone,
            path_polyline: generate_shot_path(contact, target_zone, shot_type, &self.config.path),
            score: scored.score,
            rationale: scored.rationale,
            confidence: scored.confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::debug_logger::{NoopTracer, RecordingTracer};
    use crate::engine::features::FeatureExtractor;
    use crate::engine::ids::SequentialIdGenerator;
    use crate::engine::rally_state::RallyStateMachine;
    use crate::models::{Initiative, PlayerSide, TrajectoryPoint};

    fn shot() -> ShotSegment {
        ShotSegment {
            shot_index: 0,
            shot_type: ShotType::Clear,
            start_time: 0.0,
            end_time: 900.0,
            trajectory_slice: vec![
                TrajectoryPoint::new(0.4, 0.8, 0.0),
                TrajectoryPoint::new(0.5, 0.5, 450.0),
                TrajectoryPoint::new(0.6, 0.1, 900.0),
            ],
            player: PlayerSide::Far,
        }
    }

    fn state(phase: Phase, pressure: f64) -> RallyState {
        RallyState {
            phase,
            initiative: Initiative::Unknown,
            pressure,
            open_court_zones: vec![0, 2, 6, 8],
            timestamp: 0.0,
        }
    }

    #[test]
    fn test_path_endpoints_and_shape() {
        let path_cfg = PathConfig::default();
        let path = generate_shot_path((0.2, 0.3), 8, ShotType::Clear, &path_cfg);
        assert_eq!(path.len(), PATH_POINTS);

        let first = path[0];
        let last = path[PATH_POINTS - 1];
        let (tx, ty) = zone_to_position(8);
        assert!((first.x - 0.2).abs() < 1e-9 && (first.y - 0.3).abs() < 1e-9);
        assert!((last.x - tx).abs() < 1e-9 && (last.y - ty).abs() < 1e-9);
        assert!((first.height - path_cfg.contact_height).abs() < 1e-9);
        assert!((last.height - path_cfg.landing_height).abs() < 1e-9);

        let apex = path.iter().map(|p| p.height).fold(f64::MIN, f64::max);
        assert!(apex > first.height);
    }

    #[test]
    fn test_clear_arcs_higher_than_drive() {
        let path_cfg = PathConfig::default();
        let clear = generate_shot_path((0.5, 0.5), 7, ShotType::Clear, &path_cfg);
        let drive = generate_shot_path((0.5, 0.5), 7, ShotType::Drive, &path_cfg);
        assert!(clear[3].height > drive[3].height);
    }

    #[test]
    fn test_viable_shot_types_respect_depth() {
        let front = get_viable_shot_types(Phase::Attack, 4);
        assert_eq!(front, vec![ShotType::Net, ShotType::Push, ShotType::Drive]);

        let back = get_viable_shot_types(Phase::Defense, 7);
        assert_eq!(back, vec![ShotType::Clear, ShotType::Drive]);
        assert_eq!(
            viable_shot_types_at(Phase::Attack, CourtDepth::Mid),
            vec![ShotType::Smash, ShotType::Drop, ShotType::Drive]
        );

        for phase in Phase::ALL {
            for zone in all_zones() {
                assert!(!get_viable_shot_types(phase, zone).is_empty());
            }
        }
    }

    #[test]
    fn test_viable_shot_types_same_from_either_baseline() {
        for phase in Phase::ALL {
            for col in 0..3u8 {
                assert_eq!(
                    get_viable_shot_types(phase, col),
                    get_viable_shot_types(phase, col + 6),
                    "{:?} column {}",
                    phase,
                    col
                );
            }
        }
        let near_back = get_viable_shot_types(Phase::Attack, 1);
        assert!(near_back.contains(&ShotType::Smash));
        assert!(!near_back.contains(&ShotType::Net));
    }

    #[test]
    fn test_near_baseline_contact_offered_back_court_shots() {
        let config = EngineConfig::default();
        let tracer = NoopTracer;
        let generator = RecommendationGenerator::new(&config, ZoneTable::standard(), &tracer);
        let extractor = FeatureExtractor::new(&config);
        let s = state(Phase::Defense, 0.9);

        let types_from = |y: f64, player: PlayerSide| {
            let mut sh = shot();
            sh.player = player;
            sh.trajectory_slice[0] = TrajectoryPoint::new(0.5, y, 0.0);
            sh.trajectory_slice[2] = TrajectoryPoint::new(0.5, 1.0 - y, 900.0);
            let f = extractor.extract_features(&sh, &s, None, None, None);
            let mut ids = SequentialIdGenerator::new("rec");
            generator
                .generate_recommendations(&sh, &f, &s, &mut ids)
                .iter()
                .map(|r| r.shot_type)
                .collect::<Vec<_>>()
        };

        for (y, player) in [(0.05, PlayerSide::Near), (0.95, PlayerSide::Far)] {
            let types = types_from(y, player);
            assert_eq!(types.len(), TOP_RECOMMENDATIONS);
            assert!(
                types.iter().all(|t| matches!(t, ShotType::Clear | ShotType::Drive)),
                "y={} gave {:?}",
                y,
                types
            );
        }

        let near_net = types_from(0.45, PlayerSide::Near);
        assert!(near_net.iter().all(|t| matches!(
            t,
            ShotType::Lift | ShotType::Drive | ShotType::Push | ShotType::Net
        )));
    }

    #[test]
    fn test_candidate_targets_prefer_open_court() {
        assert_eq!(candidate_target_zones(&[8, 6]), vec![8, 6, 0, 1, 2]);
        assert_eq!(candidate_target_zones(&[]), vec![0, 1, 2, 3, 4]);
        assert_eq!(candidate_target_zones(&[0, 1, 2, 3, 5, 6]), vec![0, 1, 2, 3, 5]);
    }

    #[test]
    fn test_exactly_three_sorted() {
        let config = EngineConfig::default();
        let tracer = NoopTracer;
        let generator = RecommendationGenerator::new(&config, ZoneTable::standard(), &tracer);
        let extractor = FeatureExtractor::new(&config);
        let mut ids = SequentialIdGenerator::new("rec");

        for phase in Phase::ALL {
            let s = state(phase, 0.6);
            let f = extractor.extract_features(&shot(), &s, None, None, None);
            let recs = generator.generate_recommendations(&shot(), &f, &s, &mut ids);
            assert_eq!(recs.len(), TOP_RECOMMENDATIONS);
            for pair in recs.windows(2) {
                assert!(pair[0].score >= pair[1].score);
            }
            for rec in &recs {
                let first = rec.path_polyline[0];
                assert!((first.x - 0.4).abs() < 1e-9 && (first.y - 0.8).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_ids_come_from_generator() {
        let config = EngineConfig::default();
        let tracer = NoopTracer;
        let generator = RecommendationGenerator::new(&config, ZoneTable::standard(), &tracer);
        let s = state(Phase::Neutral, 0.5);
        let f = FeatureExtractor::new(&config).extract_features(&shot(), &s, None, None, None);
        let mut ids = SequentialIdGenerator::new("rec");
        let recs = generator.generate_recommendations(&shot(), &f, &s, &mut ids);
        let got: Vec<&str> = recs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(got, vec!["rec-0001", "rec-0002", "rec-0003"]);
    }

    #[test]
    fn test_tracer_sees_every_candidate() {
        let config = EngineConfig::default();
        let tracer = RecordingTracer::new();
        let generator = RecommendationGenerator::new(&config, ZoneTable::standard(), &tracer);
        let s = state(Phase::Defense, 0.9);
        let f = FeatureExtractor::new(&config).extract_features(&shot(), &s, None, None, None);
        let mut ids = SequentialIdGenerator::new("rec");
        generator.generate_recommendations(&shot(), &f, &s, &mut ids);
        // Contact in the far mid court: clear and drive, five targets each.
        assert_eq!(tracer.candidate_count(), 10);
    }

    #[test]
    fn test_per_shot_analysis_maps_every_shot() {
        let config = EngineConfig::default();
        let tracer = NoopTracer;
        let zones = ZoneTable::standard();
        let generator = RecommendationGenerator::new(&config, zones, &tracer);
        let machine = RallyStateMachine::new(zones, &config.thresholds);

        let mut second = shot();
        second.shot_index = 1;
        second.start_time = 900.0;
        second.end_time = 1600.0;
        let shots = vec![shot(), second];
        let states = machine.compute_all_rally_states(&shots, None);
        let features = FeatureExtractor::new(&config).extract_all(&shots, &states, None, None);
        let mut ids = SequentialIdGenerator::new("rec");

        let analysis = generator.generate_per_shot_analysis(&shots, &states, &features, &mut ids);
        assert_eq!(analysis.len(), 2);
        assert!(analysis.iter().all(|a| a.recommendations.len() == TOP_RECOMMENDATIONS));
        assert_eq!(analysis[1].shot.shot_index, 1);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: always three, ordered, in range, path ends on the target
            #[test]
            fn prop_top_three_well_formed(
                phase in proptest::sample::select(Phase::ALL.to_vec()),
                pressure in 0.0f64..=1.0,
                cx in 0.0f64..1.0,
                cy in 0.0f64..1.0,
                open in proptest::collection::vec(0u8..9, 0..9),
            ) {
                let config = EngineConfig::default();
                let tracer = NoopTracer;
                let generator =
                    RecommendationGenerator::new(&config, ZoneTable::standard(), &tracer);
                let mut s = state(phase, pressure);
                s.open_court_zones = open;
                let mut sh = shot();
                sh.trajectory_slice[0] = TrajectoryPoint::new(cx, cy, 0.0);
                let f = FeatureExtractor::new(&config)
                    .extract_features(&sh, &s, None, None, None);
                let mut ids = SequentialIdGenerator::new("p");
                let recs = generator.generate_recommendations(&sh, &f, &s, &mut ids);

                prop_assert_eq!(recs.len(), 3);
                for pair in recs.windows(2) {
                    prop_assert!(pair[0].score >= pair[1].score);
                }
                for rec in &recs {
                    prop_assert!((0.0..=100.0).contains(&rec.score));
                    prop_assert!((0.5..=1.0).contains(&rec.confidence));
                    let last = rec.path_polyline[rec.path_polyline.len() - 1];
                    let (tx, ty) = zone_to_position(rec.target_zone);
                    prop_assert!((last.x - tx).abs() < 1e-9 && (last.y - ty).abs() < 1e-9);
                    let first = rec.path_polyline[0];
                    prop_assert!((first.x - cx).abs() < 1e-9 && (first.y - cy).abs() < 1e-9);
                }
            }
        }
    }
}
