//! Scoring Engine
//!
//! Scores a `(target zone, shot type)` candidate against the current shot
//! features and rally state:
//!
//! ```text
//! score = base
//!       + movement_pressure · w1
//!       + open_court        · w2
//!       − shot_risk         · w3   (only above the attack pressure gate)
//!       − angle_exposure    · w4
//! ```
//!
//! clamped to 0..=100. Every factor that crosses its materiality cut-off is
//! reported in the rationale with a signed impact.

use super::config::EngineConfig;
use super::zones::{is_corner, zone_col, zone_to_position, ZoneTable};
use crate::models::{
    Phase, RallyState, RationaleEntry, RationaleKind, ShotFeatures, ShotType, ZoneId,
};

const EPS: f64 = 1e-9;

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;
pub const BASE_CONFIDENCE: f64 = 0.75;
pub const MIN_CONFIDENCE: f64 = 0.5;
pub const MAX_CONFIDENCE: f64 = 1.0;

const PHASE_FIT_BONUS: f64 = 0.10;
const HIGH_PRESSURE_PENALTY: f64 = 0.10;
const POOR_RECOVERY_BONUS: f64 = 0.05;

const OPEN_ZONE_SCORE: f64 = 0.8;
const NEAR_OPEN_ZONE_SCORE: f64 = 0.4;
const CLOSED_ZONE_SCORE: f64 = 0.1;

/// Exposure of each target zone to a counter-attack.
const ZONE_EXPOSURE: [f64; 9] = [
    0.30, 0.40, 0.30, //
    0.45, 0.60, 0.45, //
    0.25, 0.35, 0.25,
];
const CENTRE_SOFT_SHOT_EXPOSURE: f64 = 0.20;
const DEEP_CORNER_CLEAR_RELIEF: f64 = 0.15;

/// A shot choice to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Candidate {
    pub shot_type: ShotType,
    pub target_zone: ZoneId,
}

/// Raw factor values behind a score.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoreBreakdown {
    pub movement_pressure: f64,
    pub open_court: f64,
    pub shot_risk: f64,
    /// Whether pressure was high enough for risk to count.
    pub risk_applied: bool,
    pub angle_exposure: f64,
    pub phase_fit: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScore {
    pub candidate: Candidate,
    pub score: f64,
    pub confidence: f64,
    pub rationale: Vec<RationaleEntry>,
    pub breakdown: ScoreBreakdown,
}

/// Base risk of a shot type, before pressure and phase scaling.
pub fn base_shot_risk(shot_type: ShotType) -> f64 {
    match shot_type {
        ShotType::Smash => 0.80,
        ShotType::Net => 0.50,
        ShotType::Unknown => 0.50,
        ShotType::Drop => 0.45,
        ShotType::Drive => 0.40,
        ShotType::Push => 0.35,
        ShotType::Clear => 0.30,
        ShotType::Lift => 0.25,
        ShotType::Serve => 0.20,
    }
}

/// Shot types that fit a phase's default tactic.
pub fn canonical_tactics(phase: Phase) -> &'static [ShotType] {
    match phase {
        Phase::Attack => &[ShotType::Smash, ShotType::Drop, ShotType::Net],
        Phase::Neutral => &[ShotType::Clear, ShotType::Drive, ShotType::Drop],
        Phase::Defense => &[ShotType::Lift, ShotType::Clear, ShotType::Push],
    }
}

pub struct ScoringEngine<'a> {
    zones: &'a ZoneTable,
    config: &'a EngineConfig,
}

impl<'a> ScoringEngine<'a> {
    pub fn new(zones: &'a ZoneTable, config: &'a EngineConfig) -> Self {
        Self { zones, config }
    }

    /// How far the opponent has to travel: zone distance from the current
    /// landing zone, plus a bonus for going against their momentum.
    pub fn movement_pressure_score(&self, target: ZoneId, features: &ShotFeatures) -> f64 {
        let w = &self.config.scoring;
        let distance = self.zones.zone_distance(features.landing_zone, target);
        let momentum = momentum_factor(features, target);
        (w.distance_share * distance + w.momentum_share * momentum).clamp(0.0, 1.0)
    }

    pub fn open_court_score(&self, target: ZoneId, rally_state: &RallyState) -> f64 {
        if rally_state.is_open(target) {
            let bonus = if is_corner(target) { self.config.scoring.corner_bonus } else { 0.0 };
            (OPEN_ZONE_SCORE + bonus).min(1.0)
        } else if self.zones.touches_any(target, &rally_state.open_court_zones) {
            NEAR_OPEN_ZONE_SCORE
        } else {
            CLOSED_ZONE_SCORE
        }
    }

    /// Base risk scaled by pressure and by a phase/type mismatch.
    pub fn shot_risk(&self, shot_type: ShotType, rally_state: &RallyState) -> f64 {
        let pressure_scale = 1.0 + 0.5 * rally_state.pressure.clamp(0.0, 1.0);
        let mismatch = match rally_state.phase {
            Phase::Defense if shot_type.is_attacking() => 1.5,
            Phase::Attack if shot_type.is_defensive() => 0.8,
            _ => 1.0,
        };
        (base_shot_risk(shot_type) * pressure_scale * mismatch).clamp(0.0, 1.0)
    }

    pub fn angle_exposure(&self, target: ZoneId, shot_type: ShotType) -> f64 {
        let mut exposure = ZONE_EXPOSURE[target.min(8) as usize];
        if matches!(shot_type, ShotType::Net | ShotType::Drop) && zone_col(target) == 1 {
            exposure += CENTRE_SOFT_SHOT_EXPOSURE;
        }
        if matches!(shot_type, ShotType::Clear | ShotType::Lift) && matches!(target, 6 | 8) {
            exposure -= DEEP_CORNER_CLEAR_RELIEF;
        }
        exposure.clamp(0.0, 1.0)
    }

    pub fn confidence(
        &self,
        shot_type: ShotType,
        features: &ShotFeatures,
        rally_state: &RallyState,
    ) -> f64 {
        let th = &self.config.thresholds;
        let mut confidence = BASE_CONFIDENCE;
        if canonical_tactics(rally_state.phase).contains(&shot_type) {
            confidence += PHASE_FIT_BONUS;
        }
        if rally_state.pressure > th.pressure_defense {
            confidence -= HIGH_PRESSURE_PENALTY;
        }
        if features.recovery_quality < th.poor_recovery {
            confidence += POOR_RECOVERY_BONUS;
        }
        confidence.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
    }

    pub fn score_candidate(
        &self,
        candidate: Candidate,
        features: &ShotFeatures,
        rally_state: &RallyState,
    ) -> CandidateScore {
        let w = &self.config.scoring;
        let th = &self.config.thresholds;
        let Candidate { shot_type, target_zone } = candidate;

        let breakdown = ScoreBreakdown {
            movement_pressure: self.movement_pressure_score(target_zone, features),
            open_court: self.open_court_score(target_zone, rally_state),
            shot_risk: self.shot_risk(shot_type, rally_state),
            risk_applied: rally_state.pressure > th.pressure_attack,
            angle_exposure: self.angle_exposure(target_zone, shot_type),
            phase_fit: canonical_tactics(rally_state.phase).contains(&shot_type),
        };

        let risk_penalty = if breakdown.risk_applied { breakdown.shot_risk * w.risk } else { 0.0 };
        let score = (w.base_score
            + breakdown.movement_pressure * w.movement
            + breakdown.open_court * w.open_court
            - risk_penalty
            - breakdown.angle_exposure * w.angle)
            .clamp(MIN_SCORE, MAX_SCORE);

        CandidateScore {
            candidate,
            score,
            confidence: self.confidence(shot_type, features, rally_state),
            rationale: self.rationale(candidate, &breakdown, rally_state),
            breakdown,
        }
    }

    /// Scores every candidate and sorts by score, highest first. Equal
    /// scores keep their generation order.
    pub fn score_and_rank_recommendations(
        &self,
        candidates: &[Candidate],
        features: &ShotFeatures,
        rally_state: &RallyState,
    ) -> Vec<CandidateScore> {
        let mut scored: Vec<CandidateScore> = candidates
            .iter()
            .map(|&c| self.score_candidate(c, features, rally_state))
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored
    }

    fn rationale(
        &self,
        candidate: Candidate,
        breakdown: &ScoreBreakdown,
        rally_state: &RallyState,
    ) -> Vec<RationaleEntry> {
        let cut = &self.config.thresholds.rationale;
        let mut entries = Vec::new();

        if breakdown.movement_pressure > cut.movement_pressure {
            entries.push(RationaleEntry {
                kind: RationaleKind::MovementPressure,
                description: format!(
                    "Zone {} forces the opponent to cover a long distance",
                    candidate.target_zone
                ),
                impact: breakdown.movement_pressure,
            });
        }

        if breakdown.open_court >= cut.open_court {
            entries.push(RationaleEntry {
                kind: RationaleKind::OpenCourt,
                description: format!("Zone {} is open court", candidate.target_zone),
                impact: breakdown.open_court,
            });
        } else if breakdown.open_court <= cut.closed_court {
            entries.push(RationaleEntry {
                kind: RationaleKind::OpenCourt,
                description: format!(
                    "Zone {} is well covered by the opponent",
                    candidate.target_zone
                ),
                impact: -0.5,
            });
        }

        if breakdown.risk_applied && breakdown.shot_risk > cut.shot_risk {
            entries.push(RationaleEntry {
                kind: RationaleKind::ShotRisk,
                description: format!(
                    "A {} under pressure {:.2} is error-prone",
                    candidate.shot_type, rally_state.pressure
                ),
                impact: -breakdown.shot_risk,
            });
        }

        if breakdown.angle_exposure > cut.angle_exposure {
            entries.push(RationaleEntry {
                kind: RationaleKind::AngleExposure,
                description: format!(
                    "Zone {} leaves a wide return angle",
                    candidate.target_zone
                ),
                impact: -breakdown.angle_exposure,
            });
        }

        entries
    }
}

/// 1.0 when the target lies directly against the opponent's heading, 0.0 when
/// along it or when their heading is unknown.
fn momentum_factor(features: &ShotFeatures, target: ZoneId) -> f64 {
    let Some((hx, hy)) = features.opponent_heading else {
        return 0.0;
    };
    let (tx, ty) = zone_to_position(target);
    let (lx, ly) = zone_to_position(features.landing_zone);
    let (vx, vy) = (tx - lx, ty - ly);
    let norm = (vx * vx + vy * vy).sqrt() * (hx * hx + hy * hy).sqrt();
    if norm <= EPS {
        return 0.0;
    }
    let cos = ((hx * vx + hy * vy) / norm).clamp(-1.0, 1.0);
    (1.0 - cos) / 2.0
}
