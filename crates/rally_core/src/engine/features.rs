//! Feature Extractor
//!
//! Combines a shot segment, its rally state and any opponent/player samples
//! into `ShotFeatures`. Missing optional inputs produce neutral values
//! (zero opponent movement, timing-only recovery) rather than errors.

use super::config::EngineConfig;
use super::segmenter::{estimate_shuttle_height, estimate_shuttle_speed};
use super::zones::position_to_zone;
use crate::models::trajectory::{nearest_sample, samples_in_window};
use crate::models::{PlayerSide, PositionSample, RallyState, ShotFeatures, ShotSegment};
use std::f64::consts::PI;

const EPS: f64 = 1e-9;

/// Share of recovery quality taken from timing when player samples exist.
const RECOVERY_TIME_SHARE: f64 = 0.7;
/// Distance from base (court units) at which positional recovery hits zero.
const RECOVERY_DISTANCE_LIMIT: f64 = 0.5;

/// Opponent motion inside one shot window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OpponentMotion {
    pub distance: f64,
    pub direction_change: f64,
    pub heading: Option<(f64, f64)>,
}

pub struct FeatureExtractor<'a> {
    config: &'a EngineConfig,
}

impl<'a> FeatureExtractor<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Features for one shot. `next_shot_start` is when the opponent next
    /// acts; without it the shot's own duration is the recovery window.
    pub fn extract_features(
        &self,
        shot: &ShotSegment,
        rally_state: &RallyState,
        opponent_positions: Option<&[PositionSample]>,
        player_positions: Option<&[PositionSample]>,
        next_shot_start: Option<f64>,
    ) -> ShotFeatures {
        let seg = &self.config.segmentation;
        let slice = &shot.trajectory_slice;

        let (contact_zone, landing_zone) = match (shot.contact_point(), shot.landing_point()) {
            (Some(first), Some(last)) => {
                (position_to_zone(first.x, first.y), position_to_zone(last.x, last.y))
            }
            _ => (super::zones::CENTER_ZONE, super::zones::CENTER_ZONE),
        };

        let motion = opponent_positions
            .map(|samples| samples_in_window(samples, shot.start_time, shot.end_time))
            .map(|window| opponent_motion(&window))
            .unwrap_or_default();

        ShotFeatures {
            contact_zone,
            landing_zone,
            shuttle_speed_proxy: estimate_shuttle_speed(slice, seg.speed_norm),
            shuttle_height_proxy: estimate_shuttle_height(slice, seg.height_norm),
            opponent_movement_distance: motion.distance,
            opponent_direction_change: motion.direction_change,
            opponent_heading: motion.heading,
            recovery_quality: self.recovery_quality(shot, player_positions, next_shot_start),
            rally_state: rally_state.clone(),
        }
    }

    /// Features for every shot, paired index by index with `states`.
    pub fn extract_all(
        &self,
        shots: &[ShotSegment],
        states: &[RallyState],
        opponent_positions: Option<&[PositionSample]>,
        player_positions: Option<&[PositionSample]>,
    ) -> Vec<ShotFeatures> {
        shots
            .iter()
            .zip(states)
            .enumerate()
            .map(|(i, (shot, state))| {
                let next_start = shots.get(i + 1).map(|s| s.start_time);
                self.extract_features(shot, state, opponent_positions, player_positions, next_start)
            })
            .collect()
    }

    fn recovery_quality(
        &self,
        shot: &ShotSegment,
        player_positions: Option<&[PositionSample]>,
        next_shot_start: Option<f64>,
    ) -> f64 {
        let window = match next_shot_start {
            Some(next) => next - shot.start_time,
            None => shot.duration_ms(),
        }
        .max(0.0);
        let timing = (window / self.config.thresholds.recovery_reference_ms).clamp(0.0, 1.0);

        let base = base_position(shot.player, self.config.segmentation.net_line_y);
        match player_positions.and_then(|samples| nearest_sample(samples, shot.end_time)) {
            Some(player) => {
                let dx = player.x - base.0;
                let dy = player.y - base.1;
                let closeness =
                    1.0 - ((dx * dx + dy * dy).sqrt() / RECOVERY_DISTANCE_LIMIT).clamp(0.0, 1.0);
                (RECOVERY_TIME_SHARE * timing + (1.0 - RECOVERY_TIME_SHARE) * closeness)
                    .clamp(0.0, 1.0)
            }
            None => timing,
        }
    }
}

/// Centre of the player's own half.
fn base_position(side: PlayerSide, net_line: f64) -> (f64, f64) {
    match side {
        PlayerSide::Near => (0.5, net_line / 2.0),
        PlayerSide::Far => (0.5, net_line + (1.0 - net_line) / 2.0),
    }
}

/// Path length, turn and net heading of the samples, in order.
pub fn opponent_motion(samples: &[PositionSample]) -> OpponentMotion {
    if samples.len() < 2 {
        return OpponentMotion::default();
    }

    let steps: Vec<(f64, f64)> = samples
        .windows(2)
        .map(|w| (w[1].x - w[0].x, w[1].y - w[0].y))
        .filter(|(dx, dy)| dx.abs() > EPS || dy.abs() > EPS)
        .collect();
    let distance: f64 = steps.iter().map(|(dx, dy)| (dx * dx + dy * dy).sqrt()).sum();

    let direction_change = match (steps.first(), steps.last()) {
        (Some(a), Some(b)) if steps.len() >= 2 => {
            let na = (a.0 * a.0 + a.1 * a.1).sqrt();
            let nb = (b.0 * b.0 + b.1 * b.1).sqrt();
            let cos = ((a.0 * b.0 + a.1 * b.1) / (na * nb)).clamp(-1.0, 1.0);
            cos.acos() / PI
        }
        _ => 0.0,
    };

    let first = samples[0];
    let last = samples[samples.len() - 1];
    let (nx, ny) = (last.x - first.x, last.y - first.y);
    let norm = (nx * nx + ny * ny).sqrt();
    let heading = (norm > EPS).then(|| (nx / norm, ny / norm));

    OpponentMotion { distance, direction_change, heading }
}
