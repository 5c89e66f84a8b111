//! Rally State Machine
//!
//! Derives the tactical state of the hitting player at each shot.
//! - Defense: the previous shot (the opponent's) was a smash
//! - Attack: this shot, or this player's previous shot, is a smash, drop or
//!   net shot, and the player is not answering a smash
//! - Neutral: everything else
//!
//! Pressure mixes how rushed the exchange is, what the opponent just played,
//! and how far behind the net the player is standing.

use super::config::ThresholdsConfig;
use super::zones::{court_depth, CourtDepth, ZoneTable};
use crate::models::trajectory::nearest_sample;
use crate::models::{Initiative, Phase, PositionSample, RallyState, ShotSegment, ShotType};

pub const DEFAULT_KEY_MOMENT_THRESHOLD: f64 = 0.7;
pub const NEUTRAL_PRESSURE: f64 = 0.5;
pub const DEFAULT_NET_LINE_Y: f64 = 0.5;

/// Time pressure of the opening shot, which has nothing to answer.
const OPENING_TIME_PRESSURE: f64 = 0.3;

const TIME_WEIGHT: f64 = 0.5;
const SHOT_TYPE_WEIGHT: f64 = 0.3;
const POSITION_WEIGHT: f64 = 0.2;

pub struct RallyStateMachine<'a> {
    zones: &'a ZoneTable,
    thresholds: &'a ThresholdsConfig,
    net_line: f64,
}

impl<'a> RallyStateMachine<'a> {
    pub fn new(zones: &'a ZoneTable, thresholds: &'a ThresholdsConfig) -> Self {
        Self { zones, thresholds, net_line: DEFAULT_NET_LINE_Y }
    }

    /// Net position used to judge how deep a contact is.
    pub fn with_net_line(mut self, net_line_y: f64) -> Self {
        self.net_line = net_line_y;
        self
    }

    /// State used when there is no shot history.
    pub fn neutral_state(&self) -> RallyState {
        RallyState {
            phase: Phase::Neutral,
            initiative: Initiative::Unknown,
            pressure: NEUTRAL_PRESSURE,
            open_court_zones: self.zones.find_open_court_zones(None),
            timestamp: 0.0,
        }
    }

    /// State at `shot_index`. Empty history or an out-of-range index gives
    /// the neutral state.
    pub fn compute_rally_state(
        &self,
        shots: &[ShotSegment],
        shot_index: usize,
        opponent_position: Option<(f64, f64)>,
    ) -> RallyState {
        let Some(shot) = shots.get(shot_index) else {
            return self.neutral_state();
        };
        let previous = shot_index.checked_sub(1).and_then(|i| shots.get(i));
        let own_previous = shot_index.checked_sub(2).and_then(|i| shots.get(i));

        let phase = phase_for(shot, previous, own_previous);
        RallyState {
            phase,
            initiative: initiative_for(phase, previous),
            pressure: self.pressure_for(shot, previous),
            open_court_zones: self.zones.find_open_court_zones(opponent_position),
            timestamp: shot.start_time,
        }
    }

    /// One state per shot, each paired with the opponent sample nearest in
    /// time to the shot's start.
    pub fn compute_all_rally_states(
        &self,
        shots: &[ShotSegment],
        opponent_positions: Option<&[PositionSample]>,
    ) -> Vec<RallyState> {
        (0..shots.len())
            .map(|i| {
                let opponent = opponent_positions
                    .and_then(|samples| nearest_sample(samples, shots[i].start_time))
                    .map(|s| s.position());
                self.compute_rally_state(shots, i, opponent)
            })
            .collect()
    }

    fn pressure_for(&self, shot: &ShotSegment, previous: Option<&ShotSegment>) -> f64 {
        let time = match previous {
            Some(prev) => {
                let gap = (shot.start_time - prev.start_time).max(0.0);
                1.0 / (1.0 + gap / self.thresholds.time_pressure_scale_ms)
            }
            None => OPENING_TIME_PRESSURE,
        };
        let shot_type = shot_type_pressure(previous.map(|p| p.shot_type));
        let position = shot
            .contact_point()
            .map(|p| position_pressure(court_depth(p.y, self.net_line)))
            .unwrap_or(0.0);

        (TIME_WEIGHT * time + SHOT_TYPE_WEIGHT * shot_type + POSITION_WEIGHT * position)
            .clamp(0.0, 1.0)
    }
}

fn phase_for(
    shot: &ShotSegment,
    previous: Option<&ShotSegment>,
    own_previous: Option<&ShotSegment>,
) -> Phase {
    if previous.map_or(false, |p| p.shot_type == ShotType::Smash) {
        return Phase::Defense;
    }
    if shot.shot_type.is_attacking() || own_previous.map_or(false, |p| p.shot_type.is_attacking()) {
        return Phase::Attack;
    }
    Phase::Neutral
}

fn initiative_for(phase: Phase, previous: Option<&ShotSegment>) -> Initiative {
    match phase {
        Phase::Attack => Initiative::Us,
        Phase::Defense => Initiative::Them,
        Phase::Neutral => match previous.map(|p| p.shot_type) {
            Some(ShotType::Lift | ShotType::Clear) => Initiative::Us,
            Some(ShotType::Drop | ShotType::Net | ShotType::Push) => Initiative::Them,
            _ => Initiative::Unknown,
        },
    }
}

/// Pressure carried by the shot the player is answering.
fn shot_type_pressure(previous: Option<ShotType>) -> f64 {
    match previous {
        Some(ShotType::Smash) => 1.0,
        Some(ShotType::Drive) => 0.6,
        Some(ShotType::Drop | ShotType::Net) => 0.5,
        Some(ShotType::Push) => 0.4,
        _ => 0.2,
    }
}

/// Deeper contact, more pressure. Same on both halves.
fn position_pressure(depth: CourtDepth) -> f64 {
    match depth {
        CourtDepth::Back => 0.8,
        CourtDepth::Mid => 0.45,
        CourtDepth::Front => 0.2,
    }
}

/// Plurality phase; ties and empty input give neutral.
pub fn get_dominant_phase(states: &[RallyState]) -> Phase {
    let counts: Vec<(Phase, usize)> = Phase::ALL
        .iter()
        .map(|&phase| (phase, states.iter().filter(|s| s.phase == phase).count()))
        .collect();
    let max = counts.iter().map(|c| c.1).max().unwrap_or(0);
    if max == 0 {
        return Phase::Neutral;
    }
    let mut leaders = counts.iter().filter(|c| c.1 == max);
    match (leaders.next(), leaders.next()) {
        (Some(&(phase, _)), None) => phase,
        _ => Phase::Neutral,
    }
}

/// Mean pressure; 0.5 for empty input.
pub fn get_average_pressure(states: &[RallyState]) -> f64 {
    if states.is_empty() {
        return NEUTRAL_PRESSURE;
    }
    states.iter().map(|s| s.pressure).sum::<f64>() / states.len() as f64
}

/// Indices whose pressure is strictly above `threshold`.
pub fn find_key_moments(states: &[RallyState], threshold: f64) -> Vec<usize> {
    states
        .iter()
        .enumerate()
        .filter(|(_, s)| s.pressure > threshold)
        .map(|(i, _)| i)
        .collect()
}
