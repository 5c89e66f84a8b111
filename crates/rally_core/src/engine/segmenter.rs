//! Shot Segmenter
//!
//! Splits a continuous shuttle trajectory into shots. A new shot starts at a
//! decision point:
//! - the direction of travel turns further than the reversal angle (a hit),
//! - the shuttle crosses the net line,
//! - the sample stream has a gap longer than the tracking-break limit,
//! - a pose hint (racket swing timestamp) lands on a sample.
//!
//! Decision points closer together than the minimum shot interval are
//! collapsed, and any span shorter than two samples is folded into its
//! neighbour, so every segment carries at least two points.

use super::config::SegmentationConfig;
use super::zones::depth_from_net;
use crate::models::result::TrajectoryStats;
use crate::models::{PlayerSide, ShotSegment, ShotType, TrajectoryPoint};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const EPS: f64 = 1e-9;

/// Neutral height when there is no arc to measure.
pub const NEUTRAL_HEIGHT: f64 = 0.5;

/// Extra information that can override or refine a shot's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShotContext {
    /// Type confirmed by an outside source (coach tag, pose classifier).
    pub forced_type: Option<ShotType>,
    /// Type of the shot this one answers.
    pub previous_type: Option<ShotType>,
    /// First shot of the rally.
    pub rally_opener: bool,
}

/// Segments plus the decision points that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    pub shots: Vec<ShotSegment>,
    pub decision_points: Vec<usize>,
}

pub struct ShotSegmenter<'a> {
    config: &'a SegmentationConfig,
}

impl<'a> ShotSegmenter<'a> {
    pub fn new(config: &'a SegmentationConfig) -> Self {
        Self { config }
    }

    pub fn segment_shots(
        &self,
        trajectory: &[TrajectoryPoint],
        pose_timestamps: Option<&[f64]>,
    ) -> Vec<ShotSegment> {
        self.segment(trajectory, pose_timestamps).shots
    }

    pub fn segment(
        &self,
        trajectory: &[TrajectoryPoint],
        pose_timestamps: Option<&[f64]>,
    ) -> Segmentation {
        if trajectory.len() < 2 {
            return Segmentation { shots: Vec::new(), decision_points: Vec::new() };
        }

        let decision_points = self.detect_decision_points(trajectory, pose_timestamps);

        let mut bounds = Vec::with_capacity(decision_points.len() + 2);
        bounds.push(0);
        bounds.extend(decision_points.iter().copied());
        bounds.push(trajectory.len());
        let spans: Vec<(usize, usize)> = bounds
            .windows(2)
            .filter(|w| w[1] > w[0])
            .map(|w| (w[0], w[1]))
            .collect();

        let spans = merge_short_segments(&spans, trajectory.len());

        let mut shots: Vec<ShotSegment> = Vec::with_capacity(spans.len());
        for (index, &(start, end)) in spans.iter().enumerate() {
            let slice = trajectory[start..end].to_vec();
            let context = ShotContext {
                forced_type: None,
                previous_type: shots.last().map(|s| s.shot_type),
                rally_opener: index == 0,
            };
            let shot_type = self.classify(&slice, &context);
            let first = slice[0];
            let last = slice[slice.len() - 1];
            shots.push(ShotSegment {
                shot_index: index,
                shot_type,
                start_time: first.timestamp,
                end_time: last.timestamp,
                player: PlayerSide::from_y(first.y, self.config.net_line_y),
                trajectory_slice: slice,
            });
        }

        Segmentation { shots, decision_points }
    }

    /// Sorted sample indices where a new shot begins (never 0).
    pub fn detect_decision_points(
        &self,
        points: &[TrajectoryPoint],
        pose_timestamps: Option<&[f64]>,
    ) -> Vec<usize> {
        let mut candidates = BTreeSet::new();
        let reversal_cos = self.config.reversal_cos();
        let net = self.config.net_line_y;

        for i in 1..points.len() {
            let prev = &points[i - 1];
            let cur = &points[i];

            if cur.timestamp - prev.timestamp > self.config.max_gap_ms {
                candidates.insert(i);
            }

            if (prev.y < net) != (cur.y < net) {
                candidates.insert(i);
            }

            if let Some(next) = points.get(i + 1) {
                let v1 = (cur.x - prev.x, cur.y - prev.y);
                let v2 = (next.x - cur.x, next.y - cur.y);
                let n1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
                let n2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();
                if n1 > EPS && n2 > EPS {
                    let cos = (v1.0 * v2.0 + v1.1 * v2.1) / (n1 * n2);
                    if cos < reversal_cos {
                        candidates.insert(i);
                    }
                }
            }
        }

        if let Some(poses) = pose_timestamps {
            for &ts in poses {
                if let Some(i) = self.snap_to_sample(points, ts) {
                    if i > 0 {
                        candidates.insert(i);
                    }
                }
            }
        }

        // Double-count suppression: keep the first of any cluster.
        let mut accepted: Vec<usize> = Vec::with_capacity(candidates.len());
        for i in candidates {
            let spaced = accepted.last().map_or(true, |&last| {
                points[i].timestamp - points[last].timestamp >= self.config.min_shot_interval_ms
            });
            if spaced {
                accepted.push(i);
            }
        }
        accepted
    }

    fn snap_to_sample(&self, points: &[TrajectoryPoint], ts: f64) -> Option<usize> {
        let (index, dt) = points
            .iter()
            .enumerate()
            .map(|(i, p)| (i, (p.timestamp - ts).abs()))
            .fold(None, |best: Option<(usize, f64)>, (i, dt)| match best {
                Some((_, best_dt)) if best_dt <= dt => best,
                _ => Some((i, dt)),
            })?;
        (dt <= self.config.pose_snap_tolerance_ms).then_some(index)
    }

    /// New segment with its type re-derived from the slice and `context`.
    ///
    /// The current type of `shot` is ignored, so applying the same context
    /// twice gives the same result.
    pub fn reclassify_shot(&self, shot: &ShotSegment, context: &ShotContext) -> ShotSegment {
        shot.with_type(self.classify(&shot.trajectory_slice, context))
    }

    pub fn classify(&self, points: &[TrajectoryPoint], context: &ShotContext) -> ShotType {
        if let Some(forced) = context.forced_type {
            return forced;
        }
        if context.rally_opener {
            return ShotType::Serve;
        }
        let (first, last) = match (points.first(), points.last()) {
            (Some(f), Some(l)) if points.len() >= 2 => (f, l),
            _ => return ShotType::Unknown,
        };

        let cfg = self.config;
        let speed = estimate_shuttle_speed(points, cfg.speed_norm);
        let height = estimate_shuttle_height(points, cfg.height_norm);
        let start_depth = self.depth(first.y);
        let end_depth = self.depth(last.y);

        let base = if speed >= cfg.smash_speed && height < cfg.flat_arc && start_depth >= 0.5 {
            ShotType::Smash
        } else if end_depth >= 0.66 && (height >= cfg.high_arc || speed < cfg.drive_speed) {
            if start_depth >= 0.5 {
                ShotType::Clear
            } else {
                ShotType::Lift
            }
        } else if end_depth <= 0.33 {
            match (speed < cfg.slow_speed, start_depth <= 0.33) {
                (true, true) => ShotType::Net,
                (false, true) => ShotType::Push,
                (_, false) => ShotType::Drop,
            }
        } else if height < cfg.flat_arc && speed >= cfg.drive_speed {
            ShotType::Drive
        } else if end_depth >= 0.66 {
            if start_depth >= 0.5 {
                ShotType::Clear
            } else {
                ShotType::Lift
            }
        } else {
            ShotType::Unknown
        };

        match (context.previous_type, base) {
            // A flat reply to a smash that dies short is a block.
            (Some(ShotType::Smash), ShotType::Drive | ShotType::Unknown) if end_depth <= 0.5 => {
                ShotType::Push
            }
            (Some(ShotType::Net), ShotType::Unknown) => ShotType::Net,
            _ => base,
        }
    }

    fn depth(&self, y: f64) -> f64 {
        depth_from_net(y, self.config.net_line_y)
    }
}

/// Folds every span shorter than two samples into its neighbour (previous
/// when there is one, otherwise the next).
pub fn merge_short_segments(spans: &[(usize, usize)], total: usize) -> Vec<(usize, usize)> {
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
    let mut pending_start: Option<usize> = None;
    for &(start, end) in spans {
        let start = pending_start.take().unwrap_or(start);
        if end - start >= 2 {
            merged.push((start, end));
        } else if let Some(last) = merged.last_mut() {
            last.1 = end;
        } else {
            pending_start = Some(start);
        }
    }
    if let Some(start) = pending_start {
        if total - start >= 2 {
            merged.push((start, total));
        }
    }
    merged
}

/// Mean ground speed over the slice, normalized to 0.0 ..= 1.0.
///
/// `speed_norm` is the speed (court units per second) that maps to 1.0.
pub fn estimate_shuttle_speed(points: &[TrajectoryPoint], speed_norm: f64) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let distance: f64 = points.windows(2).map(|w| w[0].distance_to(&w[1])).sum();
    if distance <= EPS {
        return 0.0;
    }
    let elapsed_s = (points[points.len() - 1].timestamp - points[0].timestamp) / 1000.0;
    if elapsed_s <= EPS {
        return 1.0;
    }
    (distance / elapsed_s / speed_norm.max(EPS)).clamp(0.0, 1.0)
}

/// Largest perpendicular deviation of intermediate samples from the chord
/// between the first and last sample, normalized to 0.0 ..= 1.0.
pub fn estimate_shuttle_height(points: &[TrajectoryPoint], height_norm: f64) -> f64 {
    if points.len() < 2 {
        return NEUTRAL_HEIGHT;
    }
    let first = points[0];
    let last = points[points.len() - 1];
    let cx = last.x - first.x;
    let cy = last.y - first.y;
    let chord = (cx * cx + cy * cy).sqrt();

    let deviation = points[1..points.len() - 1]
        .iter()
        .map(|p| {
            let px = p.x - first.x;
            let py = p.y - first.y;
            if chord <= EPS {
                (px * px + py * py).sqrt()
            } else {
                (cx * py - cy * px).abs() / chord
            }
        })
        .fold(0.0, f64::max);

    (deviation / height_norm.max(EPS)).clamp(0.0, 1.0)
}

/// Whole-rally speed statistics and vertical direction changes.
pub fn trajectory_stats(points: &[TrajectoryPoint]) -> TrajectoryStats {
    if points.len() < 3 {
        return TrajectoryStats::default();
    }

    // (dy, speed) per step; None where time does not advance.
    let steps: Vec<Option<(f64, f64)>> = points
        .windows(2)
        .map(|w| {
            let dt = (w[1].timestamp - w[0].timestamp) / 1000.0;
            (dt > EPS).then(|| (w[1].y - w[0].y, w[0].distance_to(&w[1]) / dt))
        })
        .collect();

    // Step i runs from sample i to i + 1, so a flip between steps i - 1 and i
    // happens at sample i.
    let mut direction_changes = Vec::new();
    for i in 1..steps.len() {
        if let (Some(before), Some(after)) = (steps[i - 1], steps[i]) {
            if before.0 * after.0 < 0.0 {
                direction_changes.push(i);
            }
        }
    }

    let speeds: Vec<f64> = steps.iter().flatten().map(|s| s.1).collect();
    if speeds.is_empty() {
        return TrajectoryStats { direction_changes, ..TrajectoryStats::default() };
    }
    let average_speed = speeds.iter().sum::<f64>() / speeds.len() as f64;
    let max_speed = speeds.iter().copied().fold(0.0, f64::max);

    TrajectoryStats { direction_changes, average_speed, max_speed }
}
