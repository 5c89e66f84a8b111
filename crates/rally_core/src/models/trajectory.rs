//! Tracked shuttle and player samples.
//!
//! Coordinates are normalized to the court: `x` runs across the width,
//! `y` runs along the length with the net at `y = 0.5`. Timestamps are
//! milliseconds from an arbitrary origin shared by every stream of a rally.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single tracked shuttle position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrajectoryPoint {
    pub x: f64,
    pub y: f64,
    /// Milliseconds
    pub timestamp: f64,
}

impl TrajectoryPoint {
    pub fn new(x: f64, y: f64, timestamp: f64) -> Self {
        Self { x, y, timestamp }
    }

    /// Planar distance to another sample (court units).
    pub fn distance_to(&self, other: &TrajectoryPoint) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

/// Opponent and player streams use the same shape as the shuttle stream.
pub type PositionSample = TrajectoryPoint;

/// Returns the sample whose timestamp is closest to `timestamp`.
///
/// Ties resolve to the earlier sample.
pub fn nearest_sample(samples: &[PositionSample], timestamp: f64) -> Option<&PositionSample> {
    let mut best: Option<&PositionSample> = None;
    let mut best_dt = f64::INFINITY;
    for sample in samples {
        let dt = (sample.timestamp - timestamp).abs();
        if dt < best_dt {
            best_dt = dt;
            best = Some(sample);
        }
    }
    best
}

/// Samples with `start <= timestamp <= end`, in input order.
pub fn samples_in_window(samples: &[PositionSample], start: f64, end: f64) -> Vec<PositionSample> {
    samples
        .iter()
        .filter(|s| s.timestamp >= start && s.timestamp <= end)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_sample_prefers_earlier_on_tie() {
        let samples = vec![
            TrajectoryPoint::new(0.1, 0.1, 100.0),
            TrajectoryPoint::new(0.2, 0.2, 300.0),
        ];
        let nearest = nearest_sample(&samples, 200.0).unwrap();
        assert_eq!(nearest.timestamp, 100.0);

        let nearest = nearest_sample(&samples, 290.0).unwrap();
        assert_eq!(nearest.timestamp, 300.0);
    }

    #[test]
    fn test_nearest_sample_empty() {
        assert!(nearest_sample(&[], 10.0).is_none());
    }

    #[test]
    fn test_samples_in_window_inclusive() {
        let samples = vec![
            TrajectoryPoint::new(0.1, 0.1, 0.0),
            TrajectoryPoint::new(0.2, 0.2, 100.0),
            TrajectoryPoint::new(0.3, 0.3, 200.0),
            TrajectoryPoint::new(0.4, 0.4, 300.0),
        ];
        let window = samples_in_window(&samples, 100.0, 200.0);
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].timestamp, 100.0);
        assert_eq!(window[1].timestamp, 200.0);
    }
}
