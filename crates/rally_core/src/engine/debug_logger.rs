//! # Analysis Tracer
//!
//! Records how the pipeline reached its recommendations: which decision
//! points were found, what state each shot got, how each candidate scored.
//!
//! The tracer is supplied by the caller; the default is a no-op so the engine
//! carries no hidden logging state.
//!
//! ## Usage
//! ```rust,ignore
//! let tracer = RecordingTracer::new();
//! let analyzer = RallyAnalyzer::new(config).with_tracer(Box::new(tracer.clone()));
//! analyzer.analyze_rally(&input, &mut ids);
//! println!("{}", tracer.summary());
//! ```

use crate::error::Fallback;
use crate::models::{Phase, ShotType, ZoneId};
use serde::Serialize;
use std::sync::{Arc, Mutex};

// ========== Trace Events ==========

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    /// Segmentation finished
    Segmented {
        points: usize,
        decision_points: Vec<usize>,
        shots: usize,
    },
    /// Rally state computed for a shot
    StateComputed {
        shot_index: usize,
        phase: Phase,
        pressure: f64,
    },
    /// Candidate scored
    CandidateScored {
        shot_index: usize,
        shot_type: ShotType,
        target_zone: ZoneId,
        score: f64,
        confidence: f64,
    },
    /// Graceful degradation
    Fallback { fallback: Fallback },
}

/// Sink for pipeline trace events.
pub trait AnalysisTracer: Send + Sync {
    /// Skip building events when nothing listens.
    fn enabled(&self) -> bool {
        true
    }

    fn record(&self, event: TraceEvent);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl AnalysisTracer for NoopTracer {
    fn enabled(&self) -> bool {
        false
    }

    fn record(&self, _event: TraceEvent) {}
}

/// Forwards events to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTracer;

impl AnalysisTracer for LogTracer {
    fn enabled(&self) -> bool {
        tracing::enabled!(tracing::Level::DEBUG)
    }

    fn record(&self, event: TraceEvent) {
        match &event {
            TraceEvent::Segmented { points, decision_points, shots } => {
                tracing::debug!(points, shots, ?decision_points, "segmented trajectory");
            }
            TraceEvent::StateComputed { shot_index, phase, pressure } => {
                tracing::debug!(shot_index, %phase, pressure, "rally state");
            }
            TraceEvent::CandidateScored {
                shot_index,
                shot_type,
                target_zone,
                score,
                confidence,
            } => {
                tracing::debug!(
                    shot_index,
                    %shot_type,
                    target_zone,
                    score,
                    confidence,
                    "candidate scored"
                );
            }
            TraceEvent::Fallback { fallback } => {
                tracing::debug!(fallback = fallback.as_str(), "fallback applied");
            }
        }
    }
}

/// Buffers events in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingTracer {
    events: Arc<Mutex<Vec<TraceEvent>>>,
}

impl RecordingTracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    pub fn candidate_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, TraceEvent::CandidateScored { .. }))
            .count()
    }

    /// One line per event kind with counts.
    pub fn summary(&self) -> String {
        let events = self.events();
        let mut segmented = 0;
        let mut states = 0;
        let mut candidates = 0;
        let mut fallbacks = Vec::new();
        for event in &events {
            match event {
                TraceEvent::Segmented { .. } => segmented += 1,
                TraceEvent::StateComputed { .. } => states += 1,
                TraceEvent::CandidateScored { .. } => candidates += 1,
                TraceEvent::Fallback { fallback } => fallbacks.push(fallback.as_str()),
            }
        }
        format!(
            "=== Analysis Trace ===\nSegmentations: {}\nStates: {}\nCandidates: {}\n\
             Fallbacks: [{}]",
            segmented,
            states,
            candidates,
            fallbacks.join(", ")
        )
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.events()).unwrap_or_default()
    }
}

impl AnalysisTracer for RecordingTracer {
    fn record(&self, event: TraceEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
