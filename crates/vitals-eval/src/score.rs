//! Performance score.
//!
//! Starts at [`MAX_SCORE`] and subtracts one penalty per signal over its
//! baseline:
//! - **Durations**: `(observed − baseline) / 100`, i.e. one point per
//!   100 ms over.
//! - **Layout shift**: `(observed − baseline) * 100`, since CLS lives on
//!   a 0–1 scale.
//! - **Component renders**: `(render − baseline) / 100` per entry.
//!
//! Only positive differences count and unset signals contribute nothing.
//! The result is rounded and clamped to `0..=100`.

use serde::Serialize;
use tracing::debug;

use vitals_core::{MetricSnapshot, Signal, ThresholdConfig};

pub const MAX_SCORE: u8 = 100;

/// Per-signal penalties behind a score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// Positive penalties, in evaluation order. Renders appear once per
    /// offending entry.
    pub penalties: Vec<(Signal, f64)>,
    pub total_penalty: f64,
    pub score: u8,
}

/// Scores snapshots against the fixed default baseline.
///
/// The baseline is fixed; alert overrides never change the score.
#[derive(Debug, Clone, Default)]
pub struct ScoreCalculator {
    baseline: ThresholdConfig,
}

impl ScoreCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self, snapshot: &MetricSnapshot) -> u8 {
        self.breakdown(snapshot).score
    }

    pub fn breakdown(&self, snapshot: &MetricSnapshot) -> ScoreBreakdown {
        let mut penalties = Vec::new();

        for signal in Signal::HEADLINE {
            let Some(observed) = snapshot.get(signal) else {
                continue;
            };
            let diff = observed - self.baseline.for_signal(signal);
            let penalty = match signal {
                Signal::CumulativeLayoutShift => diff * 100.0,
                _ => diff / 100.0,
            };
            if penalty > 0.0 {
                penalties.push((signal, penalty));
            }
        }

        for render in &snapshot.component_render_times {
            let penalty = (render.render_time - self.baseline.component_render_time) / 100.0;
            if penalty > 0.0 {
                penalties.push((Signal::ComponentRender, penalty));
            }
        }

        let total_penalty: f64 = penalties.iter().map(|(_, p)| p).sum();
        let raw = (f64::from(MAX_SCORE) - total_penalty).round();
        let score = raw.clamp(0.0, f64::from(MAX_SCORE)) as u8;

        debug!(score, total_penalty, penalties = penalties.len(), "score computed");

        ScoreBreakdown {
            penalties,
            total_penalty,
            score,
        }
    }
}
