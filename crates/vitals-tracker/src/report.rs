//! What a tracker run surfaced.

use serde::Serialize;

use vitals_core::{AlertEvent, MetricSnapshot, Signal};
use vitals_eval::Feedback;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub snapshot: MetricSnapshot,
    /// Empty when alerts are disabled.
    pub alerts: Vec<AlertEvent>,
    /// `None` when gamification is disabled.
    pub score: Option<u8>,
    pub feedback: Option<Feedback>,
    /// Automatic sources still pending when collection gave up.
    pub timed_out: Vec<Signal>,
}

impl RunReport {
    pub fn is_partial(&self) -> bool {
        !self.timed_out.is_empty()
    }
}
