//! The page environment seen by metric sources.
//!
//! Browser observation channels are callback driven. Here every
//! capability is exposed as a channel receiver instead, so a source can
//! simply await its next qualifying observation.

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot, watch};

/// Observation channel filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryType {
    /// Paint milestones (`first-paint`, `first-contentful-paint`).
    Paint,
    /// Largest-paint candidates, reported repeatedly as the page grows.
    LargestContentfulPaint,
    /// Individual layout shifts.
    LayoutShift,
}

/// One entry delivered on an observation channel.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceEntry {
    pub name: String,
    /// Milliseconds since navigation start.
    pub start_time: f64,
    /// Layout shift score (layout-shift entries only).
    pub value: f64,
    /// Whether the shift followed recent user input.
    pub had_recent_input: bool,
}

impl PerformanceEntry {
    pub fn paint(name: &str, start_time: f64) -> Self {
        Self {
            name: name.to_string(),
            start_time,
            ..Default::default()
        }
    }

    pub fn layout_shift(value: f64, had_recent_input: bool) -> Self {
        Self {
            name: "layout-shift".to_string(),
            value,
            had_recent_input,
            ..Default::default()
        }
    }
}

/// Document ready state. Ordered: `Loading < Interactive < Complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadyState {
    Loading,
    /// The response has arrived and the document is parsed.
    Interactive,
    /// The load event has fired.
    Complete,
}

/// Navigation timing marks, in milliseconds since navigation start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavigationTiming {
    pub request_start: f64,
    pub response_start: f64,
}

/// Interaction class a listener is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    /// First pointer press, used for first input delay.
    PointerDown,
    /// Click, used for interaction-to-next-paint.
    Click,
}

/// A delivered user interaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub kind: InteractionKind,
    /// The event's own timestamp.
    pub timestamp: f64,
    /// When the page got to run the handler.
    pub processing_start: f64,
}

impl InteractionEvent {
    /// Handler delay, clamped to zero.
    pub fn delay(&self) -> f64 {
        (self.processing_start - self.timestamp).max(0.0)
    }
}

/// Capabilities a page offers to metric sources.
///
/// Every accessor returns `None` when the capability is missing (for
/// example outside a browser); sources treat that as "leave unset".
pub trait PageEnvironment: Send + Sync {
    /// Whether any performance observation channel exists.
    fn supports_observation(&self) -> bool;

    /// Subscribe to entries of one type. Entries delivered before the
    /// subscription are replayed first, batch by batch. Dropping the
    /// receiver disconnects the observer.
    fn observe(&self, entry_type: EntryType) -> Option<mpsc::UnboundedReceiver<Vec<PerformanceEntry>>>;

    /// Ready-state listener. `None` when there is no document.
    fn ready_state(&self) -> Option<watch::Receiver<ReadyState>>;

    /// Navigation timing marks, once the response has started.
    fn navigation_timing(&self) -> Option<NavigationTiming>;

    /// Register a one-shot listener. Dropping the receiver deregisters it.
    fn listen(&self, kind: InteractionKind) -> Option<oneshot::Receiver<InteractionEvent>>;

    /// Milliseconds since navigation start.
    fn now(&self) -> f64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_states_are_ordered() {
        assert!(ReadyState::Loading < ReadyState::Interactive);
        assert!(ReadyState::Interactive < ReadyState::Complete);
    }

    #[test]
    fn interaction_delay_never_negative() {
        let late = InteractionEvent {
            kind: InteractionKind::Click,
            timestamp: 1000.0,
            processing_start: 1085.0,
        };
        assert_eq!(late.delay(), 85.0);

        let skewed = InteractionEvent {
            processing_start: 990.0,
            ..late
        };
        assert_eq!(skewed.delay(), 0.0);
    }
}
