//! Recorded page scenarios (`scenario.toml`).
//!
//! A scenario describes what a page did during load: which paint and
//! layout-shift batches were reported, how far the document got, what the
//! navigation timing looked like, and which interactions and component
//! renders happened.
//!
//! ```toml
//! clock_ms = 2400.0
//! ready_state = "complete"
//!
//! [navigation]
//! request_start = 12.0
//! response_start = 190.0
//!
//! [[batch]]
//! entry_type = "paint"
//! entries = [{ name = "first-contentful-paint", start_time = 640.0 }]
//!
//! [[interaction]]
//! kind = "pointer_down"
//! timestamp = 2600.0
//! handled_at = 2645.0
//!
//! [[render]]
//! name = "Header"
//! render_time = 120.0
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use vitals_sources::{
    EntryType, InteractionKind, NavigationTiming, PerformanceEntry, ReadyState, SimulatedPage,
};
use vitals_tracker::PerformanceTracker;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse scenario: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid scenario: {0}")]
    Invalid(String),
}

pub type ScenarioResult<T> = Result<T, ScenarioError>;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scenario {
    /// No page at all; only renders are replayed.
    pub headless: bool,
    /// Whether the page supports performance observers.
    pub observation: Option<bool>,
    /// Page clock once loading settled, in ms since navigation start.
    pub clock_ms: f64,
    pub ready_state: Option<ReadyState>,
    pub navigation: Option<NavigationTiming>,
    #[serde(rename = "batch")]
    pub batches: Vec<Batch>,
    #[serde(rename = "interaction")]
    pub interactions: Vec<Interaction>,
    #[serde(rename = "render")]
    pub renders: Vec<Render>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Batch {
    pub entry_type: EntryType,
    #[serde(default)]
    pub entries: Vec<PerformanceEntry>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Interaction {
    pub kind: InteractionKind,
    /// When the input happened.
    pub timestamp: f64,
    /// When its handler started. Defaults to the timestamp (no delay).
    pub handled_at: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Render {
    pub name: String,
    pub render_time: f64,
}

impl Scenario {
    pub fn from_file(path: &Path) -> ScenarioResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ScenarioResult<Self> {
        let scenario: Scenario = toml::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> ScenarioResult<()> {
        if !self.clock_ms.is_finite() || self.clock_ms < 0.0 {
            return Err(ScenarioError::Invalid(format!(
                "clock_ms must be a non-negative number, got {}",
                self.clock_ms
            )));
        }
        for interaction in &self.interactions {
            let handled = interaction.handled_at.unwrap_or(interaction.timestamp);
            if !interaction.timestamp.is_finite() || !handled.is_finite() {
                return Err(ScenarioError::Invalid(format!(
                    "{:?} interaction has a non-finite time",
                    interaction.kind
                )));
            }
        }
        for render in &self.renders {
            if render.name.is_empty() {
                return Err(ScenarioError::Invalid("render without a name".to_string()));
            }
        }
        Ok(())
    }

    /// Build the page as it stood when loading settled. Interactions are
    /// not dispatched here; see [`Scenario::replay_interactions`].
    pub fn build_page(&self) -> Arc<SimulatedPage> {
        let page = if self.observation.unwrap_or(true) {
            SimulatedPage::new()
        } else {
            SimulatedPage::without_observation()
        };

        for batch in &self.batches {
            page.deliver(batch.entry_type, batch.entries.clone());
        }
        if let Some(navigation) = self.navigation {
            page.set_navigation_timing(navigation);
        }
        page.set_clock(self.clock_ms);
        if let Some(state) = self.ready_state {
            page.set_ready_state(state);
        }
        debug!(
            batches = self.batches.len(),
            ready_state = ?self.ready_state,
            "scenario page built"
        );
        Arc::new(page)
    }

    fn first_interaction(&self, kind: InteractionKind) -> Option<Interaction> {
        self.interactions.iter().copied().find(|i| i.kind == kind)
    }

    /// Track FID and INP for the interactions this scenario contains,
    /// dispatching each once its listener is registered. Gives up after
    /// `bound`; interactions after the first of each kind are ignored.
    pub async fn replay_interactions(
        &self,
        tracker: &PerformanceTracker,
        page: &SimulatedPage,
        bound: Duration,
    ) {
        let pointer = self.first_interaction(InteractionKind::PointerDown);
        let click = self.first_interaction(InteractionKind::Click);

        let fid = async {
            if pointer.is_some() {
                tracker.track_first_input_delay().await;
            }
        };
        let inp = async {
            if click.is_some() {
                tracker.track_interaction_to_next_paint().await;
            }
        };
        let dispatch = async {
            for interaction in [pointer, click].into_iter().flatten() {
                while page.listener_count(interaction.kind) == 0 {
                    tokio::task::yield_now().await;
                }
                page.set_clock(interaction.handled_at.unwrap_or(interaction.timestamp));
                page.dispatch_interaction(interaction.kind, interaction.timestamp);
            }
        };

        let replay = async {
            tokio::join!(fid, inp, dispatch);
        };
        if tokio::time::timeout(bound, replay).await.is_err() {
            warn!(bound_ms = bound.as_millis() as u64, "interaction replay timed out");
        }
        // Lifecycle readings use the load-settled clock.
        page.set_clock(self.clock_ms);
    }
}
