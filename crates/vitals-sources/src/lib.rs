//! vitals-sources: the producers behind every tracked signal.
//!
//! Each source subscribes to one capability of the page environment,
//! waits for its first qualifying observation, writes it into the
//! session's `MetricsStore`, and resolves.
//!
//! # Architecture
//!
//! ```text
//! PageEnvironment (trait)
//!   ├── SimulatedPage - in-process page driven by tests and replays
//!   └── HeadlessPage  - no capabilities; every source degrades to unset
//!
//! MetricSource (trait) → SourceFuture → Settled { outcome, continuation }
//!   ├── PaintSource        - FCP, LCP, CLS (buffered observation channels)
//!   ├── LifecycleSource    - TTI, TTFB (race-safe ready-state gate)
//!   └── InteractionSource  - FID, INP (one-shot listeners)
//!
//! manual::track_component_render / RenderTimer - caller-pushed renders
//! ```
//!
//! A source whose capability is missing resolves immediately with
//! `Outcome::Unsupported` and leaves its field unset. That is the
//! defined degraded mode, not an error.

pub mod env;
pub mod headless;
pub mod interaction;
pub mod lifecycle;
pub mod manual;
pub mod paint;
pub mod simulated;
pub mod source;

pub use env::{
    EntryType, InteractionEvent, InteractionKind, NavigationTiming, PageEnvironment,
    PerformanceEntry, ReadyState,
};
pub use headless::HeadlessPage;
pub use interaction::InteractionSource;
pub use lifecycle::LifecycleSource;
pub use manual::{RenderTimer, track_component_render};
pub use paint::{PaintReducer, PaintSource};
pub use simulated::SimulatedPage;
pub use source::{MetricSource, Outcome, Settled, SourceFuture};

use std::sync::Arc;

use vitals_core::ObserverPolicies;

/// The sources started by a full collection pass, in canonical order.
pub fn automatic_sources(policies: &ObserverPolicies) -> Vec<Arc<dyn MetricSource>> {
    vec![
        Arc::new(PaintSource::first_contentful_paint(policies.first_contentful_paint)),
        Arc::new(PaintSource::largest_contentful_paint(policies.largest_contentful_paint)),
        Arc::new(PaintSource::cumulative_layout_shift(policies.cumulative_layout_shift)),
        Arc::new(LifecycleSource::time_to_interactive()),
        Arc::new(LifecycleSource::time_to_first_byte()),
    ]
}
