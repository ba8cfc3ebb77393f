//! Manual component render tracking.
//!
//! Renders are pushed by the caller, synchronously and any number of
//! times. There is nothing to subscribe to.

use std::time::Instant;

use tracing::debug;

use vitals_store::MetricsStore;

/// Append a named render duration (milliseconds) to the session log.
pub fn track_component_render(store: &MetricsStore, name: &str, render_time: f64) {
    store.push_render(name, render_time);
    debug!(component = %name, render_time, "component rendered");
}

/// Measures one render from creation until [`RenderTimer::finish`] or
/// drop, then records it.
#[derive(Debug)]
pub struct RenderTimer {
    store: MetricsStore,
    name: String,
    started: Instant,
    recorded: bool,
}

impl RenderTimer {
    pub fn start(store: &MetricsStore, name: &str) -> Self {
        Self {
            store: store.clone(),
            name: name.to_string(),
            started: Instant::now(),
            recorded: false,
        }
    }

    /// Record the elapsed time and return it in milliseconds.
    pub fn finish(mut self) -> f64 {
        self.record()
    }

    fn record(&mut self) -> f64 {
        let elapsed = self.started.elapsed().as_secs_f64() * 1000.0;
        if !self.recorded {
            self.recorded = true;
            track_component_render(&self.store, &self.name, elapsed);
        }
        elapsed
    }
}

impl Drop for RenderTimer {
    fn drop(&mut self) {
        self.record();
    }
}
