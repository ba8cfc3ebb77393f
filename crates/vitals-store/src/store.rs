//! Shared metrics record.
//!
//! Sources write disjoint fields, so no write needs to touch more than one
//! field atomically. A mutex still guards the record because collection
//! runs on a multi-threaded runtime and the render log is appended from
//! arbitrary caller threads.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use vitals_core::{ComponentRender, MetricSnapshot, Signal};

/// Handle to one session's metrics. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct MetricsStore {
    inner: Arc<Mutex<MetricSnapshot>>,
}

impl MetricsStore {
    /// Start a fresh session with every signal unset.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MetricSnapshot> {
        // A panic while holding the lock cannot leave a half-written
        // field behind, so a poisoned record is still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record an observation for a headline signal.
    ///
    /// Durations replace the previous value (last report wins). CLS keeps
    /// the larger of the stored and reported running sums, so the value
    /// never decreases within a session. Negative or non-finite values
    /// are rejected. Returns whether the store changed.
    pub fn record(&self, signal: Signal, value: f64) -> bool {
        if !value.is_finite() || value < 0.0 {
            warn!(%signal, value, "rejecting invalid observation");
            return false;
        }

        let mut snap = self.lock();
        let slot = match signal {
            Signal::FirstContentfulPaint => &mut snap.first_contentful_paint,
            Signal::LargestContentfulPaint => &mut snap.largest_contentful_paint,
            Signal::TimeToInteractive => &mut snap.time_to_interactive,
            Signal::FirstInputDelay => &mut snap.first_input_delay,
            Signal::InteractionToNextPaint => &mut snap.interaction_to_next_paint,
            Signal::TimeToFirstByte => &mut snap.time_to_first_byte,
            Signal::CumulativeLayoutShift => {
                if value <= snap.cumulative_layout_shift {
                    return false;
                }
                snap.cumulative_layout_shift = value;
                debug!(%signal, value, "metric recorded");
                return true;
            }
            Signal::ComponentRender => {
                warn!("component renders must be recorded with push_render");
                return false;
            }
        };
        *slot = Some(value);
        debug!(%signal, value, "metric recorded");
        true
    }

    /// Append a component render to the log.
    ///
    /// Negative durations are clamped to zero; the entry is still kept
    /// since a repeated render is meaningful on its own.
    pub fn push_render(&self, name: &str, render_time: f64) {
        let render_time = if render_time.is_finite() {
            render_time.max(0.0)
        } else {
            warn!(component = %name, render_time, "non-finite render time clamped to zero");
            0.0
        };
        self.lock().component_render_times.push(ComponentRender {
            name: name.to_string(),
            render_time,
        });
    }

    /// Copy of the current record.
    pub fn snapshot(&self) -> MetricSnapshot {
        self.lock().clone()
    }

    /// Current value of a headline signal.
    pub fn get(&self, signal: Signal) -> Option<f64> {
        self.lock().get(signal)
    }

    /// Number of recorded component renders.
    pub fn render_count(&self) -> usize {
        self.lock().component_render_times.len()
    }
}
