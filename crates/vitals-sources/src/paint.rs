//! Paint-event sources: first contentful paint, largest contentful
//! paint, and cumulative layout shift.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use vitals_core::{Signal, StopPolicy};
use vitals_store::MetricsStore;

use crate::env::{EntryType, PageEnvironment, PerformanceEntry};
use crate::source::{MetricSource, Outcome, Settled, SourceFuture};

const FIRST_CONTENTFUL_PAINT: &str = "first-contentful-paint";

/// Turns a delivered batch into the value to store, if any.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintReducer {
    /// Start time of the first entry with this name.
    NamedEntry(&'static str),
    /// Start time of the last entry in the batch.
    LastEntry,
    /// Running sum of shift values without recent input. Yields the
    /// total after every batch, including batches that add nothing.
    ShiftSum { total: f64 },
}

impl PaintReducer {
    pub fn apply(&mut self, batch: &[PerformanceEntry]) -> Option<f64> {
        match self {
            PaintReducer::NamedEntry(name) => batch
                .iter()
                .find(|e| e.name == *name)
                .map(|e| e.start_time),
            PaintReducer::LastEntry => batch.last().map(|e| e.start_time),
            PaintReducer::ShiftSum { total } => {
                *total += batch
                    .iter()
                    .filter(|e| !e.had_recent_input && e.value > 0.0)
                    .map(|e| e.value)
                    .sum::<f64>();
                Some(*total)
            }
        }
    }
}

/// A source fed by a buffered observation channel.
#[derive(Debug, Clone)]
pub struct PaintSource {
    signal: Signal,
    entry_type: EntryType,
    reducer: PaintReducer,
    policy: StopPolicy,
}

impl PaintSource {
    pub fn new(signal: Signal, entry_type: EntryType, reducer: PaintReducer, policy: StopPolicy) -> Self {
        Self {
            signal,
            entry_type,
            reducer,
            policy,
        }
    }

    pub fn first_contentful_paint(policy: StopPolicy) -> Self {
        Self::new(
            Signal::FirstContentfulPaint,
            EntryType::Paint,
            PaintReducer::NamedEntry(FIRST_CONTENTFUL_PAINT),
            policy,
        )
    }

    pub fn largest_contentful_paint(policy: StopPolicy) -> Self {
        Self::new(
            Signal::LargestContentfulPaint,
            EntryType::LargestContentfulPaint,
            PaintReducer::LastEntry,
            policy,
        )
    }

    pub fn cumulative_layout_shift(policy: StopPolicy) -> Self {
        Self::new(
            Signal::CumulativeLayoutShift,
            EntryType::LayoutShift,
            PaintReducer::ShiftSum { total: 0.0 },
            policy,
        )
    }

    pub fn policy(&self) -> StopPolicy {
        self.policy
    }
}

impl MetricSource for PaintSource {
    fn signal(&self) -> Signal {
        self.signal
    }

    fn start(&self, env: &Arc<dyn PageEnvironment>, store: &MetricsStore) -> SourceFuture {
        let signal = self.signal;
        let policy = self.policy;
        let mut reducer = self.reducer.clone();
        let store = store.clone();
        let channel = if env.supports_observation() {
            env.observe(self.entry_type)
        } else {
            None
        };

        Box::pin(async move {
            let Some(mut batches) = channel else {
                debug!(%signal, "observation unsupported, leaving unset");
                return Settled::done(signal, Outcome::Unsupported);
            };

            while let Some(batch) = batches.recv().await {
                let Some(first) = reducer.apply(&batch) else {
                    continue;
                };
                let value = drain_queued(&mut batches, &mut reducer, first);
                store.record(signal, value);
                debug!(%signal, value, ?policy, "paint observation");

                return match policy {
                    StopPolicy::AfterFirstMatch => Settled::done(signal, Outcome::Observed),
                    StopPolicy::KeepObserving => {
                        Settled::continuing(signal, keep_observing(signal, batches, reducer, store))
                    }
                };
            }

            debug!(%signal, "observation channel closed before a value qualified");
            Settled::done(signal, Outcome::ChannelClosed)
        })
    }
}

/// Fold every batch already queued behind the first qualifying one into
/// `value`, so a settled source reflects the whole buffered backlog.
/// A named entry is settled by its first match and ignores the rest.
fn drain_queued(
    batches: &mut mpsc::UnboundedReceiver<Vec<PerformanceEntry>>,
    reducer: &mut PaintReducer,
    mut value: f64,
) -> f64 {
    if matches!(reducer, PaintReducer::NamedEntry(_)) {
        return value;
    }
    while let Ok(batch) = batches.try_recv() {
        if let Some(next) = reducer.apply(&batch) {
            value = next;
        }
    }
    value
}

/// Apply every later batch until the channel closes or the task is
/// dropped.
async fn keep_observing(
    signal: Signal,
    mut batches: mpsc::UnboundedReceiver<Vec<PerformanceEntry>>,
    mut reducer: PaintReducer,
    store: MetricsStore,
) {
    while let Some(batch) = batches.recv().await {
        if let Some(value) = reducer.apply(&batch) {
            store.record(signal, value);
            debug!(%signal, value, "paint observation updated");
        }
    }
    debug!(%signal, "observer disconnected");
}
