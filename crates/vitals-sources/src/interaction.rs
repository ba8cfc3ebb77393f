//! Interaction-gated sources: first input delay and
//! interaction-to-next-paint.
//!
//! These depend on real user input that may never happen, so they are
//! never part of a collection pass. The listener is one-shot: it is gone
//! after the first delivery, and dropping the pending future drops the
//! receiver, which deregisters it.

use std::sync::Arc;

use tracing::debug;

use vitals_core::Signal;
use vitals_store::MetricsStore;

use crate::env::{InteractionKind, PageEnvironment};
use crate::source::{MetricSource, Outcome, Settled, SourceFuture};

#[derive(Debug, Clone)]
pub struct InteractionSource {
    signal: Signal,
    kind: InteractionKind,
}

impl InteractionSource {
    pub fn first_input_delay() -> Self {
        Self {
            signal: Signal::FirstInputDelay,
            kind: InteractionKind::PointerDown,
        }
    }

    pub fn interaction_to_next_paint() -> Self {
        Self {
            signal: Signal::InteractionToNextPaint,
            kind: InteractionKind::Click,
        }
    }

    pub fn kind(&self) -> InteractionKind {
        self.kind
    }
}

impl MetricSource for InteractionSource {
    fn signal(&self) -> Signal {
        self.signal
    }

    fn start(&self, env: &Arc<dyn PageEnvironment>, store: &MetricsStore) -> SourceFuture {
        let signal = self.signal;
        let kind = self.kind;
        let listener = env.listen(kind);
        let store = store.clone();

        Box::pin(async move {
            let Some(listener) = listener else {
                debug!(%signal, ?kind, "interaction listeners unsupported, leaving unset");
                return Settled::done(signal, Outcome::Unsupported);
            };

            match listener.await {
                Ok(event) => {
                    let delay = event.delay();
                    store.record(signal, delay);
                    debug!(%signal, ?kind, delay, "interaction observed");
                    Settled::done(signal, Outcome::Observed)
                }
                Err(_) => {
                    debug!(%signal, ?kind, "listener released without an interaction");
                    Settled::done(signal, Outcome::ChannelClosed)
                }
            }
        })
    }
}
