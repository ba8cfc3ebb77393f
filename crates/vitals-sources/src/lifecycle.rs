//! Lifecycle-gated sources: time to interactive and time to first byte.
//!
//! Both wait for a ready-state milestone. The listener is registered
//! before the current state is checked, so a milestone that passed
//! before observation started still resolves, and one that passes in
//! between cannot be missed. Each source resolves at most once.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use vitals_core::Signal;
use vitals_store::MetricsStore;

use crate::env::{PageEnvironment, ReadyState};
use crate::source::{MetricSource, Outcome, Settled, SourceFuture};

/// What to record once the milestone is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reading {
    /// The environment clock at resolution.
    Clock,
    /// Response start minus request start.
    ResponseLatency,
}

#[derive(Debug, Clone)]
pub struct LifecycleSource {
    signal: Signal,
    milestone: ReadyState,
    reading: Reading,
}

impl LifecycleSource {
    /// Resolves when the load event has fired.
    pub fn time_to_interactive() -> Self {
        Self {
            signal: Signal::TimeToInteractive,
            milestone: ReadyState::Complete,
            reading: Reading::Clock,
        }
    }

    /// Resolves once the response has arrived.
    pub fn time_to_first_byte() -> Self {
        Self {
            signal: Signal::TimeToFirstByte,
            milestone: ReadyState::Interactive,
            reading: Reading::ResponseLatency,
        }
    }

    pub fn milestone(&self) -> ReadyState {
        self.milestone
    }
}

impl MetricSource for LifecycleSource {
    fn signal(&self) -> Signal {
        self.signal
    }

    fn start(&self, env: &Arc<dyn PageEnvironment>, store: &MetricsStore) -> SourceFuture {
        let signal = self.signal;
        let milestone = self.milestone;
        let reading = self.reading;
        let listener = env.ready_state();
        let env = Arc::clone(env);
        let store = store.clone();

        Box::pin(async move {
            let Some(listener) = listener else {
                debug!(%signal, "no document, leaving unset");
                return Settled::done(signal, Outcome::Unsupported);
            };

            let Some(already_reached) = reach(listener, milestone).await else {
                debug!(%signal, "document went away before milestone");
                return Settled::done(signal, Outcome::ChannelClosed);
            };

            let value = match reading {
                Reading::Clock => env.now(),
                Reading::ResponseLatency => match env.navigation_timing() {
                    Some(t) => (t.response_start - t.request_start).max(0.0),
                    None => {
                        debug!(%signal, "navigation timing unavailable");
                        return Settled::done(signal, Outcome::Unsupported);
                    }
                },
            };

            store.record(signal, value);
            if already_reached {
                debug!(%signal, value, "milestone already passed at observation start");
            } else {
                debug!(%signal, value, "milestone reached");
            }
            Settled::done(signal, Outcome::Observed)
        })
    }
}

/// Wait until the ready state reaches `milestone`.
///
/// Returns `Some(true)` when it had already been reached when checked,
/// `Some(false)` when it was reached later, and `None` if the sender went
/// away first.
async fn reach(mut listener: watch::Receiver<ReadyState>, milestone: ReadyState) -> Option<bool> {
    if *listener.borrow_and_update() >= milestone {
        return Some(true);
    }
    loop {
        listener.changed().await.ok()?;
        if *listener.borrow_and_update() >= milestone {
            return Some(false);
        }
    }
}
