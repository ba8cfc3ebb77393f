//! The uniform source contract.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use vitals_core::Signal;
use vitals_store::MetricsStore;

use crate::env::PageEnvironment;

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Future returned by [`MetricSource::start`].
pub type SourceFuture = BoxFuture<Settled>;

/// How a source resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A value was written to the store.
    Observed,
    /// The environment lacks the capability; the field stays unset.
    Unsupported,
    /// The capability went away before anything qualified.
    ChannelClosed,
}

/// A resolved source.
pub struct Settled {
    pub signal: Signal,
    pub outcome: Outcome,
    /// Remaining observation work for sources that keep observing after
    /// their first value. The owner decides where it runs; dropping it
    /// disconnects the observer.
    pub continuation: Option<BoxFuture<()>>,
}

impl Settled {
    pub fn done(signal: Signal, outcome: Outcome) -> Self {
        Self {
            signal,
            outcome,
            continuation: None,
        }
    }

    pub fn continuing(signal: Signal, continuation: impl Future<Output = ()> + Send + 'static) -> Self {
        Self {
            signal,
            outcome: Outcome::Observed,
            continuation: Some(Box::pin(continuation)),
        }
    }
}

impl std::fmt::Debug for Settled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settled")
            .field("signal", &self.signal)
            .field("outcome", &self.outcome)
            .field("continuing", &self.continuation.is_some())
            .finish()
    }
}

/// A producer for one tracked signal.
///
/// `start` registers with the environment immediately (so every source
/// of a collection pass subscribes in the same turn) and returns a
/// future that resolves once the first qualifying observation has been
/// written, or once the source knows it never will be.
pub trait MetricSource: Send + Sync {
    fn signal(&self) -> Signal;

    fn start(&self, env: &Arc<dyn PageEnvironment>, store: &MetricsStore) -> SourceFuture;
}
