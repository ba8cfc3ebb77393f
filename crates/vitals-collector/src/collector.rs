//! Collector: concurrent fan-out over the automatic sources.
//!
//! All sources are started before any is awaited, then joined with
//! wait-for-all semantics under one deadline. Resolution order is not
//! meaningful; the returned snapshot reflects whatever settled before
//! the join finished or the deadline passed.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::{self, JoinHandle, JoinSet};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use vitals_core::{MetricSnapshot, ObserverPolicies, Signal};
use vitals_sources::{MetricSource, Outcome, PageEnvironment, Settled, automatic_sources};
use vitals_store::MetricsStore;

/// Default upper bound on one collection pass.
pub const DEFAULT_COLLECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of one collection pass.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectReport {
    pub snapshot: MetricSnapshot,
    /// Sources that wrote a value.
    pub observed: Vec<Signal>,
    /// Sources that resolved without a value (capability missing or gone)
    /// or whose task failed.
    pub unavailable: Vec<Signal>,
    /// Sources still pending at the deadline.
    pub timed_out: Vec<Signal>,
}

impl CollectReport {
    /// Whether any source missed the deadline.
    pub fn is_partial(&self) -> bool {
        !self.timed_out.is_empty()
    }
}

/// Runs the automatic sources against one session's store.
pub struct Collector {
    env: Arc<dyn PageEnvironment>,
    store: MetricsStore,
    sources: Vec<Arc<dyn MetricSource>>,
    timeout: Duration,
    /// Continuations of sources that keep observing: signal → task.
    observers: Mutex<HashMap<Signal, JoinHandle<()>>>,
}

impl Collector {
    /// A collector over the default automatic sources.
    pub fn new(env: Arc<dyn PageEnvironment>, store: MetricsStore) -> Self {
        Self {
            env,
            store,
            sources: automatic_sources(&ObserverPolicies::default()),
            timeout: DEFAULT_COLLECT_TIMEOUT,
            observers: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_policies(mut self, policies: &ObserverPolicies) -> Self {
        self.sources = automatic_sources(policies);
        self
    }

    /// Replace the source set (for custom instrumentation and tests).
    pub fn with_sources(mut self, sources: Vec<Arc<dyn MetricSource>>) -> Self {
        self.sources = sources;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn store(&self) -> &MetricsStore {
        &self.store
    }

    pub fn env(&self) -> &Arc<dyn PageEnvironment> {
        &self.env
    }

    /// Run every source and return the resulting snapshot.
    pub async fn collect(&self) -> MetricSnapshot {
        self.collect_report().await.snapshot
    }

    /// Run every source and report how each one settled.
    pub async fn collect_report(&self) -> CollectReport {
        self.collect_within(self.timeout).await
    }

    /// Like [`Collector::collect_report`], with a one-off bound.
    pub async fn collect_within(&self, timeout: Duration) -> CollectReport {
        let deadline = Instant::now() + timeout;
        let mut pending: BTreeSet<Signal> = BTreeSet::new();
        let mut tasks: HashMap<task::Id, Signal> = HashMap::new();
        let mut set = JoinSet::new();

        for source in &self.sources {
            pending.insert(source.signal());
            let handle = set.spawn(source.start(&self.env, &self.store));
            tasks.insert(handle.id(), source.signal());
        }
        debug!(sources = pending.len(), timeout_ms = timeout.as_millis() as u64, "collection started");

        let mut observed = Vec::new();
        let mut unavailable = Vec::new();

        loop {
            match tokio::time::timeout_at(deadline, set.join_next_with_id()).await {
                Ok(Some(Ok((_, settled)))) => {
                    pending.remove(&settled.signal);
                    match settled.outcome {
                        Outcome::Observed => observed.push(settled.signal),
                        Outcome::Unsupported | Outcome::ChannelClosed => {
                            unavailable.push(settled.signal)
                        }
                    }
                    self.adopt(settled);
                }
                Ok(Some(Err(e))) => {
                    // A failed source settled; it did not stall.
                    if let Some(signal) = tasks.get(&e.id()).copied() {
                        pending.remove(&signal);
                        unavailable.push(signal);
                    }
                    warn!(error = %e, "metric source task failed");
                }
                Ok(None) => break,
                Err(_) => {
                    // Dropping the stalled futures releases their listeners.
                    set.abort_all();
                    break;
                }
            }
        }

        let timed_out: Vec<Signal> = pending.into_iter().collect();
        if !timed_out.is_empty() {
            warn!(
                stalled = ?timed_out,
                timeout_ms = timeout.as_millis() as u64,
                "collection timed out, returning partial snapshot"
            );
        }
        observed.sort();
        unavailable.sort();

        let snapshot = self.store.snapshot();
        info!(
            observed = observed.len(),
            unavailable = unavailable.len(),
            timed_out = timed_out.len(),
            "metrics collected"
        );

        CollectReport {
            snapshot,
            observed,
            unavailable,
            timed_out,
        }
    }

    /// Take ownership of a settled source: its continuation, if any,
    /// runs as this signal's observer, replacing an earlier one.
    pub fn adopt(&self, settled: Settled) -> Outcome {
        let Settled {
            signal,
            outcome,
            continuation,
        } = settled;

        if let Some(continuation) = continuation {
            let handle = tokio::spawn(continuation);
            if let Some(old) = self.lock_observers().insert(signal, handle) {
                old.abort();
                debug!(%signal, "replaced running observer");
            }
        }
        outcome
    }

    /// Signals with a running observer.
    pub fn active_observers(&self) -> Vec<Signal> {
        let mut observers = self.lock_observers();
        observers.retain(|_, handle| !handle.is_finished());
        let mut signals: Vec<Signal> = observers.keys().copied().collect();
        signals.sort();
        signals
    }

    /// Stop every running observer.
    pub fn stop_all(&self) {
        let mut observers = self.lock_observers();
        for (signal, handle) in observers.drain() {
            handle.abort();
            debug!(%signal, "observer stopped");
        }
    }

    fn lock_observers(&self) -> MutexGuard<'_, HashMap<Signal, JoinHandle<()>>> {
        self.observers.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for Collector {
    fn drop(&mut self) {
        self.stop_all();
    }
}
