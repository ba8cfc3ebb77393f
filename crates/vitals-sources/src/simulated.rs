//! In-process page used by tests and scenario replays.
//!
//! Mirrors browser semantics closely enough for the sources: observation
//! channels buffer every delivered batch and replay them to late
//! observers, the ready state only moves forward, and interaction
//! listeners fire once.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tokio::sync::{mpsc, oneshot, watch};
use tracing::debug;

use crate::env::{
    EntryType, InteractionEvent, InteractionKind, NavigationTiming, PageEnvironment,
    PerformanceEntry, ReadyState,
};

type BatchSender = mpsc::UnboundedSender<Vec<PerformanceEntry>>;

#[derive(Default)]
struct PageState {
    clock_ms: f64,
    navigation: Option<NavigationTiming>,
    /// Every delivered batch, per entry type, for buffered replay.
    buffered: HashMap<EntryType, Vec<Vec<PerformanceEntry>>>,
    observers: HashMap<EntryType, Vec<BatchSender>>,
    listeners: HashMap<InteractionKind, Vec<oneshot::Sender<InteractionEvent>>>,
}

/// A controllable page.
pub struct SimulatedPage {
    state: Mutex<PageState>,
    ready: watch::Sender<ReadyState>,
    observation: bool,
}

impl Default for SimulatedPage {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedPage {
    /// A loading page with observation support.
    pub fn new() -> Self {
        let (ready, _) = watch::channel(ReadyState::Loading);
        Self {
            state: Mutex::new(PageState::default()),
            ready,
            observation: true,
        }
    }

    /// A page whose runtime lacks performance observers. Lifecycle and
    /// interaction capabilities remain.
    pub fn without_observation() -> Self {
        Self {
            observation: false,
            ..Self::new()
        }
    }

    fn lock(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Move the page clock to `ms` since navigation start.
    pub fn set_clock(&self, ms: f64) {
        self.lock().clock_ms = ms;
    }

    pub fn set_navigation_timing(&self, timing: NavigationTiming) {
        self.lock().navigation = Some(timing);
    }

    /// Advance the ready state. Moving backwards is ignored.
    pub fn set_ready_state(&self, state: ReadyState) {
        let advanced = self.ready.send_if_modified(|current| {
            if state > *current {
                *current = state;
                true
            } else {
                false
            }
        });
        if advanced {
            debug!(?state, "ready state advanced");
        }
    }

    /// Set the clock and fire the load event.
    pub fn complete_at(&self, ms: f64) {
        self.set_clock(ms);
        self.set_ready_state(ReadyState::Complete);
    }

    /// Deliver a batch to current observers and buffer it for later ones.
    pub fn deliver(&self, entry_type: EntryType, batch: Vec<PerformanceEntry>) {
        let mut state = self.lock();
        if let Some(observers) = state.observers.get_mut(&entry_type) {
            observers.retain(|tx| tx.send(batch.clone()).is_ok());
        }
        state.buffered.entry(entry_type).or_default().push(batch);
    }

    /// Fire an interaction that happened at `timestamp`; the handler runs
    /// at the current clock. Returns how many listeners received it.
    pub fn dispatch_interaction(&self, kind: InteractionKind, timestamp: f64) -> usize {
        let mut state = self.lock();
        let event = InteractionEvent {
            kind,
            timestamp,
            processing_start: state.clock_ms,
        };
        let listeners = state.listeners.remove(&kind).unwrap_or_default();
        let delivered = listeners
            .into_iter()
            .filter_map(|tx| tx.send(event).ok())
            .count();
        debug!(?kind, timestamp, delivered, "interaction dispatched");
        delivered
    }

    /// Live interaction listeners of one kind. Listeners whose receiver
    /// was dropped are pruned first.
    pub fn listener_count(&self, kind: InteractionKind) -> usize {
        let mut state = self.lock();
        match state.listeners.get_mut(&kind) {
            Some(listeners) => {
                listeners.retain(|tx| !tx.is_closed());
                listeners.len()
            }
            None => 0,
        }
    }

    /// Live observers of one entry type.
    pub fn observer_count(&self, entry_type: EntryType) -> usize {
        let mut state = self.lock();
        match state.observers.get_mut(&entry_type) {
            Some(observers) => {
                observers.retain(|tx| !tx.is_closed());
                observers.len()
            }
            None => 0,
        }
    }
}

impl PageEnvironment for SimulatedPage {
    fn supports_observation(&self) -> bool {
        self.observation
    }

    fn observe(&self, entry_type: EntryType) -> Option<mpsc::UnboundedReceiver<Vec<PerformanceEntry>>> {
        if !self.observation {
            return None;
        }
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.lock();
        for batch in state.buffered.get(&entry_type).into_iter().flatten() {
            // The receiver is alive here, so the send cannot fail.
            let _ = tx.send(batch.clone());
        }
        state.observers.entry(entry_type).or_default().push(tx);
        Some(rx)
    }

    fn ready_state(&self) -> Option<watch::Receiver<ReadyState>> {
        Some(self.ready.subscribe())
    }

    fn navigation_timing(&self) -> Option<NavigationTiming> {
        self.lock().navigation
    }

    fn listen(&self, kind: InteractionKind) -> Option<oneshot::Receiver<InteractionEvent>> {
        let (tx, rx) = oneshot::channel();
        let mut state = self.lock();
        let listeners = state.listeners.entry(kind).or_default();
        listeners.retain(|tx| !tx.is_closed());
        listeners.push(tx);
        Some(rx)
    }

    fn now(&self) -> f64 {
        self.lock().clock_ms
    }
}
