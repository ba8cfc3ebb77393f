//! An environment with no page: server-side or non-interactive contexts.

use tokio::sync::{mpsc, oneshot, watch};

use crate::env::{
    EntryType, InteractionEvent, InteractionKind, NavigationTiming, PageEnvironment,
    PerformanceEntry, ReadyState,
};

/// Offers no capabilities. Every source resolves immediately and leaves
/// its field unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessPage;

impl PageEnvironment for HeadlessPage {
    fn supports_observation(&self) -> bool {
        false
    }

    fn observe(&self, _entry_type: EntryType) -> Option<mpsc::UnboundedReceiver<Vec<PerformanceEntry>>> {
        None
    }

    fn ready_state(&self) -> Option<watch::Receiver<ReadyState>> {
        None
    }

    fn navigation_timing(&self) -> Option<NavigationTiming> {
        None
    }

    fn listen(&self, _kind: InteractionKind) -> Option<oneshot::Receiver<InteractionEvent>> {
        None
    }

    fn now(&self) -> f64 {
        0.0
    }
}
