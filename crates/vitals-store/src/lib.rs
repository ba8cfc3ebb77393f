//! vitals-store: the session-scoped metrics record.
//!
//! One `MetricsStore` exists per page session. It is owned by whoever
//! starts the session and handed by clone to every metric source and
//! consumer; there is no process-wide singleton.
//!
//! The `MetricsStore` is `Clone` + `Send` + `Sync` (backed by
//! `Arc<Mutex<_>>`) and can be shared across async tasks.

pub mod store;

pub use store::MetricsStore;
