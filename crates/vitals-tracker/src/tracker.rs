//! Performance tracker: the public surface of a session.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use vitals_collector::{CollectReport, Collector};
use vitals_core::{
    AlertEvent, ConfigResult, MetricSnapshot, ObserverPolicies, Signal, ThresholdConfig,
    ThresholdOverrides, TrackerConfig,
};
use vitals_eval::{AlertEvaluator, Feedback, ScoreCalculator};
use vitals_sources::{
    InteractionSource, LifecycleSource, MetricSource, Outcome, PageEnvironment, PaintSource,
    RenderTimer, track_component_render,
};
use vitals_store::MetricsStore;

use crate::report::RunReport;

/// Tracks one page session.
///
/// Owns the session's store; every source started through the tracker
/// writes into it, and [`PerformanceTracker::snapshot`] reads it back.
/// Dropping the tracker stops any observer still running.
pub struct PerformanceTracker {
    store: MetricsStore,
    collector: Collector,
    policies: ObserverPolicies,
}

impl PerformanceTracker {
    /// A tracker with default observer policies and collection bound.
    pub fn new(env: Arc<dyn PageEnvironment>) -> Self {
        let store = MetricsStore::new();
        Self {
            collector: Collector::new(env, store.clone()),
            store,
            policies: ObserverPolicies::default(),
        }
    }

    /// A tracker using the config's observer policies and timeout.
    pub fn from_config(env: Arc<dyn PageEnvironment>, config: &TrackerConfig) -> ConfigResult<Self> {
        config.validate()?;
        let store = MetricsStore::new();
        let collector = Collector::new(env, store.clone())
            .with_policies(&config.observers)
            .with_timeout(config.collect_timeout()?);
        Ok(Self {
            store,
            collector,
            policies: config.observers,
        })
    }

    pub fn store(&self) -> &MetricsStore {
        &self.store
    }

    pub fn collect_timeout(&self) -> Duration {
        self.collector.timeout()
    }

    /// Run every automatic source and return the snapshot.
    pub async fn collect(&self) -> MetricSnapshot {
        self.collector.collect().await
    }

    pub async fn collect_report(&self) -> CollectReport {
        self.collector.collect_report().await
    }

    /// Copy of the current metrics. Reading twice without a write in
    /// between yields equal snapshots.
    pub fn snapshot(&self) -> MetricSnapshot {
        self.store.snapshot()
    }

    pub async fn track_first_contentful_paint(&self) -> Outcome {
        self.track(PaintSource::first_contentful_paint(self.policies.first_contentful_paint))
            .await
    }

    pub async fn track_largest_contentful_paint(&self) -> Outcome {
        self.track(PaintSource::largest_contentful_paint(self.policies.largest_contentful_paint))
            .await
    }

    pub async fn track_cumulative_layout_shift(&self) -> Outcome {
        self.track(PaintSource::cumulative_layout_shift(self.policies.cumulative_layout_shift))
            .await
    }

    pub async fn track_time_to_interactive(&self) -> Outcome {
        self.track(LifecycleSource::time_to_interactive()).await
    }

    pub async fn track_time_to_first_byte(&self) -> Outcome {
        self.track(LifecycleSource::time_to_first_byte()).await
    }

    /// Waits for the first pointer-down. Never resolves on a page that
    /// sees no input; wrap it in a timeout or drop it to deregister.
    pub async fn track_first_input_delay(&self) -> Outcome {
        self.track(InteractionSource::first_input_delay()).await
    }

    /// Waits for the first click. Same caveat as FID.
    pub async fn track_interaction_to_next_paint(&self) -> Outcome {
        self.track(InteractionSource::interaction_to_next_paint()).await
    }

    async fn track(&self, source: impl MetricSource) -> Outcome {
        let settled = source.start(self.collector.env(), &self.store).await;
        self.collector.adopt(settled)
    }

    /// Append a component render (milliseconds).
    pub fn track_component_render(&self, name: &str, render_time: f64) {
        track_component_render(&self.store, name, render_time);
    }

    /// Time a render from now until the timer is finished or dropped.
    pub fn render_timer(&self, name: &str) -> RenderTimer {
        RenderTimer::start(&self.store, name)
    }

    /// Evaluate the current snapshot against the defaults merged with
    /// `overrides`. Every alert is logged at `warn`.
    pub fn check_alerts(&self, overrides: Option<&ThresholdOverrides>) -> Vec<AlertEvent> {
        alerts_for(&self.snapshot(), overrides)
    }

    /// Score the current snapshot against the default baseline.
    pub fn score(&self) -> u8 {
        ScoreCalculator::new().score(&self.snapshot())
    }

    /// Collect (if enabled), surface alerts (if enabled), then score and
    /// present feedback (if enabled).
    ///
    /// Observer policies come from construction; only the toggles,
    /// thresholds and timeout are read from `config` here.
    pub async fn run(&self, config: &TrackerConfig) -> RunReport {
        let mut timed_out = Vec::new();
        if config.track_metrics {
            let timeout = match config.collect_timeout() {
                Ok(timeout) => timeout,
                Err(e) => {
                    warn!(
                        error = %e,
                        fallback_ms = self.collect_timeout().as_millis() as u64,
                        "invalid collect timeout"
                    );
                    self.collect_timeout()
                }
            };
            timed_out = self.collector.collect_within(timeout).await.timed_out;
        }

        // Alerts, score and the report all describe this one read.
        let snapshot = self.snapshot();
        let alerts = if config.show_alerts {
            alerts_for(&snapshot, Some(&config.thresholds))
        } else {
            Vec::new()
        };

        let feedback = config.enable_gamification.then(|| present(&snapshot));

        RunReport {
            snapshot,
            alerts,
            score: feedback.map(|f| f.score),
            feedback,
            timed_out,
        }
    }

    /// Collect, score, and present feedback.
    pub async fn run_gamification(&self) -> Feedback {
        let snapshot = self.collect().await;
        present(&snapshot)
    }

    /// Signals whose observers are still running.
    pub fn active_observers(&self) -> Vec<Signal> {
        self.collector.active_observers()
    }

    /// Stop every running observer. Recorded values stay.
    pub fn shutdown(&self) {
        self.collector.stop_all();
        info!("tracker shut down");
    }
}

fn alerts_for(snapshot: &MetricSnapshot, overrides: Option<&ThresholdOverrides>) -> Vec<AlertEvent> {
    let thresholds = match overrides {
        Some(overrides) => ThresholdConfig::default().merged(overrides),
        None => ThresholdConfig::default(),
    };
    let alerts = AlertEvaluator::new(thresholds).evaluate(snapshot);
    for alert in &alerts {
        warn!(
            signal = %alert.signal,
            observed = alert.observed,
            threshold = alert.threshold,
            component = alert.component.as_deref().unwrap_or(""),
            "{alert}"
        );
    }
    alerts
}

fn present(snapshot: &MetricSnapshot) -> Feedback {
    let feedback = vitals_eval::feedback(ScoreCalculator::new().score(snapshot));
    info!(score = feedback.score, tier = %feedback.tier, "{feedback}");
    feedback
}
