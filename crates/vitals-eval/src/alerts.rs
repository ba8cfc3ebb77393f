//! Threshold alerts.

use tracing::debug;

use vitals_core::{AlertEvent, MetricSnapshot, Signal, ThresholdConfig};

/// Compares snapshots against a threshold table.
#[derive(Debug, Clone, Default)]
pub struct AlertEvaluator {
    thresholds: ThresholdConfig,
}

impl AlertEvaluator {
    pub fn new(thresholds: ThresholdConfig) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    /// One alert per headline signal that is set and strictly above its
    /// threshold, in canonical order, followed by one alert per render
    /// entry above the shared render bound.
    pub fn evaluate(&self, snapshot: &MetricSnapshot) -> Vec<AlertEvent> {
        let mut alerts = Vec::new();

        for signal in Signal::HEADLINE {
            let threshold = self.thresholds.for_signal(signal);
            match snapshot.get(signal) {
                Some(observed) if observed > threshold => alerts.push(AlertEvent {
                    signal,
                    observed,
                    threshold,
                    component: None,
                }),
                _ => {}
            }
        }

        let render_threshold = self.thresholds.component_render_time;
        for render in &snapshot.component_render_times {
            if render.render_time > render_threshold {
                alerts.push(AlertEvent {
                    signal: Signal::ComponentRender,
                    observed: render.render_time,
                    threshold: render_threshold,
                    component: Some(render.name.clone()),
                });
            }
        }

        debug!(alerts = alerts.len(), "snapshot evaluated");
        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitals_core::{ComponentRender, ThresholdOverrides};

    fn render(name: &str, ms: f64) -> ComponentRender {
        ComponentRender {
            name: name.to_string(),
            render_time: ms,
        }
    }

    fn fcp_threshold(value: f64) -> ThresholdConfig {
        ThresholdConfig::default().merged(&ThresholdOverrides {
            fcp: Some(value),
            ..Default::default()
        })
    }

    #[test]
    fn empty_snapshot_raises_nothing() {
        let evaluator = AlertEvaluator::default();
        assert!(evaluator.evaluate(&MetricSnapshot::default()).is_empty());
    }

    #[test]
    fn fcp_over_custom_threshold_raises_exactly_one() {
        let snapshot = MetricSnapshot {
            first_contentful_paint: Some(1000.0),
            ..Default::default()
        };
        let alerts = AlertEvaluator::new(fcp_threshold(500.0)).evaluate(&snapshot);

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].signal, Signal::FirstContentfulPaint);
        assert_eq!(alerts[0].observed, 1000.0);
        assert_eq!(alerts[0].threshold, 500.0);
    }

    #[test]
    fn unset_signal_never_alerts() {
        let alerts = AlertEvaluator::new(fcp_threshold(0.0)).evaluate(&MetricSnapshot::default());
        assert!(alerts.is_empty());
    }

    #[test]
    fn value_equal_to_threshold_does_not_alert() {
        let snapshot = MetricSnapshot {
            largest_contentful_paint: Some(2500.0),
            time_to_first_byte: Some(800.0),
            ..Default::default()
        };
        assert!(AlertEvaluator::default().evaluate(&snapshot).is_empty());
    }

    #[test]
    fn alerts_follow_canonical_order() {
        let snapshot = MetricSnapshot {
            first_contentful_paint: Some(2100.0),
            largest_contentful_paint: Some(2600.0),
            time_to_interactive: Some(3500.0),
            cumulative_layout_shift: 0.3,
            first_input_delay: Some(150.0),
            interaction_to_next_paint: Some(260.0),
            time_to_first_byte: Some(900.0),
            component_render_times: vec![render("Grid", 700.0)],
        };
        let signals: Vec<Signal> = AlertEvaluator::default()
            .evaluate(&snapshot)
            .into_iter()
            .map(|a| a.signal)
            .collect();

        assert_eq!(
            signals,
            vec![
                Signal::FirstContentfulPaint,
                Signal::LargestContentfulPaint,
                Signal::TimeToInteractive,
                Signal::CumulativeLayoutShift,
                Signal::FirstInputDelay,
                Signal::InteractionToNextPaint,
                Signal::TimeToFirstByte,
                Signal::ComponentRender,
            ]
        );
    }

    #[test]
    fn one_render_alert_per_offending_entry() {
        let snapshot = MetricSnapshot {
            component_render_times: vec![
                render("Grid", 650.0),
                render("Nav", 20.0),
                render("Grid", 900.0),
                render("Chart", 500.0),
            ],
            ..Default::default()
        };
        let alerts = AlertEvaluator::default().evaluate(&snapshot);

        assert_eq!(alerts.len(), 2);
        assert!(alerts.iter().all(|a| a.component.as_deref() == Some("Grid")));
        assert_eq!(alerts[0].observed, 650.0);
        assert_eq!(alerts[1].observed, 900.0);
    }
}
