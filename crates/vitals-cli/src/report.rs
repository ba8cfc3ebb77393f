//! Human-readable rendering of a run report.

use std::fmt::Write;

use vitals_core::Signal;
use vitals_tracker::RunReport;

pub fn format_report(report: &RunReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Metrics");
    for signal in Signal::HEADLINE {
        let value = match report.snapshot.get(signal) {
            Some(v) if signal == Signal::CumulativeLayoutShift => format!("{v:.3}"),
            Some(v) => format!("{v:.0}{}", signal.unit()),
            None => "unset".to_string(),
        };
        let _ = writeln!(out, "  {:<6} {value}", signal.to_string());
    }

    let renders = &report.snapshot.component_render_times;
    if !renders.is_empty() {
        let _ = writeln!(out, "\nComponent renders");
        for render in renders {
            let _ = writeln!(out, "  {:<20} {:.0} ms", render.name, render.render_time);
        }
    }

    if !report.timed_out.is_empty() {
        let stalled: Vec<String> = report.timed_out.iter().map(|s| s.to_string()).collect();
        let _ = writeln!(out, "\nTimed out: {}", stalled.join(", "));
    }

    if !report.alerts.is_empty() {
        let _ = writeln!(out, "\nAlerts ({})", report.alerts.len());
        for alert in &report.alerts {
            let _ = writeln!(out, "  ! {alert}");
        }
    }

    if let Some(feedback) = &report.feedback {
        let _ = writeln!(out, "\n{feedback}");
    }

    out
}
