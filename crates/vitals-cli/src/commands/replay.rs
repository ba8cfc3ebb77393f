use std::path::Path;
use std::sync::Arc;

use tracing::info;

use vitals_core::TrackerConfig;
use vitals_sources::HeadlessPage;
use vitals_tracker::{PerformanceTracker, RunReport};

use crate::report::format_report;
use crate::scenario::Scenario;

pub async fn replay(scenario: &Path, config: Option<&Path>, format: &str) -> anyhow::Result<()> {
    let scenario = Scenario::from_file(scenario)?;
    let config = match config {
        Some(path) => TrackerConfig::from_file(path)?,
        None => TrackerConfig::default(),
    };

    let report = run_scenario(&scenario, &config).await?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            print!("{}", format_report(&report));
        }
    }

    Ok(())
}

/// Drive one scenario through a fresh tracker.
pub async fn run_scenario(scenario: &Scenario, config: &TrackerConfig) -> anyhow::Result<RunReport> {
    let tracker = if scenario.headless {
        info!("replaying headless scenario");
        PerformanceTracker::from_config(Arc::new(HeadlessPage), config)?
    } else {
        let page = scenario.build_page();
        let tracker = PerformanceTracker::from_config(page.clone(), config)?;
        scenario
            .replay_interactions(&tracker, &page, tracker.collect_timeout())
            .await;
        tracker
    };

    for render in &scenario.renders {
        tracker.track_component_render(&render.name, render.render_time);
    }

    let report = tracker.run(config).await;
    tracker.shutdown();
    Ok(report)
}
