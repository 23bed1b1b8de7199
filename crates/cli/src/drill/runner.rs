//! Drill runner - replays recorded distress events through the dispatcher.

use std::path::{Path, PathBuf};
use std::time::Instant;

use contracts::DistressEvent;
use serde::Serialize;
use tracing::{info, warn};

use dispatcher::{DispatchReport, ErrorKind};

use super::DrillStats;
use crate::commands::CliDispatcher;
use crate::error::{CliError, Result};

/// Drill configuration
#[derive(Debug, Clone)]
pub struct DrillConfig {
    /// JSON array of distress events
    pub events_path: PathBuf,

    /// Stop at the first failed dispatch
    pub fail_fast: bool,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,

    /// Print one JSON line per event
    pub json: bool,
}

/// One line of `--json` output
#[derive(Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
enum DrillLine<'a> {
    Dispatched {
        index: usize,
        #[serde(flatten)]
        report: &'a DispatchReport,
    },
    Failed {
        index: usize,
        user_id: i64,
        kind: &'static str,
        error: String,
    },
}

/// Replays a drill file
pub struct Drill {
    config: DrillConfig,
}

impl Drill {
    pub fn new(config: DrillConfig) -> Self {
        Self { config }
    }

    /// Read the drill file
    pub fn load_events(path: &Path) -> Result<Vec<DistressEvent>> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::drill_input(path.display().to_string(), e.to_string()))?;
        serde_json::from_str(&content)
            .map_err(|e| CliError::drill_input(path.display().to_string(), e.to_string()))
    }

    /// Dispatch every event in file order
    pub async fn run(self, dispatcher: &mut CliDispatcher) -> Result<DrillStats> {
        let start_time = Instant::now();

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let events = Self::load_events(&self.config.events_path)?;
        info!(
            events = events.len(),
            path = %self.config.events_path.display(),
            "Drill events loaded"
        );

        let mut stats = DrillStats {
            events_loaded: events.len(),
            ..Default::default()
        };

        for (index, event) in events.into_iter().enumerate() {
            let user_id = event.user_id;
            match dispatcher.dispatch(event).await {
                Ok(report) => {
                    stats.dispatched += 1;
                    observability::record_dispatch(
                        report.tier.as_str(),
                        report.notified_count,
                        report.nearest_km,
                    );
                    stats.alert_metrics.update(
                        report.tier.as_str(),
                        report.notified_count,
                        report.nearest_km,
                    );
                    self.emit(&DrillLine::Dispatched {
                        index,
                        report: &report,
                    });
                }
                Err(e) => {
                    stats.failed += 1;
                    let kind = e.kind();
                    observability::record_dispatch_failure(kind.as_str());
                    stats.alert_metrics.record_failure(kind.as_str());
                    warn!(index, user_id, error = %e, "Drill event failed");
                    self.emit(&DrillLine::Failed {
                        index,
                        user_id,
                        kind: kind.as_str(),
                        error: e.to_string(),
                    });

                    if self.config.fail_fast || kind == ErrorKind::Persistence {
                        warn!(index, "Stopping drill");
                        break;
                    }
                }
            }
        }

        stats.snapshot = dispatcher.snapshot();
        stats.duration = start_time.elapsed();

        info!(
            dispatched = stats.dispatched,
            failed = stats.failed,
            duration_secs = stats.duration.as_secs_f64(),
            "Drill complete"
        );

        Ok(stats)
    }

    fn emit(&self, line: &DrillLine<'_>) {
        if !self.config.json {
            return;
        }
        match serde_json::to_string(line) {
            Ok(json) => println!("{}", json),
            Err(e) => warn!(error = %e, "Failed to serialize drill line"),
        }
    }
}
