//! `panic` command implementation.

use contracts::DistressEvent;
use dispatcher::{DispatchReport, DispatcherError};
use tracing::info;

use super::{open_dispatcher, print_json};
use crate::cli::PanicArgs;
use crate::error::Result;

/// Execute the `panic` command
pub async fn run_panic(args: &PanicArgs) -> Result<()> {
    let (_, mut dispatcher) = open_dispatcher(&args.config)?;

    let event = DistressEvent::now(args.user, args.lat, args.lon).map_err(DispatcherError::from)?;

    let report = match dispatcher.dispatch(event).await {
        Ok(report) => report,
        Err(e) => {
            observability::record_dispatch_failure(e.kind().as_str());
            return Err(e.into());
        }
    };
    observability::record_dispatch(report.tier.as_str(), report.notified_count, report.nearest_km);

    info!(event_id = report.event_id, notified = report.notified_count, "Panic command finished");

    if args.json {
        print_json(&report)?;
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &DispatchReport) {
    println!("✓ {} (event #{})", report.message, report.event_id);
    println!("  Notified: {}", report.notified_count);
    println!("  Tier: {}", report.tier.as_str());
    if !report.recipients.is_empty() {
        let ids: Vec<String> = report.recipients.iter().map(|id| id.to_string()).collect();
        println!("  Recipients: {}", ids.join(", "));
    }
    if let Some(km) = report.nearest_km {
        println!("  Nearest: {:.2} km", km);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::{config_args, write_config};

    #[tokio::test]
    async fn test_panic_persists_to_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("alerts.json");
        let args = PanicArgs {
            config: config_args(write_config(dir.path()), Some(store.clone())),
            user: 1,
            lat: 23.8103,
            lon: 90.4125,
            json: true,
        };

        run_panic(&args).await.unwrap();
        let document = std::fs::read_to_string(&store).unwrap();
        assert!(document.contains("Your friend nadia"));
    }

    #[tokio::test]
    async fn test_unknown_user_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let args = PanicArgs {
            config: config_args(write_config(dir.path()), None),
            user: 42,
            lat: 23.8103,
            lon: 90.4125,
            json: false,
        };

        let err = run_panic(&args).await.unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[tokio::test]
    async fn test_out_of_range_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let args = PanicArgs {
            config: config_args(write_config(dir.path()), None),
            user: 1,
            lat: 123.0,
            lon: 90.4125,
            json: false,
        };

        let err = run_panic(&args).await.unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
