//! `drill` command implementation.

use tracing::{info, warn};

use super::open_dispatcher;
use crate::cli::DrillArgs;
use crate::drill::{Drill, DrillConfig};
use crate::error::Result;

/// Execute the `drill` command
pub async fn run_drill(args: &DrillArgs) -> Result<()> {
    let (config, mut dispatcher) = open_dispatcher(&args.config)?;

    if config.users.is_empty() {
        warn!("No users configured - every drill event will fail");
    }

    let drill = Drill::new(DrillConfig {
        events_path: args.events.clone(),
        fail_fast: args.fail_fast,
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
        json: args.json,
    });

    info!(events = %args.events.display(), "Starting drill...");
    let stats = drill.run(&mut dispatcher).await?;

    if !args.json {
        stats.print_summary();
    }
    Ok(())
}
