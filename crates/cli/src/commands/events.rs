//! `events`, `notify` and `resolve` command implementations.

use contracts::{EventRecord, EventStatus};
use serde::Serialize;
use tracing::info;

use super::{open_persistent_dispatcher, print_json};
use crate::cli::{EventsArgs, NotifyArgs, ResolveArgs};
use crate::error::Result;

/// Event row for JSON output
#[derive(Serialize)]
struct EventRow {
    id: i64,
    user_id: i64,
    lat: f64,
    lon: f64,
    triggered_at: String,
    status: EventStatus,
}

impl From<&EventRecord> for EventRow {
    fn from(record: &EventRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.event.user_id,
            lat: record.event.latitude,
            lon: record.event.longitude,
            triggered_at: record.event.triggered_at.to_rfc3339(),
            status: record.status,
        }
    }
}

/// Execute the `events` command
pub async fn run_events(args: &EventsArgs) -> Result<()> {
    let (_, dispatcher) = open_persistent_dispatcher(&args.config, "events")?;
    let records = dispatcher.events(args.user).await?;
    let rows: Vec<EventRow> = records.iter().map(EventRow::from).collect();

    if args.json {
        return print_json(&rows);
    }

    println!("🚨 Panic events ({})", rows.len());
    for (i, row) in rows.iter().enumerate() {
        let prefix = if i == rows.len() - 1 { "└─" } else { "├─" };
        println!(
            "   {} #{} user {} at ({:.4}, {:.4}) {} [{:?}]",
            prefix, row.id, row.user_id, row.lat, row.lon, row.triggered_at, row.status
        );
    }
    Ok(())
}

/// Execute the `notify` command
pub async fn run_notify(args: &NotifyArgs) -> Result<()> {
    let (_, mut dispatcher) = open_persistent_dispatcher(&args.config, "notify")?;
    let id = dispatcher
        .notify_manual(args.event, args.sender, args.recipient, &args.message)
        .await?;

    info!(notification_id = id, "Notify command finished");
    println!("✓ Notification #{} sent to user {}", id, args.recipient);
    Ok(())
}

/// Execute the `resolve` command
pub async fn run_resolve(args: &ResolveArgs) -> Result<()> {
    let (_, mut dispatcher) = open_persistent_dispatcher(&args.config, "resolve")?;
    let record = dispatcher.resolve_event(args.event).await?;

    println!("✓ Panic event #{} is {:?}", record.id, record.status);
    Ok(())
}
