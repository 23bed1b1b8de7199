//! `inbox` command implementation.

use super::{open_persistent_dispatcher, print_json};
use crate::cli::InboxArgs;
use crate::error::Result;

/// Execute the `inbox` command
pub async fn run_inbox(args: &InboxArgs) -> Result<()> {
    let (_, mut dispatcher) = open_persistent_dispatcher(&args.config, "inbox")?;

    let entries = dispatcher.list_unread(args.user).await?;
    observability::record_inbox_read(entries.len());

    if args.json {
        return print_json(&entries);
    }

    if entries.is_empty() {
        println!("No unread notifications for user {}", args.user);
        return Ok(());
    }

    println!("📬 Unread notifications ({})", entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let prefix = if i == entries.len() - 1 { "└─" } else { "├─" };
        println!(
            "   {} [{}] {}",
            prefix,
            entry.time.format("%Y-%m-%d %H:%M:%S"),
            entry.message
        );
    }
    Ok(())
}
