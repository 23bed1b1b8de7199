//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Safe Route - proximity panic alerts for trusted contacts
#[derive(Parser, Debug)]
#[command(
    name = "safe-route",
    author,
    version,
    about = "Proximity panic alert dispatcher",
    long_about = "Raises panic alerts for a user in distress.\n\n\
                  Direct contacts within the alert radius are notified first; when none \n\
                  are in range, contacts of those contacts are notified instead. Alerts \n\
                  and their notifications are recorded in one transaction."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "SAFE_ROUTE_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "SAFE_ROUTE_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Raise a panic alert for a user at a position
    Panic(PanicArgs),

    /// Show and consume a user's unread notifications
    Inbox(InboxArgs),

    /// List recorded panic events
    Events(EventsArgs),

    /// Send a manual notification tied to an event
    Notify(NotifyArgs),

    /// Mark a panic event resolved
    Resolve(ResolveArgs),

    /// Update a user's last known position in the configuration file
    Locate(LocateArgs),

    /// Replay a file of distress events and summarise the outcome
    Drill(DrillArgs),

    /// Validate configuration file without dispatching
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Configuration source shared by every command
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "safe-route.toml",
        env = "SAFE_ROUTE_CONFIG"
    )]
    pub config: PathBuf,

    /// Override the alert store file from configuration (implies a file store)
    #[arg(long, env = "SAFE_ROUTE_STORE")]
    pub store: Option<PathBuf>,

    /// Override the alert radius in km
    #[arg(long, env = "SAFE_ROUTE_RADIUS_KM")]
    pub radius_km: Option<f64>,
}

/// Arguments for the `panic` command
#[derive(Parser, Debug, Clone)]
pub struct PanicArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Triggering user id
    #[arg(short, long)]
    pub user: i64,

    /// Latitude of the distress position
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude of the distress position
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// Output the dispatch report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `inbox` command
#[derive(Parser, Debug, Clone)]
pub struct InboxArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// User whose inbox to read
    #[arg(short, long)]
    pub user: i64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `events` command
#[derive(Parser, Debug, Clone)]
pub struct EventsArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Only events raised by this user
    #[arg(short, long)]
    pub user: Option<i64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `notify` command
#[derive(Parser, Debug, Clone)]
pub struct NotifyArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Event the notification belongs to
    #[arg(short, long)]
    pub event: i64,

    /// Sending user id
    #[arg(long)]
    pub sender: i64,

    /// Receiving user id
    #[arg(long)]
    pub recipient: i64,

    /// Notification text
    #[arg(short, long)]
    pub message: String,
}

/// Arguments for the `resolve` command
#[derive(Parser, Debug, Clone)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Event to resolve
    #[arg(short, long)]
    pub event: i64,
}

/// Arguments for the `locate` command
#[derive(Parser, Debug, Clone)]
pub struct LocateArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// User to move
    #[arg(short, long)]
    pub user: i64,

    /// New latitude
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// New longitude
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,
}

/// Arguments for the `drill` command
#[derive(Parser, Debug, Clone)]
pub struct DrillArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// JSON file holding an array of distress events
    #[arg(short, long, env = "SAFE_ROUTE_DRILL_EVENTS")]
    pub events: PathBuf,

    /// Stop at the first failed dispatch
    #[arg(long)]
    pub fail_fast: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "SAFE_ROUTE_METRICS_PORT")]
    pub metrics_port: u16,

    /// Output per-event reports as JSON lines
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "safe-route.toml", env = "SAFE_ROUTE_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "safe-route.toml", env = "SAFE_ROUTE_CONFIG")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// List each user's contacts
    #[arg(long)]
    pub contacts: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
