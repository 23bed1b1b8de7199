//! # Safe Route CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 配置加载与验证
//! - 紧急求助告警分发与收件箱读取
//! - 告警演练 (drill) 与统计摘要

mod cli;
mod commands;
mod drill;
mod error;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Cli, Commands};
use commands::{
    run_drill, run_events, run_inbox, run_info, run_locate, run_notify, run_panic, run_resolve,
    run_validate,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }

    info!(version = env!("CARGO_PKG_VERSION"), "Safe Route CLI starting");

    let result = match &cli.command {
        Commands::Panic(args) => run_panic(args).await,
        Commands::Inbox(args) => run_inbox(args).await,
        Commands::Events(args) => run_events(args).await,
        Commands::Notify(args) => run_notify(args).await,
        Commands::Resolve(args) => run_resolve(args).await,
        Commands::Locate(args) => run_locate(args).await,
        Commands::Drill(args) => run_drill(args).await,
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

/// Initialize logging based on CLI options
fn init_logging(cli: &Cli) -> Result<()> {
    let default_log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    observability::init_with_config(observability::ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: None,
        default_log_level: default_log_level.to_string(),
    })
}
