//! Command implementations.

mod drill;
mod events;
mod inbox;
mod info;
mod locate;
mod panic;
mod validate;

pub use drill::run_drill;
pub use events::{run_events, run_notify, run_resolve};
pub use inbox::run_inbox;
pub use info::run_info;
pub use locate::run_locate;
pub use panic::run_panic;
pub use validate::run_validate;

use contracts::{SafeRouteConfig, StoreKind};
use dispatcher::{ConfiguredStore, MemoryDirectory, ProximityDispatcher};
use tracing::info;

use crate::cli::ConfigArgs;
use crate::error::{CliError, Result};

pub(crate) type CliDispatcher = ProximityDispatcher<MemoryDirectory, ConfiguredStore>;

/// Load configuration and apply command-line overrides
pub(crate) fn load_config(args: &ConfigArgs) -> Result<SafeRouteConfig> {
    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()));
    }

    let mut config = config_loader::ConfigLoader::load_from_path(&args.config)
        .map_err(|e| CliError::config(e.to_string()))?;

    if let Some(ref path) = args.store {
        info!(path = %path.display(), "Overriding alert store from CLI");
        config.store.kind = StoreKind::File;
        config.store.path = Some(path.clone());
    }
    if let Some(radius_km) = args.radius_km {
        info!(radius_km, "Overriding alert radius from CLI");
        config.alert.radius_km = radius_km;
    }
    if args.store.is_some() || args.radius_km.is_some() {
        config_loader::ConfigLoader::validate(&config)
            .map_err(|e| CliError::config(e.to_string()))?;
    }

    Ok(config)
}

/// Build a dispatcher over the configured directory and store
pub(crate) fn open_dispatcher(args: &ConfigArgs) -> Result<(SafeRouteConfig, CliDispatcher)> {
    open_with(load_config(args)?)
}

fn open_with(config: SafeRouteConfig) -> Result<(SafeRouteConfig, CliDispatcher)> {
    let dispatcher = dispatcher::create_dispatcher(config.clone())?;

    info!(
        users = config.users.len(),
        store = ?config.store.kind,
        radius_km = config.alert.radius_km,
        "Dispatcher ready"
    );
    Ok((config, dispatcher))
}

/// Build a dispatcher whose alert state outlives this process
///
/// Commands that read or amend earlier alerts need a file store; a memory
/// store would start empty on every invocation.
pub(crate) fn open_persistent_dispatcher(
    args: &ConfigArgs,
    command: &str,
) -> Result<(SafeRouteConfig, CliDispatcher)> {
    let config = load_config(args)?;
    if config.store.kind == StoreKind::Memory {
        return Err(CliError::config(format!(
            "`{command}` needs a file store: set [store] kind = \"file\" or pass --store"
        )));
    }
    open_with(config)
}

/// Print `value` as pretty JSON
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    println!("{}", json);
    Ok(())
}
