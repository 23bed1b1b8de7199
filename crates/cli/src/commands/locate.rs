//! `locate` command implementation.

use std::path::Path;

use config_loader::{ConfigFormat, ConfigLoader};
use contracts::{GeoPoint, SafeRouteConfig, UserId};
use dispatcher::DispatcherError;
use tracing::info;

use super::open_dispatcher;
use crate::cli::LocateArgs;
use crate::error::{CliError, Result};

/// Execute the `locate` command
pub async fn run_locate(args: &LocateArgs) -> Result<()> {
    let (_, mut dispatcher) = open_dispatcher(&args.config)?;

    let point = GeoPoint::new(args.lat, args.lon).map_err(DispatcherError::from)?;
    dispatcher.update_location(args.user, point).await?;

    // Reload so command-line overrides never end up in the file
    let mut config = ConfigLoader::load_from_path(&args.config.config)
        .map_err(|e| CliError::config(e.to_string()))?;
    apply_location(&mut config, args.user, point);
    write_config(&args.config.config, &config)?;
    info!(path = %args.config.config.display(), "Configuration updated");

    println!(
        "✓ User {} is now at ({:.4}, {:.4})",
        args.user, point.lat, point.lon
    );
    Ok(())
}

fn apply_location(config: &mut SafeRouteConfig, user_id: UserId, point: GeoPoint) {
    if let Some(seed) = config.users.iter_mut().find(|u| u.id == user_id) {
        seed.lat = Some(point.lat);
        seed.lon = Some(point.lon);
    }
}

fn write_config(path: &Path, config: &SafeRouteConfig) -> Result<()> {
    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ConfigFormat::from_extension)
        .unwrap_or(ConfigFormat::Toml);

    let content = match format {
        ConfigFormat::Toml => ConfigLoader::to_toml(config),
        ConfigFormat::Json => ConfigLoader::to_json(config),
    }
    .map_err(|e| CliError::config(e.to_string()))?;

    std::fs::write(path, content)?;
    Ok(())
}
