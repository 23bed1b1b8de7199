//! `info` command implementation.

use serde::Serialize;
use tracing::info;

use contracts::SafeRouteConfig;

use super::print_json;
use crate::cli::InfoArgs;
use crate::error::{CliError, Result};

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    alert: AlertInfo,
    store: StoreInfo,
    users: Vec<UserInfo>,
}

#[derive(Serialize)]
struct AlertInfo {
    radius_km: f64,
    earth_radius_km: f64,
}

#[derive(Serialize)]
struct StoreInfo {
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
}

#[derive(Serialize)]
struct UserInfo {
    id: i64,
    username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<[f64; 2]>,
    contact_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    contacts: Vec<String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()));
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .map_err(|e| CliError::config(format!("{}: {e}", args.config.display())))?;

    let info = build_config_info(&config, args);
    if args.json {
        print_json(&info)?;
    } else {
        print_config_info(&info);
    }

    Ok(())
}

fn build_config_info(config: &SafeRouteConfig, args: &InfoArgs) -> ConfigInfo {
    let username = |id: i64| {
        config
            .users
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.username.clone())
            .unwrap_or_else(|| format!("#{id}"))
    };

    let users = config
        .users
        .iter()
        .map(|u| UserInfo {
            id: u.id,
            username: u.username.clone(),
            location: u.last_known().map(|p| [p.lat, p.lon]),
            contact_count: u.contacts.len(),
            contacts: if args.contacts {
                u.contacts.iter().map(|id| username(*id)).collect()
            } else {
                Vec::new()
            },
        })
        .collect();

    ConfigInfo {
        version: format!("{:?}", config.version),
        alert: AlertInfo {
            radius_km: config.alert.radius_km,
            earth_radius_km: config.alert.earth_radius_km,
        },
        store: StoreInfo {
            kind: format!("{:?}", config.store.kind),
            path: config.store.path.as_ref().map(|p| p.display().to_string()),
        },
        users,
    }
}

fn print_config_info(info: &ConfigInfo) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  Safe Route Configuration                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("🚨 Alert Policy");
    println!("   ├─ Version: {}", info.version);
    println!("   ├─ Radius: {} km", info.alert.radius_km);
    println!("   └─ Earth radius: {} km", info.alert.earth_radius_km);

    println!("\n💾 Store");
    match &info.store.path {
        Some(path) => {
            println!("   ├─ Kind: {}", info.store.kind);
            println!("   └─ Path: {}", path);
        }
        None => println!("   └─ Kind: {}", info.store.kind),
    }

    println!("\n👥 Users ({})", info.users.len());
    for (i, user) in info.users.iter().enumerate() {
        let is_last = i == info.users.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };

        let location = match user.location {
            Some([lat, lon]) => format!("({:.4}, {:.4})", lat, lon),
            None => "(no location)".to_string(),
        };
        println!("   {} {} #{} {}", prefix, user.username, user.id, location);

        if user.contacts.is_empty() {
            println!("   {}  └─ {} contacts", child_prefix, user.contact_count);
        } else {
            println!("   {}  └─ contacts: {}", child_prefix, user.contacts.join(", "));
        }
    }

    println!();
}
