//! SafeRouteConfig - Config Loader output
//!
//! Describes the alert policy, the alert store backend and the seeded contact directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{GeoPoint, UserId, EARTH_RADIUS_KM};

/// Default alert radius (km)
pub const ALERT_RADIUS_KM: f64 = 5.0;

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SafeRouteConfig {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Alert fan-out policy
    #[serde(default)]
    pub alert: AlertPolicy,

    /// Alert store backend
    #[serde(default)]
    pub store: StoreConfig,

    /// Seeded contact directory
    #[serde(default)]
    pub users: Vec<UserSeed>,
}

/// Alert fan-out policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertPolicy {
    /// Eligibility radius around the trigger (km)
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,

    /// Sphere radius used by the haversine distance (km)
    #[serde(default = "default_earth_radius_km")]
    pub earth_radius_km: f64,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            radius_km: ALERT_RADIUS_KM,
            earth_radius_km: EARTH_RADIUS_KM,
        }
    }
}

fn default_radius_km() -> f64 {
    ALERT_RADIUS_KM
}

fn default_earth_radius_km() -> f64 {
    EARTH_RADIUS_KM
}

/// Alert store backend selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend type
    #[serde(default)]
    pub kind: StoreKind,

    /// Document path, required for `file`
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Alert store backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// Process-local, lost on exit
    #[default]
    Memory,
    /// JSON document on disk
    File,
}

/// One directory user with outgoing contact edges
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSeed {
    pub id: UserId,

    pub username: String,

    /// Last known latitude
    #[serde(default)]
    pub lat: Option<f64>,

    /// Last known longitude
    #[serde(default)]
    pub lon: Option<f64>,

    /// Contact user ids
    #[serde(default)]
    pub contacts: Vec<UserId>,
}

impl UserSeed {
    /// Last known position, present only when both coordinates are set
    pub fn last_known(&self) -> Option<GeoPoint> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(GeoPoint { lat, lon }),
            _ => None,
        }
    }
}
