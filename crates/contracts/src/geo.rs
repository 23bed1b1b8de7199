//! Geographic points and great-circle distance.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::ContractError;

/// Mean earth radius used by the haversine distance (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// WGS84 latitude / longitude pair, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct GeoPoint {
    /// Latitude, [-90, 90]
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,

    /// Longitude, [-180, 180]
    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: f64,
}

impl GeoPoint {
    /// Create a validated point
    ///
    /// # Errors
    /// `Validation` when a coordinate is non-finite or out of range.
    pub fn new(lat: f64, lon: f64) -> Result<Self, ContractError> {
        let point = Self { lat, lon };
        point.check()?;
        Ok(point)
    }

    /// Validate ranges; NaN slips through range checks so it is rejected first.
    pub fn check(&self) -> Result<(), ContractError> {
        if !self.lat.is_finite() {
            return Err(ContractError::validation("lat", "latitude must be finite"));
        }
        if !self.lon.is_finite() {
            return Err(ContractError::validation("lon", "longitude must be finite"));
        }
        self.validate()?;
        Ok(())
    }

    /// Great-circle distance to `other` in km, on the default earth radius
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        haversine_km(*self, *other, EARTH_RADIUS_KM)
    }
}

/// Haversine distance between two points on a sphere of `radius_km`.
pub fn haversine_km(a: GeoPoint, b: GeoPoint, radius_km: f64) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    // rounding can push h past 1.0 near antipodes
    let h = h.clamp(0.0, 1.0);
    2.0 * radius_km * h.sqrt().atan2((1.0 - h).sqrt())
}
