//! # Contracts
//!
//! Frozen interface contracts, defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Wall clock UTC (`chrono::DateTime<Utc>`) for event trigger and notification times
//! - Identifiers are relational row ids (`i64`)

mod config;
mod directory;
mod error;
mod event;
mod geo;
mod notification;
mod store;

pub use config::*;
pub use directory::{ContactDirectory, LocalContactDirectory, UserProfile};
pub use error::*;
pub use event::*;
pub use geo::{haversine_km, GeoPoint, EARTH_RADIUS_KM};
pub use notification::*;
pub use store::{AlertStore, LocalAlertStore};

/// User row identifier
pub type UserId = i64;

/// Panic event row identifier
pub type EventId = i64;

/// Notification row identifier
pub type NotificationId = i64;
