//! Drill execution module.

mod runner;
mod stats;

pub use runner::{Drill, DrillConfig};
pub use stats::DrillStats;
