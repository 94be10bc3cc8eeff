//! Entity synchronization core for the fleet map client.
//!
//! Keeps a set of tracked vehicles consistent with periodically refreshed
//! telemetry, derives marker position and heading from successive samples,
//! and keeps the world and overlay layers rendering in lock-step.

pub mod diagnostics;
pub mod fleet_interface;
pub mod math;
pub mod prelude;
pub mod scene;
pub mod sync;

#[cfg(test)]
mod testing;

pub use fleet_interface::{TelemetrySample, TelemetrySource, Vehicle, VehicleId};
pub use prelude::{MapConfig, ResponseOrdering, SourceError, StartupError};
pub use sync::{Command, FleetMap, SyncLoop};
