pub mod source;
pub mod vehicle;

pub use source::{fetch, Purpose, Request, Response, TelemetrySource};
pub use vehicle::{TelemetrySample, Vehicle, VehicleId};
