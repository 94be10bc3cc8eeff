use std::future::Future;

use crate::fleet_interface::vehicle::{TelemetrySample, Vehicle, VehicleId};
use crate::prelude::SourceResult;

/// Request/response access to the fleet telemetry service.
///
/// Every call is one independent round trip. Implementations hold no per-call
/// state, so many calls may be in flight at once.
pub trait TelemetrySource: Send + Sync + 'static {
    fn list_vehicles(&self) -> impl Future<Output = SourceResult<Vec<Vehicle>>> + Send;

    fn vehicle(&self, id: &VehicleId) -> impl Future<Output = SourceResult<Vehicle>> + Send;

    fn telemetry(
        &self,
        id: &VehicleId,
    ) -> impl Future<Output = SourceResult<TelemetrySample>> + Send;
}

/// Why a telemetry request was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    /// Initial fetch for the vehicle at `slot` in the population list.
    Populate { slot: usize },
    /// Periodic refresh from the sync loop.
    Poll,
    /// On-demand refresh for a user selection.
    Select { generation: u64 },
}

/// A round trip the map context wants performed.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Telemetry {
        vehicle: VehicleId,
        seq: u64,
        purpose: Purpose,
    },
    /// Search-by-id: vehicle record first, then its telemetry.
    Lookup {
        vehicle: VehicleId,
        seq: u64,
        generation: u64,
    },
}

/// The completed form of a [`Request`], carrying its outcome.
#[derive(Debug, Clone)]
pub enum Response {
    Telemetry {
        vehicle: VehicleId,
        seq: u64,
        purpose: Purpose,
        result: SourceResult<TelemetrySample>,
    },
    Lookup {
        vehicle: VehicleId,
        seq: u64,
        generation: u64,
        result: SourceResult<(Vehicle, TelemetrySample)>,
    },
}

/// Performs one request against `source`. Errors are carried in the response.
pub async fn fetch<S: TelemetrySource>(source: &S, request: Request) -> Response {
    match request {
        Request::Telemetry {
            vehicle,
            seq,
            purpose,
        } => {
            let result = source.telemetry(&vehicle).await;
            Response::Telemetry {
                vehicle,
                seq,
                purpose,
                result,
            }
        }
        Request::Lookup {
            vehicle,
            seq,
            generation,
        } => {
            let result = match source.vehicle(&vehicle).await {
                Ok(found) => source
                    .telemetry(&found.id)
                    .await
                    .map(|sample| (found, sample)),
                Err(err) => Err(err),
            };
            Response::Lookup {
                vehicle,
                seq,
                generation,
                result,
            }
        }
    }
}
