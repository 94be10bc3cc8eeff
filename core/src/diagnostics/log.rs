use log::{debug, info, warn};

use crate::fleet_interface::VehicleId;
use crate::prelude::SourceError;

/// Log lines emitted by the map context and the sync loop.
pub struct SyncLog;

impl SyncLog {
    pub fn new() -> Self {
        Self
    }

    pub fn populated(&self, tracked: usize, skipped: usize) {
        info!("population finished: {} tracked, {} skipped", tracked, skipped);
    }

    pub fn tick(&self, tick: u64, requests: usize) {
        debug!("tick {}: {} telemetry requests issued", tick, requests);
    }

    pub fn fetch_failed(&self, vehicle: &VehicleId, err: &SourceError) {
        warn!("telemetry for {} unavailable, keeping last sample: {}", vehicle, err);
    }

    pub fn stale(&self, vehicle: &VehicleId, seq: u64, applied: u64) {
        debug!(
            "dropping response #{} for {} (already applied #{})",
            seq, vehicle, applied
        );
    }

    pub fn focused(&self, vehicle: &VehicleId) {
        info!("focused vehicle {}", vehicle);
    }

    pub fn selection_missed(&self, query: &str, reason: &str) {
        warn!("selection of {:?} ignored: {}", query, reason);
    }
}

impl Default for SyncLog {
    fn default() -> Self {
        Self::new()
    }
}
