use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::math::projector::{HEADING_LENGTH_PER_SPEED, SCENE_UNITS_PER_DEGREE};

/// How completed telemetry responses are applied when polls overlap.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResponseOrdering {
    /// Whichever response completes last overwrites the entity's sample.
    #[default]
    LastCompletedWins,
    /// Responses issued before the currently applied one are dropped.
    RejectOutOfOrder,
}

/// Shared configuration for the map context and the sync loop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MapConfig {
    pub poll_interval_ms: u64,
    pub initial_delay_ms: u64,
    /// Scene units per degree of latitude/longitude.
    pub units_per_degree: f64,
    /// Heading arrow length per unit of reported speed.
    pub heading_length_per_speed: f64,
    /// Camera height above a marker after search-by-id recenters on it.
    pub focus_height: f64,
    pub ordering: ResponseOrdering,
    pub marker_seed: Option<u64>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2000,
            initial_delay_ms: 5000,
            units_per_degree: SCENE_UNITS_PER_DEGREE,
            heading_length_per_speed: HEADING_LENGTH_PER_SPEED,
            focus_height: 10.0,
            ordering: ResponseOrdering::LastCompletedWins,
            marker_seed: None,
        }
    }
}

impl MapConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }
}

/// Failure of a single Telemetry Source round trip.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("decode failure: {0}")]
    Decode(String),
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Unrecoverable failure while bringing the map up.
#[derive(thiserror::Error, Debug)]
pub enum StartupError {
    #[error("vehicle list unavailable: {0}")]
    VehicleList(#[source] SourceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_match_documented_cadence() {
        let config = MapConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_millis(2000));
        assert_eq!(config.initial_delay(), Duration::from_millis(5000));
        assert_eq!(config.ordering, ResponseOrdering::LastCompletedWins);
    }

    #[test]
    fn config_fills_missing_fields_from_defaults() {
        let config: MapConfig =
            serde_json::from_str(r#"{"poll_interval_ms": 500, "ordering": "reject_out_of_order"}"#)
                .unwrap();
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.ordering, ResponseOrdering::RejectOutOfOrder);
        assert_eq!(config.focus_height, 10.0);
    }
}
