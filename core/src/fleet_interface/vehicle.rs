use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, stable vehicle identifier assigned by the telemetry service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(String);

impl VehicleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Interprets raw search input as an id. Whitespace is trimmed; blank input yields `None`.
    pub fn parse_query(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self::new(trimmed))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Vehicle record as listed by the telemetry service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub name: String,
}

impl Vehicle {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: VehicleId::new(id),
            name: name.into(),
        }
    }
}

/// One telemetry snapshot for a vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub vehicle_id: VehicleId,
    pub lat: f64,
    pub lng: f64,
    pub speed: f64,
    pub battery_level: f64,
    pub cpu_usage: f64,
    /// Milliseconds since the epoch. Not guaranteed to increase between polls.
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_query_trims_and_rejects_blank() {
        assert_eq!(
            VehicleId::parse_query("  a8b0 \n"),
            Some(VehicleId::new("a8b0"))
        );
        assert_eq!(VehicleId::parse_query("   "), None);
    }

    #[test]
    fn telemetry_sample_reads_service_json() {
        let raw = r#"{
            "battery_level": 52.9,
            "cpu_usage": 49.9,
            "lat": 51.73375958280051,
            "lng": -1.2047088146209715,
            "speed": 27.9,
            "timestamp": 1660848897000,
            "vehicle_id": "a8b0"
        }"#;
        let sample: TelemetrySample = serde_json::from_str(raw).unwrap();
        assert_eq!(sample.vehicle_id.as_str(), "a8b0");
        assert_eq!(sample.timestamp, 1_660_848_897_000);
        assert_eq!(sample.speed, 27.9);
    }

    #[test]
    fn vehicle_list_reads_service_json() {
        let raw = r#"[{"id": "a8b0", "name": "Rover"}, {"id": "c1d2", "name": "Scout"}]"#;
        let vehicles: Vec<Vehicle> = serde_json::from_str(raw).unwrap();
        assert_eq!(vehicles[1], Vehicle::new("c1d2", "Scout"));
    }
}
