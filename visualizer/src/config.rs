use anyhow::{ensure, Context};
use fleetcore::prelude::{MapConfig, ResponseOrdering};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_ENDPOINT: &str = "https://vehicle-api-test.herokuapp.com/api";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the telemetry service.
    pub endpoint: String,
    #[serde(flatten)]
    pub map: MapConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            map: MapConfig::default(),
        }
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub interval_ms: Option<u64>,
    pub seed: Option<u64>,
    pub reject_out_of_order: bool,
}

impl ClientConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading client config {}", path_ref.display()))?;
        let config: ClientConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing client config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn resolve(path: Option<&Path>, overrides: Overrides) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(endpoint) = overrides.endpoint {
            config.endpoint = endpoint;
        }
        if let Some(interval_ms) = overrides.interval_ms {
            config.map.poll_interval_ms = interval_ms;
        }
        if overrides.seed.is_some() {
            config.map.marker_seed = overrides.seed;
        }
        if overrides.reject_out_of_order {
            config.map.ordering = ResponseOrdering::RejectOutOfOrder;
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            !self.endpoint.trim().is_empty(),
            "telemetry endpoint must not be empty"
        );
        ensure!(
            self.map.poll_interval_ms > 0,
            "poll interval must be greater than zero"
        );
        ensure!(
            self.map.units_per_degree.is_finite() && self.map.units_per_degree > 0.0,
            "units_per_degree must be a positive number"
        );
        Ok(())
    }
}
