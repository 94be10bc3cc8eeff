use anyhow::Context;
use fleetcore::fleet_interface::{TelemetrySample, TelemetrySource, Vehicle, VehicleId};
use fleetcore::prelude::{SourceError, SourceResult};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use std::future::Future;

/// Telemetry Source backed by the fleet service's JSON API.
#[derive(Debug, Clone)]
pub struct HttpTelemetrySource {
    client: reqwest::Client,
    base: Url,
}

impl HttpTelemetrySource {
    pub fn new(endpoint: &str) -> anyhow::Result<Self> {
        let base = Url::parse(endpoint)
            .with_context(|| format!("parsing telemetry endpoint {endpoint}"))?;
        anyhow::ensure!(
            !base.cannot_be_a_base(),
            "telemetry endpoint {endpoint} cannot carry a path"
        );
        Ok(Self {
            client: reqwest::Client::new(),
            base,
        })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> SourceResult<T> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(url.path().to_string()));
        }
        if !status.is_success() {
            return Err(SourceError::Transport(format!("{}: {}", status, url)));
        }

        response.json::<T>().await.map_err(|e| {
            if e.is_decode() {
                SourceError::Decode(e.to_string())
            } else {
                SourceError::Transport(e.to_string())
            }
        })
    }
}

impl TelemetrySource for HttpTelemetrySource {
    fn list_vehicles(&self) -> impl Future<Output = SourceResult<Vec<Vehicle>>> + Send {
        self.get_json(self.url(&["vehicles"]))
    }

    fn vehicle(&self, id: &VehicleId) -> impl Future<Output = SourceResult<Vehicle>> + Send {
        self.get_json(self.url(&["vehicles", id.as_str()]))
    }

    fn telemetry(
        &self,
        id: &VehicleId,
    ) -> impl Future<Output = SourceResult<TelemetrySample>> + Send {
        self.get_json(self.url(&["vehicles", id.as_str(), "telemetry"]))
    }
}
