//! Test doubles for the external collaborators.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use crate::fleet_interface::{TelemetrySample, TelemetrySource, Vehicle, VehicleId};
use crate::math::ScenePosition;
use crate::prelude::{SourceError, SourceResult};
use crate::scene::{
    Camera, DetailPanel, IndicatorId, IndicatorSpec, MarkerId, MarkerSpec, SceneRenderer,
    VehicleDetail, ViewportSize,
};

pub fn sample(id: &str, lat: f64, lng: f64, speed: f64) -> TelemetrySample {
    TelemetrySample {
        vehicle_id: VehicleId::new(id),
        lat,
        lng,
        speed,
        battery_level: 50.0,
        cpu_usage: 25.0,
        timestamp: 0,
    }
}

type Script = VecDeque<(Duration, SourceResult<TelemetrySample>)>;

/// Telemetry source answering from per-vehicle queues of canned responses.
pub struct ScriptedSource {
    vehicles: Vec<Vehicle>,
    listing_error: Mutex<Option<SourceError>>,
    scripts: Mutex<HashMap<VehicleId, Script>>,
    calls: Mutex<HashMap<VehicleId, usize>>,
}

impl ScriptedSource {
    pub fn new(vehicles: Vec<Vehicle>) -> Self {
        Self {
            vehicles,
            listing_error: Mutex::new(None),
            scripts: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
        }
    }

    pub fn push(&self, id: &str, result: SourceResult<TelemetrySample>) {
        self.push_delayed(id, Duration::ZERO, result);
    }

    pub fn push_delayed(&self, id: &str, delay: Duration, result: SourceResult<TelemetrySample>) {
        self.scripts
            .lock()
            .unwrap()
            .entry(VehicleId::new(id))
            .or_default()
            .push_back((delay, result));
    }

    pub fn fail_listing(&self, err: SourceError) {
        *self.listing_error.lock().unwrap() = Some(err);
    }

    pub fn telemetry_calls(&self, id: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(&VehicleId::new(id))
            .copied()
            .unwrap_or(0)
    }

    fn next(&self, id: &VehicleId) -> (Duration, SourceResult<TelemetrySample>) {
        *self.calls.lock().unwrap().entry(id.clone()).or_default() += 1;
        let scripted = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(id)
            .and_then(VecDeque::pop_front);
        match scripted {
            Some(entry) => entry,
            None if self.vehicles.iter().any(|v| &v.id == id) => (
                Duration::ZERO,
                Err(SourceError::Transport("no scripted response".into())),
            ),
            None => (Duration::ZERO, Err(SourceError::NotFound(id.to_string()))),
        }
    }
}

impl TelemetrySource for ScriptedSource {
    fn list_vehicles(&self) -> impl Future<Output = SourceResult<Vec<Vehicle>>> + Send {
        let result = match self.listing_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(self.vehicles.clone()),
        };
        async move { result }
    }

    fn vehicle(&self, id: &VehicleId) -> impl Future<Output = SourceResult<Vehicle>> + Send {
        let result = self
            .vehicles
            .iter()
            .find(|vehicle| &vehicle.id == id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(id.to_string()));
        async move { result }
    }

    fn telemetry(
        &self,
        id: &VehicleId,
    ) -> impl Future<Output = SourceResult<TelemetrySample>> + Send {
        let (delay, result) = self.next(id);
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            result
        }
    }
}

/// Renderer that keeps the scene graph in maps and counts draw calls.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    next_id: u64,
    pub markers: BTreeMap<MarkerId, MarkerSpec>,
    pub indicators: BTreeMap<IndicatorId, IndicatorSpec>,
    pub placements: Vec<(MarkerId, ScenePosition)>,
    pub camera: Option<Camera>,
    pub camera_sets: usize,
    pub size: Option<ViewportSize>,
    pub world_draws: usize,
    pub overlay_draws: usize,
}

impl RecordingRenderer {
    pub fn placements_of(&self, marker: MarkerId) -> Vec<ScenePosition> {
        self.placements
            .iter()
            .filter(|(id, _)| *id == marker)
            .map(|(_, position)| *position)
            .collect()
    }

    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl SceneRenderer for RecordingRenderer {
    fn create_marker(&mut self, spec: MarkerSpec) -> MarkerId {
        let id = MarkerId(self.allocate());
        self.markers.insert(id, spec);
        id
    }

    fn create_indicator(&mut self, spec: IndicatorSpec) -> IndicatorId {
        let id = IndicatorId(self.allocate());
        self.indicators.insert(id, spec);
        id
    }

    fn place_marker(&mut self, marker: MarkerId, position: ScenePosition) {
        if let Some(spec) = self.markers.get_mut(&marker) {
            spec.position = position;
        }
        self.placements.push((marker, position));
    }

    fn place_indicator(&mut self, indicator: IndicatorId, spec: IndicatorSpec) {
        self.indicators.insert(indicator, spec);
    }

    fn destroy_marker(&mut self, marker: MarkerId) {
        self.markers.remove(&marker);
    }

    fn destroy_indicator(&mut self, indicator: IndicatorId) {
        self.indicators.remove(&indicator);
    }

    fn set_camera(&mut self, camera: &Camera) {
        self.camera = Some(*camera);
        self.camera_sets += 1;
    }

    fn resize(&mut self, size: ViewportSize) {
        self.size = Some(size);
    }

    fn draw_world(&mut self) {
        self.world_draws += 1;
    }

    fn draw_overlay(&mut self) {
        self.overlay_draws += 1;
    }
}

/// Detail panel that remembers everything it was asked to show.
#[derive(Debug, Default)]
pub struct RecordingPanel {
    pub visible: bool,
    pub shown: Vec<VehicleDetail>,
    pub hides: usize,
}

impl DetailPanel for RecordingPanel {
    fn show(&mut self, detail: &VehicleDetail) {
        self.visible = true;
        self.shown.push(detail.clone());
    }

    fn hide(&mut self) {
        self.visible = false;
        self.hides += 1;
    }
}
