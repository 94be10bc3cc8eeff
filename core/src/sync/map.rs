use std::collections::HashSet;

use crate::diagnostics::{MetricsSnapshot, SyncLog, SyncMetrics};
use crate::fleet_interface::{Purpose, Request, Response, TelemetrySample, Vehicle, VehicleId};
use crate::math::Projector;
use crate::prelude::{MapConfig, ResponseOrdering, SourceResult};
use crate::scene::{
    Camera, DetailPanel, MarkerId, MarkerManager, RenderCoordinator, RenderReason, SceneRenderer,
    SelectionController, TrackedEntity, VehicleDetail, VehicleRegistry, ViewportSize,
};

/// Sync loop state. Polling only lasts while a tick issues its requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Idle,
    Polling,
}

/// User-facing actions routed into the map.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    MarkerClicked(MarkerId),
    Select(VehicleId),
    Search(String),
    Close,
    CameraChanged(Camera),
    Resized(ViewportSize),
}

struct Population {
    vehicles: Vec<Vehicle>,
    answered: Vec<bool>,
    remaining: usize,
    skipped: usize,
}

/// Application context: owns every piece of map state and mutates it from a
/// single logical timeline.
///
/// The context performs no I/O. Operations return the [`Request`]s to run and
/// completed round trips come back through [`FleetMap::handle`], in any order.
pub struct FleetMap<R: SceneRenderer, P: DetailPanel> {
    config: MapConfig,
    registry: VehicleRegistry,
    markers: MarkerManager,
    selection: SelectionController,
    render: RenderCoordinator,
    camera: Camera,
    renderer: R,
    panel: P,
    phase: LoopPhase,
    population: Option<Population>,
    populated: bool,
    default_focus_applied: bool,
    metrics: SyncMetrics,
    log: SyncLog,
}

impl<R: SceneRenderer, P: DetailPanel> FleetMap<R, P> {
    pub fn new(config: MapConfig, renderer: R, panel: P) -> Self {
        let projector = Projector::new(config.units_per_degree, config.heading_length_per_speed);
        let markers = MarkerManager::new(projector, config.marker_seed);
        Self {
            config,
            registry: VehicleRegistry::new(),
            markers,
            selection: SelectionController::new(),
            render: RenderCoordinator::new(),
            camera: Camera::default(),
            renderer,
            panel,
            phase: LoopPhase::Idle,
            population: None,
            populated: false,
            default_focus_applied: false,
            metrics: SyncMetrics::new(),
            log: SyncLog::new(),
        }
    }

    /// Starts tracking `vehicles`. Duplicate ids are dropped. Each entity is
    /// created as soon as its own initial fetch succeeds.
    pub fn populate(&mut self, vehicles: Vec<Vehicle>) -> Vec<Request> {
        if self.populated || self.population.is_some() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let vehicles: Vec<Vehicle> = vehicles
            .into_iter()
            .filter(|vehicle| seen.insert(vehicle.id.clone()))
            .collect();
        let requests: Vec<Request> = vehicles
            .iter()
            .enumerate()
            .map(|(slot, vehicle)| Request::Telemetry {
                vehicle: vehicle.id.clone(),
                seq: 0,
                purpose: Purpose::Populate { slot },
            })
            .collect();

        self.metrics.record_requests(requests.len());
        self.population = Some(Population {
            answered: vec![false; vehicles.len()],
            remaining: vehicles.len(),
            skipped: 0,
            vehicles,
        });
        if requests.is_empty() {
            self.finish_population();
        }
        requests
    }

    /// Timer fire: one poll request per tracked entity, in registry order.
    /// Entities whose initial fetch is still outstanding are not polled.
    pub fn on_timer(&mut self) -> Vec<Request> {
        if self.registry.is_empty() {
            return Vec::new();
        }

        self.phase = LoopPhase::Polling;
        let requests: Vec<Request> = self
            .registry
            .all_mut()
            .map(|entity| Request::Telemetry {
                vehicle: entity.id().clone(),
                seq: entity.next_seq(),
                purpose: Purpose::Poll,
            })
            .collect();
        self.metrics.record_tick(requests.len());
        self.log.tick(self.metrics.snapshot().ticks, requests.len());
        self.phase = LoopPhase::Idle;
        requests
    }

    /// Routes one completed round trip.
    pub fn handle(&mut self, response: Response) {
        match response {
            Response::Telemetry {
                vehicle,
                seq,
                purpose,
                result,
            } => match purpose {
                Purpose::Populate { slot } => self.handle_populated(slot, result),
                Purpose::Poll => self.handle_polled(vehicle, seq, result),
                Purpose::Select { generation } => {
                    self.handle_selected(vehicle, seq, generation, result)
                }
            },
            Response::Lookup {
                vehicle,
                seq,
                generation,
                result,
            } => self.handle_lookup(vehicle, seq, generation, result),
        }
    }

    pub fn command(&mut self, command: Command) -> Vec<Request> {
        match command {
            Command::MarkerClicked(marker) => self.click(marker),
            Command::Select(vehicle) => self.select(vehicle),
            Command::Search(raw) => self.search(&raw),
            Command::Close => {
                self.close();
                Vec::new()
            }
            Command::CameraChanged(camera) => {
                self.set_camera(camera);
                Vec::new()
            }
            Command::Resized(size) => {
                self.resize(size);
                Vec::new()
            }
        }
    }

    pub fn click(&mut self, marker: MarkerId) -> Vec<Request> {
        match self.markers.resolve_click(marker).cloned() {
            Some(vehicle) => self.select(vehicle),
            None => Vec::new(),
        }
    }

    pub fn select(&mut self, vehicle: VehicleId) -> Vec<Request> {
        let Some(entity) = self.registry.get_mut(&vehicle) else {
            self.log.selection_missed(vehicle.as_str(), "vehicle is not tracked");
            self.metrics.record_selection_miss();
            return Vec::new();
        };
        let seq = entity.next_seq();
        let generation = self.selection.begin(vehicle.clone(), false);
        self.metrics.record_requests(1);
        vec![Request::Telemetry {
            vehicle,
            seq,
            purpose: Purpose::Select { generation },
        }]
    }

    /// Search-by-id. Input is taken as an exact id after trimming.
    pub fn search(&mut self, raw: &str) -> Vec<Request> {
        let Some(vehicle) = VehicleId::parse_query(raw) else {
            self.log.selection_missed(raw, "empty query");
            self.metrics.record_selection_miss();
            return Vec::new();
        };
        let Some(entity) = self.registry.get_mut(&vehicle) else {
            self.log.selection_missed(raw, "vehicle is not tracked");
            self.metrics.record_selection_miss();
            return Vec::new();
        };
        let seq = entity.next_seq();
        let generation = self.selection.begin(vehicle.clone(), true);
        self.metrics.record_requests(2);
        vec![Request::Lookup {
            vehicle,
            seq,
            generation,
        }]
    }

    pub fn close(&mut self) {
        self.selection.close(&mut self.panel);
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
        self.renderer.set_camera(&self.camera);
        self.render
            .request(&mut self.renderer, RenderReason::CameraChanged);
    }

    pub fn resize(&mut self, size: ViewportSize) {
        self.render.resize(&mut self.renderer, size);
    }

    /// Destroys every marker and indicator. The map tracks nothing afterwards.
    pub fn teardown(&mut self) {
        for entity in self.registry.drain() {
            self.markers.destroy(&mut self.renderer, &entity);
        }
        self.selection.close(&mut self.panel);
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn registry(&self) -> &VehicleRegistry {
        &self.registry
    }

    pub fn entity(&self, vehicle: &VehicleId) -> Option<&TrackedEntity> {
        self.registry.get(vehicle)
    }

    pub fn focus(&self) -> Option<&VehicleId> {
        self.selection.focus()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    /// True once every initial fetch has answered.
    pub fn is_populated(&self) -> bool {
        self.populated
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            renders: self.render.renders(),
            ..self.metrics.snapshot()
        }
    }

    fn handle_populated(&mut self, slot: usize, result: SourceResult<TelemetrySample>) {
        let Some(population) = self.population.as_mut() else {
            return;
        };
        let Some(answered) = population.answered.get_mut(slot) else {
            return;
        };
        if *answered {
            return;
        }
        *answered = true;
        population.remaining -= 1;
        let vehicle = population.vehicles[slot].clone();

        match result {
            Ok(sample) => self.track(vehicle, sample),
            Err(err) => {
                self.log.fetch_failed(&vehicle.id, &err);
                self.metrics.record_failure();
                if let Some(population) = self.population.as_mut() {
                    population.skipped += 1;
                }
            }
        }

        if self
            .population
            .as_ref()
            .is_some_and(|population| population.remaining == 0)
        {
            self.finish_population();
        }
    }

    /// Creates the entity for a vehicle whose first sample just arrived.
    fn track(&mut self, vehicle: Vehicle, sample: TelemetrySample) {
        if self.registry.contains(&vehicle.id) {
            return;
        }
        let entity = self.markers.create(&mut self.renderer, vehicle, sample);
        self.metrics.record_applied();
        if let Err(duplicate) = self.registry.insert(entity) {
            self.markers.destroy(&mut self.renderer, &duplicate);
            return;
        }
        self.apply_default_focus();
        self.render
            .request(&mut self.renderer, RenderReason::Populated);
    }

    fn finish_population(&mut self) {
        let Some(population) = self.population.take() else {
            return;
        };
        self.populated = true;
        self.log.populated(self.registry.len(), population.skipped);
    }

    /// Moves the camera onto the first entity created, once per map lifetime.
    /// FocusState is not touched.
    fn apply_default_focus(&mut self) {
        if self.default_focus_applied {
            return;
        }
        if let Some(first) = self.registry.first() {
            self.camera.offset_to(first.position);
            self.renderer.set_camera(&self.camera);
            self.default_focus_applied = true;
        }
    }

    fn handle_polled(
        &mut self,
        vehicle: VehicleId,
        seq: u64,
        result: SourceResult<TelemetrySample>,
    ) {
        match result {
            Ok(sample) => {
                if self.apply(&vehicle, seq, sample) {
                    self.refresh_panel(&vehicle);
                    self.render
                        .request(&mut self.renderer, RenderReason::SampleApplied);
                }
            }
            Err(err) => {
                self.log.fetch_failed(&vehicle, &err);
                self.metrics.record_failure();
            }
        }
    }

    fn handle_selected(
        &mut self,
        vehicle: VehicleId,
        seq: u64,
        generation: u64,
        result: SourceResult<TelemetrySample>,
    ) {
        match result {
            Ok(sample) => {
                let applied = self.apply(&vehicle, seq, sample);
                if self.selection.commit(generation, &vehicle).is_some() {
                    self.log.focused(&vehicle);
                    self.refresh_panel(&vehicle);
                }
                if applied {
                    self.render
                        .request(&mut self.renderer, RenderReason::SampleApplied);
                }
            }
            Err(err) => {
                self.log.fetch_failed(&vehicle, &err);
                self.metrics.record_failure();
                if self.selection.abandon(generation) {
                    self.metrics.record_selection_miss();
                }
            }
        }
    }

    fn handle_lookup(
        &mut self,
        vehicle: VehicleId,
        seq: u64,
        generation: u64,
        result: SourceResult<(Vehicle, TelemetrySample)>,
    ) {
        let sample = match result {
            Ok((_, sample)) if self.registry.contains(&vehicle) => sample,
            Ok(_) => {
                self.log
                    .selection_missed(vehicle.as_str(), "vehicle is not tracked");
                self.abandon_selection(generation);
                return;
            }
            Err(err) => {
                self.log.selection_missed(vehicle.as_str(), &err.to_string());
                self.abandon_selection(generation);
                return;
            }
        };

        let applied = self.apply(&vehicle, seq, sample);
        match self.selection.commit(generation, &vehicle) {
            Some(committed) => {
                self.log.focused(&vehicle);
                self.refresh_panel(&vehicle);
                if committed.recenter {
                    self.recenter_on(&vehicle);
                } else if applied {
                    self.render
                        .request(&mut self.renderer, RenderReason::SampleApplied);
                }
            }
            None if applied => {
                self.render
                    .request(&mut self.renderer, RenderReason::SampleApplied);
            }
            None => {}
        }
    }

    fn abandon_selection(&mut self, generation: u64) {
        if self.selection.abandon(generation) {
            self.metrics.record_selection_miss();
        }
    }

    fn recenter_on(&mut self, vehicle: &VehicleId) {
        let Some(entity) = self.registry.get(vehicle) else {
            return;
        };
        self.camera
            .focus_on(entity.position, self.config.focus_height);
        self.renderer.set_camera(&self.camera);
        self.render
            .request(&mut self.renderer, RenderReason::Recentered);
    }

    /// Applies `sample` to the entity's marker. Returns `false` when the
    /// entity is unknown or the response lost to a newer one.
    fn apply(&mut self, vehicle: &VehicleId, seq: u64, sample: TelemetrySample) -> bool {
        let Some(entity) = self.registry.get_mut(vehicle) else {
            return false;
        };
        if self.config.ordering == ResponseOrdering::RejectOutOfOrder && seq < entity.applied_seq
        {
            self.log.stale(vehicle, seq, entity.applied_seq);
            self.metrics.record_stale();
            return false;
        }
        self.markers.update(&mut self.renderer, entity, sample);
        entity.applied_seq = seq;
        self.metrics.record_applied();
        true
    }

    fn refresh_panel(&mut self, vehicle: &VehicleId) {
        if !self.selection.is_focused(vehicle) {
            return;
        }
        if let Some(entity) = self.registry.get(vehicle) {
            self.panel
                .show(&VehicleDetail::new(&entity.vehicle, &entity.latest));
        }
    }
}
