use fleetcore::math::ScenePosition;
use fleetcore::scene::{
    Camera, DetailPanel, IndicatorId, IndicatorSpec, MarkerId, MarkerSpec, SceneRenderer,
    VehicleDetail, ViewportSize,
};
use iced::widget::canvas;
use std::collections::BTreeMap;

/// Screen radius, in pixels, inside which a click hits a marker.
pub const MARKER_HIT_RADIUS: f32 = 10.0;

/// Retained scene graph read by the world and overlay canvases.
///
/// Draw requests invalidate the matching canvas cache; iced repaints from
/// this state on the next frame.
pub struct SceneModel {
    next_id: u64,
    markers: BTreeMap<MarkerId, MarkerSpec>,
    indicators: BTreeMap<IndicatorId, IndicatorSpec>,
    camera: Camera,
    size: Option<ViewportSize>,
    world: canvas::Cache,
    overlay: canvas::Cache,
    frames: u64,
}

impl SceneModel {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            markers: BTreeMap::new(),
            indicators: BTreeMap::new(),
            camera: Camera::default(),
            size: None,
            world: canvas::Cache::new(),
            overlay: canvas::Cache::new(),
            frames: 0,
        }
    }

    pub fn markers(&self) -> impl Iterator<Item = (&MarkerId, &MarkerSpec)> {
        self.markers.iter()
    }

    pub fn indicators(&self) -> impl Iterator<Item = &IndicatorSpec> {
        self.indicators.values()
    }

    pub fn marker(&self, marker: MarkerId) -> Option<&MarkerSpec> {
        self.markers.get(&marker)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn size(&self) -> Option<ViewportSize> {
        self.size
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn world_cache(&self) -> &canvas::Cache {
        &self.world
    }

    pub fn overlay_cache(&self) -> &canvas::Cache {
        &self.overlay
    }

    pub fn screen_position(&self, position: ScenePosition, size: ViewportSize) -> (f32, f32) {
        self.camera.to_screen(position, size)
    }

    /// Topmost marker under the pointer at `(x, y)` on a surface of `size`.
    pub fn marker_at(&self, x: f32, y: f32, size: ViewportSize) -> Option<MarkerId> {
        self.markers
            .iter()
            .rev()
            .find(|(_, spec)| {
                let (mx, my) = self.screen_position(spec.position, size);
                (mx - x).hypot(my - y) <= MARKER_HIT_RADIUS
            })
            .map(|(id, _)| *id)
    }

    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl Default for SceneModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneRenderer for SceneModel {
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
    }

    fn place_indicator(&mut self, indicator: IndicatorId, spec: IndicatorSpec) {
        if let Some(current) = self.indicators.get_mut(&indicator) {
            *current = spec;
        }
    }

    fn destroy_marker(&mut self, marker: MarkerId) {
        self.markers.remove(&marker);
    }

    fn destroy_indicator(&mut self, indicator: IndicatorId) {
        self.indicators.remove(&indicator);
    }

    fn set_camera(&mut self, camera: &Camera) {
        self.camera = *camera;
    }

    fn resize(&mut self, size: ViewportSize) {
        self.size = Some(size);
    }

    fn draw_world(&mut self) {
        self.world.clear();
    }

    fn draw_overlay(&mut self) {
        self.overlay.clear();
        self.frames += 1;
    }
}

/// Detail panel state shown in the side column.
#[derive(Debug, Default)]
pub struct PanelModel {
    detail: Option<VehicleDetail>,
}

impl PanelModel {
    pub fn detail(&self) -> Option<&VehicleDetail> {
        self.detail.as_ref()
    }
}

impl DetailPanel for PanelModel {
    fn show(&mut self, detail: &VehicleDetail) {
        self.detail = Some(detail.clone());
    }

    fn hide(&mut self) {
        self.detail = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetcore::math::Vec3;
    use fleetcore::VehicleId;

    fn spec(id: &str, x: f64, y: f64) -> MarkerSpec {
        MarkerSpec {
            vehicle: VehicleId::new(id),
            position: Vec3::new(x, y, 0.0),
            hue: 120.0,
        }
    }

    #[test]
    fn marker_hit_test_uses_camera_projection() {
        let mut scene = SceneModel::new();
        let size = ViewportSize::new(800.0, 600.0);
        let near = scene.create_marker(spec("a", 0.0, 0.0));
        scene.create_marker(spec("b", 3.0, 0.0));

        assert_eq!(scene.marker_at(403.0, 298.0, size), Some(near));
        assert_eq!(scene.marker_at(10.0, 10.0, size), None);

        let mut camera = *scene.camera();
        camera.focus_on(Vec3::new(3.0, 0.0, 0.0), 10.0);
        scene.set_camera(&camera);
        assert_ne!(scene.marker_at(400.0, 300.0, size), Some(near));
    }

    #[test]
    fn placing_and_destroying_updates_the_graph() {
        let mut scene = SceneModel::new();
        let marker = scene.create_marker(spec("a", 0.0, 0.0));
        scene.place_marker(marker, Vec3::new(5.0, 5.0, 0.0));
        assert_eq!(scene.marker(marker).unwrap().position, Vec3::new(5.0, 5.0, 0.0));

        scene.destroy_marker(marker);
        assert!(scene.marker(marker).is_none());
        assert_eq!(scene.markers().count(), 0);
    }

    #[test]
    fn draw_requests_count_frames() {
        let mut scene = SceneModel::new();
        scene.draw_world();
        scene.draw_overlay();
        scene.resize(ViewportSize::new(1024.0, 768.0));
        assert_eq!(scene.frames(), 1);
        assert_eq!(scene.size(), Some(ViewportSize::new(1024.0, 768.0)));
    }

    #[test]
    fn panel_shows_and_hides_detail() {
        let mut panel = PanelModel::default();
        let detail = VehicleDetail {
            name: "Rover".into(),
            speed: 27.9,
            battery_level: 52.9,
            cpu_usage: 49.9,
            lat: 51.7,
            lng: -1.2,
        };
        panel.show(&detail);
        assert_eq!(panel.detail().unwrap().name, "Rover");
        panel.hide();
        assert!(panel.detail().is_none());
    }
}
