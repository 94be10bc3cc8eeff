use crate::fleet_interface::VehicleId;
use crate::math::{ScenePosition, Vec3};
use crate::scene::selection::VehicleDetail;
use crate::scene::viewport::{Camera, ViewportSize};

/// Handle of an interactive marker in the overlay layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub u64);

/// Handle of a heading indicator in the world layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndicatorId(pub u64);

/// The pair of scene objects owned by one tracked entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerHandle {
    pub marker: MarkerId,
    pub indicator: IndicatorId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub vehicle: VehicleId,
    pub position: ScenePosition,
    /// Hue in degrees, `[0, 360)`.
    pub hue: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSpec {
    pub origin: ScenePosition,
    pub direction: Vec3,
    pub length: f64,
}

/// Scene-graph primitives for the world and overlay layers.
pub trait SceneRenderer {
    fn create_marker(&mut self, spec: MarkerSpec) -> MarkerId;
    fn create_indicator(&mut self, spec: IndicatorSpec) -> IndicatorId;
    fn place_marker(&mut self, marker: MarkerId, position: ScenePosition);
    fn place_indicator(&mut self, indicator: IndicatorId, spec: IndicatorSpec);
    fn destroy_marker(&mut self, marker: MarkerId);
    fn destroy_indicator(&mut self, indicator: IndicatorId);
    fn set_camera(&mut self, camera: &Camera);
    /// Recompute aspect/projection and layer sizes.
    fn resize(&mut self, size: ViewportSize);
    fn draw_world(&mut self);
    fn draw_overlay(&mut self);
}

/// The detail panel of the surrounding UI shell.
pub trait DetailPanel {
    fn show(&mut self, detail: &VehicleDetail);
    fn hide(&mut self);
}
