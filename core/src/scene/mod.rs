pub mod markers;
pub mod registry;
pub mod render;
pub mod renderer;
pub mod selection;
pub mod viewport;

pub use markers::MarkerManager;
pub use registry::{TrackedEntity, VehicleRegistry};
pub use render::{RenderCoordinator, RenderReason};
pub use renderer::{
    DetailPanel, IndicatorId, IndicatorSpec, MarkerHandle, MarkerId, MarkerSpec, SceneRenderer,
};
pub use selection::{SelectionController, VehicleDetail};
pub use viewport::{Camera, ViewportSize};
