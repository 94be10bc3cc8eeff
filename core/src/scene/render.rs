use log::trace;

use crate::scene::renderer::SceneRenderer;
use crate::scene::viewport::ViewportSize;

/// What caused a render request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderReason {
    Populated,
    SampleApplied,
    CameraChanged,
    Resized,
    Recentered,
}

/// Draws the world and overlay layers in lock-step.
///
/// Markers in the overlay are positioned with the same camera as the world
/// layer, so the two are never drawn separately.
#[derive(Debug, Default)]
pub struct RenderCoordinator {
    renders: u64,
}

impl RenderCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request<R: SceneRenderer>(&mut self, renderer: &mut R, reason: RenderReason) {
        renderer.draw_world();
        renderer.draw_overlay();
        self.renders += 1;
        trace!("render #{} ({:?})", self.renders, reason);
    }

    pub fn resize<R: SceneRenderer>(&mut self, renderer: &mut R, size: ViewportSize) {
        renderer.resize(size);
        self.request(renderer, RenderReason::Resized);
    }

    pub fn renders(&self) -> u64 {
        self.renders
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingRenderer;

    #[test]
    fn request_draws_both_layers() {
        let mut renderer = RecordingRenderer::default();
        let mut coordinator = RenderCoordinator::new();
        coordinator.request(&mut renderer, RenderReason::CameraChanged);
        coordinator.request(&mut renderer, RenderReason::SampleApplied);
        assert_eq!(renderer.world_draws, 2);
        assert_eq!(renderer.overlay_draws, 2);
        assert_eq!(coordinator.renders(), 2);
    }

    #[test]
    fn resize_updates_surface_before_drawing() {
        let mut renderer = RecordingRenderer::default();
        let mut coordinator = RenderCoordinator::new();
        coordinator.resize(&mut renderer, ViewportSize::new(1280.0, 720.0));
        assert_eq!(renderer.size, Some(ViewportSize::new(1280.0, 720.0)));
        assert_eq!(renderer.world_draws, 1);
        assert_eq!(renderer.overlay_draws, 1);
    }
}
