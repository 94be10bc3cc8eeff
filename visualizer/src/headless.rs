use anyhow::Context;
use fleetcore::math::ScenePosition;
use fleetcore::scene::{
    Camera, DetailPanel, IndicatorId, IndicatorSpec, MarkerId, MarkerSpec, SceneRenderer,
    VehicleDetail, ViewportSize,
};
use fleetcore::{Command, FleetMap, SyncLoop};
use log::{debug, info};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::config::ClientConfig;
use crate::source::HttpTelemetrySource;

/// Scene renderer that only reports what it would draw.
#[derive(Debug, Default)]
pub struct LogRenderer {
    next_id: u64,
    frames: u64,
}

impl LogRenderer {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl SceneRenderer for LogRenderer {
    fn create_marker(&mut self, spec: MarkerSpec) -> MarkerId {
        let id = MarkerId(self.allocate());
        debug!(
            "marker {} for {} at ({:.2}, {:.2})",
            id.0, spec.vehicle, spec.position.x, spec.position.y
        );
        id
    }

    fn create_indicator(&mut self, _spec: IndicatorSpec) -> IndicatorId {
        IndicatorId(self.allocate())
    }

    fn place_marker(&mut self, marker: MarkerId, position: ScenePosition) {
        debug!(
            "marker {} moved to ({:.2}, {:.2})",
            marker.0, position.x, position.y
        );
    }

    fn place_indicator(&mut self, _indicator: IndicatorId, _spec: IndicatorSpec) {}

    fn destroy_marker(&mut self, marker: MarkerId) {
        debug!("marker {} destroyed", marker.0);
    }

    fn destroy_indicator(&mut self, _indicator: IndicatorId) {}

    fn set_camera(&mut self, camera: &Camera) {
        debug!(
            "camera looking at ({:.2}, {:.2}) from {:.1}",
            camera.target.x,
            camera.target.y,
            camera.distance()
        );
    }

    fn resize(&mut self, _size: ViewportSize) {}

    fn draw_world(&mut self) {}

    fn draw_overlay(&mut self) {
        self.frames += 1;
    }
}

#[derive(Debug, Default)]
pub struct LogPanel;

impl DetailPanel for LogPanel {
    fn show(&mut self, detail: &VehicleDetail) {
        info!(
            "{}: speed {:.1} | battery {:.1}% | cpu {:.1}% | {}",
            detail.name,
            detail.speed,
            detail.battery_level,
            detail.cpu_usage,
            detail.coordinates()
        );
    }

    fn hide(&mut self) {}
}

/// Runs the sync loop without a window until Ctrl-C.
///
/// With `focus` set, the vehicle is searched for once the first poll is due.
pub fn run(
    config: ClientConfig,
    source: HttpTelemetrySource,
    focus: Option<String>,
) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;

    runtime.block_on(async move {
        let mut map = FleetMap::new(config.map.clone(), LogRenderer::default(), LogPanel);
        let (tx, rx) = mpsc::unbounded_channel();
        let initial_delay = config.map.initial_delay();

        tokio::spawn(async move {
            if let Some(query) = focus {
                tokio::time::sleep(initial_delay).await;
                let _ = tx.send(Command::Search(query));
            }
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
            drop(tx);
        });

        info!("syncing fleet from {}", config.endpoint);
        SyncLoop::new(Arc::new(source))
            .run(&mut map, rx)
            .await
            .context("starting fleet sync")?;

        map.teardown();
        let metrics = map.metrics();
        info!(
            "{} ticks, {} samples applied, {} failed, {} stale, {} renders",
            metrics.ticks, metrics.applied, metrics.failures, metrics.stale, metrics.renders
        );
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetcore::math::Vec3;
    use fleetcore::VehicleId;

    #[test]
    fn log_renderer_hands_out_distinct_handles() {
        let mut renderer = LogRenderer::default();
        let marker = renderer.create_marker(MarkerSpec {
            vehicle: VehicleId::new("a"),
            position: Vec3::zeros(),
            hue: 0.0,
        });
        let indicator = renderer.create_indicator(IndicatorSpec {
            origin: Vec3::zeros(),
            direction: Vec3::x(),
            length: 1.0,
        });
        assert_ne!(marker.0, indicator.0);
        renderer.draw_overlay();
        assert_eq!(renderer.frames, 1);
    }
}
