use log::error;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{self, Instant};

use crate::fleet_interface::{fetch, Request, Response, TelemetrySource};
use crate::prelude::StartupError;
use crate::scene::{DetailPanel, SceneRenderer};
use crate::sync::map::{Command, FleetMap};

/// Drives a [`FleetMap`] against a live [`TelemetrySource`].
///
/// Each request runs as its own task, so a slow vehicle never holds up the
/// others. Completions are handed to the map one at a time from this loop.
/// The timer fires at a fixed cadence regardless of outstanding responses,
/// so ticks may overlap.
pub struct SyncLoop<S: TelemetrySource> {
    source: Arc<S>,
    tasks: JoinSet<Response>,
}

impl<S: TelemetrySource> SyncLoop<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            tasks: JoinSet::new(),
        }
    }

    /// Lists the fleet and dispatches the initial telemetry fetches.
    pub async fn start<R: SceneRenderer, P: DetailPanel>(
        &mut self,
        map: &mut FleetMap<R, P>,
    ) -> Result<usize, StartupError> {
        let vehicles = self
            .source
            .list_vehicles()
            .await
            .map_err(StartupError::VehicleList)?;
        let count = vehicles.len();
        let requests = map.populate(vehicles);
        self.dispatch(requests);
        Ok(count)
    }

    /// Starts the map and keeps it in sync until `commands` is closed.
    ///
    /// Only a failed vehicle listing ends the loop with an error. The map is
    /// left intact on return; call [`FleetMap::teardown`] when done with it.
    pub async fn run<R: SceneRenderer, P: DetailPanel>(
        mut self,
        map: &mut FleetMap<R, P>,
        mut commands: mpsc::UnboundedReceiver<Command>,
    ) -> Result<(), StartupError> {
        self.start(map).await?;

        let period = map.config().poll_interval();
        let first_fire = Instant::now() + map.config().initial_delay();
        let mut timer = time::interval_at(first_fire, period);

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    let requests = map.on_timer();
                    self.dispatch(requests);
                }
                Some(joined) = self.tasks.join_next(), if !self.tasks.is_empty() => {
                    match joined {
                        Ok(response) => map.handle(response),
                        Err(err) => error!("telemetry task ended abnormally: {}", err),
                    }
                }
                command = commands.recv() => match command {
                    Some(command) => {
                        let requests = map.command(command);
                        self.dispatch(requests);
                    }
                    None => return Ok(()),
                },
            }
        }
    }

    pub fn dispatch(&mut self, requests: Vec<Request>) {
        for request in requests {
            let source = Arc::clone(&self.source);
            self.tasks
                .spawn(async move { fetch(source.as_ref(), request).await });
        }
    }

    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }
}
