mod canvas;
mod config;
mod headless;
mod scene_model;
mod source;

use clap::Parser;
use fleetcore::fleet_interface::{fetch, Request, Response};
use fleetcore::scene::{Camera, MarkerId, ViewportSize};
use fleetcore::{FleetMap, SourceError, TelemetrySource, Vehicle};
use iced::{
    time,
    widget::{button, column, row, scrollable, stack, text, text_input, Canvas, Column, Container},
    Alignment, Element, Length, Subscription, Task, Theme,
};
use std::{path::PathBuf, sync::Arc};

use crate::canvas::{OverlayLayer, WorldLayer};
use crate::config::{ClientConfig, Overrides};
use crate::scene_model::{PanelModel, SceneModel};
use crate::source::HttpTelemetrySource;

#[derive(Debug, Parser)]
#[command(name = "fleetmap", about = "Live map of fleet telemetry")]
struct Args {
    /// YAML client config.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Base URL of the telemetry service.
    #[arg(long)]
    endpoint: Option<String>,
    /// Poll interval in milliseconds.
    #[arg(long)]
    interval_ms: Option<u64>,
    /// Seed for marker colors.
    #[arg(long)]
    seed: Option<u64>,
    /// Drop telemetry responses older than the one already applied.
    #[arg(long)]
    reject_out_of_order: bool,
    /// Sync without a window and log activity.
    #[arg(long)]
    headless: bool,
    /// Vehicle id to search for once polling starts (headless only).
    #[arg(long)]
    focus: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = ClientConfig::resolve(
        args.config.as_deref(),
        Overrides {
            endpoint: args.endpoint,
            interval_ms: args.interval_ms,
            seed: args.seed,
            reject_out_of_order: args.reject_out_of_order,
        },
    )?;
    let source = HttpTelemetrySource::new(&config.endpoint)?;

    if args.headless {
        return headless::run(config, source, args.focus);
    }

    let source = Arc::new(source);
    iced::application(
        move || Visualizer::boot(config.clone(), Arc::clone(&source)),
        Visualizer::update,
        Visualizer::view,
    )
    .title(application_title)
    .subscription(application_subscription)
    .theme(application_theme)
    .run()?;
    Ok(())
}

fn application_title(_: &Visualizer) -> String {
    "Fleet Map".into()
}

fn application_subscription(state: &Visualizer) -> Subscription<Message> {
    if state.polling {
        time::every(state.map.config().poll_interval()).map(|_| Message::Tick)
    } else {
        Subscription::none()
    }
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Dark
}

struct Visualizer {
    source: Arc<HttpTelemetrySource>,
    map: FleetMap<SceneModel, PanelModel>,
    polling: bool,
    query: String,
    status: String,
    history: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum Message {
    VehiclesListed(Result<Vec<Vehicle>, SourceError>),
    Fetched(Response),
    PollingStarted,
    Tick,
    MarkerClicked(MarkerId),
    CameraChanged(Camera),
    Resized(ViewportSize),
    QueryChanged(String),
    Search,
    Close,
}

impl Visualizer {
    fn new(config: ClientConfig, source: Arc<HttpTelemetrySource>) -> Self {
        Visualizer {
            source,
            map: FleetMap::new(config.map, SceneModel::new(), PanelModel::default()),
            polling: false,
            query: String::new(),
            status: format!("Listing vehicles from {}...", config.endpoint),
            history: Vec::new(),
        }
    }

    fn boot(config: ClientConfig, source: Arc<HttpTelemetrySource>) -> (Self, Task<Message>) {
        let initial_delay = config.map.initial_delay();
        let state = Self::new(config, source);
        let listing = {
            let source = Arc::clone(&state.source);
            Task::perform(
                async move { source.list_vehicles().await },
                Message::VehiclesListed,
            )
        };
        let first_poll = Task::perform(tokio::time::sleep(initial_delay), |_| {
            Message::PollingStarted
        });
        (state, Task::batch([listing, first_poll]))
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::VehiclesListed(Ok(vehicles)) => {
                state.status = format!("Fetching telemetry for {} vehicles", vehicles.len());
                let requests = state.map.populate(vehicles);
                state.dispatch(requests)
            }
            Message::VehiclesListed(Err(err)) => {
                state.status = format!("Vehicle list unavailable: {err}");
                state.push_history(format!("Startup failed: {err}"));
                Task::none()
            }
            Message::Fetched(response) => {
                let tracked_before = state.map.registry().len();
                let was_populated = state.map.is_populated();
                state.map.handle(response);
                let tracked = state.map.registry().len();
                if tracked != tracked_before {
                    state.status = format!("Tracking {tracked} vehicles");
                }
                if !was_populated && state.map.is_populated() {
                    state.push_history(format!("Populated: {tracked} vehicles"));
                }
                Task::none()
            }
            Message::PollingStarted => {
                state.polling = true;
                let requests = state.map.on_timer();
                state.dispatch(requests)
            }
            Message::Tick => {
                if !state.polling {
                    return Task::none();
                }
                let requests = state.map.on_timer();
                state.dispatch(requests)
            }
            Message::MarkerClicked(marker) => {
                let requests = state.map.click(marker);
                state.dispatch(requests)
            }
            Message::CameraChanged(camera) => {
                state.map.set_camera(camera);
                Task::none()
            }
            Message::Resized(size) => {
                state.map.resize(size);
                Task::none()
            }
            Message::QueryChanged(query) => {
                state.query = query;
                Task::none()
            }
            Message::Search => {
                let requests = state.map.search(&state.query);
                let query = state.query.trim().to_string();
                if query.is_empty() {
                    state.push_history("Search needs a vehicle id".into());
                } else if requests.is_empty() {
                    state.push_history(format!("No tracked vehicle {query:?}"));
                } else {
                    state.push_history(format!("Searching for {query}"));
                }
                state.dispatch(requests)
            }
            Message::Close => {
                state.map.close();
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let scene = state.map.renderer();
        let focus = state
            .map
            .focus()
            .and_then(|vehicle| state.map.entity(vehicle))
            .map(|entity| entity.marker.marker);

        let map_view = stack![
            Canvas::new(WorldLayer::new(scene))
                .width(Length::Fill)
                .height(Length::Fill),
            Canvas::new(OverlayLayer::new(scene, focus))
                .width(Length::Fill)
                .height(Length::Fill),
        ]
        .width(Length::Fill)
        .height(Length::Fill);

        let search = row![
            text_input("Vehicle id", &state.query)
                .on_input(Message::QueryChanged)
                .on_submit(Message::Search)
                .padding(6),
            button("Find").on_press(Message::Search).padding(6),
        ]
        .spacing(6)
        .align_y(Alignment::Center);

        let detail: Element<'_, Message> = match state.map.panel().detail() {
            Some(detail) => column![
                text(detail.name.clone()).size(22),
                text(format!("Speed: {:.1}", detail.speed)).size(14),
                text(format!("Battery: {:.1}%", detail.battery_level)).size(14),
                text(format!("CPU: {:.1}%", detail.cpu_usage)).size(14),
                text(detail.coordinates()).size(14),
                button("Close").on_press(Message::Close).padding(6),
            ]
            .spacing(6)
            .into(),
            None => text("Click a marker or search by id").size(14).into(),
        };

        let metrics = state.map.metrics();
        let metrics_line = text(format!(
            "{} ticks | {} applied | {} failed | {} stale | {} frames",
            metrics.ticks, metrics.applied, metrics.failures, metrics.stale, metrics.renders
        ))
        .size(12);

        let history_list = if state.history.is_empty() {
            Column::new().push(text("No activity yet").size(12))
        } else {
            state
                .history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        let side_column = column![
            text("Fleet").size(26),
            search,
            Container::new(detail).padding(6),
            text(&state.status).size(14),
            metrics_line,
            text("Activity log").size(16),
            Container::new(scrollable(history_list).height(Length::Fixed(160.0))).padding(6),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fixed(320.0));

        let layout = row![side_column, map_view]
            .spacing(12)
            .align_y(Alignment::Start)
            .padding(12);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn dispatch(&self, requests: Vec<Request>) -> Task<Message> {
        Task::batch(requests.into_iter().map(|request| {
            let source = Arc::clone(&self.source);
            Task::perform(
                async move { fetch(source.as_ref(), request).await },
                Message::Fetched,
            )
        }))
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > 20 {
            self.history.remove(0);
        }
    }
}
