use fleetcore::math::Vec3;
use fleetcore::scene::{IndicatorSpec, MarkerId, ViewportSize};
use iced::{
    mouse,
    widget::canvas::{self, Frame, Geometry, Path, Stroke},
    Color, Event, Point, Rectangle, Renderer, Theme,
};

use crate::scene_model::SceneModel;
use crate::Message;

const BACKGROUND: Color = Color {
    r: 0.05,
    g: 0.05,
    b: 0.07,
    a: 1.0,
};
// #474747
const ARROW_COLOR: Color = Color {
    r: 0.278,
    g: 0.278,
    b: 0.278,
    a: 1.0,
};
const MARKER_RADIUS: f32 = 7.0;
const WAVE_RADIUS: f32 = 13.0;
const ZOOM_STEP: f64 = 0.9;

fn viewport(bounds: Rectangle) -> ViewportSize {
    ViewportSize::new(bounds.width, bounds.height)
}

/// Converts a marker hue in degrees into an opaque color at 70% saturation
/// and 50% lightness. Full saturation is too loud against the dark map.
pub fn hue_color(hue: f32) -> Color {
    let hue = hue.rem_euclid(360.0);
    let saturation = 0.7;
    let lightness = 0.5;
    let chroma = (1.0 - (2.0 * lightness - 1.0_f32).abs()) * saturation;
    let sector = hue / 60.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = lightness - chroma / 2.0;
    Color::from_rgb(r + m, g + m, b + m)
}

/// Map plane grid and heading indicators.
pub struct WorldLayer<'a> {
    scene: &'a SceneModel,
}

impl<'a> WorldLayer<'a> {
    pub fn new(scene: &'a SceneModel) -> Self {
        Self { scene }
    }

    fn draw_grid(&self, frame: &mut Frame, size: ViewportSize) {
        let camera = self.scene.camera();
        let scale = camera.units_per_pixel(size);
        if scale <= 0.0 {
            return;
        }
        let half_w = size.width as f64 / 2.0 * scale;
        let half_h = size.height as f64 / 2.0 * scale;

        for (step, shade) in [(1.0_f64, 0.12_f32), (10.0, 0.22)] {
            // Skip a level once its lines would be packed tighter than 4px.
            if step / scale < 4.0 {
                continue;
            }
            let color = Color::from_rgb(shade, shade, shade + 0.03);

            let mut x = ((camera.target.x - half_w) / step).floor() * step;
            while x <= camera.target.x + half_w {
                let (sx, _) = camera.to_screen(Vec3::new(x, camera.target.y, 0.0), size);
                frame.stroke(
                    &Path::line(Point::new(sx, 0.0), Point::new(sx, size.height)),
                    Stroke::default().with_color(color).with_width(1.0),
                );
                x += step;
            }

            let mut y = ((camera.target.y - half_h) / step).floor() * step;
            while y <= camera.target.y + half_h {
                let (_, sy) = camera.to_screen(Vec3::new(camera.target.x, y, 0.0), size);
                frame.stroke(
                    &Path::line(Point::new(0.0, sy), Point::new(size.width, sy)),
                    Stroke::default().with_color(color).with_width(1.0),
                );
                y += step;
            }
        }
    }

    fn draw_arrow(&self, frame: &mut Frame, spec: &IndicatorSpec, size: ViewportSize) {
        if spec.length <= 0.0 {
            return;
        }
        let camera = self.scene.camera();
        let tip = spec.origin + spec.direction * spec.length;
        let (ox, oy) = camera.to_screen(spec.origin, size);
        let (tx, ty) = camera.to_screen(tip, size);
        let (dx, dy) = (tx - ox, ty - oy);
        let screen_length = dx.hypot(dy);
        if screen_length < f32::EPSILON {
            return;
        }

        let head_length = screen_length * 0.2;
        let head_width = head_length * 0.5;
        let (ux, uy) = (dx / screen_length, dy / screen_length);
        let base = Point::new(tx - ux * head_length, ty - uy * head_length);
        let (px, py) = (-uy * head_width / 2.0, ux * head_width / 2.0);

        frame.stroke(
            &Path::line(Point::new(ox, oy), base),
            Stroke::default().with_color(ARROW_COLOR).with_width(2.0),
        );
        let head = Path::new(|builder| {
            builder.move_to(Point::new(tx, ty));
            builder.line_to(Point::new(base.x + px, base.y + py));
            builder.line_to(Point::new(base.x - px, base.y - py));
            builder.close();
        });
        frame.fill(&head, ARROW_COLOR);
    }
}

impl canvas::Program<Message> for WorldLayer<'_> {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let size = viewport(bounds);
        let world = self.scene.world_cache().draw(renderer, bounds.size(), |frame| {
            frame.fill_rectangle(Point::ORIGIN, bounds.size(), BACKGROUND);
            self.draw_grid(frame, size);
            for indicator in self.scene.indicators() {
                self.draw_arrow(frame, indicator, size);
            }
        });
        vec![world]
    }
}

#[derive(Debug, Default)]
pub struct OverlayState {
    drag: Option<Point>,
}

/// Interactive marker layer drawn on top of the world.
pub struct OverlayLayer<'a> {
    scene: &'a SceneModel,
    focus: Option<MarkerId>,
}

impl<'a> OverlayLayer<'a> {
    pub fn new(scene: &'a SceneModel, focus: Option<MarkerId>) -> Self {
        Self { scene, focus }
    }

    fn point_of(&self, position: Vec3, size: ViewportSize) -> Point {
        let (x, y) = self.scene.screen_position(position, size);
        Point::new(x, y)
    }
}

impl canvas::Program<Message> for OverlayLayer<'_> {
    type State = OverlayState;

    fn update(
        &self,
        state: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        let size = viewport(bounds);

        if let Event::Mouse(mouse_event) = event {
            match mouse_event {
                mouse::Event::ButtonPressed(mouse::Button::Left) => {
                    let position = cursor.position_in(bounds)?;
                    if let Some(marker) = self.scene.marker_at(position.x, position.y, size) {
                        return Some(
                            canvas::Action::publish(Message::MarkerClicked(marker)).and_capture(),
                        );
                    }
                    state.drag = Some(position);
                    return Some(canvas::Action::capture());
                }
                mouse::Event::ButtonReleased(mouse::Button::Left) => {
                    if state.drag.take().is_some() {
                        return Some(canvas::Action::capture());
                    }
                }
                mouse::Event::CursorMoved { .. } => {
                    if let (Some(from), Some(to)) = (state.drag, cursor.position_in(bounds)) {
                        state.drag = Some(to);
                        let mut camera = *self.scene.camera();
                        camera.pan_pixels(to.x - from.x, to.y - from.y, size);
                        return Some(
                            canvas::Action::publish(Message::CameraChanged(camera)).and_capture(),
                        );
                    }
                }
                mouse::Event::WheelScrolled { delta } if cursor.is_over(bounds) => {
                    let lines = match delta {
                        mouse::ScrollDelta::Lines { y, .. } => *y,
                        mouse::ScrollDelta::Pixels { y, .. } => *y / 40.0,
                    };
                    let mut camera = *self.scene.camera();
                    camera.zoom(ZOOM_STEP.powf(lines as f64));
                    return Some(
                        canvas::Action::publish(Message::CameraChanged(camera)).and_capture(),
                    );
                }
                _ => {}
            }
        }

        if self.scene.size() != Some(size) {
            return Some(canvas::Action::publish(Message::Resized(size)));
        }
        None
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let size = viewport(bounds);
        let markers = self.scene.overlay_cache().draw(renderer, bounds.size(), |frame| {
            for (_, spec) in self.scene.markers() {
                let center = self.point_of(spec.position, size);
                let color = hue_color(spec.hue);
                frame.stroke(
                    &Path::circle(center, WAVE_RADIUS),
                    Stroke::default()
                        .with_color(Color { a: 0.45, ..color })
                        .with_width(2.0),
                );
                frame.fill(&Path::circle(center, MARKER_RADIUS), color);
            }
        });

        let mut highlight = Frame::new(renderer, bounds.size());
        if let Some(spec) = self.focus.and_then(|marker| self.scene.marker(marker)) {
            let center = self.point_of(spec.position, size);
            highlight.stroke(
                &Path::circle(center, WAVE_RADIUS + 4.0),
                Stroke::default().with_color(Color::WHITE).with_width(2.0),
            );
        }

        vec![markers, highlight.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if state.drag.is_some() {
            return mouse::Interaction::Grabbing;
        }
        match cursor.position_in(bounds) {
            Some(position)
                if self
                    .scene
                    .marker_at(position.x, position.y, viewport(bounds))
                    .is_some() =>
            {
                mouse::Interaction::Pointer
            }
            Some(_) => mouse::Interaction::Grab,
            None => mouse::Interaction::default(),
        }
    }
}
