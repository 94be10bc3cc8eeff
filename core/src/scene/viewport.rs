use crate::math::{ScenePosition, Vec3};

pub const FIELD_OF_VIEW_DEG: f64 = 45.0;
pub const MIN_DISTANCE: f64 = 1.0;
pub const MAX_DISTANCE: f64 = 500.0;
pub const DEFAULT_HEIGHT: f64 = 10.0;

/// Pixel size of the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

impl ViewportSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// Top-down perspective camera looking at the map plane. No rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub target: Vec3,
    pub eye: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            target: Vec3::zeros(),
            eye: Vec3::new(0.0, 0.0, DEFAULT_HEIGHT),
        }
    }
}

impl Camera {
    pub fn distance(&self) -> f64 {
        (self.eye - self.target).norm()
    }

    /// Shift target and eye by `offset`, keeping the current height.
    pub fn offset_to(&mut self, offset: ScenePosition) {
        self.target = self.target + offset;
        self.eye = self.eye + offset;
    }

    /// Look straight down at `position` from `height`.
    pub fn focus_on(&mut self, position: ScenePosition, height: f64) {
        self.target = position;
        self.eye = Vec3::new(position.x, position.y, height);
    }

    pub fn zoom(&mut self, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let distance = (self.distance() * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.eye = Vec3::new(self.target.x, self.target.y, self.target.z + distance);
    }

    /// Scene units covered by one pixel on the map plane.
    pub fn units_per_pixel(&self, size: ViewportSize) -> f64 {
        let half_height = self.distance() * (FIELD_OF_VIEW_DEG.to_radians() / 2.0).tan();
        if size.height > 0.0 {
            2.0 * half_height / size.height as f64
        } else {
            0.0
        }
    }

    /// Screen-space panning: content follows the pointer.
    pub fn pan_pixels(&mut self, dx: f32, dy: f32, size: ViewportSize) {
        let scale = self.units_per_pixel(size);
        let offset = Vec3::new(-(dx as f64) * scale, dy as f64 * scale, 0.0);
        self.offset_to(offset);
    }

    /// Pixel coordinates of a scene position, origin at the top-left corner.
    pub fn to_screen(&self, position: ScenePosition, size: ViewportSize) -> (f32, f32) {
        let scale = self.units_per_pixel(size);
        if scale <= 0.0 {
            return (size.width / 2.0, size.height / 2.0);
        }
        let x = size.width as f64 / 2.0 + (position.x - self.target.x) / scale;
        let y = size.height as f64 / 2.0 - (position.y - self.target.y) / scale;
        (x as f32, y as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_projects_to_viewport_center() {
        let mut camera = Camera::default();
        camera.focus_on(Vec3::new(5173.0, -120.0, 0.0), 10.0);
        let size = ViewportSize::new(800.0, 600.0);
        assert_eq!(camera.to_screen(camera.target, size), (400.0, 300.0));
    }

    #[test]
    fn pan_moves_content_with_pointer() {
        let mut camera = Camera::default();
        let size = ViewportSize::new(800.0, 600.0);
        let point = Vec3::new(1.0, 1.0, 0.0);
        let (before_x, before_y) = camera.to_screen(point, size);
        camera.pan_pixels(25.0, -10.0, size);
        let (after_x, after_y) = camera.to_screen(point, size);
        assert!((after_x - before_x - 25.0).abs() < 1e-3);
        assert!((after_y - before_y + 10.0).abs() < 1e-3);
    }

    #[test]
    fn zoom_is_clamped_to_control_limits() {
        let mut camera = Camera::default();
        camera.zoom(1000.0);
        assert_eq!(camera.distance(), MAX_DISTANCE);
        camera.zoom(0.0001);
        assert_eq!(camera.distance(), MIN_DISTANCE);
    }

    #[test]
    fn offset_keeps_height() {
        let mut camera = Camera::default();
        camera.offset_to(Vec3::new(10.0, 20.0, 0.0));
        assert_eq!(camera.target, Vec3::new(10.0, 20.0, 0.0));
        assert_eq!(camera.eye, Vec3::new(10.0, 20.0, DEFAULT_HEIGHT));
    }
}
