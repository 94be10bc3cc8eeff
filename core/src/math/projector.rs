use crate::fleet_interface::TelemetrySample;
use crate::math::vector::{direction_of, ScenePosition, Vec3};

/// Scene units per degree of latitude/longitude.
pub const SCENE_UNITS_PER_DEGREE: f64 = 100.0;
/// Arrow length per unit of reported speed. Cosmetic only.
pub const HEADING_LENGTH_PER_SPEED: f64 = 0.05;
/// Length of the indicator created alongside a new marker.
pub const INITIAL_HEADING_LENGTH: f64 = 1.0;

/// Heading derived from two successive samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Heading {
    /// `None` when there is no usable movement; keep the current direction.
    pub direction: Option<Vec3>,
    pub magnitude: f64,
}

/// Flat-plane projection of telemetry onto the scene.
///
/// Latitude maps to x and longitude to y with one linear factor. There is no
/// geographic correction; existing scenes depend on this layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    units_per_degree: f64,
    length_per_speed: f64,
}

impl Projector {
    pub fn new(units_per_degree: f64, length_per_speed: f64) -> Self {
        Self {
            units_per_degree,
            length_per_speed,
        }
    }

    pub fn project(&self, sample: &TelemetrySample) -> ScenePosition {
        Vec3::new(
            sample.lat * self.units_per_degree,
            sample.lng * self.units_per_degree,
            0.0,
        )
    }

    pub fn heading(&self, prev: Option<&TelemetrySample>, curr: &TelemetrySample) -> Heading {
        let direction =
            prev.and_then(|prev| direction_of(&(self.project(curr) - self.project(prev))));
        Heading {
            direction,
            magnitude: curr.speed.max(0.0) * self.length_per_speed,
        }
    }

    /// Direction and length for an indicator that has no movement history yet:
    /// it points away from the scene origin.
    pub fn initial_heading(&self, position: ScenePosition) -> (Vec3, f64) {
        (
            direction_of(&position).unwrap_or_else(Vec3::x),
            INITIAL_HEADING_LENGTH,
        )
    }
}

impl Default for Projector {
    fn default() -> Self {
        Self::new(SCENE_UNITS_PER_DEGREE, HEADING_LENGTH_PER_SPEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample;

    #[test]
    fn projection_is_linear_in_coordinates() {
        let projector = Projector::default();
        let a = projector.project(&sample("a", 51.5, -1.25, 0.0));
        let b = projector.project(&sample("a", 103.0, -2.5, 0.0));
        assert_eq!(a, Vec3::new(5150.0, -125.0, 0.0));
        assert_eq!(b, a * 2.0);
        assert_eq!(projector.project(&sample("a", 51.5, -1.25, 9.0)), a);
    }

    #[test]
    fn heading_points_along_movement() {
        let projector = Projector::default();
        let prev = sample("a", 1.0, 1.0, 20.0);
        let curr = sample("a", 1.0, 1.5, 20.0);
        let heading = projector.heading(Some(&prev), &curr);
        let direction = heading.direction.unwrap();
        assert!((direction.y - 1.0).abs() < 1e-9);
        assert!(direction.x.abs() < 1e-9);
        assert!((heading.magnitude - 1.0).abs() < 1e-12);
    }

    #[test]
    fn stationary_or_first_sample_has_no_direction() {
        let projector = Projector::default();
        let curr = sample("a", 51.7, -1.2, 12.0);
        assert!(projector.heading(None, &curr).direction.is_none());
        assert!(projector.heading(Some(&curr), &curr).direction.is_none());
    }

    #[test]
    fn magnitude_scales_with_speed() {
        let projector = Projector::default();
        let prev = sample("a", 0.0, 0.0, 0.0);
        assert_eq!(projector.heading(Some(&prev), &sample("a", 1.0, 0.0, 0.0)).magnitude, 0.0);
        let slow = projector.heading(Some(&prev), &sample("a", 1.0, 0.0, 10.0)).magnitude;
        let fast = projector.heading(Some(&prev), &sample("a", 1.0, 0.0, 30.0)).magnitude;
        assert!((fast - 3.0 * slow).abs() < 1e-12);
    }

    #[test]
    fn initial_heading_faces_away_from_origin() {
        let projector = Projector::default();
        let (direction, length) = projector.initial_heading(Vec3::new(0.0, -4.0, 0.0));
        assert_eq!(direction, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(length, INITIAL_HEADING_LENGTH);
        assert_eq!(projector.initial_heading(Vec3::zeros()).0, Vec3::x());
    }
}
