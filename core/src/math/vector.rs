use nalgebra::Vector3;

/// Scene vector used for positions and heading directions.
pub type Vec3 = Vector3<f64>;

/// Position in scene units on the map plane.
pub type ScenePosition = Vec3;

/// Shortest vector that still carries a direction.
pub const MIN_DIRECTION_NORM: f64 = 1e-9;

/// Unit vector along `v`, or `None` when `v` is too short or not finite.
pub fn direction_of(v: &Vec3) -> Option<Vec3> {
    v.try_normalize(MIN_DIRECTION_NORM)
        .filter(|unit| unit.iter().all(|c| c.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_has_unit_length() {
        let unit = direction_of(&Vec3::new(3.0, 4.0, 0.0)).unwrap();
        assert!((unit.norm() - 1.0).abs() < 1e-12);
        assert!((unit.x - 0.6).abs() < 1e-12);
    }

    #[test]
    fn degenerate_vectors_have_no_direction() {
        assert!(direction_of(&Vec3::zeros()).is_none());
        assert!(direction_of(&Vec3::new(1e-12, 0.0, 0.0)).is_none());
        assert!(direction_of(&Vec3::new(f64::NAN, 0.0, 0.0)).is_none());
    }
}
