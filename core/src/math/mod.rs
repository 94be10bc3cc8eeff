pub mod projector;
pub mod vector;

pub use projector::{Heading, Projector};
pub use vector::{direction_of, ScenePosition, Vec3};
