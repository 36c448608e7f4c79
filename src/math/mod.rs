pub mod intersect_2d;
pub mod polygon_2d;
pub mod side;

pub use side::Rotation;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Tolerance used for side tests and parallelism checks.
///
/// This is much tighter than the vertex welding epsilon, which is a map unit
/// distance and lives in [`crate::config::BspConfig`].
pub const TOLERANCE: f64 = 1e-9;

/// Returns the 2D cross product (perp dot) of two vectors.
#[must_use]
pub fn cross(a: &Vector2, b: &Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}
