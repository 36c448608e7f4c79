use super::Point2;

/// Signed area of a closed loop of points.
///
/// Positive for counter-clockwise loops, negative for clockwise ones, and
/// zero for anything with fewer than three points.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: f64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum();
    twice * 0.5
}
