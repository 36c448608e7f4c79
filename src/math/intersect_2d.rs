use super::{cross, Point2, Vector2, TOLERANCE};

/// Parametric 2D line-line intersection.
///
/// Given lines `p1 + t * d1` and `p2 + u * d2`, returns `(t, u)` if not parallel.
#[must_use]
pub fn line_line_intersect_2d(
    p1: &Point2,
    d1: &Vector2,
    p2: &Point2,
    d2: &Vector2,
) -> Option<(f64, f64)> {
    let denom = cross(d1, d2);
    if denom.abs() < TOLERANCE {
        return None;
    }
    let offset = p2 - p1;
    let t = cross(&offset, d2) / denom;
    let u = cross(&offset, d1) / denom;
    Some((t, u))
}

/// Returns true if two directions are parallel (or anti-parallel).
///
/// The cross product is normalized by both lengths so the test is a sine
/// comparison and does not depend on segment length.
#[must_use]
pub fn is_parallel(d1: &Vector2, d2: &Vector2) -> bool {
    let lengths = d1.norm() * d2.norm();
    if lengths < TOLERANCE {
        return true;
    }
    (cross(d1, d2) / lengths).abs() < TOLERANCE
}

/// Linear interpolation: `origin + dir * t`.
#[must_use]
pub fn point_at(origin: &Point2, dir: &Vector2, t: f64) -> Point2 {
    origin + dir * t
}

/// Projects `point` onto the line `origin + t * dir` and returns `t`.
#[must_use]
pub fn time_along(origin: &Point2, dir: &Vector2, point: &Point2) -> f64 {
    let len_sq = dir.norm_squared();
    if len_sq < TOLERANCE * TOLERANCE {
        return 0.0;
    }
    (point - origin).dot(dir) / len_sq
}

/// True if `t` is inside the closed segment range `[0, 1]`.
#[must_use]
pub fn in_normal_range(t: f64) -> bool {
    (0.0..=1.0).contains(&t)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn line_line_perpendicular() {
        let p1 = Point2::new(0.0, 0.0);
        let d1 = Vector2::new(1.0, 0.0);
        let p2 = Point2::new(0.5, -1.0);
        let d2 = Vector2::new(0.0, 1.0);
        let (t, u) = line_line_intersect_2d(&p1, &d1, &p2, &d2).unwrap();
        assert_relative_eq!(t, 0.5);
        assert_relative_eq!(u, 1.0);
    }

    #[test]
    fn line_line_parallel_returns_none() {
        let p1 = Point2::new(0.0, 0.0);
        let d1 = Vector2::new(1.0, 0.0);
        let p2 = Point2::new(0.0, 1.0);
        let d2 = Vector2::new(-3.0, 0.0);
        assert!(line_line_intersect_2d(&p1, &d1, &p2, &d2).is_none());
        assert!(is_parallel(&d1, &d2));
    }

    #[test]
    fn intersection_outside_segment_range() {
        let p1 = Point2::new(0.0, 0.0);
        let d1 = Vector2::new(1.0, 0.0);
        let p2 = Point2::new(3.0, 1.0);
        let d2 = Vector2::new(0.0, -1.0);
        let (t, u) = line_line_intersect_2d(&p1, &d1, &p2, &d2).unwrap();
        assert_relative_eq!(t, 3.0);
        assert_relative_eq!(u, 1.0);
        assert!(!in_normal_range(t));
        assert!(in_normal_range(u));
    }

    #[test]
    fn time_along_projects() {
        let origin = Point2::new(1.0, 1.0);
        let dir = Vector2::new(2.0, 0.0);
        assert_relative_eq!(time_along(&origin, &dir, &Point2::new(2.0, 5.0)), 0.5);
        let p = point_at(&origin, &dir, 1.5);
        assert_relative_eq!(p.x, 4.0);
        assert_relative_eq!(p.y, 1.0);
    }
}
