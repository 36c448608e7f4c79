use super::{cross, Point2, TOLERANCE};

/// Which side of a directed line a point lies on.
///
/// Lines are directed from start to end. With the y axis pointing up, a
/// clockwise polygon keeps its interior on the right of every edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rotation {
    Left,
    Right,
    On,
}

impl Rotation {
    /// Returns the mirrored side. `On` stays `On`.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Rotation::Left => Rotation::Right,
            Rotation::Right => Rotation::Left,
            Rotation::On => Rotation::On,
        }
    }
}

/// Classifies `point` against the directed line through `start` and `end`.
///
/// The perpendicular distance is compared against [`TOLERANCE`], so points
/// within that band are `On`.
#[must_use]
pub fn side_of(start: &Point2, end: &Point2, point: &Point2) -> Rotation {
    let delta = end - start;
    let len = delta.norm();
    if len < TOLERANCE {
        return Rotation::On;
    }
    let dist = cross(&delta, &(point - start)) / len;
    if dist.abs() <= TOLERANCE {
        Rotation::On
    } else if dist > 0.0 {
        Rotation::Left
    } else {
        Rotation::Right
    }
}

/// Classifies the turn taken when walking `first -> second -> third`.
#[must_use]
pub fn rotation(first: &Point2, second: &Point2, third: &Point2) -> Rotation {
    side_of(first, second, third)
}

/// Perpendicular distance from `point` to the infinite line through `start`
/// and `end`. Degenerate lines fall back to the point distance.
#[must_use]
pub fn distance_to_line(start: &Point2, end: &Point2, point: &Point2) -> f64 {
    let delta = end - start;
    let len = delta.norm();
    if len < TOLERANCE {
        return (point - start).norm();
    }
    (cross(&delta, &(point - start)) / len).abs()
}
