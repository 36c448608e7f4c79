use crate::math::Point2;

/// Index of a line in the input slice handed to the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(pub usize);

/// A line-like record produced by the map loader.
///
/// One-sided lines are impassable walls whose interior lies on their right
/// side (walking from start to end).
pub trait BspLine {
    /// The start point of the line.
    fn start(&self) -> Point2;
    /// The end point of the line.
    fn end(&self) -> Point2;
    /// True if only the right side faces into the map.
    fn one_sided(&self) -> bool;
}

/// A plain line record, for callers that have no line type of their own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapLine {
    pub start: Point2,
    pub end: Point2,
    pub one_sided: bool,
}

impl MapLine {
    /// Creates a one-sided line.
    #[must_use]
    pub fn one_sided(start: (f64, f64), end: (f64, f64)) -> Self {
        Self {
            start: Point2::new(start.0, start.1),
            end: Point2::new(end.0, end.1),
            one_sided: true,
        }
    }

    /// Creates a two-sided line.
    #[must_use]
    pub fn two_sided(start: (f64, f64), end: (f64, f64)) -> Self {
        Self {
            start: Point2::new(start.0, start.1),
            end: Point2::new(end.0, end.1),
            one_sided: false,
        }
    }

    /// Builds a closed loop of one-sided lines through `points` in order.
    ///
    /// Listing the points clockwise keeps the interior on the right of every
    /// line.
    #[must_use]
    pub fn closed_loop(points: &[(f64, f64)]) -> Vec<Self> {
        let n = points.len();
        (0..n)
            .map(|i| Self::one_sided(points[i], points[(i + 1) % n]))
            .collect()
    }
}

impl BspLine for MapLine {
    fn start(&self) -> Point2 {
        self.start
    }

    fn end(&self) -> Point2 {
        self.end
    }

    fn one_sided(&self) -> bool {
        self.one_sided
    }
}
