use crate::line::LineId;
use crate::math::intersect_2d::{is_parallel, line_line_intersect_2d, point_at};
use crate::math::side::side_of;
use crate::math::{Point2, Rotation, Vector2, TOLERANCE};

use super::vertex::VertexIndex;

/// Stable index of a segment in the [`super::GeometryStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentIndex(pub usize);

/// One end of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

impl Endpoint {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Endpoint::Start => Endpoint::End,
            Endpoint::End => Endpoint::Start,
        }
    }
}

/// A directed, immutable segment between two welded vertices.
///
/// Segments without a backing line are minisegs. Splitting produces two new
/// segments and leaves this one untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct BspSegment {
    pub index: SegmentIndex,
    pub start_index: VertexIndex,
    pub end_index: VertexIndex,
    pub start: Point2,
    pub end: Point2,
    /// Index of the distinct infinite line this segment lies on.
    pub collinear_index: usize,
    pub line: Option<LineId>,
    pub one_sided: bool,
}

impl BspSegment {
    /// Direction vector from start to end.
    #[must_use]
    pub fn delta(&self) -> Vector2 {
        self.end - self.start
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.delta().norm()
    }

    /// True if no map line backs this segment.
    #[must_use]
    pub fn is_miniseg(&self) -> bool {
        self.line.is_none()
    }

    #[must_use]
    pub fn endpoint(&self, endpoint: Endpoint) -> Point2 {
        match endpoint {
            Endpoint::Start => self.start,
            Endpoint::End => self.end,
        }
    }

    #[must_use]
    pub fn vertex(&self, endpoint: Endpoint) -> VertexIndex {
        match endpoint {
            Endpoint::Start => self.start_index,
            Endpoint::End => self.end_index,
        }
    }

    /// Which endpoint sits on `vertex`, if either.
    #[must_use]
    pub fn endpoint_at(&self, vertex: VertexIndex) -> Option<Endpoint> {
        if self.start_index == vertex {
            Some(Endpoint::Start)
        } else if self.end_index == vertex {
            Some(Endpoint::End)
        } else {
            None
        }
    }

    /// Side of this segment's infinite line that `point` is on.
    #[must_use]
    pub fn side(&self, point: &Point2) -> Rotation {
        side_of(&self.start, &self.end, point)
    }

    #[must_use]
    pub fn on_right(&self, point: &Point2) -> bool {
        self.side(point) == Rotation::Right
    }

    /// Side that `other` lies on, judged by its start point and falling back
    /// to its end point when the start is on the line.
    #[must_use]
    pub fn side_of_segment(&self, other: &BspSegment) -> Rotation {
        match self.side(&other.start) {
            Rotation::On => self.side(&other.end),
            side => side,
        }
    }

    #[must_use]
    pub fn is_parallel(&self, other: &BspSegment) -> bool {
        is_parallel(&self.delta(), &other.delta())
    }

    /// True if the two segments point the same way along their line.
    #[must_use]
    pub fn same_direction(&self, other: &BspSegment) -> bool {
        self.delta().dot(&other.delta()) > 0.0
    }

    /// Intersection of both infinite lines as `(t_self, t_other)`, or `None`
    /// when they are parallel.
    #[must_use]
    pub fn intersection_as_line(&self, other: &BspSegment) -> Option<(f64, f64)> {
        if self.is_parallel(other) {
            return None;
        }
        line_line_intersect_2d(&self.start, &self.delta(), &other.start, &other.delta())
    }

    #[must_use]
    pub fn shares_any_endpoints(&self, other: &BspSegment) -> bool {
        self.start_index == other.start_index
            || self.start_index == other.end_index
            || self.end_index == other.start_index
            || self.end_index == other.end_index
    }

    /// True for horizontal or vertical segments.
    #[must_use]
    pub fn is_axis_aligned(&self) -> bool {
        let delta = self.delta();
        delta.x.abs() < TOLERANCE || delta.y.abs() < TOLERANCE
    }

    /// Point at parametric time `t` along the segment.
    #[must_use]
    pub fn from_time(&self, t: f64) -> Point2 {
        point_at(&self.start, &self.delta(), t)
    }

    /// Distance from the point at `t` to whichever endpoint is closer, along
    /// with that endpoint.
    #[must_use]
    pub fn closest_endpoint(&self, t: f64) -> (Endpoint, f64) {
        let point = self.from_time(t);
        let to_start = (point - self.start).norm();
        let to_end = (point - self.end).norm();
        if to_start <= to_end {
            (Endpoint::Start, to_start)
        } else {
            (Endpoint::End, to_end)
        }
    }
}
