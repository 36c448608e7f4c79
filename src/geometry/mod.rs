pub mod collinear;
pub mod pruner;
pub mod segment;
pub mod vertex;

pub use collinear::CollinearTracker;
pub use pruner::SegmentChainPruner;
pub use segment::{BspSegment, Endpoint, SegmentIndex};
pub use vertex::{VertexAllocator, VertexIndex};

use std::collections::HashMap;

use crate::error::{InvariantError, Result};
use crate::line::LineId;
use crate::math::Point2;

/// Central arena that owns every vertex and segment of one build.
///
/// Everything else refers to geometry through [`VertexIndex`] and
/// [`SegmentIndex`]. Entries are only ever added, so indices stay valid for
/// the lifetime of the store.
#[derive(Debug)]
pub struct GeometryStore {
    vertices: VertexAllocator,
    collinear: CollinearTracker,
    segments: Vec<BspSegment>,
    lookup: HashMap<(VertexIndex, VertexIndex), SegmentIndex>,
}

impl GeometryStore {
    /// Creates an empty store that welds vertices within `epsilon`.
    #[must_use]
    pub fn new(epsilon: f64) -> Self {
        Self {
            vertices: VertexAllocator::new(epsilon),
            collinear: CollinearTracker::new(epsilon),
            segments: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    #[must_use]
    pub fn epsilon(&self) -> f64 {
        self.vertices.epsilon()
    }

    // --- Vertex operations ---

    /// Returns the vertex within epsilon of `point`, creating it if needed.
    pub fn vertex_index_of(&mut self, point: Point2) -> VertexIndex {
        let (index, created) = self.vertices.index_of(point);
        if created {
            self.collinear.add_vertex(index, &point);
        }
        index
    }

    /// Returns the position of a vertex.
    ///
    /// # Panics
    ///
    /// Panics if the index did not come from this store.
    #[must_use]
    pub fn vertex(&self, index: VertexIndex) -> Point2 {
        self.vertices.position(index)
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    // --- Segment operations ---

    /// Returns the segment between `start` and `end`, allocating it if the
    /// unordered pair is new. An existing segment keeps its original
    /// direction and backing line.
    ///
    /// # Errors
    ///
    /// Returns `InvariantError::ZeroLengthSegment` if both indices are the
    /// same vertex.
    pub fn segment_for(
        &mut self,
        start: VertexIndex,
        end: VertexIndex,
        line: Option<LineId>,
        one_sided: bool,
    ) -> Result<SegmentIndex> {
        if start == end {
            return Err(InvariantError::ZeroLengthSegment(start).into());
        }
        if let Some(existing) = self.find_segment(start, end) {
            return Ok(existing);
        }

        let start_pos = self.vertices.position(start);
        let end_pos = self.vertices.position(end);
        let collinear_index = self.collinear.line_for(start_pos, end_pos);

        let index = SegmentIndex(self.segments.len());
        self.segments.push(BspSegment {
            index,
            start_index: start,
            end_index: end,
            start: start_pos,
            end: end_pos,
            collinear_index,
            line,
            one_sided,
        });
        self.lookup.insert(pair_key(start, end), index);
        Ok(index)
    }

    /// Looks up the segment joining two vertices in either direction.
    #[must_use]
    pub fn find_segment(&self, a: VertexIndex, b: VertexIndex) -> Option<SegmentIndex> {
        self.lookup.get(&pair_key(a, b)).copied()
    }

    #[must_use]
    pub fn contains_segment(&self, a: VertexIndex, b: VertexIndex) -> bool {
        self.lookup.contains_key(&pair_key(a, b))
    }

    /// Returns a segment.
    ///
    /// # Panics
    ///
    /// Panics if the index did not come from this store.
    #[must_use]
    pub fn segment(&self, index: SegmentIndex) -> &BspSegment {
        &self.segments[index.0]
    }

    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Splits a segment at parametric time `t`, returning the halves as
    /// `(start -> middle, middle -> end)`. Both halves keep the original
    /// line and sidedness.
    ///
    /// # Errors
    ///
    /// Returns `InvariantError::SplitOutOfRange` if `t` is not strictly
    /// inside the segment, or `InvariantError::ZeroLengthSegment` if the
    /// split point welds onto an endpoint.
    pub fn split(&mut self, index: SegmentIndex, t: f64) -> Result<(SegmentIndex, SegmentIndex)> {
        if !(t > 0.0 && t < 1.0) {
            return Err(InvariantError::SplitOutOfRange { segment: index, t }.into());
        }
        let segment = self.segment(index).clone();
        let middle = self.vertex_index_of(segment.from_time(t));
        let first = self.segment_for(segment.start_index, middle, segment.line, segment.one_sided)?;
        let second = self.segment_for(middle, segment.end_index, segment.line, segment.one_sided)?;
        Ok((first, second))
    }

    // --- Collinearity ---

    /// Vertices lying on the infinite line with the given collinear index.
    #[must_use]
    pub fn collinear_vertices(&self, collinear_index: usize) -> &[VertexIndex] {
        self.collinear.vertices(collinear_index)
    }

    #[must_use]
    pub fn is_collinear_vertex(&self, collinear_index: usize, vertex: VertexIndex) -> bool {
        self.collinear.contains(collinear_index, vertex)
    }
}

fn pair_key(a: VertexIndex, b: VertexIndex) -> (VertexIndex, VertexIndex) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn segment_identity_is_unordered() {
        let mut store = GeometryStore::new(0.005);
        let a = store.vertex_index_of(Point2::new(0.0, 0.0));
        let b = store.vertex_index_of(Point2::new(1.0, 0.0));
        let first = store.segment_for(a, b, Some(LineId(0)), true).unwrap();
        let again = store.segment_for(a, b, None, false).unwrap();
        let reversed = store.segment_for(b, a, None, false).unwrap();
        assert_eq!(first, again);
        assert_eq!(first, reversed);
        assert_eq!(store.segment_count(), 1);
        assert_eq!(store.segment(first).start_index, a);
        assert_eq!(store.segment(first).line, Some(LineId(0)));
    }

    #[test]
    fn zero_length_segment_is_rejected() {
        let mut store = GeometryStore::new(0.005);
        let a = store.vertex_index_of(Point2::new(0.0, 0.0));
        let b = store.vertex_index_of(Point2::new(0.001, 0.0));
        assert_eq!(a, b);
        assert!(store.segment_for(a, b, None, false).is_err());
    }

    #[test]
    fn collinear_vertices_are_tracked_both_ways() {
        let mut store = GeometryStore::new(0.005);
        let far = store.vertex_index_of(Point2::new(10.0, 0.0));
        let a = store.vertex_index_of(Point2::new(0.0, 0.0));
        let b = store.vertex_index_of(Point2::new(1.0, 0.0));
        let seg = store.segment_for(a, b, None, false).unwrap();
        let ci = store.segment(seg).collinear_index;
        assert!(store.is_collinear_vertex(ci, far));

        let later = store.vertex_index_of(Point2::new(-3.0, 0.0));
        let off = store.vertex_index_of(Point2::new(-3.0, 1.0));
        assert!(store.is_collinear_vertex(ci, later));
        assert!(!store.is_collinear_vertex(ci, off));
        assert_eq!(store.collinear_vertices(ci).len(), 4);
    }

    #[test]
    fn collinear_segments_share_index() {
        let mut store = GeometryStore::new(0.005);
        let a = store.vertex_index_of(Point2::new(0.0, 0.0));
        let b = store.vertex_index_of(Point2::new(1.0, 1.0));
        let c = store.vertex_index_of(Point2::new(3.0, 3.0));
        let d = store.vertex_index_of(Point2::new(4.0, 3.0));
        let ab = store.segment_for(a, b, None, false).unwrap();
        let cb = store.segment_for(c, b, None, false).unwrap();
        let cd = store.segment_for(c, d, None, false).unwrap();
        assert_eq!(store.segment(ab).collinear_index, store.segment(cb).collinear_index);
        assert_ne!(store.segment(ab).collinear_index, store.segment(cd).collinear_index);
    }

    #[test]
    fn split_creates_two_new_halves() {
        let mut store = GeometryStore::new(0.005);
        let a = store.vertex_index_of(Point2::new(0.0, 0.0));
        let b = store.vertex_index_of(Point2::new(4.0, 0.0));
        let seg = store.segment_for(a, b, Some(LineId(2)), true).unwrap();
        let (first, second) = store.split(seg, 0.25).unwrap();

        let first = store.segment(first).clone();
        let second = store.segment(second).clone();
        assert_eq!(first.start_index, a);
        assert_eq!(second.end_index, b);
        assert_eq!(first.end_index, second.start_index);
        assert_relative_eq!(first.end.x, 1.0);
        assert_eq!(first.line, Some(LineId(2)));
        assert!(second.one_sided);
        assert_eq!(first.collinear_index, store.segment(seg).collinear_index);
        assert_eq!(store.segment(seg).end_index, b);
    }

    #[test]
    fn split_rejects_out_of_range_times() {
        let mut store = GeometryStore::new(0.005);
        let a = store.vertex_index_of(Point2::new(0.0, 0.0));
        let b = store.vertex_index_of(Point2::new(4.0, 0.0));
        let seg = store.segment_for(a, b, None, false).unwrap();
        assert!(store.split(seg, 0.0).is_err());
        assert!(store.split(seg, 1.0).is_err());
        assert!(store.split(seg, f64::NAN).is_err());
        // Welds onto the end vertex.
        assert!(store.split(seg, 0.9999).is_err());
    }
}
