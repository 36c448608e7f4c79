use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{InvariantError, Result};
use crate::geometry::{BspSegment, Endpoint, GeometryStore, SegmentIndex, VertexIndex};
use crate::math::intersect_2d::in_normal_range;
use crate::math::Rotation;

use super::miniseg::JunctionClassifier;

/// Progress of a partitioning pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionState {
    Loaded,
    Working,
    Finished,
}

/// Sorts a segment set to the left and right of a splitter, cutting the
/// segments that cross it.
///
/// Every vertex that ends up on the splitter line is remembered so the
/// miniseg pass can close the gaps along it.
#[derive(Debug)]
pub struct Partitioner {
    epsilon: f64,
    state: PartitionState,
    splitter: Option<SegmentIndex>,
    segments: Vec<SegmentIndex>,
    cursor: usize,
    left: Vec<SegmentIndex>,
    right: Vec<SegmentIndex>,
    collinear_vertices: Vec<VertexIndex>,
}

impl Partitioner {
    #[must_use]
    pub fn new(epsilon: f64) -> Self {
        Self {
            epsilon,
            state: PartitionState::Finished,
            splitter: None,
            segments: Vec::new(),
            cursor: 0,
            left: Vec::new(),
            right: Vec::new(),
            collinear_vertices: Vec::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> PartitionState {
        self.state
    }

    #[must_use]
    pub fn splitter(&self) -> Option<SegmentIndex> {
        self.splitter
    }

    #[must_use]
    pub fn left_segments(&self) -> &[SegmentIndex] {
        &self.left
    }

    #[must_use]
    pub fn right_segments(&self) -> &[SegmentIndex] {
        &self.right
    }

    /// Vertices on the splitter line, in discovery order.
    #[must_use]
    pub fn collinear_vertices(&self) -> &[VertexIndex] {
        &self.collinear_vertices
    }

    /// Takes the left and right sets, leaving them empty.
    pub fn take_sides(&mut self) -> (Vec<SegmentIndex>, Vec<SegmentIndex>) {
        (std::mem::take(&mut self.left), std::mem::take(&mut self.right))
    }

    /// Prepares to partition `segments` by `splitter`. The splitter's own
    /// endpoints start the collinear vertex list.
    pub fn load(&mut self, store: &GeometryStore, splitter: SegmentIndex, segments: &[SegmentIndex]) {
        let seg = store.segment(splitter);
        self.splitter = Some(splitter);
        self.segments = segments.to_vec();
        self.cursor = 0;
        self.left.clear();
        self.right.clear();
        self.collinear_vertices = vec![seg.start_index, seg.end_index];
        self.state = if segments.is_empty() {
            PartitionState::Finished
        } else {
            PartitionState::Loaded
        };
    }

    /// Partitions the next segment.
    ///
    /// # Errors
    ///
    /// Returns `InvariantError::InvalidState` when nothing is left to
    /// partition, `InvariantError::AmbiguousSide` when a segment is too small
    /// to place, or propagates splitting errors.
    pub fn execute(
        &mut self,
        store: &mut GeometryStore,
        junctions: &mut JunctionClassifier,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        let (Some(splitter_index), Some(&index)) = (self.splitter, self.segments.get(self.cursor))
        else {
            return Err(
                InvariantError::InvalidState("partitioner has nothing left to split".to_owned())
                    .into(),
            );
        };
        self.cursor += 1;
        self.state = if self.cursor < self.segments.len() {
            PartitionState::Working
        } else {
            PartitionState::Finished
        };

        let splitter = store.segment(splitter_index).clone();
        let segment = store.segment(index).clone();

        if index == splitter_index {
            self.right.push(index);
            if !splitter.one_sided {
                self.left.push(index);
            }
            return Ok(());
        }

        // Collinear within epsilon even when the directions differ slightly.
        if segment.collinear_index == splitter.collinear_index {
            self.handle_collinear(&splitter, &segment);
            return Ok(());
        }

        if splitter.is_parallel(&segment) {
            self.push_by_side(&splitter, &segment);
            return Ok(());
        }

        if splitter.shares_any_endpoints(&segment) {
            self.push_by_side(&splitter, &segment);
            return Ok(());
        }

        let (_, t_segment) = splitter
            .intersection_as_line(&segment)
            .ok_or(InvariantError::MissingIntersection(splitter_index, index))?;

        if !in_normal_range(t_segment) {
            self.push_by_side(&splitter, &segment);
            return Ok(());
        }

        // Decided by distance, not by vertex lookup: an unrelated vertex
        // may already sit at the crossing point.
        let crossing = segment.from_time(t_segment);
        let hit = if (crossing - segment.start).norm() <= self.epsilon {
            Some(Endpoint::Start)
        } else if (crossing - segment.end).norm() <= self.epsilon {
            Some(Endpoint::End)
        } else {
            None
        };

        match hit {
            Some(endpoint) => self.handle_endpoint_hit(&splitter, &segment, endpoint),
            None => self.handle_split(&splitter, &segment, t_segment, store, junctions, diagnostics),
        }
    }

    /// Partitions every remaining segment.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Partitioner::execute`].
    pub fn execute_all(
        &mut self,
        store: &mut GeometryStore,
        junctions: &mut JunctionClassifier,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        while self.state != PartitionState::Finished {
            self.execute(store, junctions, diagnostics)?;
        }
        Ok(())
    }

    fn add_collinear_vertex(&mut self, vertex: VertexIndex) {
        if !self.collinear_vertices.contains(&vertex) {
            self.collinear_vertices.push(vertex);
        }
    }

    fn push_by_side(&mut self, splitter: &BspSegment, segment: &BspSegment) {
        if splitter.side_of_segment(segment) == Rotation::Right {
            self.right.push(segment.index);
        } else {
            self.left.push(segment.index);
        }
    }

    /// The back of a one-sided line does not exist, so only the side it
    /// faces gets it.
    fn handle_collinear(&mut self, splitter: &BspSegment, segment: &BspSegment) {
        self.add_collinear_vertex(segment.start_index);
        self.add_collinear_vertex(segment.end_index);

        if segment.one_sided {
            if splitter.same_direction(segment) {
                self.right.push(segment.index);
            } else {
                self.left.push(segment.index);
            }
        } else {
            self.right.push(segment.index);
            self.left.push(segment.index);
        }
    }

    fn handle_endpoint_hit(
        &mut self,
        splitter: &BspSegment,
        segment: &BspSegment,
        endpoint: Endpoint,
    ) -> Result<()> {
        match splitter.side(&segment.endpoint(endpoint.opposite())) {
            Rotation::Right => self.right.push(segment.index),
            Rotation::Left => self.left.push(segment.index),
            Rotation::On => return Err(InvariantError::AmbiguousSide(segment.index).into()),
        }
        self.add_collinear_vertex(segment.vertex(endpoint));
        Ok(())
    }

    fn handle_split(
        &mut self,
        splitter: &BspSegment,
        segment: &BspSegment,
        t_segment: f64,
        store: &mut GeometryStore,
        junctions: &mut JunctionClassifier,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        let (first_index, second_index) = store.split(segment.index, t_segment)?;
        let first = store.segment(first_index);
        let second = store.segment(second_index);

        let side = match splitter.side(&first.start) {
            Rotation::On => {
                diagnostics.report(Diagnostic::TightEndpointSplit {
                    segment: segment.index,
                });
                match splitter.side(&segment.end) {
                    Rotation::On => return Err(InvariantError::AmbiguousSide(segment.index).into()),
                    other => other.opposite(),
                }
            }
            side => side,
        };

        if side == Rotation::Right {
            self.right.push(first_index);
            self.left.push(second_index);
        } else {
            self.left.push(first_index);
            self.right.push(second_index);
        }

        self.add_collinear_vertex(first.end_index);
        if segment.one_sided {
            junctions.add_split_junction(first, second)?;
        }
        Ok(())
    }
}
