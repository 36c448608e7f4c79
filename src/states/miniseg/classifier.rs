use std::collections::BTreeMap;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{InvariantError, Result};
use crate::geometry::{BspSegment, VertexIndex};
use crate::math::Point2;

use super::junction::Junction;

/// Tracks the junction at every vertex touched by a one-sided segment and
/// answers whether a point near such a vertex is inside the map.
///
/// One-sided segments are added first and [`JunctionClassifier::finalize`]
/// is called once to build the wedges. Afterwards only split junctions may
/// be added.
#[derive(Debug, Default)]
pub struct JunctionClassifier {
    junctions: BTreeMap<VertexIndex, Junction>,
    finalized: bool,
}

impl JunctionClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Number of vertices with a junction.
    #[must_use]
    pub fn len(&self) -> usize {
        self.junctions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.junctions.is_empty()
    }

    #[must_use]
    pub fn junction(&self, vertex: VertexIndex) -> Option<&Junction> {
        self.junctions.get(&vertex)
    }

    /// Registers a one-sided segment as inbound at its end vertex and
    /// outbound at its start vertex. Two-sided segments are ignored.
    ///
    /// # Errors
    ///
    /// Returns `InvariantError::JunctionsAlreadyFinalized` after
    /// [`JunctionClassifier::finalize`].
    pub fn add_one_sided_segment(&mut self, segment: &BspSegment) -> Result<()> {
        if self.finalized {
            return Err(InvariantError::JunctionsAlreadyFinalized.into());
        }
        if !segment.one_sided {
            return Ok(());
        }
        self.junctions
            .entry(segment.end_index)
            .or_default()
            .add_inbound(segment);
        self.junctions
            .entry(segment.start_index)
            .or_default()
            .add_outbound(segment);
        Ok(())
    }

    /// Registers many segments at once.
    ///
    /// # Errors
    ///
    /// See [`JunctionClassifier::add_one_sided_segment`].
    pub fn add_one_sided_segments<'a>(
        &mut self,
        segments: impl IntoIterator<Item = &'a BspSegment>,
    ) -> Result<()> {
        for segment in segments {
            self.add_one_sided_segment(segment)?;
        }
        Ok(())
    }

    /// Builds the wedges of every junction. Junctions with mismatched
    /// inbound and outbound counts are reported, not rejected.
    ///
    /// # Errors
    ///
    /// Returns `InvariantError::JunctionsAlreadyFinalized` on a second call.
    pub fn finalize(&mut self, diagnostics: &mut Diagnostics) -> Result<()> {
        if self.finalized {
            return Err(InvariantError::JunctionsAlreadyFinalized.into());
        }
        for (vertex, junction) in &mut self.junctions {
            if junction.has_unexpected_count() {
                diagnostics.report(Diagnostic::JunctionCountMismatch {
                    vertex: *vertex,
                    inbound: junction.inbound().len(),
                    outbound: junction.outbound().len(),
                });
            }
            junction.generate_wedges()?;
        }
        self.finalized = true;
        tracing::debug!(junctions = self.junctions.len(), "junctions finalized");
        Ok(())
    }

    /// Records the wedge created by splitting a one-sided segment into
    /// `inbound` and `outbound` at their shared vertex.
    ///
    /// # Errors
    ///
    /// Returns `InvariantError::InvalidState` if the segments are the same
    /// or do not meet head to tail.
    pub fn add_split_junction(&mut self, inbound: &BspSegment, outbound: &BspSegment) -> Result<()> {
        if inbound.index == outbound.index {
            return Err(InvariantError::InvalidState(format!(
                "split junction needs two segments, got {:?} twice",
                inbound.index
            ))
            .into());
        }
        let middle = inbound.end_index;
        if outbound.start_index != middle {
            return Err(InvariantError::InvalidState(format!(
                "split junction segments {:?} and {:?} are not connected",
                inbound.index, outbound.index
            ))
            .into());
        }

        let junction = self.junctions.entry(middle).or_default();
        junction.add_inbound(inbound);
        junction.add_outbound(outbound);
        junction.add_wedge(inbound, outbound);
        Ok(())
    }

    /// True if moving from `vertex` toward `point` immediately leaves the
    /// map. Vertices without a junction are never on the boundary, so they
    /// answer false.
    ///
    /// # Errors
    ///
    /// Returns `InvariantError::JunctionsNotFinalized` before
    /// [`JunctionClassifier::finalize`].
    pub fn check_crossing_void(&self, vertex: VertexIndex, point: &Point2) -> Result<bool> {
        if !self.finalized {
            return Err(InvariantError::JunctionsNotFinalized.into());
        }
        Ok(self
            .junctions
            .get(&vertex)
            .is_some_and(|junction| !junction.between_wedge(point)))
    }
}
