use std::collections::HashSet;

use crate::error::{InvariantError, Result};
use crate::geometry::{GeometryStore, SegmentIndex, VertexIndex};
use crate::math::intersect_2d::time_along;

use super::classifier::JunctionClassifier;

/// Progress of miniseg generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinisegState {
    Loaded,
    Working,
    Finished,
}

/// Closes the gaps along a splitter line with minisegs.
///
/// The vertices on the splitter are sorted by their time along it, and each
/// adjacent pair is joined unless a segment already joins them or the span
/// leaves the map.
#[derive(Debug)]
pub struct MinisegCreator {
    state: MinisegState,
    vertices: Vec<(VertexIndex, f64)>,
    cursor: usize,
    minisegs: Vec<SegmentIndex>,
}

impl Default for MinisegCreator {
    fn default() -> Self {
        Self {
            state: MinisegState::Finished,
            vertices: Vec::new(),
            cursor: 0,
            minisegs: Vec::new(),
        }
    }
}

impl MinisegCreator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> MinisegState {
        self.state
    }

    /// The collinear vertices in the order they are visited, with their time
    /// along the splitter.
    #[must_use]
    pub fn sorted_vertices(&self) -> &[(VertexIndex, f64)] {
        &self.vertices
    }

    /// Minisegs created so far.
    #[must_use]
    pub fn minisegs(&self) -> &[SegmentIndex] {
        &self.minisegs
    }

    /// Prepares to connect `collinear` vertices along `splitter`.
    ///
    /// # Errors
    ///
    /// Returns `InvariantError::TooFewCollinearVertices` if fewer than two
    /// distinct vertices are given.
    pub fn load(
        &mut self,
        store: &GeometryStore,
        splitter: SegmentIndex,
        collinear: &[VertexIndex],
    ) -> Result<()> {
        let splitter = store.segment(splitter);
        let delta = splitter.delta();

        let mut seen = HashSet::new();
        let mut vertices: Vec<(VertexIndex, f64)> = collinear
            .iter()
            .copied()
            .filter(|vertex| seen.insert(*vertex))
            .map(|vertex| (vertex, time_along(&splitter.start, &delta, &store.vertex(vertex))))
            .collect();
        if vertices.len() < 2 {
            return Err(InvariantError::TooFewCollinearVertices {
                count: vertices.len(),
            }
            .into());
        }
        vertices.sort_by(|a, b| a.1.total_cmp(&b.1));

        self.vertices = vertices;
        self.cursor = 0;
        self.minisegs.clear();
        self.state = MinisegState::Loaded;
        Ok(())
    }

    /// Handles the next adjacent pair of vertices.
    ///
    /// # Errors
    ///
    /// Returns `InvariantError::InvalidState` when every pair is handled, or
    /// propagates junction and segment errors.
    pub fn execute(
        &mut self,
        store: &mut GeometryStore,
        junctions: &JunctionClassifier,
    ) -> Result<()> {
        if self.state == MinisegState::Finished {
            return Err(
                InvariantError::InvalidState("miniseg creator already finished".to_owned()).into(),
            );
        }
        let (Some(&(first, _)), Some(&(second, _))) = (
            self.vertices.get(self.cursor),
            self.vertices.get(self.cursor + 1),
        ) else {
            return Err(InvariantError::TooFewCollinearVertices {
                count: self.vertices.len(),
            }
            .into());
        };

        self.cursor += 1;
        self.state = if self.cursor + 1 < self.vertices.len() {
            MinisegState::Working
        } else {
            MinisegState::Finished
        };

        if store.contains_segment(first, second) {
            return Ok(());
        }
        if junctions.check_crossing_void(first, &store.vertex(second))? {
            tracing::trace!(?first, ?second, "span crosses the void, no miniseg");
            return Ok(());
        }

        // Minisegs are two-sided, so they have no inbound/outbound pair and
        // never join a junction. Only cutting a one-sided wall adds a wedge.
        let miniseg = store.segment_for(first, second, None, false)?;
        tracing::trace!(?miniseg, ?first, ?second, "created miniseg");
        self.minisegs.push(miniseg);
        Ok(())
    }

    /// Handles every remaining pair.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`MinisegCreator::execute`].
    pub fn execute_all(
        &mut self,
        store: &mut GeometryStore,
        junctions: &JunctionClassifier,
    ) -> Result<()> {
        while self.state != MinisegState::Finished {
            self.execute(store, junctions)?;
        }
        Ok(())
    }
}
