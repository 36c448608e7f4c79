use crate::geometry::{SegmentIndex, VertexIndex};
use crate::line::LineId;

/// A tolerated problem noticed while building.
///
/// None of these stop the build, but most mean the input map is malformed
/// and the resulting tree may be too.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A junction whose inbound and outbound one-sided counts differ, which
    /// usually means an unclosed boundary.
    JunctionCountMismatch {
        vertex: VertexIndex,
        inbound: usize,
        outbound: usize,
    },
    /// A split landed so close to an endpoint that the side test of the
    /// first half was ambiguous.
    TightEndpointSplit { segment: SegmentIndex },
    /// An input line whose endpoints weld into one vertex.
    ZeroLengthLine { line: LineId },
    /// An input line with the same endpoints as an earlier one.
    DuplicateLine { line: LineId, existing: SegmentIndex },
    /// Segments removed because they were part of dangling chains.
    PrunedDanglingSegments { count: usize },
}

/// Collects diagnostics for one build and mirrors them to `tracing`.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty diagnostics list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::JunctionCountMismatch {
                vertex,
                inbound,
                outbound,
            } => tracing::warn!(
                ?vertex,
                inbound,
                outbound,
                "junction has mismatched one-sided segments, tree likely malformed"
            ),
            Diagnostic::TightEndpointSplit { segment } => {
                tracing::warn!(?segment, "very tight endpoint split");
            }
            Diagnostic::ZeroLengthLine { line } => {
                tracing::warn!(?line, "skipping zero length line");
            }
            Diagnostic::DuplicateLine { line, existing } => {
                tracing::warn!(?line, ?existing, "skipping duplicate line");
            }
            Diagnostic::PrunedDanglingSegments { count } => {
                tracing::debug!(count, "pruned dangling segments");
            }
        }
        self.entries.push(diagnostic);
    }

    /// Returns every diagnostic reported so far, in order.
    #[must_use]
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
