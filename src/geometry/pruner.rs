use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use super::segment::{BspSegment, SegmentIndex};
use super::vertex::VertexIndex;

/// Removes dangling chains of segments before a build.
///
/// A vertex with exactly one incident segment is the tail of a terminal
/// chain. Chains are cut from their tail until a vertex with two or more
/// remaining segments is reached, and this repeats until no tails are
/// left. In a fully degenerate map every segment can be pruned.
#[derive(Debug, Default)]
pub struct SegmentChainPruner {
    adjacency: BTreeMap<VertexIndex, Vec<VertexIndex>>,
    edges: HashMap<(VertexIndex, VertexIndex), SegmentIndex>,
    pruned: BTreeSet<SegmentIndex>,
}

impl SegmentChainPruner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prunes every terminal chain and returns the surviving segments in
    /// their original order.
    pub fn prune<'a>(
        &mut self,
        segments: impl IntoIterator<Item = &'a BspSegment>,
    ) -> Vec<SegmentIndex> {
        self.adjacency.clear();
        self.edges.clear();
        self.pruned.clear();

        let mut order = Vec::new();
        for segment in segments {
            order.push(segment.index);
            self.edges
                .insert(edge_key(segment.start_index, segment.end_index), segment.index);
            self.adjacency
                .entry(segment.start_index)
                .or_default()
                .push(segment.end_index);
            self.adjacency
                .entry(segment.end_index)
                .or_default()
                .push(segment.start_index);
        }

        let mut tails: VecDeque<VertexIndex> = self
            .adjacency
            .iter()
            .filter(|(_, adjacent)| adjacent.len() == 1)
            .map(|(vertex, _)| *vertex)
            .collect();

        while let Some(tail) = tails.pop_front() {
            let Some(next) = self.single_neighbour(tail) else {
                // Already consumed from the other end of the chain.
                continue;
            };
            self.cut(tail, next);
            if self.adjacency.get(&next).is_some_and(|adjacent| adjacent.len() == 1) {
                tails.push_back(next);
            }
        }

        order
            .into_iter()
            .filter(|index| !self.pruned.contains(index))
            .collect()
    }

    /// Segments removed by the last call to [`Self::prune`].
    #[must_use]
    pub fn pruned(&self) -> &BTreeSet<SegmentIndex> {
        &self.pruned
    }

    fn single_neighbour(&self, vertex: VertexIndex) -> Option<VertexIndex> {
        match self.adjacency.get(&vertex) {
            Some(adjacent) if adjacent.len() == 1 => Some(adjacent[0]),
            _ => None,
        }
    }

    fn cut(&mut self, from: VertexIndex, to: VertexIndex) {
        if let Some(index) = self.edges.remove(&edge_key(from, to)) {
            self.pruned.insert(index);
        }
        self.unlink(from, to);
        self.unlink(to, from);
    }

    fn unlink(&mut self, from: VertexIndex, to: VertexIndex) {
        let Some(adjacent) = self.adjacency.get_mut(&from) else {
            return;
        };
        if let Some(pos) = adjacent.iter().position(|v| *v == to) {
            adjacent.swap_remove(pos);
        }
        if adjacent.is_empty() {
            self.adjacency.remove(&from);
        }
    }
}

fn edge_key(a: VertexIndex, b: VertexIndex) -> (VertexIndex, VertexIndex) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
