use std::collections::HashMap;

use crate::math::Point2;

/// Stable index of a welded vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexIndex(pub usize);

/// Deduplicates points within an epsilon distance.
///
/// Points are bucketed into a grid whose cells are one epsilon wide, so a
/// lookup only has to inspect the 3x3 block of cells around the query.
/// The first vertex registered near a position wins, which keeps indices
/// reproducible for a given input order.
#[derive(Debug)]
pub struct VertexAllocator {
    epsilon: f64,
    points: Vec<Point2>,
    grid: HashMap<(i64, i64), Vec<VertexIndex>>,
}

impl VertexAllocator {
    /// Creates an empty allocator that welds points within `epsilon`.
    #[must_use]
    pub fn new(epsilon: f64) -> Self {
        Self {
            epsilon,
            points: Vec::new(),
            grid: HashMap::new(),
        }
    }

    /// Number of distinct vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The welding distance.
    #[must_use]
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Returns the position of a vertex.
    ///
    /// # Panics
    ///
    /// Panics if the index was not allocated by this allocator.
    #[must_use]
    pub fn position(&self, index: VertexIndex) -> Point2 {
        self.points[index.0]
    }

    /// Looks up the vertex within epsilon of `point` without creating one.
    #[must_use]
    pub fn find(&self, point: &Point2) -> Option<VertexIndex> {
        let (cx, cy) = self.cell_of(point);
        let mut best: Option<(VertexIndex, f64)> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(bucket) = self.grid.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for &index in bucket {
                    let dist = (self.points[index.0] - point).norm();
                    if dist > self.epsilon {
                        continue;
                    }
                    // Lowest index wins so lookups do not depend on bucket order.
                    if best.map_or(true, |(b, _)| index < b) {
                        best = Some((index, dist));
                    }
                }
            }
        }
        best.map(|(index, _)| index)
    }

    /// Returns the index for `point`, creating a vertex if none is within
    /// epsilon. The flag is true when a new vertex was created.
    pub fn index_of(&mut self, point: Point2) -> (VertexIndex, bool) {
        if let Some(index) = self.find(&point) {
            return (index, false);
        }
        let index = VertexIndex(self.points.len());
        self.points.push(point);
        let cell = self.cell_of(&point);
        self.grid.entry(cell).or_default().push(index);
        (index, true)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cell_of(&self, point: &Point2) -> (i64, i64) {
        (
            (point.x / self.epsilon).floor() as i64,
            (point.y / self.epsilon).floor() as i64,
        )
    }
}
