//! Shared fixtures for unit tests.

use crate::geometry::{GeometryStore, SegmentIndex};
use crate::line::LineId;
use crate::math::Point2;

/// Adds a closed loop of one-sided segments through `points`, numbering the
/// backing lines from `first_line`.
#[allow(clippy::unwrap_used)]
pub(crate) fn closed_loop(
    store: &mut GeometryStore,
    points: &[(f64, f64)],
    first_line: usize,
) -> Vec<SegmentIndex> {
    let n = points.len();
    (0..n)
        .map(|i| {
            let (sx, sy) = points[i];
            let (ex, ey) = points[(i + 1) % n];
            let a = store.vertex_index_of(Point2::new(sx, sy));
            let b = store.vertex_index_of(Point2::new(ex, ey));
            store
                .segment_for(a, b, Some(LineId(first_line + i)), true)
                .unwrap()
        })
        .collect()
}

/// Adds a single segment.
#[allow(clippy::unwrap_used)]
pub(crate) fn segment(
    store: &mut GeometryStore,
    start: (f64, f64),
    end: (f64, f64),
    line: Option<usize>,
    one_sided: bool,
) -> SegmentIndex {
    let a = store.vertex_index_of(Point2::new(start.0, start.1));
    let b = store.vertex_index_of(Point2::new(end.0, end.1));
    store
        .segment_for(a, b, line.map(LineId), one_sided)
        .unwrap()
}

/// The clockwise L-shaped room used across tests.
pub(crate) const L_ROOM: [(f64, f64); 6] = [
    (0.0, 0.0),
    (0.0, 2.0),
    (1.0, 2.0),
    (1.0, 1.0),
    (2.0, 1.0),
    (2.0, 0.0),
];

pub(crate) const UNIT_SQUARE: [(f64, f64); 4] = [(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)];
