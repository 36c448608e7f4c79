use std::collections::HashMap;

use crate::error::{InvariantError, Result};
use crate::geometry::{Endpoint, GeometryStore, SegmentIndex, VertexIndex};
use crate::math::polygon_2d::signed_area_2d;
use crate::math::side::{distance_to_line, rotation};
use crate::math::{Rotation, TOLERANCE};

/// Progress of a convexity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvexState {
    Loaded,
    Traversing,
    FinishedIsDegenerate,
    FinishedIsConvex,
    FinishedIsSplittable,
}

impl ConvexState {
    #[must_use]
    pub fn is_finished(self) -> bool {
        !matches!(self, ConvexState::Loaded | ConvexState::Traversing)
    }
}

/// One edge of a traversal: `segment` walked away from `endpoint`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalStep {
    pub segment: SegmentIndex,
    pub endpoint: Endpoint,
}

/// Walks a segment set as a single loop to decide whether it is already a
/// convex polygon.
///
/// Loading does the cheap structural checks: fewer than three segments is
/// degenerate, and a vertex with one or three-plus segments means the set
/// cannot be a single loop. Each call to [`ConvexChecker::execute`] then
/// advances the walk by one segment, so the builder can count steps.
#[derive(Debug)]
pub struct ConvexChecker {
    state: ConvexState,
    vertex_map: HashMap<VertexIndex, Vec<TraversalStep>>,
    start_segment: Option<SegmentIndex>,
    current: Option<TraversalStep>,
    rotation: Rotation,
    visited: usize,
    total: usize,
    traversal: Vec<TraversalStep>,
}

impl Default for ConvexChecker {
    fn default() -> Self {
        Self {
            state: ConvexState::FinishedIsDegenerate,
            vertex_map: HashMap::new(),
            start_segment: None,
            current: None,
            rotation: Rotation::On,
            visited: 0,
            total: 0,
            traversal: Vec::new(),
        }
    }
}

impl ConvexChecker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> ConvexState {
        self.state
    }

    /// Rotation of the walk so far, `On` until the first turn.
    #[must_use]
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Resets the checker for a new segment set.
    pub fn load(&mut self, store: &GeometryStore, segments: &[SegmentIndex]) {
        *self = Self::default();
        self.total = segments.len();

        if segments.len() < 3 {
            self.state = ConvexState::FinishedIsDegenerate;
            return;
        }

        for &index in segments {
            let segment = store.segment(index);
            for endpoint in [Endpoint::Start, Endpoint::End] {
                let entries = self.vertex_map.entry(segment.vertex(endpoint)).or_default();
                entries.push(TraversalStep {
                    segment: index,
                    endpoint,
                });
                if entries.len() > 2 {
                    self.state = ConvexState::FinishedIsSplittable;
                    return;
                }
            }
        }

        if self.vertex_map.values().any(|entries| entries.len() == 1) {
            self.state = ConvexState::FinishedIsSplittable;
            return;
        }

        let first = TraversalStep {
            segment: segments[0],
            endpoint: Endpoint::Start,
        };
        self.start_segment = Some(first.segment);
        self.current = Some(first);
        self.state = ConvexState::Loaded;
    }

    /// Walks one segment of the loop.
    ///
    /// # Errors
    ///
    /// Returns `InvariantError::InvalidState` if the check already finished,
    /// or `InvariantError::BrokenTraversal` if the loop cannot be followed.
    pub fn execute(&mut self, store: &GeometryStore) -> Result<()> {
        let (Some(current), Some(start_segment)) = (self.current, self.start_segment) else {
            return Err(InvariantError::InvalidState(format!(
                "convex checker cannot execute in state {:?}",
                self.state
            ))
            .into());
        };
        if self.state.is_finished() {
            return Err(InvariantError::InvalidState(format!(
                "convex checker cannot execute in state {:?}",
                self.state
            ))
            .into());
        }
        self.state = ConvexState::Traversing;

        //   first ----[current]---- pivot
        //                             |
        //                           [next]
        //                             |
        //                           third
        let segment = store.segment(current.segment);
        let first = segment.endpoint(current.endpoint);
        let second = segment.endpoint(current.endpoint.opposite());
        let pivot = segment.vertex(current.endpoint.opposite());

        let next_step = self
            .vertex_map
            .get(&pivot)
            .and_then(|entries| entries.iter().find(|e| e.segment != current.segment))
            .ok_or(InvariantError::BrokenTraversal(pivot))?;
        let next = store.segment(next_step.segment);
        let next_endpoint = next
            .endpoint_at(pivot)
            .ok_or(InvariantError::BrokenTraversal(pivot))?;
        let third = next.endpoint(next_endpoint.opposite());

        // Kinks narrower than the welding distance count as straight.
        let turn = if distance_to_line(&first, &second, &third) <= store.epsilon() {
            Rotation::On
        } else {
            rotation(&first, &second, &third)
        };
        if turn != Rotation::On {
            if self.rotation == Rotation::On {
                self.rotation = turn;
            } else if self.rotation != turn {
                self.state = ConvexState::FinishedIsSplittable;
                return Ok(());
            }
        }

        self.traversal.push(current);
        self.current = Some(TraversalStep {
            segment: next_step.segment,
            endpoint: next_endpoint,
        });
        self.visited += 1;

        if self.visited <= 2 || next_step.segment != start_segment {
            return Ok(());
        }

        self.state = if self.rotation == Rotation::On {
            ConvexState::FinishedIsDegenerate
        } else if self.visited != self.total {
            ConvexState::FinishedIsSplittable
        } else if self.enclosed_area(store).abs() <= TOLERANCE {
            ConvexState::FinishedIsDegenerate
        } else {
            ConvexState::FinishedIsConvex
        };
        Ok(())
    }

    /// Runs the walk to the end and returns the final state.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`ConvexChecker::execute`].
    pub fn execute_all(&mut self, store: &GeometryStore) -> Result<ConvexState> {
        while !self.state.is_finished() {
            self.execute(store)?;
        }
        Ok(self.state)
    }

    /// The walked loop in clockwise order. Only meaningful once the state is
    /// [`ConvexState::FinishedIsConvex`].
    #[must_use]
    pub fn clockwise_traversal(&self) -> Vec<TraversalStep> {
        if self.rotation == Rotation::Left {
            self.traversal
                .iter()
                .rev()
                .map(|step| TraversalStep {
                    segment: step.segment,
                    endpoint: step.endpoint.opposite(),
                })
                .collect()
        } else {
            self.traversal.clone()
        }
    }

    fn enclosed_area(&self, store: &GeometryStore) -> f64 {
        let points: Vec<_> = self
            .traversal
            .iter()
            .map(|step| store.segment(step.segment).endpoint(step.endpoint))
            .collect();
        signed_area_2d(&points)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{closed_loop, segment, L_ROOM, UNIT_SQUARE};

    fn check(store: &GeometryStore, segments: &[SegmentIndex]) -> ConvexChecker {
        let mut checker = ConvexChecker::new();
        checker.load(store, segments);
        checker.execute_all(store).unwrap();
        checker
    }

    #[test]
    fn unit_square_is_convex() {
        let mut store = GeometryStore::new(0.005);
        let segments = closed_loop(&mut store, &UNIT_SQUARE, 0);
        let checker = check(&store, &segments);
        assert_eq!(checker.state(), ConvexState::FinishedIsConvex);
        assert_eq!(checker.rotation(), Rotation::Right);
        let traversal = checker.clockwise_traversal();
        assert_eq!(traversal.len(), 4);
        assert_eq!(traversal[0].segment, segments[0]);
        assert!(traversal.iter().all(|s| s.endpoint == Endpoint::Start));
    }

    #[test]
    fn counter_clockwise_loop_is_reversed() {
        let mut store = GeometryStore::new(0.005);
        let ccw: Vec<_> = UNIT_SQUARE.iter().rev().copied().collect();
        let segments = closed_loop(&mut store, &ccw, 0);
        let checker = check(&store, &segments);
        assert_eq!(checker.state(), ConvexState::FinishedIsConvex);
        assert_eq!(checker.rotation(), Rotation::Left);

        let traversal = checker.clockwise_traversal();
        let points: Vec<_> = traversal
            .iter()
            .map(|s| store.segment(s.segment).endpoint(s.endpoint))
            .collect();
        assert!(signed_area_2d(&points) < 0.0);
        assert!(traversal.iter().all(|s| s.endpoint == Endpoint::End));
    }

    #[test]
    fn l_room_is_splittable() {
        let mut store = GeometryStore::new(0.005);
        let segments = closed_loop(&mut store, &L_ROOM, 0);
        assert_eq!(check(&store, &segments).state(), ConvexState::FinishedIsSplittable);
    }

    #[test]
    fn collinear_loop_is_degenerate() {
        let mut store = GeometryStore::new(0.005);
        let segments = closed_loop(&mut store, &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)], 0);
        assert_eq!(check(&store, &segments).state(), ConvexState::FinishedIsDegenerate);
    }

    #[test]
    fn kink_within_weld_distance_is_straight() {
        let mut store = GeometryStore::new(0.005);
        // The bottom wall bends inward by 0.002 at its middle.
        let segments = closed_loop(
            &mut store,
            &[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.5, 0.002)],
            0,
        );
        let checker = check(&store, &segments);
        assert_eq!(checker.state(), ConvexState::FinishedIsConvex);
        assert_eq!(checker.clockwise_traversal().len(), 5);
    }

    #[test]
    fn too_few_segments_is_degenerate() {
        let mut store = GeometryStore::new(0.005);
        let a = segment(&mut store, (0.0, 0.0), (1.0, 0.0), Some(0), true);
        let b = segment(&mut store, (1.0, 0.0), (1.0, 1.0), Some(1), true);
        let mut checker = ConvexChecker::new();
        checker.load(&store, &[a, b]);
        assert_eq!(checker.state(), ConvexState::FinishedIsDegenerate);
        checker.load(&store, &[]);
        assert_eq!(checker.state(), ConvexState::FinishedIsDegenerate);
    }

    #[test]
    fn dangling_and_triple_vertices_are_splittable() {
        let mut store = GeometryStore::new(0.005);
        let mut segments = closed_loop(&mut store, &UNIT_SQUARE, 0);
        segments.push(segment(&mut store, (1.0, 1.0), (2.0, 2.0), Some(9), false));
        let mut checker = ConvexChecker::new();
        checker.load(&store, &segments);
        assert_eq!(checker.state(), ConvexState::FinishedIsSplittable);

        let mut store = GeometryStore::new(0.005);
        let mut segments = closed_loop(&mut store, &UNIT_SQUARE, 0);
        segments.pop();
        checker.load(&store, &segments);
        assert_eq!(checker.state(), ConvexState::FinishedIsSplittable);
    }

    #[test]
    fn two_disjoint_loops_are_splittable() {
        let mut store = GeometryStore::new(0.005);
        let mut segments = closed_loop(&mut store, &UNIT_SQUARE, 0);
        let shifted: Vec<_> = UNIT_SQUARE.iter().map(|(x, y)| (x + 5.0, *y)).collect();
        segments.extend(closed_loop(&mut store, &shifted, 4));
        assert_eq!(check(&store, &segments).state(), ConvexState::FinishedIsSplittable);
    }

    #[test]
    fn execute_steps_one_segment_at_a_time() {
        let mut store = GeometryStore::new(0.005);
        let segments = closed_loop(&mut store, &UNIT_SQUARE, 0);
        let mut checker = ConvexChecker::new();
        checker.load(&store, &segments);
        assert_eq!(checker.state(), ConvexState::Loaded);
        for _ in 0..3 {
            checker.execute(&store).unwrap();
            assert_eq!(checker.state(), ConvexState::Traversing);
        }
        checker.execute(&store).unwrap();
        assert_eq!(checker.state(), ConvexState::FinishedIsConvex);
        assert!(checker.execute(&store).is_err());
    }
}
