use std::collections::HashSet;

use crate::config::{BspConfig, SplitWeights};
use crate::error::{InvariantError, Result};
use crate::geometry::{BspSegment, GeometryStore, SegmentIndex};
use crate::math::intersect_2d::in_normal_range;
use crate::math::Rotation;

/// Progress of a splitter search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitState {
    Loaded,
    Working,
    Finished,
}

/// Scores candidate splitters one at a time and keeps the cheapest.
///
/// Only one segment per distinct infinite line is scored, since every
/// segment on that line would partition the set identically. Minisegs are
/// never candidates. Ties go to the first candidate seen.
#[derive(Debug)]
pub struct SplitCalculator {
    weights: SplitWeights,
    epsilon: f64,
    punishable_distance: f64,
    state: SplitState,
    segments: Vec<SegmentIndex>,
    candidates: Vec<SegmentIndex>,
    cursor: usize,
    best: Option<(SegmentIndex, i64)>,
}

impl SplitCalculator {
    #[must_use]
    pub fn new(config: &BspConfig) -> Self {
        Self {
            weights: config.split_weights,
            epsilon: config.vertex_weld_epsilon,
            punishable_distance: config.punishable_endpoint_distance,
            state: SplitState::Finished,
            segments: Vec::new(),
            candidates: Vec::new(),
            cursor: 0,
            best: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> SplitState {
        self.state
    }

    /// Prepares a search over `segments`.
    pub fn load(&mut self, store: &GeometryStore, segments: &[SegmentIndex]) {
        let mut seen_lines = HashSet::new();
        self.candidates = segments
            .iter()
            .copied()
            .filter(|index| {
                let segment = store.segment(*index);
                !segment.is_miniseg() && seen_lines.insert(segment.collinear_index)
            })
            .collect();
        self.segments = segments.to_vec();
        self.cursor = 0;
        self.best = None;
        self.state = if self.candidates.is_empty() {
            SplitState::Finished
        } else {
            SplitState::Loaded
        };
    }

    /// Scores the next candidate.
    ///
    /// # Errors
    ///
    /// Returns `InvariantError::InvalidState` once every candidate is scored,
    /// or `InvariantError::MissingIntersection` if non-parallel lines fail
    /// to intersect.
    pub fn execute(&mut self, store: &GeometryStore) -> Result<()> {
        let Some(&candidate) = self.candidates.get(self.cursor) else {
            return Err(InvariantError::InvalidState(
                "split calculator has no candidates left".to_owned(),
            )
            .into());
        };

        let score = self.score(store, candidate)?;
        tracing::trace!(?candidate, score, "scored splitter candidate");
        if self.best.map_or(true, |(_, best)| score < best) {
            self.best = Some((candidate, score));
        }

        self.cursor += 1;
        self.state = if self.cursor < self.candidates.len() {
            SplitState::Working
        } else {
            SplitState::Finished
        };
        Ok(())
    }

    /// Scores every remaining candidate.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`SplitCalculator::execute`].
    pub fn execute_all(&mut self, store: &GeometryStore) -> Result<()> {
        while self.state != SplitState::Finished {
            self.execute(store)?;
        }
        Ok(())
    }

    /// The chosen splitter, falling back to the first segment when no
    /// candidate could be scored.
    #[must_use]
    pub fn best_splitter(&self) -> Option<SegmentIndex> {
        self.best
            .map(|(index, _)| index)
            .or_else(|| self.candidates.first().copied())
            .or_else(|| self.segments.first().copied())
    }

    /// Score of the best candidate so far.
    #[must_use]
    pub fn best_score(&self) -> Option<i64> {
        self.best.map(|(_, score)| score)
    }

    /// Scores `splitter` against the loaded segment set. Lower is better.
    ///
    /// # Errors
    ///
    /// Returns `InvariantError::MissingIntersection` if a non-parallel
    /// segment does not intersect the splitter line.
    pub fn score(&self, store: &GeometryStore, splitter_index: SegmentIndex) -> Result<i64> {
        let splitter = store.segment(splitter_index);
        let mut score = 0i64;
        if !splitter.is_axis_aligned() {
            score += self.weights.not_axis_aligned;
        }

        let mut split_count = 0i64;
        let mut left = 0i64;
        let mut right = 0i64;
        let mut count_side = |segment: &BspSegment| {
            if splitter.side_of_segment(segment) == Rotation::Right {
                right += 1;
            } else {
                left += 1;
            }
        };

        for &index in &self.segments {
            if index == splitter_index {
                continue;
            }
            let segment = store.segment(index);

            if segment.collinear_index == splitter.collinear_index {
                continue;
            }
            if splitter.is_parallel(segment) {
                count_side(segment);
                continue;
            }

            let (t_segment, _) = segment
                .intersection_as_line(splitter)
                .ok_or(InvariantError::MissingIntersection(index, splitter_index))?;
            let (_, nearest) = segment.closest_endpoint(t_segment);

            if in_normal_range(t_segment) && nearest > self.epsilon {
                split_count += 1;
            } else {
                count_side(segment);
            }

            // A near miss still leaves a sliver behind.
            if nearest > self.epsilon && nearest <= self.punishable_distance {
                score += self.weights.near_endpoint_split;
            }
        }

        if split_count == 0 && (left == 0 || right == 0) {
            return Ok(i64::MAX);
        }

        score += (left - right).abs() * self.weights.left_right_imbalance;
        score += split_count * self.weights.split_count;
        Ok(score)
    }
}
