use crate::error::{InvariantError, Result};
use crate::geometry::BspSegment;
use crate::math::Point2;

use super::wedge::JunctionWedge;

/// The one-sided segments meeting at a vertex and the wedges built from
/// them.
#[derive(Debug, Clone, Default)]
pub struct Junction {
    inbound: Vec<BspSegment>,
    outbound: Vec<BspSegment>,
    wedges: Vec<JunctionWedge>,
}

impl Junction {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Segments ending at this vertex.
    #[must_use]
    pub fn inbound(&self) -> &[BspSegment] {
        &self.inbound
    }

    /// Segments starting at this vertex.
    #[must_use]
    pub fn outbound(&self) -> &[BspSegment] {
        &self.outbound
    }

    #[must_use]
    pub fn wedges(&self) -> &[JunctionWedge] {
        &self.wedges
    }

    pub fn add_inbound(&mut self, segment: &BspSegment) {
        if !self.inbound.iter().any(|s| s.index == segment.index) {
            self.inbound.push(segment.clone());
        }
    }

    pub fn add_outbound(&mut self, segment: &BspSegment) {
        if !self.outbound.iter().any(|s| s.index == segment.index) {
            self.outbound.push(segment.clone());
        }
    }

    /// True if the inbound and outbound counts differ, which points at a
    /// malformed map.
    #[must_use]
    pub fn has_unexpected_count(&self) -> bool {
        self.inbound.len() != self.outbound.len()
    }

    /// Pairs every inbound segment with its tightest outbound segment.
    ///
    /// # Errors
    ///
    /// Returns `InvariantError::WedgesAlreadyGenerated` on a second call.
    pub fn generate_wedges(&mut self) -> Result<()> {
        if !self.wedges.is_empty() {
            return Err(InvariantError::WedgesAlreadyGenerated.into());
        }

        for inbound in &self.inbound {
            let mut closest: Option<(&BspSegment, f64)> = None;
            for outbound in &self.outbound {
                let score = angle_score(inbound, outbound);
                if closest.map_or(true, |(_, best)| score < best) {
                    closest = Some((outbound, score));
                }
            }
            // A dangling one-sided line has nothing to pair with.
            if let Some((outbound, _)) = closest {
                self.wedges.push(JunctionWedge::new(inbound, outbound));
            }
        }
        Ok(())
    }

    /// Adds a wedge that is known to be valid, such as the two halves of a
    /// split one-sided line.
    pub fn add_wedge(&mut self, inbound: &BspSegment, outbound: &BspSegment) {
        self.wedges.push(JunctionWedge::new(inbound, outbound));
    }

    /// True if `point` is inside any wedge.
    #[must_use]
    pub fn between_wedge(&self, point: &Point2) -> bool {
        self.wedges.iter().any(|wedge| wedge.between(point))
    }
}

/// Orders outbound candidates for an inbound segment. Lower is a tighter
/// clockwise turn.
///
/// Right turns map to `[-1, 1]` by negated cosine; everything else maps to
/// `[1, 3]`, so any right turn beats any left turn.
#[must_use]
pub fn angle_score(inbound: &BspSegment, outbound: &BspSegment) -> f64 {
    let back = inbound.start - inbound.end;
    let forward = outbound.end - outbound.start;
    let cos_theta = forward.dot(&back) / (forward.norm() * back.norm());
    if inbound.on_right(&outbound.end) {
        -cos_theta
    } else {
        cos_theta + 2.0
    }
}
