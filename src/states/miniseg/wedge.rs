use crate::geometry::BspSegment;
use crate::math::Point2;

/// The angular region between an inbound and an outbound one-sided segment
/// meeting at a junction vertex.
///
/// The wedge is acute when the outbound segment turns right relative to the
/// inbound one, and obtuse otherwise. An acute wedge contains the points on
/// the right of both segments; an obtuse wedge contains the points on the
/// right of either. The two tests are the same clockwise sweep seen from
/// opposite sides of a straight angle.
#[derive(Debug, Clone, PartialEq)]
pub struct JunctionWedge {
    pub inbound: BspSegment,
    pub outbound: BspSegment,
    pub obtuse: bool,
}

impl JunctionWedge {
    #[must_use]
    pub fn new(inbound: &BspSegment, outbound: &BspSegment) -> Self {
        Self {
            inbound: inbound.clone(),
            outbound: outbound.clone(),
            obtuse: !inbound.on_right(&outbound.end),
        }
    }

    /// True if `point` lies inside the wedge.
    #[must_use]
    pub fn between(&self, point: &Point2) -> bool {
        let right_of_inbound = self.inbound.on_right(point);
        let right_of_outbound = self.outbound.on_right(point);
        if self.obtuse {
            right_of_inbound || right_of_outbound
        } else {
            right_of_inbound && right_of_outbound
        }
    }
}
