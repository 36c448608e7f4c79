use crate::error::{InvariantError, Result};
use crate::geometry::SegmentIndex;
use crate::line::LineId;
use crate::math::polygon_2d::signed_area_2d;
use crate::math::Point2;

/// The line a split node partitions its children by. Its right side is the
/// right child.
#[derive(Debug, Clone, PartialEq)]
pub struct Splitter {
    pub segment: SegmentIndex,
    pub start: Point2,
    pub end: Point2,
    pub line: Option<LineId>,
}

/// One boundary edge of a subsector.
#[derive(Debug, Clone, PartialEq)]
pub struct SubsectorEdge {
    pub start: Point2,
    pub end: Point2,
    pub segment: SegmentIndex,
    /// The map line behind this edge, `None` for minisegs.
    pub line: Option<LineId>,
    /// True if the edge runs along its segment's direction.
    pub is_front: bool,
}

impl SubsectorEdge {
    #[must_use]
    pub fn is_miniseg(&self) -> bool {
        self.line.is_none()
    }
}

/// A convex leaf polygon with clockwise edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Subsector {
    edges: Vec<SubsectorEdge>,
}

impl Subsector {
    /// Wraps clockwise edges into a subsector.
    ///
    /// # Errors
    ///
    /// Returns `InvariantError::OpenSubsector` if there are fewer than three
    /// edges or they do not join head to tail.
    pub fn new(edges: Vec<SubsectorEdge>) -> Result<Self> {
        if edges.len() < 3 {
            return Err(InvariantError::OpenSubsector.into());
        }
        let closed = edges
            .iter()
            .zip(edges.iter().cycle().skip(1))
            .all(|(edge, next)| edge.end == next.start);
        if !closed {
            return Err(InvariantError::OpenSubsector.into());
        }
        Ok(Self { edges })
    }

    #[must_use]
    pub fn edges(&self) -> &[SubsectorEdge] {
        &self.edges
    }

    /// Corner points in clockwise order.
    #[must_use]
    pub fn vertices(&self) -> Vec<Point2> {
        self.edges.iter().map(|edge| edge.start).collect()
    }

    /// Enclosed area, always positive.
    #[must_use]
    pub fn area(&self) -> f64 {
        signed_area_2d(&self.vertices()).abs()
    }
}

/// A node of the finished tree.
#[derive(Debug, Clone, PartialEq)]
pub enum BspNode {
    Split {
        splitter: Splitter,
        left: Box<BspNode>,
        right: Box<BspNode>,
    },
    Leaf(Subsector),
}

impl BspNode {
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, BspNode::Leaf(_))
    }

    /// All subsectors, left subtrees before right ones.
    #[must_use]
    pub fn subsectors(&self) -> Vec<&Subsector> {
        let mut found = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                BspNode::Leaf(subsector) => found.push(subsector),
                BspNode::Split { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        found
    }

    #[must_use]
    pub fn subsector_count(&self) -> usize {
        self.count_nodes().0
    }

    #[must_use]
    pub fn split_count(&self) -> usize {
        self.count_nodes().1
    }

    #[must_use]
    pub fn total_node_count(&self) -> usize {
        let (leaves, splits) = self.count_nodes();
        leaves + splits
    }

    fn count_nodes(&self) -> (usize, usize) {
        let mut leaves = 0;
        let mut splits = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                BspNode::Leaf(_) => leaves += 1,
                BspNode::Split { left, right, .. } => {
                    splits += 1;
                    stack.push(left);
                    stack.push(right);
                }
            }
        }
        (leaves, splits)
    }
}
