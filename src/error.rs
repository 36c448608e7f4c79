use thiserror::Error;

use crate::geometry::{SegmentIndex, VertexIndex};

/// Top-level error type for BSP construction.
#[derive(Debug, Error)]
pub enum BspError {
    #[error(transparent)]
    Invariant(#[from] InvariantError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Violations of the builder's sequencing invariants.
///
/// These indicate a bug in the algorithm (or an input so pathological that
/// it could not terminate), never a recoverable condition.
#[derive(Debug, Error)]
pub enum InvariantError {
    #[error("junction wedges were already generated")]
    WedgesAlreadyGenerated,

    #[error("junctions were already finalized")]
    JunctionsAlreadyFinalized,

    #[error("junctions must be finalized before they are queried")]
    JunctionsNotFinalized,

    #[error("miniseg generation needs at least 2 collinear vertices, got {count}")]
    TooFewCollinearVertices { count: usize },

    #[error("work item ceiling of {limit} exceeded, input is pathological")]
    WorkItemCeilingExceeded { limit: usize },

    #[error("segment cannot start and end at the same vertex {0:?}")]
    ZeroLengthSegment(VertexIndex),

    #[error("split time {t} is not strictly inside segment {segment:?}")]
    SplitOutOfRange { segment: SegmentIndex, t: f64 },

    #[error("cannot tell which side of the splitter segment {0:?} is on")]
    AmbiguousSide(SegmentIndex),

    #[error("non-parallel segments {0:?} and {1:?} failed to intersect")]
    MissingIntersection(SegmentIndex, SegmentIndex),

    #[error("convex traversal broke at vertex {0:?}")]
    BrokenTraversal(VertexIndex),

    #[error("subsector edges are not a closed loop")]
    OpenSubsector,

    #[error("invalid state: {0}")]
    InvalidState(String),
}

/// Errors related to an invalid [`crate::config::BspConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parameter {name} = {value} is invalid: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

/// Convenience type alias for results using [`BspError`].
pub type Result<T> = std::result::Result<T, BspError>;
