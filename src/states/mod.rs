//! Sub-state-machines driven by the builder. Each exposes `execute` for a
//! single step and `execute_all` to run its phase to the end.

pub mod convex;
pub mod miniseg;
pub mod partition;
pub mod split;

pub use convex::{ConvexChecker, ConvexState, TraversalStep};
pub use miniseg::{JunctionClassifier, MinisegCreator, MinisegState};
pub use partition::{PartitionState, Partitioner};
pub use split::{SplitCalculator, SplitState};
