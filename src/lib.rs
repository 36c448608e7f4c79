pub mod builder;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod geometry;
pub mod line;
pub mod math;
pub mod node;
pub mod states;

#[cfg(test)]
pub(crate) mod testing;

pub use builder::{BspBuilder, BuilderState, WorkItem};
pub use config::{BranchOrder, BspConfig, SplitWeights};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::{BspError, Result};
pub use line::{BspLine, LineId, MapLine};
pub use node::{BspNode, Splitter, Subsector, SubsectorEdge};
