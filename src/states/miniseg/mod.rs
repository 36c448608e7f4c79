pub mod classifier;
pub mod creator;
pub mod junction;
pub mod wedge;

pub use classifier::JunctionClassifier;
pub use creator::{MinisegCreator, MinisegState};
pub use junction::{angle_score, Junction};
pub use wedge::JunctionWedge;
