pub mod align;
pub mod error;
pub mod id;
pub mod model;
pub mod zorder;

pub use align::{AlignmentLines, DragFrame, DragSession, GuideLines, SnapCandidate};
pub use error::ModelError;
pub use id::ComponentKey;
pub use model::*;
pub use zorder::{place_bottom, place_top};
