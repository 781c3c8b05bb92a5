//! Projection mapping editor core.
//!
//! Platform-agnostic geometry, hit testing and input routing for an editor
//! that places warpable regions hosting generative programs on a canvas and
//! cuts occluding masks out of the projected output.

pub mod document;
pub mod geometry;
pub mod input;
pub mod mask;
pub mod region;
pub mod router;
pub mod storage;
pub mod tools;
pub mod transform;

pub use document::{DocumentError, ProjectDocument, DOCUMENT_VERSION};
pub use input::{InputState, KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use mask::{Mask, MaskId, MaskManager, MaskPoint, PointKind};
pub use region::{Region, RegionId, RegionManager, RegionSnapshot, RegionTransform};
pub use router::{EventResponse, InputRouter, Selection};
pub use tools::ToolKind;
pub use transform::{CornerHandle, Matrix3d, RegionVisual, TransformManager};
