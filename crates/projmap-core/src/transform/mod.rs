//! Region transform engine.
//!
//! Regions are warped by dragging their four corners. The warp is
//! realized as a projective matrix solved from the untransformed rectangle
//! onto the current corners; when no warp is in effect the display just
//! places the container at the first corner.

mod handles;
mod manager;
mod perspective;

pub use handles::{handles, hit_test_handle, CornerHandle, Handle, HANDLE_HIT_RADIUS};
pub use manager::{RegionVisual, TransformDrag, TransformManager};
pub use perspective::{calculate_perspective_matrix, is_quad_warped, Matrix3d, WARP_TOLERANCE};
