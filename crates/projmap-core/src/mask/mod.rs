//! Mask engine: free-form occluding polygons.
//!
//! Masks are authored point by point with the mask tool, may mix straight
//! and Bezier edges, and once closed hide whatever lies beneath them in the
//! projected output. Only closed masks take part in containment tests.

mod manager;
mod path;
mod point;

pub use manager::{
    MaskManager, PointHit, PointTarget, SegmentHit, POINT_HIT_RADIUS, SEGMENT_HIT_DISTANCE,
};
pub use point::{Mask, MaskId, MaskPoint, PointKind, BEZIER_HANDLE_OFFSET};
