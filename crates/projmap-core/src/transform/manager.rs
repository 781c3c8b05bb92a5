//! Drag sessions and visual placement for regions.

use std::collections::HashMap;

use kurbo::{Affine, Point, Size, Vec2};

use super::handles::{hit_test_handle, CornerHandle};
use super::perspective::{calculate_perspective_matrix, is_quad_warped, Matrix3d};
use crate::region::{rect_corners, Region, RegionId};

/// An in-progress region gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformDrag {
    /// Moving the whole region. `offset` is the pointer relative to the
    /// region position when the drag started.
    MoveRegion { region_id: RegionId, offset: Vec2 },
    /// Dragging one warp corner.
    WarpCorner { region_id: RegionId, corner: CornerHandle },
}

impl TransformDrag {
    pub fn region_id(&self) -> RegionId {
        match *self {
            Self::MoveRegion { region_id, .. } | Self::WarpCorner { region_id, .. } => region_id,
        }
    }
}

/// How the display should place a region's visual container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionVisual {
    /// Canvas position of the container's top-left.
    pub origin: Point,
    pub size: Size,
    /// Rotate, scale and skew about the container centre.
    pub affine: Affine,
    /// Projective warp with a top-left transform origin, when one is in effect.
    pub perspective: Option<Matrix3d>,
}

impl RegionVisual {
    fn new(region: &Region) -> Self {
        Self {
            origin: region.position,
            size: region.size,
            affine: Affine::IDENTITY,
            perspective: None,
        }
    }
}

/// Region transform engine.
///
/// Region geometry itself lives in [`Region`]; this owns the drag session
/// and the per-region visual placement derived from that geometry.
#[derive(Debug, Clone, Default)]
pub struct TransformManager {
    session: Option<TransformDrag>,
    visuals: HashMap<RegionId, RegionVisual>,
}

impl TransformManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Warp handle under `point`, tested at its rotated position.
    pub fn hit_test_handle(&self, point: Point, region: &Region) -> Option<CornerHandle> {
        hit_test_handle(point, region)
    }

    /// Containment in the warp quad. Rotation is deliberately not applied,
    /// matching the editor's existing click behaviour.
    pub fn is_inside_region(&self, point: Point, region: &Region) -> bool {
        region.contains(point)
    }

    /// Start moving `region` (no handle) or warping one of its corners.
    /// A session that is still open is ended first.
    pub fn start_drag(&mut self, point: Point, handle: Option<CornerHandle>, region: &Region) {
        if let Some(previous) = self.session.take() {
            log::debug!("ending stale drag on region {}", previous.region_id());
        }
        let session = match handle {
            None => TransformDrag::MoveRegion {
                region_id: region.id,
                offset: point - region.position,
            },
            Some(corner) => TransformDrag::WarpCorner {
                region_id: region.id,
                corner,
            },
        };
        log::debug!("start {session:?}");
        self.session = Some(session);
    }

    /// Continue the session with the pointer at `point`.
    ///
    /// `region` must be the region the session was started on; returns
    /// false when there is no session or it belongs to another region.
    pub fn drag(&mut self, point: Point, region: &mut Region) -> bool {
        let Some(session) = self.session else {
            return false;
        };
        if session.region_id() != region.id {
            return false;
        }
        match session {
            TransformDrag::MoveRegion { offset, .. } => {
                region.position = point - offset;
                self.update_origin(region);
            }
            TransformDrag::WarpCorner { corner, .. } => {
                region.corners[corner.index()] = (point - region.position).to_point();
                self.apply_corner_transform(region);
            }
        }
        true
    }

    pub fn end_drag(&mut self) {
        if let Some(session) = self.session.take() {
            log::debug!("end drag on region {}", session.region_id());
        }
    }

    pub fn session(&self) -> Option<TransformDrag> {
        self.session
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// Recompute the projective warp from the region's four corners.
    ///
    /// On a singular system the previous visual is left untouched and
    /// false is returned.
    pub fn apply_corner_transform(&mut self, region: &Region) -> bool {
        let source = rect_corners(region.size);
        let Some(matrix) = calculate_perspective_matrix(&source, &region.corners) else {
            log::warn!("region {} corners are degenerate; keeping previous warp", region.id);
            return false;
        };
        let visual = self.visual_entry(region);
        visual.perspective = Some(matrix);
        visual.origin = region.position;
        visual.size = region.size;
        true
    }

    /// Refresh the classic transform, then the warp placement.
    pub fn apply_transform(&mut self, region: &Region) {
        let visual = self.visual_entry(region);
        visual.affine = region.transform.to_affine(region.size);
        visual.size = region.size;
        self.apply_perspective_transform(region);
    }

    /// Use the projective matrix for warped quads; otherwise fall back to
    /// placing the container at the first corner.
    pub fn apply_perspective_transform(&mut self, region: &Region) {
        let warped = is_quad_warped(&region.corners, region.size);
        let matrix = if warped {
            calculate_perspective_matrix(&rect_corners(region.size), &region.corners)
        } else {
            None
        };
        let visual = self.visual_entry(region);
        match matrix {
            Some(matrix) => {
                visual.perspective = Some(matrix);
                visual.origin = region.position;
            }
            // Degenerate warp: hold on to whatever matrix was last valid.
            None if warped && visual.perspective.is_some() => {
                log::warn!("region {} corners are degenerate; keeping previous warp", region.id);
                visual.origin = region.position;
            }
            None => {
                visual.perspective = None;
                visual.origin = region.position + region.corners[0].to_vec2();
            }
        }
    }

    /// Identity transform and rectangular corners.
    pub fn reset_transform(&mut self, region: &mut Region) {
        region.reset_transform();
        self.apply_transform(region);
    }

    /// Set the rotation in degrees.
    pub fn rotate_region(&mut self, region: &mut Region, degrees: f64) {
        region.transform.rotation = degrees;
        self.apply_transform(region);
    }

    pub fn scale_region(&mut self, region: &mut Region, scale_x: f64, scale_y: f64) {
        region.transform.scale_x = scale_x;
        region.transform.scale_y = scale_y;
        self.apply_transform(region);
    }

    /// Set the skew angles in degrees.
    pub fn skew_region(&mut self, region: &mut Region, skew_x: f64, skew_y: f64) {
        region.transform.skew_x = skew_x;
        region.transform.skew_y = skew_y;
        self.apply_transform(region);
    }

    /// Current placement for a region, once any transform has been applied.
    pub fn visual(&self, id: RegionId) -> Option<&RegionVisual> {
        self.visuals.get(&id)
    }

    /// Drop state for a removed region.
    pub fn forget(&mut self, id: RegionId) {
        self.visuals.remove(&id);
        if self.session.is_some_and(|s| s.region_id() == id) {
            self.session = None;
        }
    }

    pub fn clear(&mut self) {
        self.visuals.clear();
        self.session = None;
    }

    fn update_origin(&mut self, region: &Region) {
        let visual = self.visual_entry(region);
        visual.origin = if visual.perspective.is_some() {
            region.position
        } else {
            region.position + region.corners[0].to_vec2()
        };
    }

    fn visual_entry(&mut self, region: &Region) -> &mut RegionVisual {
        self.visuals
            .entry(region.id)
            .or_insert_with(|| RegionVisual::new(region))
    }
}
