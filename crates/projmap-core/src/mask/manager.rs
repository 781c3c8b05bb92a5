//! Mask collection, authoring and drag sessions.

use kurbo::{Point, Vec2};

use super::point::{Mask, MaskId, MaskPoint};
use crate::geometry::distance_to_segment;

/// Pick radius for points and control points.
pub const POINT_HIT_RADIUS: f64 = 10.0;
/// Pick distance for mask edges.
pub const SEGMENT_HIT_DISTANCE: f64 = 8.0;

/// Which part of a mask point was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointTarget {
    /// The main point.
    Point,
    /// One of the two Bezier control points.
    Control(usize),
}

/// Result of [`MaskManager::hit_test_point`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointHit {
    pub mask_index: usize,
    pub point_index: usize,
    pub target: PointTarget,
}

/// Result of [`MaskManager::hit_test_segment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentHit {
    pub mask_index: usize,
    pub segment_index: usize,
}

/// An in-progress drag gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
enum MaskDrag {
    /// Dragging one point or control point.
    Point {
        mask_id: MaskId,
        point_index: usize,
        target: PointTarget,
    },
    /// Dragging a whole mask. `offset` is the pointer position relative to
    /// the mask's first point when the drag started.
    Mask { mask_id: MaskId, offset: Vec2 },
}

/// Owns every mask plus the authoring and drag state.
#[derive(Debug, Clone)]
pub struct MaskManager {
    /// Masks in insertion order (last is topmost).
    masks: Vec<Mask>,
    /// Mask currently being authored, if any.
    active: Option<MaskId>,
    /// Mask selected with the select tool, if any.
    selected: Option<MaskId>,
    drag: Option<MaskDrag>,
    next_id: MaskId,
}

impl Default for MaskManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MaskManager {
    pub fn new() -> Self {
        Self {
            masks: Vec::new(),
            active: None,
            selected: None,
            drag: None,
            next_id: 1,
        }
    }

    /// Create an empty open mask and make it the authoring target.
    pub fn start_new_mask(&mut self) -> MaskId {
        let id = self.next_id;
        self.next_id += 1;
        self.masks.push(Mask::new(id));
        self.active = Some(id);
        log::debug!("started mask {id}");
        id
    }

    /// Append a point to the authoring mask, creating one if needed.
    pub fn add_point(&mut self, position: Point, bezier: bool) -> MaskPoint {
        let id = match self.active {
            Some(id) if self.index_of(id).is_some() => id,
            _ => self.start_new_mask(),
        };
        let point = if bezier {
            MaskPoint::bezier(position)
        } else {
            MaskPoint::linear(position)
        };
        if let Some(mask) = self.mask_by_id_mut(id) {
            mask.points.push(point);
        }
        point
    }

    /// Insert a curve point right after `segment_index` in the authoring mask.
    pub fn insert_point_on_segment(
        &mut self,
        position: Point,
        segment_index: usize,
    ) -> Option<MaskPoint> {
        let mask = self.active_mask_mut()?;
        if segment_index >= mask.points.len() {
            return None;
        }
        let point = MaskPoint::bezier(position);
        mask.points.insert(segment_index + 1, point);
        Some(point)
    }

    /// Remove a point from the authoring mask. A closed mask that drops
    /// below three points is reopened.
    pub fn remove_point(&mut self, point_index: usize) -> bool {
        let Some(mask) = self.active_mask_mut() else {
            return false;
        };
        if point_index >= mask.points.len() {
            return false;
        }
        mask.points.remove(point_index);
        if mask.closed && mask.points.len() < Mask::MIN_CLOSED_POINTS {
            log::debug!("mask {} reopened with {} points", mask.id, mask.points.len());
            mask.closed = false;
        }
        true
    }

    /// Close the authoring mask. Requires at least three points.
    pub fn close_mask(&mut self) -> bool {
        match self.active_mask_mut() {
            Some(mask) if mask.points.len() >= Mask::MIN_CLOSED_POINTS => {
                mask.closed = true;
                true
            }
            _ => false,
        }
    }

    /// Stop authoring the active mask. Requires at least two points; the
    /// mask stays in the collection either way.
    pub fn finish_mask(&mut self) -> bool {
        match self.active_mask() {
            Some(mask) if mask.points.len() >= 2 => {
                log::debug!("finished mask {}", mask.id);
                self.active = None;
                true
            }
            _ => false,
        }
    }

    /// Find the topmost point or control point within [`POINT_HIT_RADIUS`].
    pub fn hit_test_point(&self, position: Point) -> Option<PointHit> {
        for (mask_index, mask) in self.masks.iter().enumerate().rev() {
            for (point_index, point) in mask.points.iter().enumerate() {
                if position.distance(point.position) <= POINT_HIT_RADIUS {
                    return Some(PointHit {
                        mask_index,
                        point_index,
                        target: PointTarget::Point,
                    });
                }
                if let Some(controls) = point.controls() {
                    if let Some(cp) = controls
                        .iter()
                        .position(|cp| position.distance(*cp) <= POINT_HIT_RADIUS)
                    {
                        return Some(PointHit {
                            mask_index,
                            point_index,
                            target: PointTarget::Control(cp),
                        });
                    }
                }
            }
        }
        None
    }

    /// Find the topmost edge within [`SEGMENT_HIT_DISTANCE`].
    pub fn hit_test_segment(&self, position: Point) -> Option<SegmentHit> {
        self.masks.iter().enumerate().rev().find_map(|(mask_index, mask)| {
            mask.segments()
                .find(|&(_, a, b)| distance_to_segment(position, a, b) <= SEGMENT_HIT_DISTANCE)
                .map(|(segment_index, _, _)| SegmentHit {
                    mask_index,
                    segment_index,
                })
        })
    }

    /// Begin dragging a point or control point. Ends any running drag.
    pub fn start_drag(&mut self, hit: PointHit) -> bool {
        let Some(mask) = self.masks.get(hit.mask_index) else {
            return false;
        };
        if hit.point_index >= mask.points.len() {
            return false;
        }
        if self.drag.is_some() {
            log::debug!("mask drag replaced before pointer up");
        }
        self.drag = Some(MaskDrag::Point {
            mask_id: mask.id,
            point_index: hit.point_index,
            target: hit.target,
        });
        true
    }

    /// Begin dragging a whole mask and select it. Ends any running drag.
    pub fn start_mask_drag(&mut self, position: Point, mask_index: usize) -> bool {
        let Some(mask) = self.masks.get(mask_index) else {
            return false;
        };
        let offset = mask
            .points
            .first()
            .map_or(Vec2::ZERO, |first| position - first.position);
        if self.drag.is_some() {
            log::debug!("mask drag replaced before pointer up");
        }
        self.selected = Some(mask.id);
        self.drag = Some(MaskDrag::Mask {
            mask_id: mask.id,
            offset,
        });
        true
    }

    /// Continue the running drag, if any.
    pub fn drag(&mut self, position: Point) {
        match self.drag {
            Some(MaskDrag::Mask { .. }) => self.drag_mask(position),
            Some(MaskDrag::Point {
                mask_id,
                point_index,
                target,
            }) => {
                let Some(point) = self
                    .mask_by_id_mut(mask_id)
                    .and_then(|m| m.points.get_mut(point_index))
                else {
                    return;
                };
                match target {
                    PointTarget::Point => point.translate(position - point.position),
                    PointTarget::Control(i) => {
                        if let Some(cp) = point.controls_mut().and_then(|c| c.get_mut(i)) {
                            *cp = position;
                        }
                    }
                }
            }
            None => {}
        }
    }

    /// Move the dragged mask so its first point sits at `position - offset`.
    ///
    /// The delta is measured against the current first point on every call,
    /// so repeated calls with the same pointer position are idempotent.
    pub fn drag_mask(&mut self, position: Point) {
        let Some(MaskDrag::Mask { mask_id, offset }) = self.drag else {
            return;
        };
        let Some(mask) = self.mask_by_id_mut(mask_id) else {
            return;
        };
        let Some(first) = mask.points.first() else {
            return;
        };
        let delta = (position - offset) - first.position;
        mask.translate(delta);
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Containment test for a specific mask.
    pub fn is_point_inside_mask(position: Point, mask: &Mask) -> bool {
        mask.contains(position)
    }

    /// Index of the topmost closed mask containing `position`.
    pub fn hit_test_mask(&self, position: Point) -> Option<usize> {
        self.masks.iter().rposition(|m| m.contains(position))
    }

    /// Select a mask by collection index, or clear the selection with `None`
    /// or an out-of-range index.
    pub fn select_mask_by_index(&mut self, index: Option<usize>) -> Option<&Mask> {
        match index.and_then(|i| self.masks.get(i)) {
            Some(mask) => {
                self.selected = Some(mask.id);
                Some(mask)
            }
            None => {
                self.selected = None;
                None
            }
        }
    }

    /// Resume authoring an existing mask.
    pub fn edit_mask(&mut self, id: MaskId) -> bool {
        if self.index_of(id).is_some() {
            self.active = Some(id);
            true
        } else {
            false
        }
    }

    /// Delete a mask by id. Clears authoring, selection and drag state that
    /// referred to it.
    pub fn delete_mask(&mut self, id: MaskId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.masks.remove(index);
        if self.active == Some(id) {
            self.active = None;
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
        let dragging_deleted = match self.drag {
            Some(MaskDrag::Mask { mask_id, .. }) | Some(MaskDrag::Point { mask_id, .. }) => {
                mask_id == id
            }
            None => false,
        };
        if dragging_deleted {
            self.drag = None;
        }
        log::debug!("deleted mask {id}");
        true
    }

    /// Remove every mask and reset all session state.
    pub fn clear(&mut self) {
        self.masks.clear();
        self.active = None;
        self.selected = None;
        self.drag = None;
    }

    pub fn masks(&self) -> &[Mask] {
        &self.masks
    }

    pub fn get(&self, id: MaskId) -> Option<&Mask> {
        self.masks.iter().find(|m| m.id == id)
    }

    pub fn active_mask(&self) -> Option<&Mask> {
        self.active.and_then(|id| self.get(id))
    }

    pub fn selected_mask(&self) -> Option<&Mask> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Id that the next created mask will receive.
    pub fn next_id(&self) -> MaskId {
        self.next_id
    }

    /// Plain copy of the collection for persistence.
    pub fn to_snapshot(&self) -> Vec<Mask> {
        self.masks.clone()
    }

    /// Replace the collection from a snapshot.
    pub fn restore(&mut self, masks: Vec<Mask>) {
        if let Some(max) = masks.iter().map(|m| m.id).max() {
            self.next_id = max + 1;
        }
        self.masks = masks;
        self.active = None;
        self.selected = None;
        self.drag = None;
    }

    fn index_of(&self, id: MaskId) -> Option<usize> {
        self.masks.iter().position(|m| m.id == id)
    }

    fn mask_by_id_mut(&mut self, id: MaskId) -> Option<&mut Mask> {
        self.masks.iter_mut().find(|m| m.id == id)
    }

    fn active_mask_mut(&mut self) -> Option<&mut Mask> {
        let id = self.active?;
        self.mask_by_id_mut(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::PointKind;

    fn square(manager: &mut MaskManager, origin: Point, size: f64) -> MaskId {
        let id = manager.start_new_mask();
        manager.add_point(origin, false);
        manager.add_point(Point::new(origin.x + size, origin.y), false);
        manager.add_point(Point::new(origin.x + size, origin.y + size), false);
        manager.add_point(Point::new(origin.x, origin.y + size), false);
        assert!(manager.close_mask());
        assert!(manager.finish_mask());
        id
    }

    #[test]
    fn test_add_point_creates_mask() {
        let mut manager = MaskManager::new();
        manager.add_point(Point::new(1.0, 2.0), false);
        assert_eq!(manager.masks().len(), 1);
        assert_eq!(manager.active_mask().unwrap().points.len(), 1);
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut manager = MaskManager::new();
        let a = manager.start_new_mask();
        let b = manager.start_new_mask();
        assert!(manager.delete_mask(b));
        let c = manager.start_new_mask();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_close_requires_three_points() {
        let mut manager = MaskManager::new();
        manager.add_point(Point::new(0.0, 0.0), false);
        manager.add_point(Point::new(10.0, 0.0), false);
        assert!(!manager.close_mask());
        assert!(!manager.active_mask().unwrap().closed);

        manager.add_point(Point::new(10.0, 10.0), false);
        assert!(manager.close_mask());
        assert!(manager.active_mask().unwrap().closed);
    }

    #[test]
    fn test_finish_requires_two_points() {
        let mut manager = MaskManager::new();
        manager.add_point(Point::new(0.0, 0.0), false);
        assert!(!manager.finish_mask());
        assert!(manager.active_mask().is_some());

        manager.add_point(Point::new(10.0, 0.0), false);
        assert!(manager.finish_mask());
        assert!(manager.active_mask().is_none());
        assert_eq!(manager.masks().len(), 1);
    }

    #[test]
    fn test_square_scenario() {
        let mut manager = MaskManager::new();
        manager.start_new_mask();
        for (x, y) in [(10.0, 10.0), (100.0, 10.0), (100.0, 100.0), (10.0, 100.0)] {
            manager.add_point(Point::new(x, y), false);
        }
        assert!(manager.close_mask());
        let mask = manager.active_mask().unwrap();
        assert!(mask.closed);
        assert!(MaskManager::is_point_inside_mask(Point::new(50.0, 50.0), mask));
        assert!(!MaskManager::is_point_inside_mask(Point::new(200.0, 200.0), mask));
    }

    #[test]
    fn test_convex_centroid_inside() {
        let mut manager = MaskManager::new();
        manager.start_new_mask();
        for (x, y) in [(0.0, 0.0), (80.0, -10.0), (120.0, 40.0), (60.0, 110.0), (-20.0, 60.0)] {
            manager.add_point(Point::new(x, y), false);
        }
        manager.close_mask();
        let mask = manager.active_mask().unwrap();
        assert!(mask.contains(mask.centroid().unwrap()));
        assert!(!mask.contains(Point::new(1000.0, -1000.0)));
    }

    #[test]
    fn test_insert_point_on_segment() {
        let mut manager = MaskManager::new();
        manager.add_point(Point::new(0.0, 0.0), false);
        manager.add_point(Point::new(100.0, 0.0), false);
        manager.add_point(Point::new(100.0, 100.0), false);

        let inserted = manager.insert_point_on_segment(Point::new(50.0, 0.0), 0).unwrap();
        let mask = manager.active_mask().unwrap();
        assert_eq!(mask.points.len(), 4);
        assert_eq!(mask.points[1], inserted);
        assert!(matches!(mask.points[1].kind, PointKind::Bezier { .. }));

        assert!(manager.insert_point_on_segment(Point::ZERO, 4).is_none());
        assert_eq!(manager.active_mask().unwrap().points.len(), 4);
    }

    #[test]
    fn test_insert_without_active_mask() {
        let mut manager = MaskManager::new();
        assert!(manager.insert_point_on_segment(Point::ZERO, 0).is_none());
    }

    #[test]
    fn test_remove_point() {
        let mut manager = MaskManager::new();
        manager.add_point(Point::new(0.0, 0.0), false);
        manager.add_point(Point::new(10.0, 0.0), false);
        assert!(!manager.remove_point(5));
        assert!(manager.remove_point(0));
        let mask = manager.active_mask().unwrap();
        assert_eq!(mask.points.len(), 1);
        assert_eq!(mask.points[0].position, Point::new(10.0, 0.0));
    }

    #[test]
    fn test_remove_point_reopens_mask() {
        let mut manager = MaskManager::new();
        for (x, y) in [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)] {
            manager.add_point(Point::new(x, y), false);
        }
        assert!(manager.close_mask());
        assert!(manager.remove_point(0));

        let mask = manager.active_mask().unwrap();
        assert_eq!(mask.points.len(), 2);
        assert!(!mask.closed);
        assert!(!mask.to_path().elements().contains(&kurbo::PathEl::ClosePath));
        assert!(!manager.close_mask());
    }

    #[test]
    fn test_remove_point_keeps_large_mask_closed() {
        let mut manager = MaskManager::new();
        for (x, y) in [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)] {
            manager.add_point(Point::new(x, y), false);
        }
        manager.close_mask();
        manager.remove_point(3);
        assert!(manager.active_mask().unwrap().closed);
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let mut manager = MaskManager::new();
        manager.add_point(Point::new(50.0, 50.0), false);
        manager.finish_mask();
        manager.start_new_mask();
        manager.add_point(Point::new(52.0, 50.0), false);

        let hit = manager.hit_test_point(Point::new(51.0, 50.0)).unwrap();
        assert_eq!(hit.mask_index, 1);
        assert_eq!(hit.target, PointTarget::Point);
    }

    #[test]
    fn test_hit_test_control_point() {
        let mut manager = MaskManager::new();
        manager.add_point(Point::new(100.0, 100.0), true);
        let hit = manager.hit_test_point(Point::new(131.0, 101.0)).unwrap();
        assert_eq!(hit.target, PointTarget::Control(1));
        assert!(manager.hit_test_point(Point::new(115.0, 100.0)).is_none());
    }

    #[test]
    fn test_hit_test_segment_skips_open_closing_edge() {
        let mut manager = MaskManager::new();
        manager.add_point(Point::new(0.0, 0.0), false);
        manager.add_point(Point::new(100.0, 0.0), false);
        manager.add_point(Point::new(100.0, 100.0), false);

        let hit = manager.hit_test_segment(Point::new(50.0, 5.0)).unwrap();
        assert_eq!(hit.segment_index, 0);
        // Diagonal closing edge is not tested while the mask is open.
        assert!(manager.hit_test_segment(Point::new(50.0, 50.0)).is_none());

        manager.close_mask();
        let hit = manager.hit_test_segment(Point::new(50.0, 50.0)).unwrap();
        assert_eq!(hit.segment_index, 2);
    }

    #[test]
    fn test_drag_main_point_moves_controls() {
        let mut manager = MaskManager::new();
        manager.add_point(Point::new(100.0, 100.0), true);
        let hit = manager.hit_test_point(Point::new(100.0, 100.0)).unwrap();
        assert!(manager.start_drag(hit));
        manager.drag(Point::new(110.0, 95.0));
        manager.end_drag();

        let point = manager.masks()[0].points[0];
        assert_eq!(point.position, Point::new(110.0, 95.0));
        let controls = point.controls().unwrap();
        assert_eq!(controls[0], Point::new(80.0, 95.0));
        assert_eq!(controls[1], Point::new(140.0, 95.0));
    }

    #[test]
    fn test_drag_control_point_only() {
        let mut manager = MaskManager::new();
        manager.add_point(Point::new(100.0, 100.0), true);
        let hit = manager.hit_test_point(Point::new(70.0, 100.0)).unwrap();
        assert_eq!(hit.target, PointTarget::Control(0));
        manager.start_drag(hit);
        manager.drag(Point::new(60.0, 80.0));

        let point = manager.masks()[0].points[0];
        assert_eq!(point.position, Point::new(100.0, 100.0));
        let controls = point.controls().unwrap();
        assert_eq!(controls[0], Point::new(60.0, 80.0));
        assert_eq!(controls[1], Point::new(130.0, 100.0));
    }

    #[test]
    fn test_drag_mask_is_anchored() {
        let mut manager = MaskManager::new();
        square(&mut manager, Point::new(0.0, 0.0), 50.0);
        let index = manager.hit_test_mask(Point::new(20.0, 20.0)).unwrap();
        assert!(manager.start_mask_drag(Point::new(20.0, 20.0), index));
        assert!(manager.selected_mask().is_some());

        manager.drag(Point::new(30.0, 25.0));
        manager.drag(Point::new(30.0, 25.0));
        let mask = &manager.masks()[0];
        assert_eq!(mask.points[0].position, Point::new(10.0, 5.0));
        assert_eq!(mask.points[2].position, Point::new(60.0, 55.0));
    }

    #[test]
    fn test_hit_test_mask_topmost() {
        let mut manager = MaskManager::new();
        square(&mut manager, Point::new(0.0, 0.0), 100.0);
        square(&mut manager, Point::new(50.0, 50.0), 100.0);
        assert_eq!(manager.hit_test_mask(Point::new(75.0, 75.0)), Some(1));
        assert_eq!(manager.hit_test_mask(Point::new(25.0, 25.0)), Some(0));
        assert_eq!(manager.hit_test_mask(Point::new(500.0, 500.0)), None);
    }

    #[test]
    fn test_select_mask_by_index() {
        let mut manager = MaskManager::new();
        let id = square(&mut manager, Point::new(0.0, 0.0), 10.0);
        assert_eq!(manager.select_mask_by_index(Some(0)).map(|m| m.id), Some(id));
        assert!(manager.select_mask_by_index(Some(7)).is_none());
        assert!(manager.selected_mask().is_none());
    }

    #[test]
    fn test_delete_active_mask_clears_authoring() {
        let mut manager = MaskManager::new();
        let id = manager.start_new_mask();
        manager.add_point(Point::ZERO, false);
        assert!(manager.delete_mask(id));
        assert!(manager.active_mask().is_none());
        assert!(!manager.delete_mask(id));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut manager = MaskManager::new();
        square(&mut manager, Point::new(0.0, 0.0), 40.0);
        manager.start_new_mask();
        manager.add_point(Point::new(5.5, 6.5), true);
        manager.add_point(Point::new(70.0, 8.0), false);

        let json = serde_json::to_string(&manager.to_snapshot()).unwrap();
        let masks: Vec<Mask> = serde_json::from_str(&json).unwrap();

        let mut restored = MaskManager::new();
        restored.restore(masks);
        assert_eq!(restored.masks(), manager.masks());
        assert!(restored.masks().iter().all(|m| m.id < restored.next_id()));
        assert!(restored.active_mask().is_none());
    }
}
