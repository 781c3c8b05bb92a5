//! Region collection and lifecycle.

use kurbo::{Point, Size};

use super::{rect_corners, Region, RegionId, RegionSnapshot};

/// Where a region lands when no position is given.
pub const DEFAULT_REGION_POSITION: Point = Point::new(100.0, 100.0);
/// Drawing surface size used when no size is given.
pub const DEFAULT_REGION_SIZE: Size = Size::new(400.0, 300.0);

/// Owns all regions in z-order (back to front).
#[derive(Debug, Clone)]
pub struct RegionManager {
    regions: Vec<Region>,
    next_id: RegionId,
}

impl Default for RegionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionManager {
    pub fn new() -> Self {
        Self {
            regions: Vec::new(),
            next_id: 1,
        }
    }

    /// Add a region on top of the others.
    pub fn create_region(&mut self, source: String, position: Point, size: Size) -> RegionId {
        let id = self.next_id;
        self.next_id += 1;
        self.regions.push(Region::new(id, source, position, size));
        log::debug!("created region {id} at ({}, {})", position.x, position.y);
        id
    }

    /// Add a region with the default position and size.
    pub fn create_default_region(&mut self, source: String) -> RegionId {
        self.create_region(source, DEFAULT_REGION_POSITION, DEFAULT_REGION_SIZE)
    }

    /// Replace the hosted program source.
    pub fn update_source(&mut self, id: RegionId, source: String) -> bool {
        match self.get_mut(id) {
            Some(region) => {
                region.source = source;
                true
            }
            None => false,
        }
    }

    pub fn remove_region(&mut self, id: RegionId) -> Option<Region> {
        let index = self.regions.iter().position(|r| r.id == id)?;
        log::debug!("removed region {id}");
        Some(self.regions.remove(index))
    }

    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    pub fn get_mut(&mut self, id: RegionId) -> Option<&mut Region> {
        self.regions.iter_mut().find(|r| r.id == id)
    }

    /// Change the drawing surface size. Corners snap back to the new
    /// rectangle; non-positive sizes are rejected.
    pub fn resize_region(&mut self, id: RegionId, size: Size) -> bool {
        if !(size.width > 0.0 && size.height > 0.0) {
            return false;
        }
        match self.get_mut(id) {
            Some(region) => {
                region.size = size;
                region.corners = rect_corners(size);
                true
            }
            None => false,
        }
    }

    /// Select one region, or none. At most one region is selected at a time.
    pub fn select_region(&mut self, id: Option<RegionId>) -> Option<&Region> {
        for region in &mut self.regions {
            region.selected = Some(region.id) == id;
        }
        self.regions.iter().find(|r| r.selected)
    }

    pub fn selected_region(&self) -> Option<&Region> {
        self.regions.iter().find(|r| r.selected)
    }

    /// Topmost region whose warp quad contains `point`.
    pub fn hit_test(&self, point: Point) -> Option<&Region> {
        self.regions.iter().rev().find(|r| r.contains(point))
    }

    /// Regions back to front.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn clear(&mut self) {
        self.regions.clear();
    }

    pub fn next_id(&self) -> RegionId {
        self.next_id
    }

    pub fn to_snapshots(&self) -> Vec<RegionSnapshot> {
        self.regions.iter().map(Region::to_snapshot).collect()
    }

    /// Replace every region from persisted data, keeping their ids.
    pub fn restore(&mut self, snapshots: Vec<RegionSnapshot>) {
        if let Some(max) = snapshots.iter().map(|s| s.id).max() {
            self.next_id = max + 1;
        }
        self.regions = snapshots.into_iter().map(Region::from_snapshot).collect();
    }
}
