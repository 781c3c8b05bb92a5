//! Routes pointer and keyboard events to the mask and transform engines.

use kurbo::{Point, Size};

use crate::document::ProjectDocument;
use crate::input::{InputState, KeyEvent, Modifiers, MouseButton, PointerEvent};
use crate::mask::{MaskId, MaskManager};
use crate::region::{Region, RegionId, RegionManager};
use crate::tools::ToolKind;
use crate::transform::TransformManager;

/// What is selected. Regions and masks are never selected together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Region(RegionId),
    Mask(MaskId),
}

/// How the router disposed of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResponse {
    /// The editor consumed the event.
    Handled,
    /// Nothing reacted to the event.
    Ignored,
    /// The event belongs to the hosted programs.
    Passthrough,
}

/// The editor: regions, masks, the active tool and the current selection.
#[derive(Debug, Clone, Default)]
pub struct InputRouter {
    masks: MaskManager,
    regions: RegionManager,
    transforms: TransformManager,
    tool: ToolKind,
    input: InputState,
    selection: Selection,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn masks(&self) -> &MaskManager {
        &self.masks
    }

    pub fn regions(&self) -> &RegionManager {
        &self.regions
    }

    pub fn transforms(&self) -> &TransformManager {
        &self.transforms
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Switch tools. Leaving or entering the mask tool closes the mask
    /// being authored (it stays the authoring target).
    pub fn set_tool(&mut self, tool: ToolKind) {
        if tool == self.tool {
            return;
        }
        if tool == ToolKind::Mask || self.tool == ToolKind::Mask {
            self.masks.close_mask();
        }
        self.end_drags();
        log::debug!("tool {} -> {}", self.tool.name(), tool.name());
        self.tool = tool;
    }

    /// Select a region, a mask or nothing.
    pub fn select(&mut self, selection: Selection) {
        let (region, mask_index) = match selection {
            Selection::None => (None, None),
            Selection::Region(id) => (Some(id), None),
            Selection::Mask(id) => (None, self.masks.masks().iter().position(|m| m.id == id)),
        };
        let region = self.regions.select_region(region).map(|r| r.id);
        let mask = self.masks.select_mask_by_index(mask_index).map(|m| m.id);
        self.selection = match (region, mask) {
            (Some(id), _) => Selection::Region(id),
            (None, Some(id)) => Selection::Mask(id),
            (None, None) => Selection::None,
        };
    }

    pub fn handle_pointer_event(
        &mut self,
        event: PointerEvent,
        modifiers: Modifiers,
    ) -> EventResponse {
        self.input.set_modifiers(modifiers);
        self.input.handle_pointer_event(event);
        self.dispatch_pointer(event)
    }

    fn dispatch_pointer(&mut self, event: PointerEvent) -> EventResponse {
        if !self.tool.is_editing() {
            return EventResponse::Passthrough;
        }
        match event {
            PointerEvent::Down {
                position,
                button: MouseButton::Left,
            } => {
                // A drag whose pointer-up never arrived is over.
                self.end_drags();
                match self.tool {
                    ToolKind::Mask => self.mask_pointer_down(position),
                    _ => self.select_pointer_down(position),
                }
            }
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up {
                button: MouseButton::Left,
                ..
            } => {
                if self.end_drags() {
                    EventResponse::Handled
                } else {
                    EventResponse::Ignored
                }
            }
            PointerEvent::Down { .. } | PointerEvent::Up { .. } => EventResponse::Ignored,
        }
    }

    fn select_pointer_down(&mut self, position: Point) -> EventResponse {
        if let Selection::Region(id) = self.selection {
            if let Some(region) = self.regions.get(id) {
                if let Some(handle) = self.transforms.hit_test_handle(position, region) {
                    self.transforms.start_drag(position, Some(handle), region);
                    return EventResponse::Handled;
                }
                if self.transforms.is_inside_region(position, region) {
                    self.transforms.start_drag(position, None, region);
                    return EventResponse::Handled;
                }
            }
        }

        if let Some(index) = self.masks.hit_test_mask(position) {
            self.masks.start_mask_drag(position, index);
            self.regions.select_region(None);
            self.selection = self
                .masks
                .selected_mask()
                .map_or(Selection::None, |m| Selection::Mask(m.id));
            return EventResponse::Handled;
        }

        if let Some(id) = self.regions.hit_test(position).map(|r| r.id) {
            self.select(Selection::Region(id));
            if let Some(region) = self.regions.get(id) {
                self.transforms.start_drag(position, None, region);
            }
            return EventResponse::Handled;
        }

        if self.selection == Selection::None {
            return EventResponse::Ignored;
        }
        self.select(Selection::None);
        EventResponse::Handled
    }

    fn mask_pointer_down(&mut self, position: Point) -> EventResponse {
        if self.input.is_double_click() {
            self.masks.close_mask();
            return EventResponse::Handled;
        }

        if let Some(hit) = self.masks.hit_test_point(position) {
            self.masks.start_drag(hit);
            return EventResponse::Handled;
        }

        if let Some(hit) = self.masks.hit_test_segment(position) {
            // Edges of other masks absorb the click without changing them.
            let active = self.masks.active_mask().map(|m| m.id);
            let hit_id = self.masks.masks().get(hit.mask_index).map(|m| m.id);
            if active.is_some() && active == hit_id {
                self.masks.insert_point_on_segment(position, hit.segment_index);
            }
            return EventResponse::Handled;
        }

        self.masks.add_point(position, self.input.modifiers.shift);
        EventResponse::Handled
    }

    fn pointer_move(&mut self, position: Point) -> EventResponse {
        if let Some(session) = self.transforms.session() {
            if let Some(region) = self.regions.get_mut(session.region_id()) {
                self.transforms.drag(position, region);
                return EventResponse::Handled;
            }
        }
        if self.masks.is_dragging() {
            self.masks.drag(position);
            return EventResponse::Handled;
        }
        EventResponse::Ignored
    }

    /// Ends every drag session; returns whether one was running.
    fn end_drags(&mut self) -> bool {
        let dragging = self.transforms.is_dragging() || self.masks.is_dragging();
        self.transforms.end_drag();
        self.masks.end_drag();
        dragging
    }

    pub fn handle_key_event(&mut self, event: KeyEvent, modifiers: Modifiers) -> EventResponse {
        self.input.set_modifiers(modifiers);
        if !self.tool.is_editing() {
            return EventResponse::Passthrough;
        }
        let KeyEvent::Pressed(key) = event else {
            return EventResponse::Ignored;
        };

        let handled = match (key.as_str(), self.tool) {
            ("Delete" | "Backspace", ToolKind::Select) => self.delete_selected(),
            ("Escape", ToolKind::Mask) => {
                let closed = self.masks.close_mask();
                self.masks.finish_mask() || closed
            }
            ("Escape", _) => {
                let had_selection = self.selection != Selection::None;
                self.select(Selection::None);
                had_selection
            }
            ("Enter", ToolKind::Mask) => self.masks.close_mask(),
            _ => false,
        };
        if handled {
            EventResponse::Handled
        } else {
            EventResponse::Ignored
        }
    }

    /// Delete the selected region or mask.
    pub fn delete_selected(&mut self) -> bool {
        let deleted = match self.selection {
            Selection::None => false,
            Selection::Region(id) => self.remove_region(id).is_some(),
            Selection::Mask(id) => self.masks.delete_mask(id),
        };
        self.select(Selection::None);
        deleted
    }

    /// Place a new region hosting `source` and apply its initial transform.
    pub fn add_region(&mut self, source: String, position: Point, size: Size) -> RegionId {
        let id = self.regions.create_region(source, position, size);
        if let Some(region) = self.regions.get(id) {
            self.transforms.apply_transform(region);
        }
        id
    }

    pub fn remove_region(&mut self, id: RegionId) -> Option<Region> {
        let region = self.regions.remove_region(id)?;
        self.transforms.forget(id);
        if self.selection == Selection::Region(id) {
            self.selection = Selection::None;
        }
        Some(region)
    }

    /// Replace the program hosted by a region.
    pub fn update_region_source(&mut self, id: RegionId, source: String) -> bool {
        self.regions.update_source(id, source)
    }

    /// Resize a region's drawing surface. Its warp is discarded.
    pub fn resize_region(&mut self, id: RegionId, size: Size) -> bool {
        if !self.regions.resize_region(id, size) {
            return false;
        }
        if let Some(region) = self.regions.get(id) {
            self.transforms.apply_transform(region);
        }
        true
    }

    pub fn rotate_region(&mut self, id: RegionId, degrees: f64) -> bool {
        self.with_region(id, |tm, region| tm.rotate_region(region, degrees))
    }

    pub fn scale_region(&mut self, id: RegionId, scale_x: f64, scale_y: f64) -> bool {
        self.with_region(id, |tm, region| tm.scale_region(region, scale_x, scale_y))
    }

    pub fn skew_region(&mut self, id: RegionId, skew_x: f64, skew_y: f64) -> bool {
        self.with_region(id, |tm, region| tm.skew_region(region, skew_x, skew_y))
    }

    pub fn reset_region_transform(&mut self, id: RegionId) -> bool {
        self.with_region(id, |tm, region| tm.reset_transform(region))
    }

    fn with_region(
        &mut self,
        id: RegionId,
        f: impl FnOnce(&mut TransformManager, &mut Region),
    ) -> bool {
        match self.regions.get_mut(id) {
            Some(region) => {
                f(&mut self.transforms, region);
                true
            }
            None => false,
        }
    }

    /// Remove every region and mask and return to the select tool.
    pub fn reset_project(&mut self) {
        self.end_drags();
        self.regions.clear();
        self.masks.clear();
        self.transforms.clear();
        self.selection = Selection::None;
        self.tool = ToolKind::Select;
        log::info!("project reset");
    }

    pub fn snapshot(&self) -> ProjectDocument {
        ProjectDocument::new(self.regions.to_snapshots(), self.masks.to_snapshot())
    }

    /// Snapshot only between gestures, so a save never records half a drag.
    pub fn snapshot_if_idle(&self) -> Option<ProjectDocument> {
        if self.transforms.is_dragging() || self.masks.is_dragging() {
            None
        } else {
            Some(self.snapshot())
        }
    }

    /// Replace the whole project and rebuild every region's visual.
    pub fn restore(&mut self, document: ProjectDocument) {
        self.end_drags();
        self.transforms.clear();
        self.selection = Selection::None;
        self.regions.restore(document.regions);
        self.masks.restore(document.masks);
        for region in self.regions.regions() {
            self.transforms.apply_transform(region);
        }
        log::info!(
            "restored {} regions and {} masks",
            self.regions.len(),
            self.masks.masks().len()
        );
    }
}
