//! Mask point and polygon data.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

use crate::geometry::point_in_polygon;

/// Unique mask identifier. Assigned monotonically and never reused.
pub type MaskId = u32;

/// Horizontal distance of freshly created Bezier control points from their owner.
pub const BEZIER_HANDLE_OFFSET: f64 = 30.0;

/// How the outline leaves a point towards the next one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PointKind {
    /// Straight edge to the next point.
    Linear,
    /// Cubic curve. `controls[0]` is the entry handle, `controls[1]` the exit handle.
    Bezier {
        #[serde(rename = "controlPoints")]
        controls: [Point; 2],
    },
}

/// A vertex of a mask outline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaskPoint {
    #[serde(flatten)]
    pub position: Point,
    #[serde(flatten)]
    pub kind: PointKind,
}

impl MaskPoint {
    /// A point with a straight outgoing edge.
    pub fn linear(position: Point) -> Self {
        Self {
            position,
            kind: PointKind::Linear,
        }
    }

    /// A curve point with handles placed symmetrically left and right of it.
    pub fn bezier(position: Point) -> Self {
        let offset = Vec2::new(BEZIER_HANDLE_OFFSET, 0.0);
        Self {
            position,
            kind: PointKind::Bezier {
                controls: [position - offset, position + offset],
            },
        }
    }

    pub fn is_bezier(&self) -> bool {
        matches!(self.kind, PointKind::Bezier { .. })
    }

    /// Control points, if this is a curve point.
    pub fn controls(&self) -> Option<&[Point; 2]> {
        match &self.kind {
            PointKind::Bezier { controls } => Some(controls),
            PointKind::Linear => None,
        }
    }

    pub fn controls_mut(&mut self) -> Option<&mut [Point; 2]> {
        match &mut self.kind {
            PointKind::Bezier { controls } => Some(controls),
            PointKind::Linear => None,
        }
    }

    /// Move the point and its control points rigidly.
    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
        if let Some(controls) = self.controls_mut() {
            for cp in controls.iter_mut() {
                *cp += delta;
            }
        }
    }
}

/// A free-form occluding polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mask {
    pub id: MaskId,
    pub points: Vec<MaskPoint>,
    pub closed: bool,
}

impl Mask {
    /// Minimum number of points required before a mask may be closed.
    pub const MIN_CLOSED_POINTS: usize = 3;

    pub fn new(id: MaskId) -> Self {
        Self {
            id,
            points: Vec::new(),
            closed: false,
        }
    }

    /// Whether the mask is a closed polygon that can contain points.
    pub fn is_fillable(&self) -> bool {
        self.closed && self.points.len() >= Self::MIN_CLOSED_POINTS
    }

    /// Even-odd containment against the polygon through the main points.
    ///
    /// Open masks and masks with fewer than three points contain nothing.
    /// Bezier curvature is ignored; only the vertices are tested.
    pub fn contains(&self, point: Point) -> bool {
        if !self.is_fillable() {
            return false;
        }
        let vertices: Vec<Point> = self.points.iter().map(|p| p.position).collect();
        point_in_polygon(point, &vertices)
    }

    /// Edges as `(segment_index, start, end)`, skipping the closing edge of open masks.
    pub fn segments(&self) -> impl Iterator<Item = (usize, Point, Point)> + '_ {
        let n = self.points.len();
        let count = if self.closed { n } else { n.saturating_sub(1) };
        (0..count).map(move |i| (i, self.points[i].position, self.points[(i + 1) % n].position))
    }

    /// Translate every point and control point.
    pub fn translate(&mut self, delta: Vec2) {
        for point in &mut self.points {
            point.translate(delta);
        }
    }

    /// Centroid of the main points (vertex average).
    pub fn centroid(&self) -> Option<Point> {
        if self.points.is_empty() {
            return None;
        }
        let sum = self
            .points
            .iter()
            .fold(Vec2::ZERO, |acc, p| acc + p.position.to_vec2());
        Some((sum / self.points.len() as f64).to_point())
    }
}
