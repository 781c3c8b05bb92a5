//! Regions: rectangular placements that host a generative program.
//!
//! A region's geometry is its top-left `position`, pixel `size`, four
//! warp `corners` in local space and a classic rotate/scale/skew transform.
//! The hosted program source is carried as opaque text.

mod manager;

pub use manager::{RegionManager, DEFAULT_REGION_POSITION, DEFAULT_REGION_SIZE};

use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

use crate::geometry::point_in_polygon;

/// Unique region identifier. Assigned monotonically and never reused.
pub type RegionId = u32;

/// Classic transform of a region, applied about its centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionTransform {
    /// Rotation in degrees.
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Horizontal skew in degrees.
    pub skew_x: f64,
    /// Vertical skew in degrees.
    pub skew_y: f64,
}

impl Default for RegionTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl RegionTransform {
    pub const IDENTITY: Self = Self {
        rotation: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
        skew_x: 0.0,
        skew_y: 0.0,
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Compose `rotate · scale · skew` about the centre of a `size` box, in
    /// the region's local coordinates.
    pub fn to_affine(&self, size: Size) -> Affine {
        let center = Vec2::new(size.width / 2.0, size.height / 2.0);
        Affine::translate(center)
            * Affine::rotate(self.rotation.to_radians())
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
            * Affine::skew(self.skew_x.to_radians().tan(), self.skew_y.to_radians().tan())
            * Affine::translate(-center)
    }
}

/// Geometry and program of a placed region.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub id: RegionId,
    /// Hosted program source, passed through untouched.
    pub source: String,
    /// Top-left corner on the canvas.
    pub position: Point,
    /// Pixel size of the hosted program's drawing surface.
    pub size: Size,
    /// Warp corners relative to `position`: top-left, top-right,
    /// bottom-right, bottom-left.
    pub corners: [Point; 4],
    pub transform: RegionTransform,
    pub selected: bool,
}

impl Region {
    pub fn new(id: RegionId, source: String, position: Point, size: Size) -> Self {
        Self {
            id,
            source,
            position,
            size,
            corners: rect_corners(size),
            transform: RegionTransform::IDENTITY,
            selected: false,
        }
    }

    /// Centre of the untransformed rectangle, in canvas coordinates.
    pub fn center(&self) -> Point {
        Point::new(
            self.position.x + self.size.width / 2.0,
            self.position.y + self.size.height / 2.0,
        )
    }

    /// Warp corners in canvas coordinates.
    pub fn absolute_corners(&self) -> [Point; 4] {
        self.corners.map(|c| self.position + c.to_vec2())
    }

    /// Whether `point` lies in the warp quad. Rotation is not applied.
    pub fn contains(&self, point: Point) -> bool {
        point_in_polygon(point, &self.absolute_corners())
    }

    /// Restore the identity transform and rectangular corners.
    pub fn reset_transform(&mut self) {
        self.transform = RegionTransform::IDENTITY;
        self.corners = rect_corners(self.size);
    }

    pub fn to_snapshot(&self) -> RegionSnapshot {
        RegionSnapshot {
            id: self.id,
            source: self.source.clone(),
            position: self.position,
            size: self.size,
            corners: self.corners,
            transform: self.transform,
        }
    }

    /// Rebuild a region from persisted data. Selection is never restored.
    pub fn from_snapshot(snapshot: RegionSnapshot) -> Self {
        Self {
            id: snapshot.id,
            source: snapshot.source,
            position: snapshot.position,
            size: snapshot.size,
            corners: snapshot.corners,
            transform: snapshot.transform,
            selected: false,
        }
    }
}

/// Persisted form of a [`Region`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSnapshot {
    pub id: RegionId,
    #[serde(rename = "hostedProgramSource", alias = "code")]
    pub source: String,
    pub position: Point,
    pub size: Size,
    pub corners: [Point; 4],
    #[serde(default)]
    pub transform: RegionTransform,
}

/// Corners of the axis-aligned `size` rectangle in local space.
pub fn rect_corners(size: Size) -> [Point; 4] {
    [
        Point::new(0.0, 0.0),
        Point::new(size.width, 0.0),
        Point::new(size.width, size.height),
        Point::new(0.0, size.height),
    ]
}
