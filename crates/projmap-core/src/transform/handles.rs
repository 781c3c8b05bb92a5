//! Corner handles for warping a region.

use kurbo::Point;

use crate::geometry::rotate_about;
use crate::region::Region;

/// Pick radius around a rendered corner handle.
pub const HANDLE_HIT_RADIUS: f64 = 10.0;

/// The four warp corners, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CornerHandle {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl CornerHandle {
    pub const ALL: [Self; 4] = [Self::TopLeft, Self::TopRight, Self::BottomRight, Self::BottomLeft];

    /// Index into [`Region::corners`].
    pub fn index(self) -> usize {
        match self {
            Self::TopLeft => 0,
            Self::TopRight => 1,
            Self::BottomRight => 2,
            Self::BottomLeft => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// A corner handle at its rendered position.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    pub corner: CornerHandle,
    /// Canvas position after the region's rotation is applied.
    pub position: Point,
}

impl Handle {
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        point.distance(self.position) <= tolerance
    }
}

/// Handles of `region` where the display draws them: each absolute corner
/// rotated about the region centre by the region's rotation.
pub fn handles(region: &Region) -> [Handle; 4] {
    let center = region.center();
    let corners = region.absolute_corners();
    CornerHandle::ALL.map(|corner| Handle {
        corner,
        position: rotate_about(corners[corner.index()], center, region.transform.rotation),
    })
}

/// First handle of `region` within [`HANDLE_HIT_RADIUS`] of `point`.
pub fn hit_test_handle(point: Point, region: &Region) -> Option<CornerHandle> {
    handles(region)
        .into_iter()
        .find(|h| h.hit_test(point, HANDLE_HIT_RADIUS))
        .map(|h| h.corner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;

    fn region() -> Region {
        Region::new(1, String::new(), Point::new(100.0, 100.0), Size::new(100.0, 100.0))
    }

    #[test]
    fn test_hit_unrotated_handles() {
        let region = region();
        assert_eq!(hit_test_handle(Point::new(102.0, 98.0), &region), Some(CornerHandle::TopLeft));
        assert_eq!(
            hit_test_handle(Point::new(200.0, 200.0), &region),
            Some(CornerHandle::BottomRight)
        );
        assert_eq!(hit_test_handle(Point::new(150.0, 150.0), &region), None);
    }

    #[test]
    fn test_hit_uses_rotated_positions() {
        let mut region = region();
        region.transform.rotation = 90.0;
        // Rotating 90 degrees about (150, 150) carries top-left (100, 100) to (200, 100).
        assert_eq!(hit_test_handle(Point::new(200.0, 100.0), &region), Some(CornerHandle::TopLeft));
        // The handle's unrotated position sees the bottom-left corner now.
        assert_eq!(
            hit_test_handle(Point::new(100.0, 100.0), &region),
            Some(CornerHandle::BottomLeft)
        );
    }

    #[test]
    fn test_index_round_trip() {
        for corner in CornerHandle::ALL {
            assert_eq!(CornerHandle::from_index(corner.index()), Some(corner));
        }
        assert_eq!(CornerHandle::from_index(4), None);
    }
}
