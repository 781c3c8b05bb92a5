//! Projective mapping from a rectangle onto an arbitrary quad.

use std::fmt;

use kurbo::{Point, Size};

use crate::geometry::solve_linear_system;
use crate::region::rect_corners;

/// Largest per-axis corner deviation that still counts as unwarped.
pub const WARP_TOLERANCE: f64 = 2.0;

/// A 4x4 transform in column-major order, the layout of CSS `matrix3d()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix3d(pub [f64; 16]);

impl Matrix3d {
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]);

    /// Embed the eight homography coefficients `h` (with `h8 = 1`).
    ///
    /// The z axis is left untouched and the homogeneous row reads
    /// `(h6, h7, 0, 1)`.
    pub fn from_homography(h: [f64; 8]) -> Self {
        Self([
            h[0], h[3], 0.0, h[6], //
            h[1], h[4], 0.0, h[7], //
            0.0, 0.0, 1.0, 0.0, //
            h[2], h[5], 0.0, 1.0,
        ])
    }

    /// Apply to a point on the z = 0 plane. `None` at the horizon (w ≈ 0).
    pub fn map_point(&self, point: Point) -> Option<Point> {
        let m = &self.0;
        let x = m[0] * point.x + m[4] * point.y + m[12];
        let y = m[1] * point.x + m[5] * point.y + m[13];
        let w = m[3] * point.x + m[7] * point.y + m[15];
        if w.abs() < f64::EPSILON {
            return None;
        }
        Some(Point::new(x / w, y / w))
    }

    /// Whether every entry is within `epsilon` of the identity.
    pub fn is_identity(&self, epsilon: f64) -> bool {
        self.0
            .iter()
            .zip(Self::IDENTITY.0.iter())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

impl fmt::Display for Matrix3d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "matrix3d(")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, ")")
    }
}

/// Solve the projective transform carrying each `src` corner onto the
/// matching `dst` corner.
///
/// Each correspondence contributes two rows of an 8x8 system in the
/// unknowns `h0..h7`. Returns `None` when the system is singular, which
/// happens for degenerate destinations such as all corners on one point.
pub fn calculate_perspective_matrix(src: &[Point; 4], dst: &[Point; 4]) -> Option<Matrix3d> {
    let mut a = [[0.0; 8]; 8];
    let mut b = [0.0; 8];
    for (i, (s, d)) in src.iter().zip(dst.iter()).enumerate() {
        a[2 * i] = [s.x, s.y, 1.0, 0.0, 0.0, 0.0, -d.x * s.x, -d.x * s.y];
        a[2 * i + 1] = [0.0, 0.0, 0.0, s.x, s.y, 1.0, -d.y * s.x, -d.y * s.y];
        b[2 * i] = d.x;
        b[2 * i + 1] = d.y;
    }

    solve_linear_system(a, b).map(Matrix3d::from_homography)
}

/// Whether any corner strays more than [`WARP_TOLERANCE`] on either axis
/// from the axis-aligned rectangle of `size`.
pub fn is_quad_warped(corners: &[Point; 4], size: Size) -> bool {
    corners.iter().zip(rect_corners(size).iter()).any(|(c, e)| {
        (c.x - e.x).abs() > WARP_TOLERANCE || (c.y - e.y).abs() > WARP_TOLERANCE
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> [Point; 4] {
        rect_corners(Size::new(100.0, 100.0))
    }

    fn assert_close(a: Point, b: Point) {
        assert!((a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6, "{a:?} != {b:?}");
    }

    #[test]
    fn test_identity_quad() {
        let matrix = calculate_perspective_matrix(&square(), &square()).unwrap();
        assert!(matrix.is_identity(1e-9));
        assert_close(matrix.map_point(Point::new(37.0, 81.0)).unwrap(), Point::new(37.0, 81.0));
    }

    #[test]
    fn test_collapsed_quad_is_singular() {
        let collapsed = [Point::new(50.0, 50.0); 4];
        assert!(calculate_perspective_matrix(&square(), &collapsed).is_none());
        assert!(calculate_perspective_matrix(&square(), &[Point::ZERO; 4]).is_none());
    }

    #[test]
    fn test_warped_top_right_corner() {
        let mut dst = square();
        dst[1] = Point::new(120.0, -20.0);
        let matrix = calculate_perspective_matrix(&square(), &dst).unwrap();
        for (s, d) in square().iter().zip(dst.iter()) {
            assert_close(matrix.map_point(*s).unwrap(), *d);
        }
    }

    #[test]
    fn test_translation_only() {
        let dst = square().map(|p| Point::new(p.x + 15.0, p.y - 5.0));
        let matrix = calculate_perspective_matrix(&square(), &dst).unwrap();
        assert!((matrix.0[12] - 15.0).abs() < 1e-9);
        assert!((matrix.0[13] + 5.0).abs() < 1e-9);
        assert!(matrix.0[3].abs() < 1e-12 && matrix.0[7].abs() < 1e-12);
    }

    #[test]
    fn test_is_quad_warped() {
        let size = Size::new(100.0, 100.0);
        assert!(!is_quad_warped(&square(), size));

        let mut nudged = square();
        nudged[2] = Point::new(101.5, 98.0);
        assert!(!is_quad_warped(&nudged, size));

        nudged[3] = Point::new(0.0, 102.5);
        assert!(is_quad_warped(&nudged, size));
    }

    #[test]
    fn test_display_css() {
        assert_eq!(
            Matrix3d::IDENTITY.to_string(),
            "matrix3d(1,0,0,0,0,1,0,0,0,0,1,0,0,0,0,1)"
        );
    }
}
