//! Outline construction for mask rendering.

use kurbo::{BezPath, Point};

use super::point::Mask;

impl Mask {
    /// Build the outline the display draws and fills.
    ///
    /// A Bezier point contributes a cubic whose first handle is its own exit
    /// control and whose second handle is the next point's entry control, or
    /// the next point itself when that point is linear. Linear points
    /// contribute straight edges. Closed masks end with `close_path`.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let Some(first) = self.points.first() else {
            return path;
        };
        path.move_to(first.position);

        let n = self.points.len();
        let edges = if self.closed { n } else { n - 1 };
        for i in 0..edges {
            let current = &self.points[i];
            let next = &self.points[(i + 1) % n];
            match current.controls() {
                Some(controls) => {
                    let entry = next.controls().map_or(next.position, |c| c[0]);
                    path.curve_to(controls[1], entry, next.position);
                }
                None => path.line_to(next.position),
            }
        }

        if self.closed {
            path.close_path();
        }
        path
    }

    /// `(anchor, control)` pairs for drawing the handle lines of curve points.
    pub fn control_handles(&self) -> Vec<(Point, Point)> {
        self.points
            .iter()
            .filter_map(|p| p.controls().map(|c| (p.position, c)))
            .flat_map(|(anchor, c)| [(anchor, c[0]), (anchor, c[1])])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::point::MaskPoint;
    use kurbo::PathEl;

    fn mask_from(points: Vec<MaskPoint>, closed: bool) -> Mask {
        Mask {
            id: 1,
            points,
            closed,
        }
    }

    #[test]
    fn test_empty_mask_path() {
        assert!(mask_from(vec![], true).to_path().elements().is_empty());
    }

    #[test]
    fn test_linear_closed_path() {
        let mask = mask_from(
            vec![
                MaskPoint::linear(Point::new(0.0, 0.0)),
                MaskPoint::linear(Point::new(10.0, 0.0)),
                MaskPoint::linear(Point::new(10.0, 10.0)),
            ],
            true,
        );
        let path = mask.to_path();
        let els = path.elements();
        assert_eq!(els.len(), 5);
        assert_eq!(els[0], PathEl::MoveTo(Point::new(0.0, 0.0)));
        assert_eq!(els[3], PathEl::LineTo(Point::new(0.0, 0.0)));
        assert_eq!(els[4], PathEl::ClosePath);
    }

    #[test]
    fn test_open_path_has_no_closing_edge() {
        let mask = mask_from(
            vec![
                MaskPoint::linear(Point::new(0.0, 0.0)),
                MaskPoint::linear(Point::new(10.0, 0.0)),
                MaskPoint::linear(Point::new(10.0, 10.0)),
            ],
            false,
        );
        let path = mask.to_path();
        assert_eq!(path.elements().len(), 3);
        assert!(!path.elements().contains(&PathEl::ClosePath));
    }

    #[test]
    fn test_bezier_uses_exit_and_entry_controls() {
        let a = MaskPoint::bezier(Point::new(0.0, 0.0));
        let b = MaskPoint::bezier(Point::new(100.0, 0.0));
        let c = MaskPoint::linear(Point::new(100.0, 100.0));
        let mask = mask_from(vec![a, b, c], false);
        let path = mask.to_path();
        let els = path.elements();
        assert_eq!(
            els[1],
            PathEl::CurveTo(Point::new(30.0, 0.0), Point::new(70.0, 0.0), Point::new(100.0, 0.0))
        );
        // Next point is linear, so the second handle collapses onto it.
        assert_eq!(
            els[2],
            PathEl::CurveTo(
                Point::new(130.0, 0.0),
                Point::new(100.0, 100.0),
                Point::new(100.0, 100.0)
            )
        );
    }

    #[test]
    fn test_control_handles() {
        let mask = mask_from(
            vec![MaskPoint::bezier(Point::new(50.0, 50.0)), MaskPoint::linear(Point::ZERO)],
            false,
        );
        let handles = mask.control_handles();
        assert_eq!(handles.len(), 2);
        assert_eq!(handles[0], (Point::new(50.0, 50.0), Point::new(20.0, 50.0)));
    }
}
