use std::f64::consts::PI;

use kurbo::{Arc, BezPath, PathEl, Point};

// Flattening tolerance for arcs, in document units.
const ARC_TOLERANCE: f64 = 0.1;

/// Path under construction: an ordered list of subpaths, each opened by a
/// move-to. A segment added while the path is empty opens a subpath at its
/// first coordinate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    inner: BezPath,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.elements().is_empty()
    }

    pub fn elements(&self) -> &[PathEl] {
        self.inner.elements()
    }

    pub fn as_bez_path(&self) -> &BezPath {
        &self.inner
    }

    /// Current point: end of the last segment, or the subpath start after a
    /// close.
    pub fn last_point(&self) -> Option<Point> {
        let mut start = None;
        let mut last = None;
        for el in self.inner.elements() {
            match *el {
                PathEl::MoveTo(p) => {
                    start = Some(p);
                    last = Some(p);
                }
                PathEl::LineTo(p) | PathEl::QuadTo(_, p) | PathEl::CurveTo(_, _, p) => {
                    last = Some(p)
                }
                PathEl::ClosePath => last = start,
            }
        }
        last
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.inner.move_to((x, y));
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        if self.is_empty() {
            self.move_to(x, y);
            return;
        }
        self.inner.line_to((x, y));
    }

    pub fn quad_curve_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        if self.is_empty() {
            self.move_to(cx, cy);
        }
        self.inner.quad_to((cx, cy), (x, y));
    }

    pub fn cubic_curve_to(&mut self, cx1: f64, cy1: f64, cx2: f64, cy2: f64, x: f64, y: f64) {
        if self.is_empty() {
            self.move_to(cx1, cy1);
        }
        self.inner.curve_to((cx1, cy1), (cx2, cy2), (x, y));
    }

    /// Elliptical arc around `(cx, cy)`. Angles are in radians; the arc's
    /// start is joined to the current point by a line, or opens a subpath.
    pub fn arc_to(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, start_angle: f64, sweep: f64) {
        let sx = cx + start_angle.cos() * rx;
        let sy = cy + start_angle.sin() * ry;
        if self.is_empty() {
            self.move_to(sx, sy);
        } else {
            self.line_to(sx, sy);
        }
        self.push_arc(cx, cy, rx, ry, start_angle, sweep);
    }

    fn push_arc(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, start_angle: f64, sweep: f64) {
        let arc = Arc::new((cx, cy), (rx, ry), start_angle, sweep, 0.0);
        for el in arc.append_iter(ARC_TOLERANCE) {
            self.inner.push(el);
        }
    }

    pub fn close(&mut self) {
        if !self.is_empty() {
            self.inner.close_path();
        }
    }

    pub fn append(&mut self, other: &Path) {
        for el in other.elements() {
            self.inner.push(*el);
        }
    }

    pub fn rect(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.move_to(x1, y1);
        self.line_to(x2, y1);
        self.line_to(x2, y2);
        self.line_to(x1, y2);
        self.close();
    }

    pub fn ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64) {
        self.move_to(cx + rx, cy);
        self.push_arc(cx, cy, rx, ry, 0.0, -PI * 2.0);
        self.close();
    }

    pub fn circle(&mut self, cx: f64, cy: f64, radius: f64) {
        self.ellipse(cx, cy, radius, radius);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_on_empty_path_open_a_subpath() {
        let mut path = Path::new();
        path.line_to(3.0, 4.0);
        assert_eq!(path.elements(), &[PathEl::MoveTo(Point::new(3.0, 4.0))]);

        let mut path = Path::new();
        path.quad_curve_to(1.0, 1.0, 2.0, 0.0);
        assert_eq!(path.elements().len(), 2);
        assert!(matches!(path.elements()[0], PathEl::MoveTo(_)));
    }

    #[test]
    fn close_returns_to_subpath_start() {
        let mut path = Path::new();
        path.rect(0.0, 0.0, 10.0, 5.0);
        assert_eq!(path.elements().len(), 5);
        assert_eq!(path.last_point(), Some(Point::new(0.0, 0.0)));
    }

    #[test]
    fn close_on_empty_path_is_ignored() {
        let mut path = Path::new();
        path.close();
        assert!(path.is_empty());
    }

    #[test]
    fn circle_is_closed_cubic_run() {
        let mut path = Path::new();
        path.circle(50.0, 50.0, 10.0);
        let els = path.elements();
        assert!(matches!(els[0], PathEl::MoveTo(p) if p == Point::new(60.0, 50.0)));
        assert!(matches!(els.last(), Some(PathEl::ClosePath)));
        assert!(els.iter().any(|el| matches!(el, PathEl::CurveTo(..))));
        let end = path.last_point().unwrap();
        assert!((end.x - 60.0).abs() < 1e-9 && (end.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn append_keeps_subpath_boundaries() {
        let mut a = Path::new();
        a.rect(0.0, 0.0, 1.0, 1.0);
        let mut b = Path::new();
        b.rect(2.0, 2.0, 3.0, 3.0);
        a.append(&b);
        let moves = a
            .elements()
            .iter()
            .filter(|el| matches!(el, PathEl::MoveTo(_)))
            .count();
        assert_eq!(moves, 2);
    }
}
