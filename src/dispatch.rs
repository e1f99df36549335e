use kurbo::{PathEl, Point, QuadBez};

use crate::canvas::Canvas;
use crate::path::Path;
use crate::types::{PaintStyle, Pt};

/// Replays drawing-model paths as document handle path operations.
/// Quadratic segments are raised to cubics, which is all the handle has.
pub struct PathConverter<'a> {
    canvas: &'a mut Canvas,
    start: Point,
    current: Point,
}

impl<'a> PathConverter<'a> {
    pub fn new(canvas: &'a mut Canvas) -> Self {
        Self {
            canvas,
            start: Point::ZERO,
            current: Point::ZERO,
        }
    }

    pub fn convert(&mut self, path: &Path) {
        for el in path.elements() {
            match *el {
                PathEl::MoveTo(p) => {
                    self.canvas.move_to(pt(p.x), pt(p.y));
                    self.start = p;
                    self.current = p;
                }
                PathEl::LineTo(p) => {
                    self.canvas.line_to(pt(p.x), pt(p.y));
                    self.current = p;
                }
                PathEl::QuadTo(c, p) => {
                    let cubic = QuadBez::new(self.current, c, p).raise();
                    self.curve_to(cubic.p1, cubic.p2, cubic.p3);
                }
                PathEl::CurveTo(c1, c2, p) => self.curve_to(c1, c2, p),
                PathEl::ClosePath => {
                    self.canvas.close_path();
                    self.current = self.start;
                }
            }
        }
    }

    fn curve_to(&mut self, c1: Point, c2: Point, p: Point) {
        self.canvas
            .curve_to(pt(c1.x), pt(c1.y), pt(c2.x), pt(c2.y), pt(p.x), pt(p.y));
        self.current = p;
    }
}

fn pt(v: f64) -> Pt {
    Pt::from_f64(v)
}

/// Hands `paths` to the canvas and paints them with `style` at `alpha`.
/// The cached alpha is only re-sent when it differs; returns whether it did.
pub fn draw(canvas: &mut Canvas, style: PaintStyle, alpha: f64, paths: &[&Path]) -> bool {
    let mut converter = PathConverter::new(canvas);
    for path in paths {
        converter.convert(path);
    }
    let (current, blend_mode) = canvas.alpha();
    let changed = alpha != current;
    if changed {
        canvas.set_alpha(alpha, blend_mode);
    }
    canvas.draw_path(style);
    changed
}
