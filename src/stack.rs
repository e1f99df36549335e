//! Save/restore bookkeeping for the drawing state, shared by backends.

use std::sync::Arc;

use kurbo::Affine;

use crate::convert::glyph_scale;
use crate::font::{FontBackend, FontData};
use crate::path::Path;
use crate::types::{Color, FillRule, LineCap, LineJoin};

/// Paint, transform and text state of one save scope.
#[derive(Debug, Clone)]
pub struct DrawingState {
    pub transform: Affine,
    pub stroke_color: Color,
    pub fill_color: Color,
    pub fill_rule: FillRule,
    pub line_width: f64,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub dash: Vec<f64>,
    pub dash_offset: f64,
    pub font: Option<Arc<dyn FontBackend>>,
    pub font_data: FontData,
    pub font_size: f64,
    /// Glyph scale handed to the font backend, derived from font size and DPI.
    pub scale: f64,
    pub path: Path,
}

impl Default for DrawingState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            stroke_color: Color::BLACK,
            fill_color: Color::WHITE,
            fill_rule: FillRule::EvenOdd,
            line_width: 1.0,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            dash: Vec::new(),
            dash_offset: 0.0,
            font: None,
            font_data: FontData::default(),
            font_size: 10.0,
            scale: 0.0,
            path: Path::new(),
        }
    }
}

/// The current drawing state plus the snapshots of enclosing scopes.
#[derive(Debug, Default)]
pub struct StateStack {
    current: DrawingState,
    saved: Vec<DrawingState>,
}

impl StateStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &DrawingState {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut DrawingState {
        &mut self.current
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn save(&mut self) {
        self.saved.push(self.current.clone());
    }

    /// Returns to the state captured by the matching `save`, path and font
    /// included. Returns `false` when there is no enclosing scope.
    pub fn restore(&mut self) -> bool {
        match self.saved.pop() {
            Some(state) => {
                self.current = state;
                true
            }
            None => false,
        }
    }

    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.current.transform *= Affine::scale_non_uniform(sx, sy);
    }

    /// `angle` in radians, clockwise on a Y-down page.
    pub fn rotate(&mut self, angle: f64) {
        self.current.transform *= Affine::rotate(angle);
    }

    pub fn translate(&mut self, tx: f64, ty: f64) {
        self.current.transform *= Affine::translate((tx, ty));
    }

    pub fn transform(&self) -> Affine {
        self.current.transform
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        self.current.stroke_color = color;
    }

    pub fn set_fill_color(&mut self, color: Color) {
        self.current.fill_color = color;
    }

    pub fn set_fill_rule(&mut self, rule: FillRule) {
        self.current.fill_rule = rule;
    }

    pub fn set_line_width(&mut self, width: f64) {
        self.current.line_width = width;
    }

    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.current.line_cap = cap;
    }

    pub fn set_line_join(&mut self, join: LineJoin) {
        self.current.line_join = join;
    }

    pub fn set_line_dash(&mut self, dash: &[f64], offset: f64) {
        self.current.dash = dash.to_vec();
        self.current.dash_offset = offset;
    }

    pub fn set_font(&mut self, font: Arc<dyn FontBackend>) {
        self.current.font = Some(font);
    }

    pub fn set_font_data(&mut self, data: FontData) {
        self.current.font_data = data;
    }

    pub fn set_font_size(&mut self, size: f64) {
        self.current.font_size = size;
    }

    /// Recomputes the glyph scale; call after any font size or DPI change.
    pub fn rescale(&mut self, dpi: i32) {
        self.current.scale = glyph_scale(self.current.font_size, dpi);
    }

    pub fn path(&self) -> &Path {
        &self.current.path
    }

    pub fn path_mut(&mut self) -> &mut Path {
        &mut self.current.path
    }

    /// Drops the pending path.
    pub fn begin_path(&mut self) {
        self.current.path = Path::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[test]
    fn restore_returns_saved_paint_state() {
        let mut stack = StateStack::new();
        stack.save();
        stack.set_fill_color(Color::rgb(10, 20, 30));
        stack.set_line_width(4.0);
        stack.set_line_cap(LineCap::Square);
        stack.set_fill_rule(FillRule::Winding);
        assert!(stack.restore());
        let state = stack.current();
        assert_eq!(state.fill_color, Color::WHITE);
        assert_eq!(state.line_width, 1.0);
        assert_eq!(state.line_cap, LineCap::Round);
        assert_eq!(state.fill_rule, FillRule::EvenOdd);
    }

    #[test]
    fn restore_without_save_keeps_state() {
        let mut stack = StateStack::new();
        stack.set_line_width(3.0);
        assert!(!stack.restore());
        assert_eq!(stack.current().line_width, 3.0);
    }

    #[test]
    fn nested_scopes_unwind_in_order() {
        let mut stack = StateStack::new();
        stack.set_line_width(1.0);
        stack.save();
        stack.set_line_width(2.0);
        stack.save();
        stack.set_line_width(3.0);
        assert_eq!(stack.depth(), 2);
        stack.restore();
        assert_eq!(stack.current().line_width, 2.0);
        stack.restore();
        assert_eq!(stack.current().line_width, 1.0);
    }

    #[test]
    fn transforms_compose_in_local_space() {
        let mut stack = StateStack::new();
        stack.translate(10.0, 0.0);
        stack.scale(2.0, 2.0);
        assert_eq!(stack.transform() * Point::new(1.0, 1.0), Point::new(12.0, 2.0));
        stack.save();
        stack.rotate(std::f64::consts::FRAC_PI_2);
        stack.restore();
        assert_eq!(stack.transform() * Point::new(1.0, 1.0), Point::new(12.0, 2.0));
    }

    #[test]
    fn glyph_scale_tracks_font_size() {
        let mut stack = StateStack::new();
        stack.set_font_size(12.0);
        stack.rescale(72);
        assert_eq!(stack.current().scale, 256.0);
    }

    #[test]
    fn begin_path_discards_pending_segments() {
        let mut stack = StateStack::new();
        stack.path_mut().rect(0.0, 0.0, 1.0, 1.0);
        stack.begin_path();
        assert!(stack.path().is_empty());
    }
}
