use std::sync::Arc;

use image::DynamicImage;
use kurbo::Affine;

use crate::error::DrawError;
use crate::font::{FontBackend, FontData};
use crate::path::Path;
use crate::stack::StateStack;
use crate::types::{Color, FillRule, LineCap, LineJoin};

/// Drawing operations a rendering backend provides.
///
/// Path construction and state queries are shared and go through the
/// backend's [`StateStack`]; setters, transforms and painting are backend
/// specific because they mirror into the output document.
pub trait GraphicsBackend {
    fn state(&self) -> &StateStack;
    fn state_mut(&mut self) -> &mut StateStack;

    // Scopes and transforms.
    fn save(&mut self);
    fn restore(&mut self);
    fn scale(&mut self, sx: f64, sy: f64);
    fn rotate(&mut self, angle: f64);
    fn translate(&mut self, tx: f64, ty: f64);

    fn transform(&self) -> Affine {
        self.state().transform()
    }

    // Paint state.
    fn set_stroke_color(&mut self, color: Color);
    fn set_fill_color(&mut self, color: Color);
    fn set_fill_rule(&mut self, rule: FillRule);
    fn set_line_width(&mut self, width: f64);
    fn set_line_cap(&mut self, cap: LineCap);
    fn set_line_join(&mut self, join: LineJoin);
    fn set_line_dash(&mut self, dash: &[f64], offset: f64);

    fn stroke_color(&self) -> Color {
        self.state().current().stroke_color
    }

    fn fill_color(&self) -> Color {
        self.state().current().fill_color
    }

    fn fill_rule(&self) -> FillRule {
        self.state().current().fill_rule
    }

    fn line_width(&self) -> f64 {
        self.state().current().line_width
    }

    fn line_cap(&self) -> LineCap {
        self.state().current().line_cap
    }

    fn line_join(&self) -> LineJoin {
        self.state().current().line_join
    }

    // Text state.
    fn set_font(&mut self, font: Arc<dyn FontBackend>);
    fn set_font_data(&mut self, data: FontData);
    fn set_font_size(&mut self, size: f64);
    fn set_dpi(&mut self, dpi: i32);
    fn dpi(&self) -> i32;

    fn font_data(&self) -> FontData {
        self.state().current().font_data.clone()
    }

    fn font_size(&self) -> f64 {
        self.state().current().font_size
    }

    // Path construction.
    fn begin_path(&mut self) {
        self.state_mut().begin_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.state_mut().path_mut().move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.state_mut().path_mut().line_to(x, y);
    }

    fn quad_curve_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        self.state_mut().path_mut().quad_curve_to(cx, cy, x, y);
    }

    fn cubic_curve_to(&mut self, cx1: f64, cy1: f64, cx2: f64, cy2: f64, x: f64, y: f64) {
        self.state_mut()
            .path_mut()
            .cubic_curve_to(cx1, cy1, cx2, cy2, x, y);
    }

    fn arc_to(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, start_angle: f64, sweep: f64) {
        self.state_mut()
            .path_mut()
            .arc_to(cx, cy, rx, ry, start_angle, sweep);
    }

    fn close(&mut self) {
        self.state_mut().path_mut().close();
    }

    fn last_point(&self) -> Option<(f64, f64)> {
        self.state().path().last_point().map(|p| (p.x, p.y))
    }

    // Painting. Each consumes `paths` plus the pending path.
    fn stroke(&mut self, paths: &[&Path]);
    fn fill(&mut self, paths: &[&Path]);
    fn fill_stroke(&mut self, paths: &[&Path]);

    // Text. Returns the horizontal advance of the string.
    fn create_string_path(&mut self, text: &str, x: f64, y: f64) -> f64;
    fn fill_string_at(&mut self, text: &str, x: f64, y: f64) -> f64;
    fn stroke_string_at(&mut self, text: &str, x: f64, y: f64) -> f64;
    fn string_bounds(&self, text: &str) -> (f64, f64, f64, f64);

    fn fill_string(&mut self, text: &str) -> f64 {
        self.fill_string_at(text, 0.0, 0.0)
    }

    fn stroke_string(&mut self, text: &str) -> f64 {
        self.stroke_string_at(text, 0.0, 0.0)
    }

    // Page content.
    fn clear(&mut self);
    fn clear_rect(&mut self, x1: i32, y1: i32, x2: i32, y2: i32);
    fn draw_image(&mut self, image: &DynamicImage) -> Result<(), DrawError>;
}
