use std::io::Cursor;
use std::sync::Arc;

use image::{DynamicImage, GenericImageView};

use crate::backend::GraphicsBackend;
use crate::canvas::{Canvas, Document};
use crate::convert::{DPI, color_alpha, color_to_channels};
use crate::debug::DebugLogger;
use crate::dispatch;
use crate::error::DrawError;
use crate::font::{FontBackend, FontData, GlyphBuf};
use crate::layout::{GlyphLayout, measure_string};
use crate::metrics::DrawMetrics;
use crate::path::Path;
use crate::stack::StateStack;
use crate::types::{Color, FillRule, LineCap, LineJoin, PaintStyle, Pt};

/// Renders the drawing model into a [`Canvas`].
///
/// Scale, rotate and translate open no block of their own: wrap them in
/// `save`/`restore`, which bracket a transform block on the canvas.
/// Text needs a font assigned with `set_font` first.
pub struct PdfGraphicContext {
    canvas: Canvas,
    stack: StateStack,
    glyph_buf: GlyphBuf,
    dpi: i32,
    image_count: u32,
    metrics: DrawMetrics,
    debug: Option<DebugLogger>,
}

impl PdfGraphicContext {
    pub fn new(canvas: Canvas) -> Self {
        let mut gc = Self {
            canvas,
            stack: StateStack::new(),
            glyph_buf: GlyphBuf::new(),
            dpi: DPI,
            image_count: 0,
            metrics: DrawMetrics::default(),
            debug: None,
        };
        gc.set_dpi(DPI);
        gc
    }

    pub(crate) fn with_debug(mut self, debug: Option<DebugLogger>) -> Self {
        self.debug = debug;
        self
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn metrics(&self) -> &DrawMetrics {
        &self.metrics
    }

    /// Closes the current page and starts a new one.
    pub fn add_page(&mut self) {
        self.canvas.show_page();
    }

    pub fn finish(self) -> Document {
        if let Some(debug) = self.debug {
            if let Err(err) = debug.finish() {
                log::warn!("debug trace not written: {err}");
            }
        }
        self.canvas.finish()
    }

    fn recalc(&mut self) {
        self.stack.rescale(self.dpi);
    }

    fn draw(&mut self, style: PaintStyle, alpha: f64, paths: &[&Path]) {
        let mut all: Vec<&Path> = Vec::with_capacity(paths.len() + 1);
        all.extend_from_slice(paths);
        all.push(self.stack.path());
        let alpha_changed = dispatch::draw(&mut self.canvas, style, alpha, &all);
        self.metrics.record_draw(style, alpha_changed);
        if alpha_changed {
            log::debug!("alpha set to {alpha}");
        }
        if let Some(debug) = &mut self.debug {
            debug.draw(style, alpha, all.len(), alpha_changed);
        }
    }

    fn clear_rect_f(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        let fill = self.stack.current().fill_color;
        self.set_fill_color(Color::WHITE);
        self.stack.path_mut().rect(x1, y1, x2, y2);
        self.fill(&[]);
        self.set_fill_color(fill);
    }
}

impl GraphicsBackend for PdfGraphicContext {
    fn state(&self) -> &StateStack {
        &self.stack
    }

    fn state_mut(&mut self) -> &mut StateStack {
        &mut self.stack
    }

    fn save(&mut self) {
        self.stack.save();
        self.canvas.transform_begin();
    }

    /// Pops the state and re-sends the paint settings to the canvas. The
    /// canvas font and dash pattern are not re-sent.
    fn restore(&mut self) {
        self.canvas.transform_end();
        self.stack.restore();
        let state = self.stack.current();
        let font_size = state.font_size;
        let line_width = state.line_width;
        let stroke_color = state.stroke_color;
        let fill_color = state.fill_color;
        let fill_rule = state.fill_rule;
        let line_cap = state.line_cap;
        let line_join = state.line_join;
        self.set_font_size(font_size);
        self.set_line_width(line_width);
        self.set_stroke_color(stroke_color);
        self.set_fill_color(fill_color);
        self.set_fill_rule(fill_rule);
        self.set_line_cap(line_cap);
        self.set_line_join(line_join);
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.stack.scale(sx, sy);
        self.canvas.scale(sx as f32, sy as f32);
    }

    /// `angle` is in radians, clockwise from the 3 o'clock position.
    fn rotate(&mut self, angle: f64) {
        self.stack.rotate(angle);
        self.canvas.rotate((-angle.to_degrees()) as f32);
    }

    fn translate(&mut self, tx: f64, ty: f64) {
        self.stack.translate(tx, ty);
        self.canvas.translate(Pt::from_f64(tx), Pt::from_f64(ty));
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.stack.set_stroke_color(color);
        self.canvas.set_stroke_color(color_to_channels(color));
    }

    /// Sets both the fill and the text colour.
    fn set_fill_color(&mut self, color: Color) {
        self.stack.set_fill_color(color);
        let rgb = color_to_channels(color);
        self.canvas.set_fill_color(rgb);
        self.canvas.set_text_color(rgb);
    }

    fn set_fill_rule(&mut self, rule: FillRule) {
        self.stack.set_fill_rule(rule);
    }

    fn set_line_width(&mut self, width: f64) {
        self.stack.set_line_width(width);
        self.canvas.set_line_width(Pt::from_f64(width));
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.stack.set_line_cap(cap);
        self.canvas.set_line_cap(cap.token());
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.stack.set_line_join(join);
        self.canvas.set_line_join(join.token());
    }

    /// Passed through to the canvas; dashes are not expanded into geometry.
    fn set_line_dash(&mut self, dash: &[f64], offset: f64) {
        self.stack.set_line_dash(dash, offset);
        let pattern = dash.iter().map(|v| Pt::from_f64(*v)).collect();
        self.canvas.set_dash(pattern, Pt::from_f64(offset));
    }

    /// Font whose outlines are traced for text. Not sent to the canvas.
    fn set_font(&mut self, font: Arc<dyn FontBackend>) {
        self.stack.set_font(font);
    }

    /// Selects the canvas font by name and style at the canvas's current
    /// size. Metrics come from the font assigned with `set_font`, if any.
    fn set_font_data(&mut self, data: FontData) {
        let name = data.document_name();
        if let Some(font) = &self.stack.current().font {
            self.canvas.add_font(&name, font.descriptor());
        }
        let size = self.canvas.font_size();
        self.canvas.set_font(&name, size);
        self.stack.set_font_data(data);
    }

    /// Font size in points. Only rescales glyph outlines.
    fn set_font_size(&mut self, size: f64) {
        self.stack.set_font_size(size);
        self.recalc();
    }

    fn set_dpi(&mut self, dpi: i32) {
        self.dpi = dpi;
        self.recalc();
    }

    fn dpi(&self) -> i32 {
        self.dpi
    }

    fn stroke(&mut self, paths: &[&Path]) {
        let alpha = color_alpha(self.stack.current().stroke_color);
        self.draw(PaintStyle::Stroke, alpha, paths);
        self.stack.begin_path();
    }

    fn fill(&mut self, paths: &[&Path]) {
        let state = self.stack.current();
        let style = PaintStyle::fill(state.fill_rule);
        let alpha = color_alpha(state.fill_color);
        self.draw(style, alpha, paths);
        self.stack.begin_path();
    }

    /// Paints fill and stroke in one operation when their alphas match;
    /// otherwise fills, then strokes, each at its own alpha.
    fn fill_stroke(&mut self, paths: &[&Path]) {
        let state = self.stack.current();
        let rule = state.fill_rule;
        let alpha_stroke = color_alpha(state.stroke_color);
        let alpha_fill = color_alpha(state.fill_color);
        if alpha_stroke == alpha_fill {
            self.draw(PaintStyle::fill_stroke(rule), alpha_fill, paths);
        } else {
            self.draw(PaintStyle::fill(rule), alpha_fill, paths);
            self.draw(PaintStyle::Stroke, alpha_stroke, paths);
        }
        self.stack.begin_path();
    }

    fn create_string_path(&mut self, text: &str, x: f64, y: f64) -> f64 {
        let Some(font) = self.stack.current().font.clone() else {
            log::warn!("{}", DrawError::MissingFont);
            return 0.0;
        };
        self.metrics.strings += 1;
        let scale = self.stack.current().scale as i32;
        let result = GlyphLayout::new(font.as_ref(), scale, &mut self.glyph_buf).layout_string(
            self.stack.path_mut(),
            text,
            x,
            y,
        );
        match result {
            Ok(advance) => {
                if let Some(debug) = &mut self.debug {
                    debug.glyphs_traced(text.chars().count());
                }
                advance
            }
            Err(err) => {
                log::warn!("{err}");
                self.metrics.glyph_failures += 1;
                if let Some(debug) = &mut self.debug {
                    debug.glyph_failed(err.glyph, &err.source);
                }
                err.advance
            }
        }
    }

    fn fill_string_at(&mut self, text: &str, x: f64, y: f64) -> f64 {
        let width = self.create_string_path(text, x, y);
        self.fill(&[]);
        width
    }

    /// Text outlines are filled, never stroked.
    fn stroke_string_at(&mut self, text: &str, x: f64, y: f64) -> f64 {
        self.fill_string_at(text, x, y)
    }

    /// Bounds of `text` relative to its origin on the baseline; top and
    /// left may be negative.
    fn string_bounds(&self, text: &str) -> (f64, f64, f64, f64) {
        let h = self.canvas.font_size().to_f64();
        let d = self.canvas.font_descriptor();
        let top = if d.ascent == 0 {
            // No metrics for standard fonts; assume an 81% ascent.
            0.81 * h
        } else {
            -(d.ascent as f64) * h / (d.ascent - d.descent) as f64
        };
        let state = self.stack.current();
        let width = state
            .font
            .as_ref()
            .map(|font| measure_string(font.as_ref(), state.scale as i32, text))
            .unwrap_or(0.0);
        (0.0, top, width, top + h)
    }

    /// Paints the whole page white.
    fn clear(&mut self) {
        let size = self.canvas.page_size();
        self.clear_rect_f(0.0, 0.0, size.width.to_f64(), size.height.to_f64());
    }

    fn clear_rect(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        self.clear_rect_f(x1 as f64, y1 as f64, x2 as f64, y2 as f64);
    }

    /// Embeds `image` as PNG and places it at its own pixel size.
    fn draw_image(&mut self, image: &DynamicImage) -> Result<(), DrawError> {
        let mut data = Vec::new();
        image.write_to(&mut Cursor::new(&mut data), image::ImageFormat::Png)?;
        let name = self.image_count.to_string();
        self.image_count += 1;
        log::debug!("registering image {name} ({} bytes)", data.len());
        if let Some(debug) = &mut self.debug {
            debug.image_registered(&name, data.len());
        }
        self.canvas.register_image(&name, data);
        let (w, h) = image.dimensions();
        self.canvas.draw_image(
            Pt::ZERO,
            Pt::ZERO,
            Pt::from_f64(w as f64),
            Pt::from_f64(h as f64),
            name,
        );
        self.metrics.images += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Command;
    use crate::layout::tests::FakeFont;
    use crate::new_pdf;
    use crate::types::{Orientation, Rgb, Size};
    use image::RgbaImage;

    fn context() -> PdfGraphicContext {
        PdfGraphicContext::new(new_pdf(Orientation::Portrait, Size::a4()))
    }

    fn paints(gc: &PdfGraphicContext) -> Vec<Command> {
        gc.canvas()
            .commands()
            .iter()
            .filter(|cmd| cmd.is_paint())
            .cloned()
            .collect()
    }

    fn geometry_count(gc: &PdfGraphicContext) -> usize {
        gc.canvas()
            .commands()
            .iter()
            .filter(|cmd| {
                matches!(
                    cmd,
                    Command::MoveTo { .. }
                        | Command::LineTo { .. }
                        | Command::CurveTo { .. }
                        | Command::ClosePath
                )
            })
            .count()
    }

    #[test]
    fn fill_stroke_with_equal_alpha_is_one_draw() {
        let mut gc = context();
        gc.set_fill_color(Color::rgba(255, 0, 0, 128));
        gc.set_stroke_color(Color::rgba(0, 0, 255, 128));
        gc.set_fill_rule(FillRule::Winding);
        gc.state_mut().path_mut().rect(0.0, 0.0, 10.0, 10.0);
        gc.fill_stroke(&[]);
        assert_eq!(paints(&gc), vec![Command::FillStroke]);
        assert_eq!(gc.metrics().draw_calls, 1);
    }

    #[test]
    fn fill_stroke_with_different_alpha_fills_then_strokes() {
        let mut gc = context();
        gc.set_fill_color(Color::rgba(255, 0, 0, 128));
        gc.set_stroke_color(Color::BLACK);
        gc.state_mut().path_mut().rect(0.0, 0.0, 10.0, 10.0);
        gc.fill_stroke(&[]);
        assert_eq!(paints(&gc), vec![Command::FillEvenOdd, Command::Stroke]);
        // Each draw replays the geometry and is preceded by its own alpha.
        assert_eq!(geometry_count(&gc), 10);
        let alphas: Vec<f64> = gc
            .canvas()
            .commands()
            .iter()
            .filter_map(|cmd| match cmd {
                Command::SetAlpha { alpha, .. } => Some(*alpha),
                _ => None,
            })
            .collect();
        assert_eq!(alphas, vec![128.0 * 257.0 / 65535.0, 1.0]);
        assert_eq!(gc.metrics().alpha_changes, 2);
    }

    #[test]
    fn painting_consumes_the_pending_path() {
        let mut gc = context();
        gc.move_to(0.0, 0.0);
        gc.line_to(5.0, 5.0);
        gc.stroke(&[]);
        assert!(gc.state().path().is_empty());
        let after_first = geometry_count(&gc);
        gc.fill(&[]);
        assert_eq!(geometry_count(&gc), after_first);
        assert_eq!(paints(&gc).len(), 2);
    }

    #[test]
    fn extra_paths_are_drawn_but_not_kept() {
        let mut gc = context();
        let mut extra = Path::new();
        extra.rect(1.0, 1.0, 2.0, 2.0);
        gc.fill(&[&extra]);
        assert_eq!(geometry_count(&gc), 5);
        gc.fill(&[]);
        assert_eq!(geometry_count(&gc), 5);
    }

    #[test]
    fn fill_rule_selects_even_odd_paint() {
        let mut gc = context();
        gc.fill(&[]);
        gc.set_fill_rule(FillRule::Winding);
        gc.fill(&[]);
        assert_eq!(paints(&gc), vec![Command::FillEvenOdd, Command::Fill]);
    }

    #[test]
    fn save_restore_round_trips_paint_state() {
        let mut gc = context();
        gc.set_line_width(2.0);
        let before = gc.state().current().clone();
        gc.save();
        gc.set_stroke_color(Color::rgb(1, 2, 3));
        gc.set_fill_color(Color::rgb(4, 5, 6));
        gc.set_line_width(7.0);
        gc.set_line_cap(LineCap::Square);
        gc.set_line_join(LineJoin::Bevel);
        gc.set_fill_rule(FillRule::Winding);
        gc.translate(10.0, 20.0);
        gc.restore();

        let after = gc.state().current();
        assert_eq!(after.stroke_color, before.stroke_color);
        assert_eq!(after.fill_color, before.fill_color);
        assert_eq!(after.line_width, before.line_width);
        assert_eq!(after.line_cap, before.line_cap);
        assert_eq!(after.line_join, before.line_join);
        assert_eq!(after.fill_rule, before.fill_rule);
        assert_eq!(gc.transform(), before.transform);

        let canvas = gc.canvas();
        assert_eq!(canvas.line_width(), Pt::from_f32(2.0));
        assert_eq!(canvas.fill_color(), Rgb::WHITE);
        assert_eq!(canvas.line_cap(), LineCap::Round.token());
        assert_eq!(canvas.transform_depth(), 0);
    }

    #[test]
    fn transforms_are_bracketed_by_the_scope() {
        let mut gc = context();
        let start = gc.canvas().current_command_count();
        gc.save();
        gc.scale(2.0, 3.0);
        gc.rotate(std::f64::consts::FRAC_PI_2);
        gc.translate(5.0, 6.0);
        gc.restore();
        let commands = &gc.canvas().commands()[start..];
        assert_eq!(commands, &[
            Command::SaveState,
            Command::Scale(2.0, 3.0),
            Command::Rotate(-90.0),
            Command::Translate(Pt::from_f32(5.0), Pt::from_f32(6.0)),
            Command::RestoreState,
        ]);
    }

    #[test]
    fn restore_does_not_resend_font_or_dash() {
        let mut gc = context();
        gc.save();
        gc.set_line_dash(&[3.0, 1.0], 0.5);
        gc.set_font_data(FontData::new(
            "mono",
            crate::font::FontFamily::Mono,
            crate::font::FontStyle::NORMAL,
        ));
        let start = gc.canvas().current_command_count();
        gc.restore();
        assert_eq!(gc.font_data(), FontData::default());
        assert!(gc.state().current().dash.is_empty());
        let resent = &gc.canvas().commands()[start..];
        assert!(
            !resent
                .iter()
                .any(|cmd| matches!(cmd, Command::SetDash { .. } | Command::SetFontName(_)))
        );
    }

    #[test]
    fn restore_without_save_is_harmless() {
        let mut gc = context();
        gc.restore();
        assert_eq!(gc.canvas().transform_depth(), 0);
        assert_eq!(gc.line_width(), 1.0);
    }

    #[test]
    fn fill_string_lays_out_and_fills() {
        let mut gc = context();
        gc.set_font(Arc::new(FakeFont));
        let advance = gc.fill_string_at("AB", 0.0, 0.0);
        assert_eq!(advance, 20.0);
        assert_eq!(paints(&gc), vec![Command::FillEvenOdd]);
        // Two triangles: move, two lines and a closing line each.
        assert_eq!(geometry_count(&gc), 8);
        assert!(gc.state().path().is_empty());
    }

    #[test]
    fn stroking_text_fills_it() {
        let mut gc = context();
        gc.set_font(Arc::new(FakeFont));
        assert_eq!(gc.stroke_string("A"), 10.0);
        assert_eq!(paints(&gc), vec![Command::FillEvenOdd]);
    }

    #[test]
    fn create_string_path_leaves_path_pending() {
        let mut gc = context();
        gc.set_font(Arc::new(FakeFont));
        assert_eq!(gc.create_string_path("B", 1.0, 2.0), 8.0);
        assert_eq!(gc.last_point(), Some((1.0, 2.0)));
        assert!(paints(&gc).is_empty());
    }

    #[test]
    fn glyph_failure_returns_partial_advance() {
        let mut gc = context();
        gc.set_font(Arc::new(FakeFont));
        let advance = gc.fill_string_at("AXB", 0.0, 0.0);
        assert_eq!(advance, -10.0);
        assert_eq!(gc.metrics().glyph_failures, 1);
        // The glyph traced before the failure is still painted.
        assert_eq!(geometry_count(&gc), 4);
    }

    #[test]
    fn malformed_glyph_outline_is_a_glyph_failure() {
        let mut gc = context();
        gc.set_font(Arc::new(FakeFont));
        assert_eq!(gc.fill_string_at("AZ", 0.0, 0.0), -10.0);
        assert_eq!(gc.metrics().glyph_failures, 1);
        assert_eq!(geometry_count(&gc), 4);
    }

    #[test]
    fn text_without_font_draws_no_geometry() {
        let mut gc = context();
        assert_eq!(gc.fill_string("AB"), 0.0);
        assert_eq!(geometry_count(&gc), 0);
        assert_eq!(gc.metrics().strings, 0);
    }

    #[test]
    fn font_size_and_dpi_rescale_glyphs() {
        let mut gc = context();
        gc.set_font_size(12.0);
        assert_eq!(gc.state().current().scale, 256.0);
        gc.set_dpi(144);
        assert_eq!(gc.state().current().scale, 512.0);
    }

    #[test]
    fn string_bounds_use_canvas_font_metrics() {
        let mut gc = context();
        gc.set_font(Arc::new(FakeFont));
        let (left, top, right, bottom) = gc.string_bounds("AB");
        assert_eq!(left, 0.0);
        assert_eq!(top, 0.81 * 12.0);
        assert_eq!(right, 20.0);
        assert_eq!(bottom, top + 12.0);

        gc.canvas_mut().add_font(
            "face",
            crate::font::FontDescriptor {
                ascent: 750,
                descent: -250,
                cap_height: 700,
                units_per_em: 1000,
            },
        );
        gc.canvas_mut().set_font("face", Pt::from_f32(12.0));
        let (_, top, _, _) = gc.string_bounds("AB");
        assert_eq!(top, -9.0);
    }

    #[test]
    fn clear_paints_white_and_restores_fill() {
        let mut gc = context();
        gc.set_fill_color(Color::rgb(10, 20, 30));
        gc.clear_rect(0, 0, 5, 5);
        assert_eq!(gc.fill_color(), Color::rgb(10, 20, 30));
        assert_eq!(gc.canvas().fill_color(), Rgb::new(10, 20, 30));
        assert!(
            gc.canvas()
                .commands()
                .contains(&Command::SetFillColor(Rgb::WHITE))
        );
        assert_eq!(paints(&gc), vec![Command::FillEvenOdd]);
    }

    #[test]
    fn images_get_per_context_names() {
        let mut gc = context();
        let image = DynamicImage::ImageRgba8(RgbaImage::new(4, 3));
        gc.draw_image(&image).unwrap();
        gc.draw_image(&image).unwrap();
        assert!(gc.canvas().has_image("0"));
        assert!(gc.canvas().has_image("1"));
        assert_eq!(gc.canvas().commands().last(), Some(&Command::DrawImage {
            x: Pt::ZERO,
            y: Pt::ZERO,
            width: Pt::from_f32(4.0),
            height: Pt::from_f32(3.0),
            resource_id: "1".to_string(),
        }));

        let mut other = context();
        other.draw_image(&image).unwrap();
        assert!(other.canvas().has_image("0"));
    }

    #[test]
    fn image_that_fails_to_encode_keeps_its_name_free() {
        let mut gc = context();
        let empty = DynamicImage::ImageRgba8(RgbaImage::new(0, 0));
        assert!(matches!(gc.draw_image(&empty), Err(DrawError::Image(_))));
        assert!(!gc.canvas().has_image("0"));
        gc.draw_image(&DynamicImage::ImageRgba8(RgbaImage::new(2, 2)))
            .unwrap();
        assert!(gc.canvas().has_image("0"));
        assert_eq!(gc.metrics().images, 1);
    }
}
