use std::collections::BTreeMap;

use crate::font::FontDescriptor;
use crate::types::{MixBlendMode, PaintStyle, Pt, Rgb, Size};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SaveState,
    RestoreState,
    Translate(Pt, Pt),
    Scale(f32, f32),
    // Degrees, counterclockwise on the page.
    Rotate(f32),
    SetFillColor(Rgb),
    SetStrokeColor(Rgb),
    SetTextColor(Rgb),
    SetLineWidth(Pt),
    SetLineCap(u8),
    SetLineJoin(u8),
    SetDash {
        pattern: Vec<Pt>,
        phase: Pt,
    },
    SetAlpha {
        alpha: f64,
        blend_mode: MixBlendMode,
    },
    SetFontName(String),
    SetFontSize(Pt),
    MoveTo {
        x: Pt,
        y: Pt,
    },
    LineTo {
        x: Pt,
        y: Pt,
    },
    CurveTo {
        x1: Pt,
        y1: Pt,
        x2: Pt,
        y2: Pt,
        x: Pt,
        y: Pt,
    },
    ClosePath,
    Fill,
    FillEvenOdd,
    Stroke,
    FillStroke,
    FillStrokeEvenOdd,
    DrawImage {
        x: Pt,
        y: Pt,
        width: Pt,
        height: Pt,
        resource_id: String,
    },
}

impl Command {
    pub fn is_paint(&self) -> bool {
        matches!(
            self,
            Command::Fill
                | Command::FillEvenOdd
                | Command::Stroke
                | Command::FillStroke
                | Command::FillStrokeEvenOdd
        )
    }
}

/// PNG-encoded bitmap registered under a resource name.
#[derive(Debug, Clone)]
pub struct ImageResource {
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct Page {
    pub commands: Vec<Command>,
}

impl Page {
    fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    pub page_size: Size,
    pub pages: Vec<Page>,
    pub images: BTreeMap<String, ImageResource>,
    pub fonts: BTreeMap<String, FontDescriptor>,
}

#[derive(Debug, Clone, PartialEq)]
struct GraphicsState {
    fill_color: Rgb,
    stroke_color: Rgb,
    text_color: Rgb,
    line_width: Pt,
    line_cap: u8,
    line_join: u8,
    alpha: f64,
    blend_mode: MixBlendMode,
    font_size: Pt,
    font_name: String,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            fill_color: Rgb::BLACK,
            stroke_color: Rgb::BLACK,
            text_color: Rgb::BLACK,
            line_width: Pt::from_f32(1.0),
            line_cap: 0,
            line_join: 0,
            alpha: 1.0,
            blend_mode: MixBlendMode::Normal,
            font_size: Pt::from_f32(12.0),
            font_name: "Helvetica".to_string(),
        }
    }
}

/// Page-based document handle. Records drawing commands per page and
/// caches the graphics state it has emitted, so setters that repeat the
/// cached value emit nothing. A transform block saves and restores that
/// cache together with the coordinate transform.
///
/// Coordinates are in points (72 per inch) with Y growing downward.
pub struct Canvas {
    page_size: Size,
    pages: Vec<Page>,
    current: Page,
    state_stack: Vec<GraphicsState>,
    current_state: GraphicsState,
    images: BTreeMap<String, ImageResource>,
    fonts: BTreeMap<String, FontDescriptor>,
}

impl Canvas {
    pub fn new(page_size: Size) -> Self {
        Self {
            page_size,
            pages: Vec::new(),
            current: Page::new(),
            state_stack: Vec::new(),
            current_state: GraphicsState::default(),
            images: BTreeMap::new(),
            fonts: BTreeMap::new(),
        }
    }

    pub fn page_size(&self) -> Size {
        self.page_size
    }

    pub fn transform_begin(&mut self) {
        self.state_stack.push(self.current_state.clone());
        self.current.commands.push(Command::SaveState);
    }

    pub fn transform_end(&mut self) {
        if let Some(state) = self.state_stack.pop() {
            self.current_state = state;
            self.current.commands.push(Command::RestoreState);
        }
    }

    pub fn transform_depth(&self) -> usize {
        self.state_stack.len()
    }

    pub fn translate(&mut self, x: Pt, y: Pt) {
        self.current.commands.push(Command::Translate(x, y));
    }

    pub fn scale(&mut self, x: f32, y: f32) {
        self.current.commands.push(Command::Scale(x, y));
    }

    pub fn rotate(&mut self, angle_degrees: f32) {
        self.current.commands.push(Command::Rotate(angle_degrees));
    }

    pub fn fill_color(&self) -> Rgb {
        self.current_state.fill_color
    }

    pub fn set_fill_color(&mut self, color: Rgb) {
        if self.current_state.fill_color == color {
            return;
        }
        self.current_state.fill_color = color;
        self.current.commands.push(Command::SetFillColor(color));
    }

    pub fn stroke_color(&self) -> Rgb {
        self.current_state.stroke_color
    }

    pub fn set_stroke_color(&mut self, color: Rgb) {
        if self.current_state.stroke_color == color {
            return;
        }
        self.current_state.stroke_color = color;
        self.current.commands.push(Command::SetStrokeColor(color));
    }

    pub fn text_color(&self) -> Rgb {
        self.current_state.text_color
    }

    pub fn set_text_color(&mut self, color: Rgb) {
        if self.current_state.text_color == color {
            return;
        }
        self.current_state.text_color = color;
        self.current.commands.push(Command::SetTextColor(color));
    }

    pub fn line_width(&self) -> Pt {
        self.current_state.line_width
    }

    pub fn set_line_width(&mut self, width: Pt) {
        let width = if width < Pt::ZERO { Pt::ZERO } else { width };
        if self.current_state.line_width == width {
            return;
        }
        self.current_state.line_width = width;
        self.current.commands.push(Command::SetLineWidth(width));
    }

    pub fn line_cap(&self) -> u8 {
        self.current_state.line_cap
    }

    pub fn set_line_cap(&mut self, cap: u8) {
        if self.current_state.line_cap == cap {
            return;
        }
        self.current_state.line_cap = cap;
        self.current.commands.push(Command::SetLineCap(cap));
    }

    pub fn line_join(&self) -> u8 {
        self.current_state.line_join
    }

    pub fn set_line_join(&mut self, join: u8) {
        if self.current_state.line_join == join {
            return;
        }
        self.current_state.line_join = join;
        self.current.commands.push(Command::SetLineJoin(join));
    }

    pub fn set_dash(&mut self, pattern: Vec<Pt>, phase: Pt) {
        self.current
            .commands
            .push(Command::SetDash { pattern, phase });
    }

    pub fn alpha(&self) -> (f64, MixBlendMode) {
        (self.current_state.alpha, self.current_state.blend_mode)
    }

    /// Values outside 0..=1 are clamped.
    pub fn set_alpha(&mut self, alpha: f64, blend_mode: MixBlendMode) {
        let alpha = alpha.clamp(0.0, 1.0);
        self.current_state.alpha = alpha;
        self.current_state.blend_mode = blend_mode;
        self.current
            .commands
            .push(Command::SetAlpha { alpha, blend_mode });
    }

    /// Registers a font's metrics under the name `set_font` selects it by.
    pub fn add_font(&mut self, name: &str, descriptor: FontDescriptor) {
        self.fonts.entry(name.to_string()).or_insert(descriptor);
    }

    pub fn set_font(&mut self, name: &str, size: Pt) {
        if self.current_state.font_name != name {
            self.current_state.font_name = name.to_string();
            self.current
                .commands
                .push(Command::SetFontName(self.current_state.font_name.clone()));
        }
        self.set_font_size(size);
    }

    pub fn set_font_size(&mut self, size: Pt) {
        if self.current_state.font_size == size {
            return;
        }
        self.current_state.font_size = size;
        self.current.commands.push(Command::SetFontSize(size));
    }

    pub fn font_name(&self) -> &str {
        &self.current_state.font_name
    }

    pub fn font_size(&self) -> Pt {
        self.current_state.font_size
    }

    /// Metrics of the selected font; zeroed for fonts never registered,
    /// such as the standard PDF fonts.
    pub fn font_descriptor(&self) -> FontDescriptor {
        self.fonts
            .get(&self.current_state.font_name)
            .copied()
            .unwrap_or_default()
    }

    pub fn move_to(&mut self, x: Pt, y: Pt) {
        self.current.commands.push(Command::MoveTo { x, y });
    }

    pub fn line_to(&mut self, x: Pt, y: Pt) {
        self.current.commands.push(Command::LineTo { x, y });
    }

    pub fn curve_to(&mut self, x1: Pt, y1: Pt, x2: Pt, y2: Pt, x: Pt, y: Pt) {
        self.current.commands.push(Command::CurveTo {
            x1,
            y1,
            x2,
            y2,
            x,
            y,
        });
    }

    pub fn close_path(&mut self) {
        self.current.commands.push(Command::ClosePath);
    }

    /// Paints and consumes the path built since the last paint.
    pub fn draw_path(&mut self, style: PaintStyle) {
        let command = match style {
            PaintStyle::Stroke => Command::Stroke,
            PaintStyle::Fill => Command::Fill,
            PaintStyle::FillEvenOdd => Command::FillEvenOdd,
            PaintStyle::FillStroke => Command::FillStroke,
            PaintStyle::FillStrokeEvenOdd => Command::FillStrokeEvenOdd,
        };
        self.current.commands.push(command);
    }

    pub fn register_image(&mut self, name: impl Into<String>, data: Vec<u8>) {
        self.images.insert(name.into(), ImageResource { data });
    }

    pub fn has_image(&self, name: &str) -> bool {
        self.images.contains_key(name)
    }

    pub fn draw_image(
        &mut self,
        x: Pt,
        y: Pt,
        width: Pt,
        height: Pt,
        resource_id: impl Into<String>,
    ) {
        self.current.commands.push(Command::DrawImage {
            x,
            y,
            width,
            height,
            resource_id: resource_id.into(),
        });
    }

    pub fn show_page(&mut self) {
        let current = std::mem::replace(&mut self.current, Page::new());
        self.pages.push(current);
        self.state_stack.clear();
        self.current_state = GraphicsState::default();
    }

    /// Commands recorded on the page being drawn.
    pub fn commands(&self) -> &[Command] {
        &self.current.commands
    }

    pub fn current_command_count(&self) -> usize {
        self.current.commands.len()
    }

    pub fn finish(mut self) -> Document {
        if !self.current.commands.is_empty() || self.pages.is_empty() {
            self.show_page();
        }
        Document {
            page_size: self.page_size,
            pages: self.pages,
            images: self.images,
            fonts: self.fonts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_setters_emit_once() {
        let mut canvas = Canvas::new(Size::a4());
        canvas.set_fill_color(Rgb::WHITE);
        canvas.set_fill_color(Rgb::WHITE);
        canvas.set_line_width(Pt::from_f32(1.0));
        assert_eq!(canvas.commands(), &[Command::SetFillColor(Rgb::WHITE)]);
    }

    #[test]
    fn transform_block_restores_cached_state() {
        let mut canvas = Canvas::new(Size::a4());
        canvas.transform_begin();
        canvas.set_stroke_color(Rgb::new(255, 0, 0));
        canvas.set_alpha(0.5, MixBlendMode::Multiply);
        assert_eq!(canvas.transform_depth(), 1);
        canvas.transform_end();
        assert_eq!(canvas.stroke_color(), Rgb::BLACK);
        assert_eq!(canvas.alpha(), (1.0, MixBlendMode::Normal));
        assert_eq!(canvas.commands().first(), Some(&Command::SaveState));
        assert_eq!(canvas.commands().last(), Some(&Command::RestoreState));
    }

    #[test]
    fn unbalanced_end_is_ignored() {
        let mut canvas = Canvas::new(Size::a4());
        canvas.transform_end();
        assert!(canvas.commands().is_empty());
    }

    #[test]
    fn alpha_is_clamped() {
        let mut canvas = Canvas::new(Size::a4());
        canvas.set_alpha(1.5, MixBlendMode::Normal);
        assert_eq!(canvas.alpha().0, 1.0);
    }

    #[test]
    fn descriptor_follows_selected_font() {
        let mut canvas = Canvas::new(Size::a4());
        let descriptor = FontDescriptor {
            ascent: 800,
            descent: -200,
            cap_height: 700,
            units_per_em: 1000,
        };
        canvas.add_font("luxi", descriptor);
        assert_eq!(canvas.font_descriptor(), FontDescriptor::default());
        canvas.set_font("luxi", Pt::from_f32(12.0));
        assert_eq!(canvas.font_descriptor(), descriptor);
        assert_eq!(canvas.commands(), &[Command::SetFontName("luxi".into())]);
    }

    #[test]
    fn finish_keeps_pages_and_resources() {
        let mut canvas = Canvas::new(Size::letter());
        canvas.register_image("0", vec![1, 2, 3]);
        canvas.move_to(Pt::ZERO, Pt::ZERO);
        canvas.line_to(Pt::from_f32(10.0), Pt::ZERO);
        canvas.draw_path(PaintStyle::Stroke);
        canvas.show_page();
        let document = canvas.finish();
        assert_eq!(document.pages.len(), 1);
        assert_eq!(document.pages[0].commands.len(), 3);
        assert!(document.images.contains_key("0"));
    }
}
