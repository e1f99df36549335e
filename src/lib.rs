mod backend;
mod canvas;
mod context;
mod contour;
mod convert;
mod debug;
mod dispatch;
mod error;
mod font;
mod layout;
mod metrics;
mod path;
mod stack;
mod types;

pub use backend::GraphicsBackend;
pub use canvas::{Canvas, Command, Document, ImageResource, Page};
pub use context::PdfGraphicContext;
pub use contour::trace_contour;
pub use convert::{
    DPI, color_alpha, color_to_channels, funits_to_pixels, glyph_point_to_pixel, glyph_scale,
};
use debug::DebugLogger;
pub use dispatch::PathConverter;
pub use error::DrawError;
pub use font::{
    FontBackend, FontData, FontDescriptor, FontFamily, FontStyle, GlyphBuf, GlyphIndex,
    OutlinePoint, TrueTypeFont, scale_funits,
};
pub use kurbo::{Affine, PathEl, Point};
pub use layout::{GlyphLayout, LayoutError, measure_string};
pub use metrics::DrawMetrics;
pub use path::Path;
pub use stack::{DrawingState, StateStack};
pub use types::{
    Color, FillRule, LineCap, LineJoin, MixBlendMode, Orientation, PaintStyle, Pt, Rgb, Size,
};

/// Creates a document handle set up the way the drawing model expects:
/// black stroke, white fill, round caps and joins, unit line width.
pub fn new_pdf(orientation: Orientation, page_size: Size) -> Canvas {
    let mut canvas = Canvas::new(page_size.oriented(orientation));
    canvas.set_stroke_color(Rgb::BLACK);
    canvas.set_fill_color(Rgb::WHITE);
    canvas.set_line_cap(LineCap::Round.token());
    canvas.set_line_join(LineJoin::Round.token());
    canvas.set_line_width(Pt::from_f32(1.0));
    canvas
}

#[derive(Clone, Debug)]
pub struct ContextBuilder {
    page_size: Size,
    orientation: Orientation,
    dpi: i32,
    debug_path: Option<std::path::PathBuf>,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self {
            page_size: Size::a4(),
            orientation: Orientation::Portrait,
            dpi: DPI,
            debug_path: None,
        }
    }

    pub fn page_size(mut self, size: Size) -> Self {
        self.page_size = size;
        self
    }

    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn dpi(mut self, dpi: i32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Writes a JSON-lines trace of draw calls and glyph failures to `path`.
    pub fn debug_path(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.debug_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<PdfGraphicContext, DrawError> {
        let debug = match &self.debug_path {
            Some(path) => Some(DebugLogger::new(path)?),
            None => None,
        };
        let canvas = new_pdf(self.orientation, self.page_size);
        let mut gc = PdfGraphicContext::new(canvas).with_debug(debug);
        if self.dpi != DPI {
            gc.set_dpi(self.dpi);
        }
        Ok(gc)
    }
}
