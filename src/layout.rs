use std::fmt;

use crate::contour::trace_contour;
use crate::convert::funits_to_pixels;
use crate::error::DrawError;
use crate::font::{FontBackend, GlyphBuf, GlyphIndex};
use crate::path::Path;

/// A string layout that stopped at a glyph whose outline could not load.
/// Contours of the glyphs before it are already in the path.
#[derive(Debug)]
pub struct LayoutError {
    pub glyph: GlyphIndex,
    /// `start_x - cursor_x` at the failing glyph. Negative once the cursor
    /// has moved right of the start.
    pub advance: f64,
    pub source: DrawError,
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "string layout aborted at glyph {}: {}",
            self.glyph.0, self.source
        )
    }
}

impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Lays out glyph outlines of one font at one scale into a path.
pub struct GlyphLayout<'a> {
    font: &'a dyn FontBackend,
    scale: i32,
    buf: &'a mut GlyphBuf,
}

impl<'a> GlyphLayout<'a> {
    pub fn new(font: &'a dyn FontBackend, scale: i32, buf: &'a mut GlyphBuf) -> Self {
        Self { font, scale, buf }
    }

    /// Traces `text` with its baseline origin at `(x, y)` and returns the
    /// horizontal advance consumed.
    pub fn layout_string(
        &mut self,
        path: &mut Path,
        text: &str,
        x: f64,
        y: f64,
    ) -> Result<f64, LayoutError> {
        let start_x = x;
        let mut x = x;
        let mut prev = None;
        for ch in text.chars() {
            let index = self.font.glyph_index(ch);
            if let Some(prev) = prev {
                x += funits_to_pixels(self.font.kerning(self.scale, prev, index));
            }
            if let Err(source) = self.draw_glyph(path, index, x, y) {
                return Err(LayoutError {
                    glyph: index,
                    advance: start_x - x,
                    source,
                });
            }
            x += funits_to_pixels(self.font.advance_width(self.scale, index));
            prev = Some(index);
        }
        Ok(x - start_x)
    }

    fn draw_glyph(
        &mut self,
        path: &mut Path,
        glyph: GlyphIndex,
        dx: f64,
        dy: f64,
    ) -> Result<(), DrawError> {
        self.font.load_outline(glyph, self.scale, self.buf)?;
        if !self.buf.is_well_formed() {
            return Err(DrawError::GlyphLoad {
                glyph,
                reason: "contour end offsets do not fit the outline points".to_string(),
            });
        }
        for contour in self.buf.contours() {
            trace_contour(path, contour, dx, dy);
        }
        Ok(())
    }
}

/// Advance of `text` from the same metrics the layout uses, without
/// loading outlines.
pub fn measure_string(font: &dyn FontBackend, scale: i32, text: &str) -> f64 {
    let mut width = 0.0;
    let mut prev = None;
    for ch in text.chars() {
        let index = font.glyph_index(ch);
        if let Some(prev) = prev {
            width += funits_to_pixels(font.kerning(scale, prev, index));
        }
        width += funits_to_pixels(font.advance_width(scale, index));
        prev = Some(index);
    }
    width
}
