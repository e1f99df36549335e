use std::fmt;
use std::fs;
use std::path::Path;

use ttf_parser::{GlyphId, OutlineBuilder};

use crate::error::DrawError;

/// Opaque glyph index assigned by a font's character map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GlyphIndex(pub u16);

/// Outline point in scaled font units (26.6 fixed point), Y up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutlinePoint {
    pub x: i32,
    pub y: i32,
    pub on_curve: bool,
}

impl OutlinePoint {
    pub fn new(x: i32, y: i32, on_curve: bool) -> Self {
        Self { x, y, on_curve }
    }
}

/// Reusable outline storage. `ends[i]` is the exclusive end offset of
/// contour `i` within `points`.
#[derive(Debug, Clone, Default)]
pub struct GlyphBuf {
    pub points: Vec<OutlinePoint>,
    pub ends: Vec<usize>,
}

impl GlyphBuf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.ends.clear();
    }

    /// True when `ends` never runs backwards or past the last point.
    pub fn is_well_formed(&self) -> bool {
        let mut start = 0;
        self.ends.iter().all(|&end| {
            let in_order = start <= end && end <= self.points.len();
            start = end;
            in_order
        })
    }

    /// Contours in order. Stops early at the first end offset that does
    /// not fit the point list.
    pub fn contours(&self) -> impl Iterator<Item = &[OutlinePoint]> + '_ {
        let mut start = 0;
        self.ends.iter().map_while(move |&end| {
            let contour = self.points.get(start..end)?;
            start = end;
            Some(contour)
        })
    }
}

/// Vertical metrics the document handle uses to place text, in font units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FontDescriptor {
    pub ascent: i32,
    pub descent: i32,
    pub cap_height: i32,
    pub units_per_em: u16,
}

/// Glyph source for text layout. All values are integers in font units
/// scaled to `scale` (26.6 units per em).
pub trait FontBackend: fmt::Debug {
    fn glyph_index(&self, ch: char) -> GlyphIndex;

    /// Replaces the contents of `buf` with the outline of `glyph`.
    fn load_outline(
        &self,
        glyph: GlyphIndex,
        scale: i32,
        buf: &mut GlyphBuf,
    ) -> Result<(), DrawError>;

    fn advance_width(&self, scale: i32, glyph: GlyphIndex) -> i32;

    fn kerning(&self, scale: i32, left: GlyphIndex, right: GlyphIndex) -> i32;

    fn descriptor(&self) -> FontDescriptor {
        FontDescriptor::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontFamily {
    #[default]
    Sans,
    Serif,
    Mono,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FontStyle {
    pub bold: bool,
    pub italic: bool,
}

impl FontStyle {
    pub const NORMAL: FontStyle = FontStyle {
        bold: false,
        italic: false,
    };

    /// Style suffix the document handle appends to a font name.
    pub fn suffix(self) -> &'static str {
        match (self.bold, self.italic) {
            (false, false) => "",
            (true, false) => "B",
            (false, true) => "I",
            (true, true) => "BI",
        }
    }
}

/// Names a font for the document handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontData {
    pub name: String,
    pub family: FontFamily,
    pub style: FontStyle,
}

impl FontData {
    pub fn new(name: impl Into<String>, family: FontFamily, style: FontStyle) -> Self {
        Self {
            name: name.into(),
            family,
            style,
        }
    }

    pub fn document_name(&self) -> String {
        format!("{}{}", self.name, self.style.suffix())
    }
}

impl Default for FontData {
    fn default() -> Self {
        Self::new("luxi", FontFamily::Sans, FontStyle::NORMAL)
    }
}

/// TrueType font read with `ttf-parser`. Only `glyf` outlines can be
/// traced; CFF-flavoured fonts parse but fail on outline loads.
#[derive(Debug)]
pub struct TrueTypeFont {
    name: String,
    data: Vec<u8>,
    units_per_em: i32,
    has_glyf: bool,
    descriptor: FontDescriptor,
}

impl TrueTypeFont {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, DrawError> {
        let face = ttf_parser::Face::parse(&data, 0)
            .map_err(|err| DrawError::InvalidFont(err.to_string()))?;
        let name = face_name(&face);
        let units_per_em = face.units_per_em();
        let descriptor = FontDescriptor {
            ascent: face.ascender() as i32,
            descent: face.descender() as i32,
            cap_height: face.capital_height().unwrap_or(0) as i32,
            units_per_em,
        };
        let has_glyf = face.tables().glyf.is_some();
        Ok(Self {
            name,
            units_per_em: units_per_em.max(1) as i32,
            has_glyf,
            descriptor,
            data,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DrawError> {
        let data = fs::read(path)?;
        Self::from_bytes(data)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.data, 0).ok()
    }

    fn scale(&self, value: i32, scale: i32) -> i32 {
        scale_funits(value, scale, self.units_per_em)
    }
}

impl FontBackend for TrueTypeFont {
    fn glyph_index(&self, ch: char) -> GlyphIndex {
        self.face()
            .and_then(|face| face.glyph_index(ch))
            .map(|id| GlyphIndex(id.0))
            .unwrap_or_default()
    }

    fn load_outline(
        &self,
        glyph: GlyphIndex,
        scale: i32,
        buf: &mut GlyphBuf,
    ) -> Result<(), DrawError> {
        buf.clear();
        let unavailable = |reason: &str| DrawError::GlyphLoad {
            glyph,
            reason: reason.to_string(),
        };
        let face = self.face().ok_or_else(|| unavailable("font data no longer parses"))?;
        if glyph.0 >= face.number_of_glyphs() {
            return Err(unavailable("glyph index out of range"));
        }
        if !self.has_glyf {
            return Err(unavailable("font has no TrueType outlines"));
        }
        let mut collector = PointCollector::new(buf, scale, self.units_per_em);
        // Glyphs without contours (spaces) yield `None` and an empty buffer.
        let _ = face.outline_glyph(GlyphId(glyph.0), &mut collector);
        collector.finish();
        Ok(())
    }

    fn advance_width(&self, scale: i32, glyph: GlyphIndex) -> i32 {
        let advance = self
            .face()
            .and_then(|face| face.glyph_hor_advance(GlyphId(glyph.0)))
            .unwrap_or(0);
        self.scale(advance as i32, scale)
    }

    fn kerning(&self, scale: i32, left: GlyphIndex, right: GlyphIndex) -> i32 {
        let Some(face) = self.face() else {
            return 0;
        };
        let Some(kern) = face.tables().kern else {
            return 0;
        };
        let mut total: i32 = 0;
        for sub in kern.subtables {
            if !sub.horizontal || sub.has_cross_stream || sub.has_state_machine {
                continue;
            }
            if let Some(v) = sub.glyphs_kerning(GlyphId(left.0), GlyphId(right.0)) {
                total = total.saturating_add(v as i32);
            }
        }
        self.scale(total, scale)
    }

    fn descriptor(&self) -> FontDescriptor {
        self.descriptor
    }
}

fn face_name(face: &ttf_parser::Face<'_>) -> String {
    use ttf_parser::name::name_id;

    let mut full = None;
    let mut post = None;
    for entry in face.names() {
        let Some(name) = entry.to_string() else {
            continue;
        };
        match entry.name_id {
            name_id::POST_SCRIPT_NAME if post.is_none() => post = Some(name),
            name_id::FULL_NAME if full.is_none() => full = Some(name),
            _ => {}
        }
    }
    post.or(full).unwrap_or_else(|| "EmbeddedFont".to_string())
}

/// Scales a design-unit value to `scale` units per em, rounding halves
/// away from zero.
pub fn scale_funits(value: i32, scale: i32, units_per_em: i32) -> i32 {
    if units_per_em == 0 {
        return 0;
    }
    let x = value as i64 * scale as i64;
    let half = units_per_em as i64 / 2;
    let x = if x >= 0 { x + half } else { x - half };
    (x / units_per_em as i64).clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

// Turns the segment callbacks of `ttf-parser` back into on/off-curve point
// lists at the requested scale. Implied on-curve midpoints come out as
// explicit points, which traces to the same geometry.
struct PointCollector<'a> {
    buf: &'a mut GlyphBuf,
    contour_start: usize,
    factor: f64,
}

impl<'a> PointCollector<'a> {
    fn new(buf: &'a mut GlyphBuf, scale: i32, units_per_em: i32) -> Self {
        let contour_start = buf.points.len();
        Self {
            buf,
            contour_start,
            factor: scale as f64 / units_per_em.max(1) as f64,
        }
    }

    // Midpoints can land on half units, so scale before the single rounding.
    fn push(&mut self, x: f32, y: f32, on_curve: bool) {
        let x = (x as f64 * self.factor).round() as i32;
        let y = (y as f64 * self.factor).round() as i32;
        self.buf.points.push(OutlinePoint::new(x, y, on_curve));
    }

    fn end_contour(&mut self) {
        let len = self.buf.points.len();
        if len == self.contour_start {
            return;
        }
        // The closing segment back to the start is implicit in a contour.
        if len - self.contour_start > 1 {
            let first = self.buf.points[self.contour_start];
            let last = self.buf.points[len - 1];
            if last.on_curve && last == first {
                self.buf.points.pop();
            }
        }
        self.buf.ends.push(self.buf.points.len());
        self.contour_start = self.buf.points.len();
    }

    fn finish(mut self) {
        self.end_contour();
    }
}

impl OutlineBuilder for PointCollector<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        self.end_contour();
        self.push(x, y, true);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.push(x, y, true);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.push(x1, y1, false);
        self.push(x, y, true);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        // glyf outlines never produce cubics; keep the endpoints.
        let _ = (x1, y1, x2, y2);
        self.push(x, y, true);
    }

    fn close(&mut self) {
        self.end_contour();
    }
}
