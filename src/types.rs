use fixed::types::I32F32;

/// Document length in points (72 per inch), stored as fixed point.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Pt(I32F32);

impl Pt {
    pub const ZERO: Pt = Pt(I32F32::from_bits(0));

    pub fn from_f32(value: f32) -> Pt {
        Pt::from_f64(value as f64)
    }

    pub fn from_f64(value: f64) -> Pt {
        if !value.is_finite() {
            return Pt::ZERO;
        }
        let milli = (value * 1000.0).round();
        let milli = milli.clamp(i64::MIN as f64, i64::MAX as f64) as i64;
        Pt::from_milli_i64(milli)
    }

    pub fn to_f32(self) -> f32 {
        self.0.to_num()
    }

    pub fn to_f64(self) -> f64 {
        self.0.to_num()
    }

    pub fn to_milli_i64(self) -> i64 {
        let bits = self.0.to_bits() as i128;
        let denom = 1i128 << 32;
        let scaled = bits * 1000;
        let adj = if scaled >= 0 { denom / 2 } else { -denom / 2 };
        let milli = (scaled + adj) / denom;
        milli.clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }

    pub fn from_milli_i64(milli: i64) -> Pt {
        let milli = milli as i128;
        let denom = 1i128 << 32;
        let adj = if milli >= 0 { 500 } else { -500 };
        let bits = (milli * denom + adj) / 1000;
        let bits = bits.clamp(i64::MIN as i128, i64::MAX as i128) as i64;
        Pt(I32F32::from_bits(bits))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: Pt,
    pub height: Pt,
}

impl Size {
    pub fn a4() -> Self {
        Self {
            width: Pt::from_f32(595.28),
            height: Pt::from_f32(841.89),
        }
    }

    pub fn letter() -> Self {
        // 8.5in x 11in at 72pt/in.
        Self {
            width: Pt::from_f32(612.0),
            height: Pt::from_f32(792.0),
        }
    }

    pub fn oriented(self, orientation: Orientation) -> Self {
        let landscape = self.width < self.height;
        match orientation {
            Orientation::Landscape if landscape => Self {
                width: self.height,
                height: self.width,
            },
            Orientation::Portrait if self.width > self.height => Self {
                width: self.height,
                height: self.width,
            },
            _ => self,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Drawing-model colour. Channels span 0..=65535 and are not premultiplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u16,
    pub g: u16,
    pub b: u16,
    pub a: u16,
}

impl Color {
    pub const BLACK: Color = Color::rgba16(0, 0, 0, 0xFFFF);
    pub const WHITE: Color = Color::rgba16(0xFFFF, 0xFFFF, 0xFFFF, 0xFFFF);

    pub const fn rgba16(r: u16, g: u16, b: u16, a: u16) -> Self {
        Self { r, g, b, a }
    }

    /// Widens 8-bit channels the usual way (`v * 257`), so 0xFF maps to 0xFFFF.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba16(
            r as u16 * 257,
            g as u16 * 257,
            b as u16 * 257,
            a as u16 * 257,
        )
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 0xFF)
    }
}

/// Colour as the document handle takes it: three 0..=255 channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MixBlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    #[default]
    EvenOdd,
    Winding,
}

impl FillRule {
    pub fn use_nonzero_winding(self) -> bool {
        self == FillRule::Winding
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    Butt,
    #[default]
    Round,
    Square,
}

impl LineCap {
    /// Cap token understood by the document handle.
    pub fn token(self) -> u8 {
        match self {
            LineCap::Butt => 0,
            LineCap::Round => 1,
            LineCap::Square => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    Miter,
    #[default]
    Round,
    Bevel,
}

impl LineJoin {
    pub fn token(self) -> u8 {
        match self {
            LineJoin::Miter => 0,
            LineJoin::Round => 1,
            LineJoin::Bevel => 2,
        }
    }
}

/// Paint operation handed to the document handle with a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaintStyle {
    Stroke,
    Fill,
    FillEvenOdd,
    FillStroke,
    FillStrokeEvenOdd,
}

impl PaintStyle {
    pub fn fill(rule: FillRule) -> Self {
        if rule.use_nonzero_winding() {
            PaintStyle::Fill
        } else {
            PaintStyle::FillEvenOdd
        }
    }

    pub fn fill_stroke(rule: FillRule) -> Self {
        if rule.use_nonzero_winding() {
            PaintStyle::FillStroke
        } else {
            PaintStyle::FillStrokeEvenOdd
        }
    }

    /// Operator spelling used in debug traces.
    pub fn as_str(self) -> &'static str {
        match self {
            PaintStyle::Stroke => "D",
            PaintStyle::Fill => "F",
            PaintStyle::FillEvenOdd => "F*",
            PaintStyle::FillStroke => "FD",
            PaintStyle::FillStrokeEvenOdd => "FD*",
        }
    }
}
