use std::fmt;

use crate::font::GlyphIndex;

#[derive(Debug)]
pub enum DrawError {
    MissingFont,
    GlyphLoad { glyph: GlyphIndex, reason: String },
    InvalidFont(String),
    Image(image::ImageError),
    Io(std::io::Error),
}

impl fmt::Display for DrawError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawError::MissingFont => write!(f, "no font assigned to the drawing state"),
            DrawError::GlyphLoad { glyph, reason } => {
                write!(f, "cannot load outline for glyph {}: {}", glyph.0, reason)
            }
            DrawError::InvalidFont(message) => write!(f, "invalid font: {}", message),
            DrawError::Image(err) => write!(f, "image error: {}", err),
            DrawError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for DrawError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DrawError::Image(err) => Some(err),
            DrawError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DrawError {
    fn from(value: std::io::Error) -> Self {
        DrawError::Io(value)
    }
}

impl From<image::ImageError> for DrawError {
    fn from(value: image::ImageError) -> Self {
        DrawError::Image(value)
    }
}
