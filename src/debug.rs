use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::DrawError;
use crate::font::GlyphIndex;
use crate::types::PaintStyle;

/// JSON-lines trace of one rendering context: a line per paint call,
/// glyph failure and embedded image, then a summary of the counters when
/// the context finishes.
pub(crate) struct DebugLogger {
    writer: BufWriter<File>,
    counters: BTreeMap<&'static str, u64>,
}

impl DebugLogger {
    pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            counters: BTreeMap::new(),
        })
    }

    pub fn draw(&mut self, style: PaintStyle, alpha: f64, paths: usize, alpha_changed: bool) {
        self.count("draw.calls", 1);
        if alpha_changed {
            self.count("draw.alpha_changes", 1);
        }
        self.line(format_args!(
            "{{\"type\":\"draw\",\"style\":\"{}\",\"alpha\":{alpha:.6},\"paths\":{paths}}}",
            style.as_str()
        ));
    }

    pub fn glyphs_traced(&mut self, count: usize) {
        self.count("glyph.traced", count as u64);
    }

    pub fn glyph_failed(&mut self, glyph: GlyphIndex, reason: &DrawError) {
        self.count("glyph.failed", 1);
        self.line(format_args!(
            "{{\"type\":\"glyph.load_failed\",\"glyph\":{},\"reason\":\"{}\"}}",
            glyph.0,
            json_escape(&reason.to_string())
        ));
    }

    pub fn image_registered(&mut self, name: &str, bytes: usize) {
        self.count("image.registered", 1);
        self.line(format_args!(
            "{{\"type\":\"image.register\",\"name\":\"{}\",\"bytes\":{bytes}}}",
            json_escape(name)
        ));
    }

    /// Writes the summary line and flushes the trace.
    pub fn finish(mut self) -> io::Result<()> {
        let counts = self
            .counters
            .iter()
            .map(|(key, value)| format!("\"{key}\":{value}"))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(self.writer, "{{\"type\":\"summary\",\"counts\":{{{counts}}}}}")?;
        self.writer.flush()
    }

    fn count(&mut self, key: &'static str, amount: u64) {
        let entry = self.counters.entry(key).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    // Lines that fail to write are dropped.
    fn line(&mut self, args: fmt::Arguments<'_>) {
        let _ = writeln!(self.writer, "{args}");
    }
}

fn json_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 8);
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}
