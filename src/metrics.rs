use crate::types::PaintStyle;

/// Counters of what a rendering context has handed to its document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawMetrics {
    pub draw_calls: usize,
    pub strokes: usize,
    pub fills: usize,
    pub fill_strokes: usize,
    pub alpha_changes: usize,
    pub strings: usize,
    pub glyph_failures: usize,
    pub images: usize,
}

impl DrawMetrics {
    pub(crate) fn record_draw(&mut self, style: PaintStyle, alpha_changed: bool) {
        self.draw_calls += 1;
        match style {
            PaintStyle::Stroke => self.strokes += 1,
            PaintStyle::Fill | PaintStyle::FillEvenOdd => self.fills += 1,
            PaintStyle::FillStroke | PaintStyle::FillStrokeEvenOdd => self.fill_strokes += 1,
        }
        if alpha_changed {
            self.alpha_changes += 1;
        }
    }
}
