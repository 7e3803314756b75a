// src/ui/widgets/overview.rs
//! Whole-file waveform panel.

use ratatui::{
    layout::Rect,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::canvas::CanvasView;
use crate::audio::{visualizer::PixelCanvas, Overview};

/// Render the overview with the first `played` fraction highlighted.
pub fn render_overview(f: &mut Frame<'_>, area: Rect, overview: Option<&Overview>, played: f64) {
    let block = Block::default().borders(Borders::ALL).title("3: Overview");
    let inner = block.inner(area);
    f.render_widget(block, area);

    match overview {
        Some(overview) => {
            let mut canvas = PixelCanvas::default();
            overview.paint(&mut canvas, played);
            f.render_widget(CanvasView::new(&canvas), inner);
        }
        None => f.render_widget(Paragraph::new("No file loaded"), inner),
    }
}
