// src/ui/widgets/waveform.rs
//! Live frequency bars panel.

use ratatui::{
    layout::Rect,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::canvas::CanvasView;
use crate::audio::LiveWaveform;

/// Render the live bars, or a hint while no source is attached.
pub fn render_waveform(f: &mut Frame<'_>, area: Rect, waveform: &LiveWaveform) {
    let title = format!("2: Waveform ({:?} palette)", waveform.palette());
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if waveform.data().is_none() {
        f.render_widget(Paragraph::new("Open a file or press m for the microphone"), inner);
        return;
    }
    f.render_widget(CanvasView::new(waveform.canvas()), inner);
}
