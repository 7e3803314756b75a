// src/ui/widgets/canvas.rs
//! Shows a pixel canvas in the terminal, two pixels per cell.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::audio::visualizer::{PixelCanvas, Surface};

/// Half-block view of a [`PixelCanvas`]: each cell shows the pixel pair
/// (`x`, `2y`) over (`x`, `2y + 1`). Pixels beyond the area are clipped.
pub struct CanvasView<'a> {
    canvas: &'a PixelCanvas,
}

impl<'a> CanvasView<'a> {
    pub fn new(canvas: &'a PixelCanvas) -> Self {
        Self { canvas }
    }
}

impl Widget for CanvasView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let cols = area.width.min(self.canvas_width());
        let rows = area.height.min(self.canvas_rows());

        for cy in 0..rows {
            for cx in 0..cols {
                let top = self.canvas.pixel(cx as u32, cy as u32 * 2);
                let bottom = self.canvas.pixel(cx as u32, cy as u32 * 2 + 1);
                let (symbol, style) = match (top, bottom) {
                    (None, None) => continue,
                    (Some(t), None) => ("▀", Style::default().fg(t.into())),
                    (None, Some(b)) => ("▄", Style::default().fg(b.into())),
                    (Some(t), Some(b)) if t == b => ("█", Style::default().fg(t.into())),
                    (Some(t), Some(b)) => (
                        "▀",
                        Style::default().fg(t.into()).bg(Color::from(b)),
                    ),
                };
                buf[(area.x + cx, area.y + cy)]
                    .set_symbol(symbol)
                    .set_style(style);
            }
        }
    }
}

impl CanvasView<'_> {
    fn canvas_width(&self) -> u16 {
        self.canvas.width().min(u16::MAX as u32) as u16
    }

    fn canvas_rows(&self) -> u16 {
        self.canvas.height().div_ceil(2).min(u16::MAX as u32) as u16
    }
}
