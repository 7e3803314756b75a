// src/audio/visualizer/renderer.rs
//! Per-frame bar drawing for the live visualizer.

use serde::Deserialize;

use super::analyzer::{AnalyzerData, FrequencyAnalyzer};
use super::surface::{Rect, Rgb, Surface};

/// Bar colors, light to dark.
pub const PALETTE: [Rgb; 5] = [
    Rgb::hex("#61dafb"),
    Rgb::hex("#5ac8fa"),
    Rgb::hex("#50b6f5"),
    Rgb::hex("#419de6"),
    Rgb::hex("#20232a"),
];

/// Each bar is this many times its even share of the surface width.
pub const BAR_WIDTH_SCALE: f64 = 2.5;

/// Horizontal gap after every bar, in surface units.
pub const BAR_GAP: f64 = 3.0;

/// How a normalized magnitude selects a palette entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteMode {
    /// `floor(m * 1)`: the first color for everything except a full-scale
    /// sample, which gets the second.
    #[default]
    Literal,
    /// `floor(m * 5)`, capped at the last entry.
    Graded,
}

impl PaletteMode {
    pub fn color(self, magnitude: f64) -> Rgb {
        let index = match self {
            PaletteMode::Literal => (magnitude * 1.0).floor() as usize,
            PaletteMode::Graded => (magnitude * PALETTE.len() as f64).floor() as usize,
        };
        PALETTE[index.min(PALETTE.len() - 1)]
    }

    pub fn toggled(self) -> Self {
        match self {
            PaletteMode::Literal => PaletteMode::Graded,
            PaletteMode::Graded => PaletteMode::Literal,
        }
    }
}

/// Width of every bar on a `surface_width` surface showing `len` samples.
pub fn bar_width(surface_width: f64, len: usize) -> f64 {
    (surface_width / len as f64) * BAR_WIDTH_SCALE
}

/// Paints analyzer output as vertically centered bars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRenderer {
    pub width: u32,
    pub height: u32,
    pub palette: PaletteMode,
}

impl FrameRenderer {
    pub fn new(width: u32, height: u32, palette: PaletteMode) -> Self {
        Self {
            width,
            height,
            palette,
        }
    }

    /// Draw one frame.
    ///
    /// Without an analyzer or a surface nothing happens: the surface is not
    /// resized, cleared or painted.
    pub fn draw<A, S>(&self, data: Option<&mut AnalyzerData<A>>, surface: Option<&mut S>)
    where
        A: FrequencyAnalyzer,
        S: Surface + ?Sized,
    {
        let (Some(data), Some(surface)) = (data, surface) else {
            return;
        };

        surface.set_size(self.width, self.height);
        let samples = data.refresh();
        self.paint(samples, surface);
    }

    /// Clear `surface` and paint one bar per sample.
    pub fn paint<S: Surface + ?Sized>(&self, samples: &[u8], surface: &mut S) {
        let width = surface.width() as f64;
        let height = surface.height() as f64;
        surface.clear_rect(Rect::new(0.0, 0.0, width, height));

        let len = samples.len();
        if len == 0 {
            return;
        }
        let bar_w = bar_width(width, len);
        let center_y = height / 2.0;

        let mut x = 0.0;
        for &sample in samples {
            let magnitude = sample as f64 / 255.0;
            let bar_h = magnitude * height;
            surface.fill_rect(
                Rect::new(x, center_y - bar_h / 2.0, bar_w, bar_h),
                self.palette.color(magnitude),
            );
            x += bar_w + BAR_GAP;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::visualizer::surface::PixelCanvas;

    struct Fixed(Vec<u8>);

    impl FrequencyAnalyzer for Fixed {
        fn frequency_bin_count(&self) -> usize {
            self.0.len()
        }

        fn byte_frequency_data(&mut self, out: &mut [u8]) {
            out.copy_from_slice(&self.0[..out.len()]);
        }
    }

    /// Records every call instead of rasterizing.
    #[derive(Default)]
    struct Recorder {
        size: (u32, u32),
        resizes: usize,
        clears: Vec<Rect>,
        fills: Vec<(Rect, Rgb)>,
    }

    impl Surface for Recorder {
        fn width(&self) -> u32 {
            self.size.0
        }

        fn height(&self) -> u32 {
            self.size.1
        }

        fn set_size(&mut self, width: u32, height: u32) {
            self.size = (width, height);
            self.resizes += 1;
        }

        fn clear_rect(&mut self, rect: Rect) {
            self.clears.push(rect);
        }

        fn fill_rect(&mut self, rect: Rect, color: Rgb) {
            self.fills.push((rect, color));
        }
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn bars_advance_by_width_plus_gap() {
        let renderer = FrameRenderer::new(300, 40, PaletteMode::Literal);
        let mut data = AnalyzerData::new(Fixed(vec![0, 51, 102, 255]));
        let mut surface = Recorder::default();
        renderer.draw(Some(&mut data), Some(&mut surface));

        let bar_w = 300.0 / 4.0 * 2.5;
        assert_eq!(surface.fills.len(), 4);
        for (i, (rect, _)) in surface.fills.iter().enumerate() {
            assert_close(rect.x, i as f64 * (bar_w + 3.0));
            assert_close(rect.width, bar_w);
        }
    }

    #[test]
    fn bars_are_vertically_centered() {
        let renderer = FrameRenderer::new(100, 40, PaletteMode::Literal);
        let mut data = AnalyzerData::new(Fixed(vec![51, 255, 0]));
        let mut surface = Recorder::default();
        renderer.draw(Some(&mut data), Some(&mut surface));

        let heights: Vec<f64> = surface.fills.iter().map(|(r, _)| r.height).collect();
        assert_close(heights[0], 8.0);
        assert_close(heights[1], 40.0);
        assert_close(heights[2], 0.0);
        for (rect, _) in &surface.fills {
            assert_close(rect.y + rect.height / 2.0, 20.0);
        }
    }

    #[test]
    fn frame_starts_with_resize_and_full_clear() {
        let renderer = FrameRenderer::new(64, 16, PaletteMode::Literal);
        let mut data = AnalyzerData::new(Fixed(vec![10; 8]));
        let mut surface = Recorder::default();
        renderer.draw(Some(&mut data), Some(&mut surface));
        renderer.draw(Some(&mut data), Some(&mut surface));

        assert_eq!(surface.resizes, 2);
        assert_eq!(surface.size, (64, 16));
        assert_eq!(surface.clears, vec![Rect::new(0.0, 0.0, 64.0, 16.0); 2]);
    }

    #[test]
    fn missing_inputs_leave_surface_untouched() {
        let renderer = FrameRenderer::new(64, 16, PaletteMode::Literal);
        let mut surface = Recorder::default();
        renderer.draw::<Fixed, _>(None, Some(&mut surface));
        assert_eq!(surface.resizes, 0);
        assert!(surface.clears.is_empty() && surface.fills.is_empty());

        let mut data = AnalyzerData::new(Fixed(vec![1, 2]));
        renderer.draw::<_, Recorder>(Some(&mut data), None);
        assert_eq!(data.samples(), &[0, 0]);
    }

    #[test]
    fn empty_buffer_only_clears() {
        let renderer = FrameRenderer::new(64, 16, PaletteMode::Literal);
        let mut data = AnalyzerData::new(Fixed(Vec::new()));
        let mut surface = Recorder::default();
        renderer.draw(Some(&mut data), Some(&mut surface));
        assert_eq!(surface.clears.len(), 1);
        assert!(surface.fills.is_empty());
    }

    #[test]
    fn literal_palette_only_moves_at_full_scale() {
        let mode = PaletteMode::Literal;
        assert_eq!(mode.color(0.0), PALETTE[0]);
        assert_eq!(mode.color(254.0 / 255.0), PALETTE[0]);
        assert_eq!(mode.color(1.0), PALETTE[1]);
    }

    #[test]
    fn graded_palette_scales_with_magnitude() {
        let mode = PaletteMode::Graded;
        assert_eq!(mode.color(0.0), PALETTE[0]);
        assert_eq!(mode.color(0.5), PALETTE[2]);
        assert_eq!(mode.color(0.99), PALETTE[4]);
        assert_eq!(mode.color(1.0), PALETTE[4]);
        assert_eq!(mode.toggled(), PaletteMode::Literal);
    }

    #[test]
    fn silent_frame_leaves_canvas_blank() {
        let renderer = FrameRenderer::new(30, 10, PaletteMode::Literal);
        let mut data = AnalyzerData::new(Fixed(vec![0; 16]));
        let mut canvas = PixelCanvas::new(30, 10);
        canvas.fill_rect(Rect::new(0.0, 0.0, 30.0, 10.0), PALETTE[3]);
        renderer.draw(Some(&mut data), Some(&mut canvas));
        assert!(canvas.is_blank());
    }
}
