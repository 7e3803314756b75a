// src/audio/visualizer/surface.rs
//! Drawing surfaces the bar renderers paint into.

use std::{fmt, str::FromStr};

use serde::Deserialize;

/// A 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse a `#rrggbb` literal at compile time. Panics on malformed input.
    pub const fn hex(s: &str) -> Self {
        let b = s.as_bytes();
        assert!(b.len() == 7 && b[0] == b'#', "expected #rrggbb");
        Rgb(
            hex_byte(b[1], b[2]),
            hex_byte(b[3], b[4]),
            hex_byte(b[5], b[6]),
        )
    }
}

const fn hex_digit(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => panic!("invalid hex digit"),
    }
}

const fn hex_byte(hi: u8, lo: u8) -> u8 {
    hex_digit(hi) * 16 + hex_digit(lo)
}

/// Error returned when a color string is not `#rrggbb`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color {0:?}, expected #rrggbb")]
pub struct ParseRgbError(String);

impl FromStr for Rgb {
    type Err = ParseRgbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix('#')
            .filter(|d| d.len() == 6 && d.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| ParseRgbError(s.to_string()))?;
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16);
        match (channel(0), channel(2), channel(4)) {
            (Ok(r), Ok(g), Ok(b)) => Ok(Rgb(r, g, b)),
            _ => Err(ParseRgbError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Rgb {
    type Error = ParseRgbError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl From<Rgb> for ratatui::style::Color {
    fn from(c: Rgb) -> Self {
        ratatui::style::Color::Rgb(c.0, c.1, c.2)
    }
}

/// An axis-aligned rectangle in surface units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }
}

/// A 2D raster target with mutable pixel dimensions.
///
/// Mirrors the subset of a canvas context the renderers need: setting the
/// size always clears the contents, even when the size does not change.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Resize and clear.
    fn set_size(&mut self, width: u32, height: u32);
    fn clear_rect(&mut self, rect: Rect);
    fn fill_rect(&mut self, rect: Rect, color: Rgb);
}

/// In-memory raster of optional RGB pixels (`None` is transparent).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelCanvas {
    width: u32,
    height: u32,
    pixels: Vec<Option<Rgb>>,
}

impl PixelCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![None; width as usize * height as usize],
        }
    }

    /// Pixel at (`x`, `y`), `None` if transparent or out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// True when no pixel has been painted.
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(Option::is_none)
    }

    /// Pixel index ranges touched by `rect`, clipped to the raster.
    fn covered(&self, rect: Rect) -> Option<(std::ops::Range<u32>, std::ops::Range<u32>)> {
        let Rect { x, y, width, height } = rect;
        if !(width > 0.0 && height > 0.0) {
            return None;
        }
        let clip = |lo: f64, hi: f64, max: u32| {
            let start = lo.floor().max(0.0).min(max as f64) as u32;
            let end = hi.ceil().max(0.0).min(max as f64) as u32;
            start..end
        };
        let xs = clip(x, x + width, self.width);
        let ys = clip(y, y + height, self.height);
        if xs.is_empty() || ys.is_empty() {
            return None;
        }
        Some((xs, ys))
    }

    fn paint(&mut self, rect: Rect, value: Option<Rgb>) {
        let Some((xs, ys)) = self.covered(rect) else {
            return;
        };
        let stride = self.width as usize;
        for y in ys {
            let row = y as usize * stride;
            for x in xs.clone() {
                self.pixels[row + x as usize] = value;
            }
        }
    }
}

impl Default for PixelCanvas {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl Surface for PixelCanvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width as usize * height as usize, None);
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.paint(rect, None);
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        self.paint(rect, Some(color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = Rgb::hex("#ff0000");

    #[test]
    fn parses_hex_colors() {
        assert_eq!("#61dafb".parse::<Rgb>().unwrap(), Rgb(0x61, 0xda, 0xfb));
        assert_eq!(Rgb::hex("#20232A"), Rgb(0x20, 0x23, 0x2a));
        assert!("61dafb".parse::<Rgb>().is_err());
        assert!("#61dafz".parse::<Rgb>().is_err());
        assert_eq!(Rgb(0xf7, 0x65, 0x65).to_string(), "#f76565");
    }

    #[test]
    fn fractional_rect_touches_every_overlapped_pixel() {
        let mut canvas = PixelCanvas::new(10, 4);
        canvas.fill_rect(Rect::new(3.732, 1.5, 0.732, 1.0), RED);
        assert_eq!(canvas.pixel(3, 1), Some(RED));
        assert_eq!(canvas.pixel(4, 2), Some(RED));
        assert_eq!(canvas.pixel(5, 1), None);
        assert_eq!(canvas.pixel(3, 0), None);
        assert_eq!(canvas.pixel(3, 3), None);
    }

    #[test]
    fn empty_and_offscreen_rects_paint_nothing() {
        let mut canvas = PixelCanvas::new(4, 4);
        canvas.fill_rect(Rect::new(1.0, 2.0, 1.0, 0.0), RED);
        canvas.fill_rect(Rect::new(12.0, 0.0, 3.0, 3.0), RED);
        canvas.fill_rect(Rect::new(-5.0, 0.0, 2.0, 3.0), RED);
        assert!(canvas.is_blank());
    }

    #[test]
    fn set_size_clears_even_when_unchanged() {
        let mut canvas = PixelCanvas::new(4, 4);
        canvas.fill_rect(Rect::new(0.0, 0.0, 4.0, 4.0), RED);
        canvas.set_size(4, 4);
        assert!(canvas.is_blank());
        assert_eq!((canvas.width(), canvas.height()), (4, 4));
    }

    #[test]
    fn clear_rect_erases_region() {
        let mut canvas = PixelCanvas::new(4, 1);
        canvas.fill_rect(Rect::new(0.0, 0.0, 4.0, 1.0), RED);
        canvas.clear_rect(Rect::new(0.0, 0.0, 2.0, 1.0));
        assert_eq!(canvas.pixel(1, 0), None);
        assert_eq!(canvas.pixel(2, 0), Some(RED));
    }
}
