// src/audio/visualizer/mod.rs
//! Real-time frequency bar visualizer and whole-file overview.

mod analyzer;
mod fft;
mod frame_loop;
mod overview;
mod renderer;
mod surface;

use std::time::{Duration, Instant};

pub use analyzer::{AnalyzerData, FrequencyAnalyzer, SampleBuffer};
pub use fft::SpectrumAnalyzer;
pub use frame_loop::{FrameLoop, LoopGuard};
pub use overview::{bar_points, BarPoint, Overview};
pub use renderer::{bar_width, FrameRenderer, PaletteMode, BAR_GAP, BAR_WIDTH_SCALE, PALETTE};
pub use surface::{ParseRgbError, PixelCanvas, Rect, Rgb, Surface};

use crate::config::WaveformSettings;

/// The live bar display: renderer, drawing surface and frame loop for the
/// currently attached analyzer.
pub struct LiveWaveform<A = SpectrumAnalyzer> {
    renderer: FrameRenderer,
    canvas: PixelCanvas,
    fps: u32,
    data: Option<AnalyzerData<A>>,
    frames: Option<FrameLoop>,
}

impl<A: FrequencyAnalyzer> LiveWaveform<A> {
    pub fn new(settings: &WaveformSettings) -> Self {
        Self {
            renderer: FrameRenderer::new(settings.width, settings.height, settings.palette),
            canvas: PixelCanvas::new(settings.width, settings.height),
            fps: settings.fps,
            data: None,
            frames: None,
        }
    }

    /// Switch to a new analyzer and start a fresh frame loop.
    ///
    /// The returned guard keeps the loop alive; the caller drops it when the
    /// source goes away.
    pub fn attach(&mut self, data: AnalyzerData<A>, now: Instant) -> LoopGuard {
        let (frames, guard) = FrameLoop::start(self.fps, now);
        self.data = Some(data);
        self.frames = Some(frames);
        guard
    }

    /// Forget the analyzer. The canvas keeps its last frame.
    pub fn detach(&mut self) {
        self.data = None;
        self.frames = None;
    }

    pub fn is_running(&self) -> bool {
        self.frames.as_ref().is_some_and(FrameLoop::is_alive)
    }

    /// Draw a frame if one is due. Returns whether the canvas was repainted.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(frames) = self.frames.as_mut() else {
            return false;
        };
        if !frames.poll(now) {
            return false;
        }
        self.renderer.draw(self.data.as_mut(), Some(&mut self.canvas));
        true
    }

    /// Time until the next frame is due, `None` while no loop is running.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.frames.as_ref().and_then(|f| f.time_until_next(now))
    }

    pub fn canvas(&self) -> &PixelCanvas {
        &self.canvas
    }

    pub fn data(&self) -> Option<&AnalyzerData<A>> {
        self.data.as_ref()
    }

    pub fn palette(&self) -> PaletteMode {
        self.renderer.palette
    }

    pub fn set_palette(&mut self, palette: PaletteMode) {
        self.renderer.palette = palette;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Full(usize);

    impl FrequencyAnalyzer for Full {
        fn frequency_bin_count(&self) -> usize {
            self.0
        }

        fn byte_frequency_data(&mut self, out: &mut [u8]) {
            out.fill(255);
        }
    }

    fn settings() -> WaveformSettings {
        WaveformSettings {
            width: 40,
            height: 8,
            fps: 10,
            palette: PaletteMode::Literal,
        }
    }

    #[test]
    fn idle_until_attached() {
        let mut live: LiveWaveform<Full> = LiveWaveform::new(&settings());
        assert!(!live.tick(Instant::now()));
        assert!(live.canvas().is_blank());
        assert_eq!(live.time_until_next(Instant::now()), None);
    }

    #[test]
    fn draws_while_guard_is_held() {
        let t0 = Instant::now();
        let mut live = LiveWaveform::new(&settings());
        let guard = live.attach(AnalyzerData::new(Full(4)), t0);
        assert!(live.is_running());
        assert!(live.tick(t0));
        assert!(!live.canvas().is_blank());
        assert_eq!(live.canvas().pixel(0, 0), Some(PALETTE[1]));

        drop(guard);
        assert!(!live.is_running());
        assert!(!live.tick(t0 + Duration::from_secs(1)));
    }

    #[test]
    fn reattaching_replaces_the_loop() {
        let t0 = Instant::now();
        let mut live = LiveWaveform::new(&settings());
        let first = live.attach(AnalyzerData::new(Full(4)), t0);
        let _second = live.attach(AnalyzerData::new(Full(2)), t0);
        drop(first);
        assert!(live.is_running());
        assert_eq!(live.data().map(AnalyzerData::buffer_length), Some(2));
    }
}
