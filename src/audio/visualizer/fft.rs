// src/audio/visualizer/fft.rs
//! FFT-backed frequency analyzer producing byte magnitudes.

use std::sync::Arc;

use ringbuf::traits::*;
use rustfft::{num_complex::Complex, Fft, FftPlanner};

use super::analyzer::FrequencyAnalyzer;
use crate::audio::sample_capture::SampleTap;
use crate::config::AnalyzerSettings;

/// Analyzer over the most recent samples in a [`SampleTap`].
///
/// Each call windows the latest `fft_size` samples (Blackman), takes the
/// magnitude spectrum, smooths it over time and maps decibels in
/// `[min_decibels, max_decibels]` onto `0..=255`.
pub struct SpectrumAnalyzer {
    tap: SampleTap,
    settings: AnalyzerSettings,
    fft: Arc<dyn Fft<f32>>,
    /// Precomputed Blackman window
    window: Vec<f32>,
    /// Smoothed linear magnitudes carried between frames
    smoothed: Vec<f32>,
    /// Time-domain samples for the current frame
    frame: Vec<f32>,
    scratch: Vec<Complex<f32>>,
}

impl SpectrumAnalyzer {
    pub fn new(tap: SampleTap, settings: AnalyzerSettings) -> Self {
        let n = settings.fft_size;
        let fft = FftPlanner::new().plan_fft_forward(n);
        Self {
            tap,
            fft,
            window: blackman_window(n),
            smoothed: vec![0.0; n / 2],
            frame: vec![0.0; n],
            scratch: vec![Complex::new(0.0, 0.0); n],
            settings,
        }
    }

    /// Copy the newest `fft_size` samples, zero-filling missing history at the front.
    fn read_frame(&mut self) {
        let n = self.settings.fft_size;
        self.frame.fill(0.0);
        let Ok(buf) = self.tap.lock() else {
            return;
        };
        let available = buf.occupied_len();
        let take = available.min(n);
        let dst = &mut self.frame[n - take..];
        for (slot, &sample) in dst.iter_mut().zip(buf.iter().skip(available - take)) {
            *slot = sample;
        }
    }

    /// Window, transform and fold the new spectrum into the smoothed one.
    fn analyze(&mut self) {
        let n = self.settings.fft_size;
        for ((c, &s), &w) in self.scratch.iter_mut().zip(&self.frame).zip(&self.window) {
            *c = Complex::new(s * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        let tau = self.settings.smoothing_time_constant;
        let scale = 1.0 / n as f32;
        for (prev, c) in self.smoothed.iter_mut().zip(&self.scratch) {
            let mag = c.norm() * scale;
            let next = tau * *prev + (1.0 - tau) * mag;
            *prev = if next.is_finite() { next } else { 0.0 };
        }
    }
}

impl FrequencyAnalyzer for SpectrumAnalyzer {
    fn frequency_bin_count(&self) -> usize {
        self.settings.frequency_bin_count()
    }

    fn byte_frequency_data(&mut self, out: &mut [u8]) {
        self.read_frame();
        self.analyze();

        let min_db = self.settings.min_decibels;
        let range_scale = 255.0 / (self.settings.max_decibels - min_db);
        for (byte, &mag) in out.iter_mut().zip(&self.smoothed) {
            let db = 20.0 * mag.log10();
            *byte = (range_scale * (db - min_db)).floor().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Blackman window with alpha = 0.16.
fn blackman_window(n: usize) -> Vec<f32> {
    let (a0, a1, a2) = (0.42f32, 0.5f32, 0.08f32);
    (0..n)
        .map(|i| {
            let phase = 2.0 * std::f32::consts::PI * i as f32 / n as f32;
            a0 - a1 * phase.cos() + a2 * (2.0 * phase).cos()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::sample_capture::new_tap;

    fn settings(fft_size: usize, smoothing: f32) -> AnalyzerSettings {
        AnalyzerSettings {
            fft_size,
            smoothing_time_constant: smoothing,
            ..AnalyzerSettings::default()
        }
    }

    /// Full 100 dB range so loud bins stay below the clamp.
    fn wide(fft_size: usize, smoothing: f32) -> AnalyzerSettings {
        AnalyzerSettings {
            max_decibels: 0.0,
            ..settings(fft_size, smoothing)
        }
    }

    fn push_all(tap: &SampleTap, samples: impl IntoIterator<Item = f32>) {
        let mut buf = tap.lock().unwrap();
        for s in samples {
            if buf.is_full() {
                let _ = buf.try_pop();
            }
            let _ = buf.try_push(s);
        }
    }

    #[test]
    fn bin_count_is_half_the_window() {
        let analyzer = SpectrumAnalyzer::new(new_tap(), settings(2048, 0.8));
        assert_eq!(analyzer.frequency_bin_count(), 1024);
    }

    #[test]
    fn silence_yields_zero_bytes() {
        let tap = new_tap();
        push_all(&tap, std::iter::repeat(0.0).take(4096));
        let mut analyzer = SpectrumAnalyzer::new(tap, settings(1024, 0.8));
        let mut out = vec![7u8; 512];
        analyzer.byte_frequency_data(&mut out);
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn empty_tap_yields_zero_bytes() {
        let mut analyzer = SpectrumAnalyzer::new(new_tap(), settings(256, 0.0));
        let mut out = vec![9u8; 128];
        analyzer.byte_frequency_data(&mut out);
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn sine_peaks_at_its_bin() {
        let n = 1024;
        let bin = 64;
        let tap = new_tap();
        push_all(
            &tap,
            (0..n).map(|i| (2.0 * std::f32::consts::PI * bin as f32 * i as f32 / n as f32).sin()),
        );
        let mut analyzer = SpectrumAnalyzer::new(tap, wide(n, 0.0));
        let mut out = vec![0u8; n / 2];
        analyzer.byte_frequency_data(&mut out);

        let peak = out
            .iter()
            .enumerate()
            .max_by_key(|&(_, &b)| b)
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, bin);
        assert!(out[bin] > 200);
        assert!(out[bin + 20] < out[bin]);
    }

    #[test]
    fn smoothing_carries_energy_into_silence() {
        let n = 256;
        let tap = new_tap();
        push_all(
            &tap,
            (0..n).map(|i| (2.0 * std::f32::consts::PI * 16.0 * i as f32 / n as f32).sin()),
        );
        let mut analyzer = SpectrumAnalyzer::new(tap.clone(), wide(n, 0.8));
        let mut out = vec![0u8; n / 2];
        analyzer.byte_frequency_data(&mut out);
        let loud = out[16];

        push_all(&tap, std::iter::repeat(0.0).take(n));
        analyzer.byte_frequency_data(&mut out);
        assert!(out[16] > 0);
        assert!(out[16] < loud);
    }

    #[test]
    fn short_output_buffers_are_filled_partially() {
        let mut analyzer = SpectrumAnalyzer::new(new_tap(), settings(64, 0.8));
        let mut out = [5u8; 4];
        analyzer.byte_frequency_data(&mut out);
        assert_eq!(out, [0; 4]);
    }
}
