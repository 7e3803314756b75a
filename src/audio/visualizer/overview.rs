// src/audio/visualizer/overview.rs
//! Static bar waveform of a whole file.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use rodio::{Decoder, Source};

use super::surface::{Rect, Surface};
use crate::audio::sample_capture::downmix_iter;
use crate::config::OverviewSettings;

/// Averaged positive (`max`) and non-positive (`min`) amplitude of one bar.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BarPoint {
    pub max: f32,
    pub min: f32,
}

/// Bar data for a whole file, ready to paint at any playback position.
#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    points: Vec<BarPoint>,
    settings: OverviewSettings,
}

impl Overview {
    /// Decode `path` completely and compute its bars.
    pub fn from_file(path: &Path, settings: OverviewSettings) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let decoder = Decoder::new(BufReader::new(file))
            .with_context(|| format!("decoding {}", path.display()))?;
        let channels = decoder.channels() as usize;
        let mono: Vec<f32> = downmix_iter(decoder.convert_samples::<f32>(), channels).collect();
        log::debug!(
            "overview of {}: {} mono samples",
            path.display(),
            mono.len()
        );
        Ok(Self::from_samples(&mono, settings))
    }

    pub fn from_samples(samples: &[f32], settings: OverviewSettings) -> Self {
        let points = bar_points(
            samples,
            settings.width,
            settings.bar_width + settings.gap,
        );
        Self { points, settings }
    }

    pub fn points(&self) -> &[BarPoint] {
        &self.points
    }

    /// Paint the bars, marking the first `played` fraction (0.0..=1.0)
    /// with the played color when one is configured.
    pub fn paint<S: Surface + ?Sized>(&self, surface: &mut S, played: f64) {
        let s = &self.settings;
        surface.set_size(s.width, s.height);

        let amp = s.height as f64 / 2.0;
        let units = self.points.len();
        let pitch = (s.bar_width + s.gap) as f64;
        for (i, point) in self.points.iter().enumerate() {
            let is_played = played > i as f64 / units as f64;
            let color = match s.played_color {
                Some(c) if is_played => c,
                _ => s.bar_color,
            };
            let y = amp + point.min as f64 * amp;
            let h = (point.max - point.min) as f64 * amp;
            surface.fill_rect(
                Rect::new(i as f64 * pitch, y, s.bar_width as f64, h),
                color,
            );
        }
    }
}

/// Split `samples` into `width / pitch` bars of averaged amplitude.
///
/// Quiet material is scaled up so its loudest bar reaches 0.8.
pub fn bar_points(samples: &[f32], width: u32, pitch: u32) -> Vec<BarPoint> {
    let units = (width / pitch.max(1)) as usize;
    if units == 0 {
        return Vec::new();
    }
    let step = samples.len() / units;

    let mut points: Vec<BarPoint> = (0..units)
        .map(|i| {
            let chunk = &samples[i * step..(i + 1) * step];
            let (mut pos_sum, mut pos_n, mut neg_sum, mut neg_n) = (0.0f32, 0u32, 0.0f32, 0u32);
            for &s in chunk {
                if s > 0.0 {
                    pos_sum += s;
                    pos_n += 1;
                } else {
                    neg_sum += s;
                    neg_n += 1;
                }
            }
            BarPoint {
                max: if pos_n > 0 { pos_sum / pos_n as f32 } else { 0.0 },
                min: if neg_n > 0 { neg_sum / neg_n as f32 } else { 0.0 },
            }
        })
        .collect();

    let peak = points
        .iter()
        .map(|p| p.max.max(-p.min))
        .fold(0.0f32, f32::max);
    if peak > 0.0 && peak < 0.8 {
        let gain = 0.8 / peak;
        for p in &mut points {
            p.max *= gain;
            p.min *= gain;
        }
    }
    points
}
