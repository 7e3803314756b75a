// src/audio/sample_capture.rs
//! A wrapper source that taps mono audio samples into a circular buffer for analysis.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use ringbuf::{traits::*, HeapRb};
use rodio::Source;

/// Capacity of the sample tap (16384 samples ~= 372ms at 44.1kHz).
pub const TAP_CAPACITY: usize = 16384;

/// Shared circular buffer of recent mono samples.
///
/// Producer: the playback or capture thread. Consumer: the analyzer on the
/// UI thread. The lock is held only while pushing or copying.
pub type SampleTap = Arc<Mutex<HeapRb<f32>>>;

/// Create an empty tap.
pub fn new_tap() -> SampleTap {
    Arc::new(Mutex::new(HeapRb::<f32>::new(TAP_CAPACITY)))
}

/// Push samples, dropping the oldest ones when the buffer is full.
pub fn push_samples(tap: &SampleTap, samples: impl IntoIterator<Item = f32>) {
    if let Ok(mut buf) = tap.lock() {
        for sample in samples {
            if buf.is_full() {
                let _ = buf.try_pop();
            }
            let _ = buf.try_push(sample);
        }
    }
}

/// Average interleaved frames down to one sample per frame.
pub fn downmix(interleaved: &[f32], channels: usize) -> impl Iterator<Item = f32> + '_ {
    let channels = channels.max(1);
    interleaved
        .chunks(channels)
        .map(move |frame| frame.iter().sum::<f32>() / channels as f32)
}

/// Like [`downmix`], but pulls frames from `samples` lazily so the
/// interleaved signal never has to be held in memory.
pub fn downmix_iter<I>(mut samples: I, channels: usize) -> impl Iterator<Item = f32>
where
    I: Iterator<Item = f32>,
{
    let channels = channels.max(1);
    std::iter::from_fn(move || {
        let mut sum = 0.0f32;
        let mut seen = 0;
        for s in samples.by_ref().take(channels) {
            sum += s;
            seen += 1;
        }
        (seen > 0).then(|| sum / channels as f32)
    })
}

/// A source adapter that passes samples through unchanged while pushing the
/// mono mix of every complete frame into a [`SampleTap`].
pub struct SampleCapture<S> {
    source: S,
    tap: SampleTap,
    /// Sum of the current frame so far
    frame_sum: f32,
    /// Samples of the current frame seen so far
    frame_pos: u16,
}

impl<S> SampleCapture<S> {
    /// Create a new sample capture wrapper around an existing source.
    pub fn new(source: S, tap: SampleTap) -> Self {
        Self {
            source,
            tap,
            frame_sum: 0.0,
            frame_pos: 0,
        }
    }
}

impl<S> Iterator for SampleCapture<S>
where
    S: Source<Item = f32>,
{
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let sample = self.source.next()?;
        let channels = self.source.channels().max(1);

        self.frame_sum += sample;
        self.frame_pos += 1;
        if self.frame_pos >= channels {
            let mono = self.frame_sum / channels as f32;
            self.frame_sum = 0.0;
            self.frame_pos = 0;
            push_samples(&self.tap, [mono]);
        }
        Some(sample)
    }
}

impl<S> Source for SampleCapture<S>
where
    S: Source<Item = f32>,
{
    fn current_frame_len(&self) -> Option<usize> {
        self.source.current_frame_len()
    }

    fn channels(&self) -> u16 {
        self.source.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.source.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.source.total_duration()
    }

    fn try_seek(&mut self, pos: Duration) -> Result<(), rodio::source::SeekError> {
        self.frame_sum = 0.0;
        self.frame_pos = 0;
        self.source.try_seek(pos)
    }
}
