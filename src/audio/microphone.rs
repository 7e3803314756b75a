// src/audio/microphone.rs
//! Live input from the default capture device.

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SampleFormat};

use super::sample_capture::{downmix, downmix_iter, push_samples, SampleTap};

/// A running capture feeding the sample tap.
///
/// Input is analyzed only, never routed to the output. Dropping the
/// microphone stops the capture thread and releases the device.
pub struct Microphone {
    device_name: String,
    started: Instant,
    /// Dropping this unblocks the capture thread
    _stop_tx: mpsc::Sender<()>,
}

impl Microphone {
    /// Open the default input device and start pushing samples into `tap`.
    pub fn start(tap: SampleTap) -> Result<Self> {
        let (ready_tx, ready_rx) = mpsc::channel::<Result<String>>();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        // cpal streams are not Send on every platform, so the stream lives
        // and dies on its own thread.
        thread::spawn(move || match open_input(tap) {
            Ok((stream, name)) => {
                let _ = ready_tx.send(Ok(name));
                let _ = stop_rx.recv();
                drop(stream);
                log::info!("microphone released");
            }
            Err(e) => {
                let _ = ready_tx.send(Err(e));
            }
        });

        let device_name = ready_rx.recv().context("microphone thread exited")??;
        log::info!("capturing from {device_name}");
        Ok(Self {
            device_name,
            started: Instant::now(),
            _stop_tx: stop_tx,
        })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Time since capture started.
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started)
    }

    /// Whole seconds since capture started.
    pub fn elapsed_secs(&self, now: Instant) -> u64 {
        self.elapsed(now).as_secs()
    }
}

fn log_stream_error(err: cpal::StreamError) {
    log::error!("input stream error: {err}");
}

fn open_input(tap: SampleTap) -> Result<(cpal::Stream, String)> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .context("no input device available")?;
    let name = device.name().unwrap_or_else(|_| "unknown input".to_string());
    let supported = device
        .default_input_config()
        .context("querying default input config")?;
    let channels = supported.channels() as usize;
    let config: cpal::StreamConfig = supported.config();

    let stream = match supported.sample_format() {
        SampleFormat::F32 => device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                push_samples(&tap, downmix(data, channels));
            },
            log_stream_error,
            None,
        )?,
        SampleFormat::I16 => device.build_input_stream(
            &config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                let converted = data.iter().map(|s| s.to_sample::<f32>());
                push_samples(&tap, downmix_iter(converted, channels));
            },
            log_stream_error,
            None,
        )?,
        SampleFormat::U16 => device.build_input_stream(
            &config,
            move |data: &[u16], _: &cpal::InputCallbackInfo| {
                let converted = data.iter().map(|s| s.to_sample::<f32>());
                push_samples(&tap, downmix_iter(converted, channels));
            },
            log_stream_error,
            None,
        )?,
        other => bail!("unsupported input sample format {other}"),
    };
    stream.play().context("starting input stream")?;
    Ok((stream, name))
}
