// src/audio/player.rs
//! File playback engine using rodio, tapping samples for the analyzer.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use ringbuf::traits::*;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use super::metadata::{load_metadata, TrackMetadata};
use super::sample_capture::{new_tap, SampleCapture, SampleTap};

/// How often the audio thread checks for the end of playback.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Commands sent to the audio playback thread.
enum PlayerCommand {
    Play(PathBuf),
    Pause,
    Resume,
    Stop,
    Seek(Duration),
}

/// State mirrored from the audio thread for quick UI access.
#[derive(Default)]
struct Flags {
    playing: AtomicBool,
    paused: AtomicBool,
    /// Playback position in milliseconds
    position_ms: AtomicU64,
    /// Bumped every time a track ends on its own
    ended: AtomicU64,
}

impl Flags {
    fn set_idle(&self) {
        self.playing.store(false, Ordering::SeqCst);
        self.paused.store(false, Ordering::SeqCst);
        self.position_ms.store(0, Ordering::SeqCst);
    }
}

/// Player that can `play()`, `pause()`, `resume()`, `seek()` or `stop()` a
/// file, stopping any prior playback. The decoded signal goes both to the
/// default output device and, downmixed, into `sample_tap`.
pub struct MusicPlayer {
    /// Sender to the audio thread for commands
    cmd_tx: Sender<PlayerCommand>,
    flags: Arc<Flags>,
    /// Most-recent metadata (if any).
    pub metadata: Option<TrackMetadata>,
    /// Recent mono samples of whatever is playing
    pub sample_tap: SampleTap,
}

impl MusicPlayer {
    /// Create an idle player.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel::<PlayerCommand>();
        let flags = Arc::new(Flags::default());
        let sample_tap = new_tap();

        let thread_flags = flags.clone();
        let tap = sample_tap.clone();

        // The audio thread owns the OutputStream, which must stay on one thread.
        thread::spawn(move || {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("no audio output available: {e}");
                    while rx.recv().is_ok() {}
                    return;
                }
            };
            let mut sink: Option<Sink> = None;

            loop {
                match rx.recv_timeout(POLL_INTERVAL) {
                    Ok(PlayerCommand::Play(path)) => {
                        if let Some(s) = sink.take() {
                            s.stop();
                        }
                        clear_tap(&tap);
                        match start_file(&handle, &path, &tap) {
                            Ok(new_sink) => {
                                log::info!("playing {}", path.display());
                                thread_flags.playing.store(true, Ordering::SeqCst);
                                thread_flags.paused.store(false, Ordering::SeqCst);
                                sink = Some(new_sink);
                            }
                            Err(e) => {
                                log::error!("{e:#}");
                                thread_flags.set_idle();
                            }
                        }
                    }
                    Ok(PlayerCommand::Pause) => {
                        if let Some(s) = &sink {
                            s.pause();
                            clear_tap(&tap);
                            thread_flags.paused.store(true, Ordering::SeqCst);
                        }
                    }
                    Ok(PlayerCommand::Resume) => {
                        if let Some(s) = &sink {
                            s.play();
                            thread_flags.paused.store(false, Ordering::SeqCst);
                        }
                    }
                    Ok(PlayerCommand::Seek(pos)) => {
                        if let Some(s) = &sink {
                            if let Err(e) = s.try_seek(pos) {
                                log::warn!("seek to {pos:?} failed: {e}");
                            }
                        }
                    }
                    Ok(PlayerCommand::Stop) => {
                        if let Some(s) = sink.take() {
                            s.stop();
                        }
                        clear_tap(&tap);
                        thread_flags.set_idle();
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => break,
                }

                if let Some(s) = &sink {
                    if s.empty() {
                        // Track finished: release the source from the output.
                        log::info!("playback ended, releasing source");
                        sink = None;
                        clear_tap(&tap);
                        thread_flags.set_idle();
                        thread_flags.ended.fetch_add(1, Ordering::SeqCst);
                    } else {
                        let pos = s.get_pos().as_millis() as u64;
                        thread_flags.position_ms.store(pos, Ordering::SeqCst);
                    }
                }
            }

            if let Some(s) = sink.take() {
                s.stop();
            }
            // Keep stream alive until thread exits
            drop(stream);
        });

        Self {
            cmd_tx: tx,
            flags,
            metadata: None,
            sample_tap,
        }
    }

    /// Stop any existing playback and start playing `path`.
    pub fn play(&mut self, path: &Path) -> Result<()> {
        self.cmd_tx
            .send(PlayerCommand::Play(path.to_path_buf()))
            .context("audio thread is gone")
    }

    /// Load metadata for `path` without touching player state. This is safe to call
    /// from a background thread and returns a plain `TrackMetadata` struct.
    pub fn load_metadata(path: PathBuf) -> Result<TrackMetadata> {
        load_metadata(path)
    }

    /// Pause playback if currently playing.
    pub fn pause(&mut self) {
        let _ = self.cmd_tx.send(PlayerCommand::Pause);
    }

    /// Resume playback if currently paused.
    pub fn resume(&mut self) {
        let _ = self.cmd_tx.send(PlayerCommand::Resume);
    }

    /// Jump to `pos` from the start of the track.
    pub fn seek(&mut self, pos: Duration) {
        let _ = self.cmd_tx.send(PlayerCommand::Seek(pos));
    }

    /// Immediately halt playback (if any).
    pub fn stop(&mut self) {
        let _ = self.cmd_tx.send(PlayerCommand::Stop);
    }

    /// Returns true if there's an active sink (i.e. playing or paused).
    pub fn is_playing(&self) -> bool {
        self.flags.playing.load(Ordering::SeqCst)
    }

    /// Returns true if playback is currently paused.
    pub fn is_paused(&self) -> bool {
        self.flags.paused.load(Ordering::SeqCst)
    }

    /// Current position of the playing track.
    pub fn position(&self) -> Duration {
        Duration::from_millis(self.flags.position_ms.load(Ordering::SeqCst))
    }

    /// Number of tracks that have played to their end.
    pub fn finished_count(&self) -> u64 {
        self.flags.ended.load(Ordering::SeqCst)
    }
}

impl Default for MusicPlayer {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop buffered samples so the analyzer sees silence.
fn clear_tap(tap: &SampleTap) {
    if let Ok(mut buf) = tap.lock() {
        buf.clear();
    }
}

/// Decode `path` and queue it on a new sink behind a sample tap.
fn start_file(handle: &OutputStreamHandle, path: &Path, tap: &SampleTap) -> Result<Sink> {
    let sink = Sink::try_new(handle).context("creating output sink")?;
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let source = Decoder::new(BufReader::new(file))
        .with_context(|| format!("decoding {}", path.display()))?;

    let capturing = SampleCapture::new(source.convert_samples::<f32>(), tap.clone());
    sink.append(capturing);
    sink.play();
    Ok(sink)
}
