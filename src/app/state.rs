// src/app/state.rs
//! Application state management.

use std::{
    path::{Path, PathBuf},
    sync::mpsc::{self, Receiver, Sender},
    thread,
    time::{Duration, Instant},
};

use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;

use crate::{
    audio::{
        sample_capture::new_tap,
        visualizer::{AnalyzerData, LoopGuard, SpectrumAnalyzer},
        LiveWaveform, Microphone, MusicPlayer, Overview, SampleTap, TrackMetadata,
    },
    config::Settings,
    fs::ensure_audio,
    ui::{
        keybindings::{key_to_action, Action},
        layout::{compute_layout, Section, SectionVisibility},
        widgets::{
            player_panel::PlaybackView, render_microphone, render_overview,
            render_player_panel, render_waveform,
        },
    },
};

/// Seek step for the arrow keys.
const SEEK_STEP: Duration = Duration::from_secs(5);

/// Main application state: owns the audio graph for the current source and
/// the live visualizer fed by it.
pub struct App {
    pub settings: Settings,

    /// File currently loaded, if any
    pub track: Option<PathBuf>,
    /// Music player instance
    pub player: MusicPlayer,
    /// Live input, when the microphone is on
    pub microphone: Option<Microphone>,

    /// Live frequency bars
    pub waveform: LiveWaveform,
    /// Keeps the waveform's frame loop running for the current source
    waveform_guard: Option<LoopGuard>,

    /// Whole-file waveform of `track`
    pub overview: Option<Overview>,
    overview_tx: Sender<(PathBuf, Overview)>,
    overview_rx: Receiver<(PathBuf, Overview)>,

    /// Metadata channel (background loader -> UI)
    meta_tx: Sender<(PathBuf, TrackMetadata)>,
    meta_rx: Receiver<(PathBuf, TrackMetadata)>,

    /// Last problem worth showing to the user
    pub status: Option<String>,
    /// Section visibility state
    pub visibility: SectionVisibility,
    /// Tracks finished as last seen from the player
    finished_seen: u64,
}

impl App {
    /// Create a new application instance.
    pub fn new(settings: Settings) -> Self {
        let (meta_tx, meta_rx) = mpsc::channel();
        let (overview_tx, overview_rx) = mpsc::channel();

        Self {
            waveform: LiveWaveform::new(&settings.waveform),
            settings,
            track: None,
            player: MusicPlayer::new(),
            microphone: None,
            waveform_guard: None,
            overview: None,
            overview_tx,
            overview_rx,
            meta_tx,
            meta_rx,
            status: None,
            visibility: SectionVisibility::default(),
            finished_seen: 0,
        }
    }

    /// Attach a fresh analyzer and sample buffer for a new source, stopping
    /// the previous frame loop.
    fn attach_source(&mut self, tap: SampleTap) {
        self.waveform_guard = None;
        let analyzer = SpectrumAnalyzer::new(tap, self.settings.analyzer.clone());
        let guard = self
            .waveform
            .attach(AnalyzerData::new(analyzer), Instant::now());
        self.waveform_guard = Some(guard);
    }

    fn detach_source(&mut self) {
        self.waveform_guard = None;
        self.waveform.detach();
    }

    /// Play `path` and rebuild the analyzer for it.
    pub fn open_file(&mut self, path: &Path) -> Result<()> {
        ensure_audio(path)?;
        self.stop_microphone();
        self.player.play(path)?;

        self.player.metadata = None;
        self.overview = None;
        self.status = None;
        self.track = Some(path.to_path_buf());
        self.attach_source(self.player.sample_tap.clone());

        // Spawn background loaders for metadata and the overview
        let tx = self.meta_tx.clone();
        let meta_path = path.to_path_buf();
        thread::spawn(move || match MusicPlayer::load_metadata(meta_path.clone()) {
            Ok(meta) => {
                let _ = tx.send((meta_path, meta));
            }
            Err(e) => log::warn!("no metadata for {}: {e:#}", meta_path.display()),
        });

        let tx = self.overview_tx.clone();
        let overview_path = path.to_path_buf();
        let settings = self.settings.overview.clone();
        thread::spawn(move || match Overview::from_file(&overview_path, settings) {
            Ok(overview) => {
                let _ = tx.send((overview_path, overview));
            }
            Err(e) => log::warn!("no overview: {e:#}"),
        });
        Ok(())
    }

    /// Switch live input on or off.
    pub fn toggle_microphone(&mut self) {
        if self.microphone.is_some() {
            self.stop_microphone();
            return;
        }

        // Live input gets its own tap; the player clears its tap on stop.
        let tap = new_tap();
        match Microphone::start(tap.clone()) {
            Ok(mic) => {
                self.player.stop();
                self.microphone = Some(mic);
                self.status = None;
                self.attach_source(tap);
            }
            Err(e) => {
                log::error!("microphone unavailable: {e:#}");
                self.status = Some(format!("Microphone unavailable: {e}"));
            }
        }
    }

    fn stop_microphone(&mut self) {
        if self.microphone.take().is_some() {
            self.detach_source();
        }
    }

    /// Handle a key event and return true if the app should quit.
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        match key_to_action(&key) {
            Action::ToggleSection(d) => self.visibility.toggle(d),
            Action::TogglePause => {
                if self.player.is_playing() {
                    if self.player.is_paused() {
                        self.player.resume();
                    } else {
                        self.player.pause();
                    }
                } else if let Some(path) = self.track.clone() {
                    if let Err(e) = self.open_file(&path) {
                        self.status = Some(format!("{e:#}"));
                    }
                }
            }
            Action::Stop => self.player.stop(),
            Action::SeekBack => {
                let pos = self.player.position().saturating_sub(SEEK_STEP);
                self.player.seek(pos);
            }
            Action::SeekForward => {
                let pos = self.player.position() + SEEK_STEP;
                self.player.seek(pos);
            }
            Action::ToggleMicrophone => self.toggle_microphone(),
            Action::TogglePalette => {
                let palette = self.waveform.palette().toggled();
                self.waveform.set_palette(palette);
            }
            Action::Quit => {
                self.player.stop();
                self.stop_microphone();
                return true;
            }
            Action::None => {}
        }
        false
    }

    /// Draw a waveform frame if one is due.
    pub fn animate(&mut self, now: Instant) -> bool {
        self.waveform.tick(now)
    }

    /// When the next waveform frame is due.
    pub fn time_until_frame(&self, now: Instant) -> Option<Duration> {
        self.waveform.time_until_next(now)
    }

    /// Collect results from background loaders and playback events.
    /// Returns true when something visible changed.
    pub fn process_background(&mut self) -> bool {
        let mut changed = false;
        while let Ok((path, meta)) = self.meta_rx.try_recv() {
            if self.track.as_deref() == Some(path.as_path()) {
                self.player.metadata = Some(meta);
                changed = true;
            }
        }
        while let Ok((path, overview)) = self.overview_rx.try_recv() {
            if self.track.as_deref() == Some(path.as_path()) {
                self.overview = Some(overview);
                changed = true;
            }
        }

        let finished = self.player.finished_count();
        if finished != self.finished_seen {
            self.finished_seen = finished;
            log::debug!("track finished");
            changed = true;
        }
        changed
    }

    fn playback_view(&self) -> PlaybackView {
        PlaybackView {
            elapsed: self.player.position().as_secs(),
            duration: self
                .player
                .metadata
                .as_ref()
                .map(|m| m.duration_secs)
                .unwrap_or(0),
            is_playing: self.player.is_playing(),
            is_paused: self.player.is_paused(),
        }
    }

    /// Fraction of the track already played.
    fn played_fraction(&self) -> f64 {
        let view = self.playback_view();
        if view.duration == 0 {
            return 0.0;
        }
        self.player.position().as_secs_f64() / view.duration as f64
    }

    /// Draw the application UI.
    pub fn draw(&mut self, f: &mut Frame<'_>) {
        let layout = compute_layout(
            f.area(),
            &self.visibility,
            self.settings.waveform.height,
            self.settings.overview.height,
        );

        for (section, area) in layout {
            match section {
                Section::Player => render_player_panel(
                    f,
                    area,
                    self.player.metadata.as_ref(),
                    self.playback_view(),
                    self.status.as_deref(),
                ),
                Section::Waveform => render_waveform(f, area, &self.waveform),
                Section::Overview => {
                    render_overview(f, area, self.overview.as_ref(), self.played_fraction())
                }
                Section::Microphone => {
                    render_microphone(f, area, self.microphone.as_ref(), Instant::now())
                }
            }
        }
    }
}
