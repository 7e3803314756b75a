// src/config/mod.rs
//! Configuration: defaults, an optional TOML file, `WAVEBARS_*` environment
//! variables and command-line overrides, applied in that order.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::audio::visualizer::{PaletteMode, Rgb};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "wavebars.toml";

/// Largest accepted side of a pixel surface.
pub const MAX_SURFACE_SIDE: u32 = 4096;

/// Errors raised while loading or validating settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),
    #[error("invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

fn invalid(key: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: reason.into(),
    }
}

/// Live bar display.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WaveformSettings {
    /// Drawing surface width in pixels
    pub width: u32,
    /// Drawing surface height in pixels
    pub height: u32,
    /// Display refresh rate driving the frame loop
    pub fps: u32,
    pub palette: PaletteMode,
}

impl Default for WaveformSettings {
    fn default() -> Self {
        Self {
            width: 300,
            height: 40,
            fps: 60,
            palette: PaletteMode::Literal,
        }
    }
}

/// Frequency analyzer parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalyzerSettings {
    /// Analysis window size; the sample buffer holds half as many bins.
    pub fft_size: usize,
    pub smoothing_time_constant: f32,
    pub min_decibels: f32,
    pub max_decibels: f32,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            smoothing_time_constant: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

impl AnalyzerSettings {
    pub fn frequency_bin_count(&self) -> usize {
        self.fft_size / 2
    }
}

/// Whole-file overview waveform.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OverviewSettings {
    pub width: u32,
    pub height: u32,
    pub bar_width: u32,
    pub gap: u32,
    pub bar_color: Rgb,
    /// Color for the already-played part; falls back to `bar_color`.
    pub played_color: Option<Rgb>,
}

impl Default for OverviewSettings {
    fn default() -> Self {
        Self {
            width: 500,
            height: 75,
            bar_width: 3,
            gap: 1,
            bar_color: Rgb::hex("#f76565"),
            played_color: None,
        }
    }
}

/// All settings.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub waveform: WaveformSettings,
    pub analyzer: AnalyzerSettings,
    pub overview: OverviewSettings,
    /// Write logs here; logging stays off when unset.
    pub log_file: Option<PathBuf>,
}

/// Values supplied on the command line, taking precedence over everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<u32>,
    pub fft_size: Option<usize>,
    pub palette: Option<PaletteMode>,
    pub log_file: Option<PathBuf>,
}

impl Overrides {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(w) = self.width {
            settings.waveform.width = w;
        }
        if let Some(h) = self.height {
            settings.waveform.height = h;
        }
        if let Some(fps) = self.fps {
            settings.waveform.fps = fps;
        }
        if let Some(n) = self.fft_size {
            settings.analyzer.fft_size = n;
        }
        if let Some(p) = self.palette {
            settings.waveform.palette = p;
        }
        if let Some(path) = &self.log_file {
            settings.log_file = Some(path.clone());
        }
    }
}

impl Settings {
    /// Load settings from `path` (required) or the default file (optional),
    /// then the environment, then `overrides`, and validate the result.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self, ConfigError> {
        Self::load_with_env(path, None, overrides)
    }

    /// Like [`Settings::load`], reading `WAVEBARS_*` variables from `env`
    /// instead of the process environment when given.
    fn load_with_env(
        path: Option<&Path>,
        env: Option<::config::Map<String, String>>,
        overrides: &Overrides,
    ) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) => ::config::File::from(p).required(true),
            None => ::config::File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
        };
        let env = ::config::Environment::with_prefix("WAVEBARS")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(env);

        let raw = ::config::Config::builder()
            .add_source(file)
            .add_source(env)
            .build()?;
        let mut settings: Settings = raw.try_deserialize()?;
        overrides.apply(&mut settings);
        settings.validate()?;
        Ok(settings)
    }

    /// Check value ranges the audio and rendering code rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.waveform;
        check_side("waveform.width", w.width)?;
        check_side("waveform.height", w.height)?;
        if !(1..=240).contains(&w.fps) {
            return Err(invalid("waveform.fps", format!("{} not in 1..=240", w.fps)));
        }

        let a = &self.analyzer;
        if !a.fft_size.is_power_of_two() || !(32..=32768).contains(&a.fft_size) {
            return Err(invalid(
                "analyzer.fft_size",
                format!("{} is not a power of two in 32..=32768", a.fft_size),
            ));
        }
        if !(0.0..=1.0).contains(&a.smoothing_time_constant) {
            return Err(invalid(
                "analyzer.smoothing_time_constant",
                "must be within 0.0..=1.0",
            ));
        }
        if !(a.min_decibels < a.max_decibels) {
            return Err(invalid(
                "analyzer.min_decibels",
                format!("{} must be below max_decibels {}", a.min_decibels, a.max_decibels),
            ));
        }

        let o = &self.overview;
        check_side("overview.width", o.width)?;
        check_side("overview.height", o.height)?;
        if o.bar_width == 0 {
            return Err(invalid("overview.bar_width", "must be positive"));
        }
        Ok(())
    }
}

fn check_side(key: &'static str, value: u32) -> Result<(), ConfigError> {
    if !(1..=MAX_SURFACE_SIDE).contains(&value) {
        return Err(invalid(
            key,
            format!("{value} not in 1..={MAX_SURFACE_SIDE}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_match_the_player() {
        let s = Settings::default();
        assert_eq!((s.waveform.width, s.waveform.height), (300, 40));
        assert_eq!(s.analyzer.fft_size, 2048);
        assert_eq!(s.analyzer.frequency_bin_count(), 1024);
        assert_eq!(s.waveform.palette, PaletteMode::Literal);
        assert_eq!(s.overview.bar_color, Rgb(0xf7, 0x65, 0x65));
        assert!(s.validate().is_ok());
    }

    #[test]
    fn file_values_override_defaults() {
        let file = write_config(
            r##"
            [waveform]
            width = 120
            palette = "graded"

            [analyzer]
            fft_size = 512

            [overview]
            bar_color = "#00ff00"
            "##,
        );
        let s = Settings::load(Some(file.path()), &Overrides::default()).unwrap();
        assert_eq!(s.waveform.width, 120);
        assert_eq!(s.waveform.height, 40);
        assert_eq!(s.waveform.palette, PaletteMode::Graded);
        assert_eq!(s.analyzer.fft_size, 512);
        assert_eq!(s.overview.bar_color, Rgb(0, 0xff, 0));
    }

    #[test]
    fn overrides_win_over_file() {
        let file = write_config("[waveform]\nwidth = 120\n");
        let overrides = Overrides {
            width: Some(64),
            fft_size: Some(256),
            ..Overrides::default()
        };
        let s = Settings::load(Some(file.path()), &overrides).unwrap();
        assert_eq!(s.waveform.width, 64);
        assert_eq!(s.analyzer.fft_size, 256);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = Settings::load(Some(&path), &Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut s = Settings::default();
        s.analyzer.fft_size = 1000;
        assert!(matches!(
            s.validate(),
            Err(ConfigError::Invalid { key: "analyzer.fft_size", .. })
        ));

        let mut s = Settings::default();
        s.waveform.height = 0;
        assert!(s.validate().is_err());

        let mut s = Settings::default();
        s.analyzer.min_decibels = -20.0;
        assert!(s.validate().is_err());

        let mut s = Settings::default();
        s.analyzer.smoothing_time_constant = 1.5;
        assert!(s.validate().is_err());

        let mut s = Settings::default();
        s.waveform.width = u32::MAX;
        s.waveform.height = u32::MAX;
        assert!(matches!(
            s.validate(),
            Err(ConfigError::Invalid { key: "waveform.width", .. })
        ));

        let mut s = Settings::default();
        s.overview.height = MAX_SURFACE_SIDE + 1;
        assert!(matches!(
            s.validate(),
            Err(ConfigError::Invalid { key: "overview.height", .. })
        ));

        let mut s = Settings::default();
        s.waveform.width = MAX_SURFACE_SIDE;
        assert!(s.validate().is_ok());
    }

    #[test]
    fn oversized_surface_from_cli_is_rejected() {
        let overrides = Overrides {
            width: Some(u32::MAX),
            height: Some(u32::MAX),
            ..Overrides::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wavebars.toml");
        std::fs::write(&path, "").unwrap();
        let err = Settings::load_with_env(Some(&path), Some(Default::default()), &overrides)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    fn env(vars: &[(&str, &str)]) -> Option<::config::Map<String, String>> {
        Some(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn environment_overrides_file() {
        let file = write_config("[waveform]\nwidth = 120\nheight = 30\n");
        let vars = env(&[
            ("WAVEBARS_WAVEFORM__WIDTH", "77"),
            ("WAVEBARS_WAVEFORM__PALETTE", "graded"),
            ("WAVEBARS_LOG_FILE", "/tmp/wavebars.log"),
            ("OTHER_WAVEFORM__WIDTH", "5"),
        ]);
        let s = Settings::load_with_env(Some(file.path()), vars, &Overrides::default()).unwrap();
        assert_eq!(s.waveform.width, 77);
        assert_eq!(s.waveform.height, 30);
        assert_eq!(s.waveform.palette, PaletteMode::Graded);
        assert_eq!(s.log_file, Some(PathBuf::from("/tmp/wavebars.log")));
    }

    #[test]
    fn cli_overrides_environment() {
        let file = write_config("[waveform]\nwidth = 120\n");
        let vars = env(&[
            ("WAVEBARS_WAVEFORM__WIDTH", "77"),
            ("WAVEBARS_LOG_FILE", "/tmp/from-env.log"),
        ]);
        let overrides = Overrides {
            width: Some(64),
            log_file: Some(PathBuf::from("/tmp/from-cli.log")),
            ..Overrides::default()
        };
        let s = Settings::load_with_env(Some(file.path()), vars, &overrides).unwrap();
        assert_eq!(s.waveform.width, 64);
        assert_eq!(s.log_file, Some(PathBuf::from("/tmp/from-cli.log")));
    }

    #[test]
    fn bad_color_fails_to_load() {
        let file = write_config("[overview]\nbar_color = \"red\"\n");
        assert!(Settings::load(Some(file.path()), &Overrides::default()).is_err());
    }
}
