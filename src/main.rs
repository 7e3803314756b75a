use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use wavebars::{
    audio::visualizer::PaletteMode,
    config::{Overrides, Settings},
    ui::{self, Launch},
};

/// wavebars - play audio with live frequency bars
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Audio file to play
    file: Option<PathBuf>,

    /// Visualize the microphone instead of a file
    #[arg(long, conflicts_with = "file")]
    mic: bool,

    /// Config file (defaults to ./wavebars.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bar surface width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Bar surface height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Frames per second
    #[arg(long)]
    fps: Option<u32>,

    /// Analyzer FFT size (power of two)
    #[arg(long)]
    fft_size: Option<usize>,

    /// Spread bar colors across the whole palette
    #[arg(long)]
    graded: bool,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            width: self.width,
            height: self.height,
            fps: self.fps,
            fft_size: self.fft_size,
            palette: self.graded.then_some(PaletteMode::Graded),
            log_file: self.log_file.clone(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref(), &cli.overrides())?;

    // The terminal belongs to the UI, so logs only go to a file
    if let Some(path) = &settings.log_file {
        let file = File::create(path)
            .with_context(|| format!("creating log file {}", path.display()))?;
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();
    }

    log::info!("starting wavebars");
    ui::run(
        settings,
        Launch {
            file: cli.file,
            mic: cli.mic,
        },
    )
}
