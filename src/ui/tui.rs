// src/ui/tui.rs
//! Terminal setup and the main event loop.

use std::{
    io,
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::Result;
use crossterm::{
    event::{self, Event as CEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::{app::App, config::Settings};

type Term = Terminal<CrosstermBackend<io::Stdout>>;

/// What to start with once the terminal is up.
#[derive(Debug, Clone, Default)]
pub struct Launch {
    pub file: Option<PathBuf>,
    pub mic: bool,
}

/// Run the player until the user quits.
pub fn run(settings: Settings, launch: Launch) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(settings);
    if let Some(path) = &launch.file {
        if let Err(e) = app.open_file(path) {
            log::error!("cannot open {}: {e:#}", path.display());
            app.status = Some(format!("{e:#}"));
        }
    } else if launch.mic {
        app.toggle_microphone();
    }

    let result = event_loop(&mut terminal, &mut app);

    // Restore the terminal even when the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

fn event_loop(terminal: &mut Term, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_secs(1);
    let mut last_tick = Instant::now();
    let mut dirty = true;

    loop {
        let now = Instant::now();
        dirty |= app.process_background();
        dirty |= app.animate(now);

        if dirty {
            terminal.draw(|f| app.draw(f))?;
            dirty = false;
        }

        let mut timeout = tick_rate.checked_sub(last_tick.elapsed()).unwrap_or_default();
        if let Some(frame) = app.time_until_frame(Instant::now()) {
            timeout = timeout.min(frame);
        }

        if event::poll(timeout)? {
            match event::read()? {
                CEvent::Key(key) if key.kind == KeyEventKind::Press => {
                    if app.on_key(key) {
                        return Ok(());
                    }
                    dirty = true;
                }
                CEvent::Resize(..) => dirty = true,
                _ => {}
            }
        }

        // Once a second the clock and mic timer need a redraw
        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
            dirty = true;
        }
    }
}
