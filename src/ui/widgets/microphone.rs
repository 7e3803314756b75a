// src/ui/widgets/microphone.rs
//! Microphone status panel.

use std::time::Instant;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::audio::Microphone;

pub fn render_microphone(f: &mut Frame<'_>, area: Rect, mic: Option<&Microphone>, now: Instant) {
    let line = match mic {
        Some(mic) => Line::from(vec![
            Span::styled(" ● live ", Style::default().fg(Color::Red)),
            Span::raw(format!(
                "{}  {} sec",
                mic.device_name(),
                mic.elapsed_secs(now)
            )),
        ]),
        None => Line::from(Span::styled(
            " ○ muted (m to start)",
            Style::default().fg(Color::Gray),
        )),
    };
    f.render_widget(
        Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("4: Microphone")),
        area,
    );
}
