// src/ui/widgets/player_panel.rs
//! Player information panel widget.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::audio::TrackMetadata;

/// Playback state shown by the panel.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaybackView {
    pub elapsed: u64,
    pub duration: u64,
    pub is_playing: bool,
    pub is_paused: bool,
}

/// Format seconds as `mm:ss`.
pub fn format_time(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Render the player information panel.
pub fn render_player_panel(
    f: &mut Frame<'_>,
    area: Rect,
    metadata: Option<&TrackMetadata>,
    playback: PlaybackView,
    status: Option<&str>,
) {
    f.render_widget(Block::default().borders(Borders::ALL).title("1: Player"), area);

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let mut lines: Vec<Line> = match metadata {
        Some(meta) => {
            let mut lines = vec![Line::from(Span::styled(
                meta.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ))];
            if let Some(artist) = &meta.artist {
                lines.push(Line::from(artist.clone()));
            }
            let props: Vec<String> = meta
                .properties
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect();
            if !props.is_empty() {
                lines.push(Line::from(props.join("  ")));
            }
            lines
        }
        None => vec![Line::from("No track playing")],
    };
    if let Some(msg) = status {
        lines.push(Line::from(Span::styled(
            msg.to_string(),
            Style::default().fg(Color::Yellow),
        )));
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner[0]);

    // Playback control buttons
    let play_pause_icon = if !playback.is_playing {
        Span::styled(" ⏵ ", Style::default().fg(Color::Gray))
    } else if playback.is_paused {
        Span::styled(" ⏵ ", Style::default().fg(Color::Yellow))
    } else {
        Span::styled(" ⏸ ", Style::default().fg(Color::Green))
    };

    let controls = Line::from(vec![
        Span::styled(" ⏪ ", Style::default().fg(Color::Cyan)), // Seek back (←)
        Span::raw(" "),
        Span::styled(" ⏹ ", Style::default().fg(Color::Red)), // Stop (s)
        Span::raw(" "),
        play_pause_icon, // Play/Pause (space)
        Span::raw(" "),
        Span::styled(" ⏩ ", Style::default().fg(Color::Cyan)), // Seek forward (→)
    ]);
    f.render_widget(Paragraph::new(controls).alignment(Alignment::Center), inner[1]);

    let duration = playback.duration.max(1);
    let ratio = (playback.elapsed as f64 / duration as f64).clamp(0.0, 1.0);
    let time_label = format!(
        "{} / {}",
        format_time(playback.elapsed),
        format_time(playback.duration)
    );
    f.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(Color::Magenta).add_modifier(Modifier::ITALIC))
            .ratio(ratio)
            .label(time_label),
        inner[2],
    );
}
