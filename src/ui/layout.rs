// src/ui/layout.rs
//! Layout computation for the UI panels.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// UI sections, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Player,
    Waveform,
    Overview,
    Microphone,
}

/// Visibility state for UI sections.
#[derive(Debug, Clone, Copy)]
pub struct SectionVisibility {
    pub player: bool,
    pub waveform: bool,
    pub overview: bool,
    pub microphone: bool,
}

impl Default for SectionVisibility {
    fn default() -> Self {
        Self {
            player: true,
            waveform: true,
            overview: true,
            microphone: true,
        }
    }
}

impl SectionVisibility {
    /// Toggle a section by number (1-4).
    pub fn toggle(&mut self, section: usize) {
        match section {
            1 => self.player = !self.player,
            2 => self.waveform = !self.waveform,
            3 => self.overview = !self.overview,
            4 => self.microphone = !self.microphone,
            _ => {}
        }
    }
}

/// Terminal rows needed to show a canvas `pixels` tall, plus borders.
pub fn canvas_rows(pixels: u32) -> u16 {
    (pixels.div_ceil(2) + 2).min(u16::MAX as u32) as u16
}

/// Stack the visible sections vertically. Canvas panels get the height their
/// pixels need; leftover space goes to the bottom.
pub fn compute_layout(
    area: Rect,
    visibility: &SectionVisibility,
    waveform_px: u32,
    overview_px: u32,
) -> Vec<(Section, Rect)> {
    let mut sections = Vec::new();
    let mut constraints = Vec::new();

    if visibility.player {
        sections.push(Section::Player);
        constraints.push(Constraint::Length(7));
    }
    if visibility.waveform {
        sections.push(Section::Waveform);
        constraints.push(Constraint::Length(canvas_rows(waveform_px)));
    }
    if visibility.overview {
        sections.push(Section::Overview);
        constraints.push(Constraint::Length(canvas_rows(overview_px)));
    }
    if visibility.microphone {
        sections.push(Section::Microphone);
        constraints.push(Constraint::Length(3));
    }
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    sections.into_iter().zip(chunks.iter().copied()).collect()
}
