// src/ui/widgets/mod.rs
//! Custom widgets for the wavebars UI.

pub mod canvas;
pub mod microphone;
pub mod overview;
pub mod player_panel;
pub mod waveform;

// Re-export widget rendering functions
pub use canvas::CanvasView;
pub use microphone::render_microphone;
pub use overview::render_overview;
pub use player_panel::render_player_panel;
pub use waveform::render_waveform;
