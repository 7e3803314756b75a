// src/audio/mod.rs
//! Audio module - playback, live input, metadata and visualization.

pub mod metadata;
pub mod microphone;
pub mod player;
pub mod sample_capture;
pub mod visualizer;

// Re-export commonly used types
pub use metadata::TrackMetadata;
pub use microphone::Microphone;
pub use player::MusicPlayer;
pub use sample_capture::{SampleCapture, SampleTap};
pub use visualizer::{LiveWaveform, Overview};
