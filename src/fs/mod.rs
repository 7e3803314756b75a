// src/fs/mod.rs
//! Filesystem module - audio file type detection.

pub mod detection;

// Re-export commonly used types
pub use detection::{detect_file_type, ensure_audio, FileType};
