// src/lib.rs
//! wavebars - a terminal audio player with a real-time frequency bar visualizer.
//!
//! This library provides the analyzer, the bar renderer and the playback
//! host behind the `wavebars` binary.

pub mod app;
pub mod audio;
pub mod config;
pub mod fs;
pub mod ui;
