// src/audio/metadata.rs
//! Track metadata extraction using Lofty.

use std::path::{Path, PathBuf};

use anyhow::Result;
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::Accessor;

/// What the player panel shows about the current track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackMetadata {
    /// Title tag, or the file name when untagged.
    pub title: String,
    pub artist: Option<String>,
    /// Audio properties (bitrate, sample rate, channels)
    pub properties: Vec<(String, String)>,
    /// Total track length in seconds.
    pub duration_secs: u64,
}

/// Load metadata for a file path without touching player state.
/// This is safe to call from a background thread.
pub fn load_metadata(path: PathBuf) -> Result<TrackMetadata> {
    let tagged_file = Probe::open(&path)?.read()?;
    let tag = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag());

    let title = tag
        .and_then(|t| t.title().map(|s| s.into_owned()))
        .unwrap_or_else(|| file_label(&path));
    let artist = tag.and_then(|t| t.artist().map(|s| s.into_owned()));

    let props = tagged_file.properties();
    let mut properties = Vec::new();
    if let Some(b) = props.audio_bitrate() {
        properties.push(("Bitrate (kbps)".into(), b.to_string()));
    }
    if let Some(sr) = props.sample_rate() {
        properties.push(("Sample Rate (Hz)".into(), sr.to_string()));
    }
    if let Some(ch) = props.channels() {
        properties.push(("Channels".into(), ch.to_string()));
    }

    Ok(TrackMetadata {
        title,
        artist,
        properties,
        duration_secs: props.duration().as_secs(),
    })
}

/// File name shown when a track carries no title.
pub fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_falls_back_to_file_name() {
        assert_eq!(file_label(Path::new("/music/song.ogg")), "song.ogg");
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_metadata(dir.path().join("missing.mp3")).is_err());
    }
}
