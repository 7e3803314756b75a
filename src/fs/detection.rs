// src/fs/detection.rs
//! Audio file detection: magic numbers first, file extension as fallback.

use std::path::Path;

use anyhow::{bail, Context, Result};
use infer::{Infer, MatcherType};
use mime_guess::MimeGuess;

/// A sniffed MIME type and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileType {
    pub mime: String,
    /// True when the type came from the file contents rather than its name
    pub sniffed: bool,
}

impl FileType {
    /// Matches the `audio/*` accept filter of the file picker.
    pub fn is_audio(&self) -> bool {
        self.mime.split('/').next() == Some("audio")
    }
}

/// Detect the MIME type for `path`.
pub fn detect_file_type(path: &Path) -> Result<FileType> {
    if let Some(kind) = Infer::new().get_from_path(path)? {
        // infer files some audio containers (e.g. ogg) under other matchers
        let mime = match kind.matcher_type() {
            MatcherType::Audio => kind.mime_type().to_string(),
            _ => match MimeGuess::from_path(path).first() {
                Some(guess) if guess.type_() == mime_guess::mime::AUDIO => guess.to_string(),
                _ => kind.mime_type().to_string(),
            },
        };
        return Ok(FileType { mime, sniffed: true });
    }

    let mime = MimeGuess::from_path(path)
        .first_or_octet_stream()
        .to_string();
    Ok(FileType {
        mime,
        sniffed: false,
    })
}

/// Accept only `audio/*` files.
pub fn ensure_audio(path: &Path) -> Result<FileType> {
    let ft = detect_file_type(path).with_context(|| format!("cannot read {}", path.display()))?;
    if !ft.is_audio() {
        bail!("{} is not an audio file ({})", path.display(), ft.mime);
    }
    log::debug!("{} detected as {}", path.display(), ft.mime);
    Ok(ft)
}
