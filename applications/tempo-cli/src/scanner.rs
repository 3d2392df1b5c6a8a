//! Music folder scanning
//!
//! Builds an in-memory library from a directory laid out as
//! `<root>/<artist>/<album>/<NN title>.<ext>`. Files closer to the root simply
//! carry less metadata.

use crate::error::{CliError, Result};
use std::path::Path;
use tempo_core::{AlbumId, ArtistId, MemoryLibrary, TrackRef};
use walkdir::{DirEntry, WalkDir};

/// Supported audio file extensions
const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "wav", "aac", "m4a", "opus"];

/// Scanner turning a directory tree into a `MemoryLibrary`
#[derive(Debug, Clone, Default)]
pub struct LibraryScanner {
    follow_links: bool,
    max_depth: Option<usize>,
}

impl LibraryScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to follow symbolic links
    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Set maximum directory depth to traverse
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Scan `root` for audio files
    ///
    /// Tracks come back in file-name order within each directory.
    pub fn scan(&self, root: &Path) -> Result<MemoryLibrary> {
        if !root.exists() {
            return Err(CliError::DirectoryNotFound(root.display().to_string()));
        }
        if !root.is_dir() {
            return Err(CliError::NotADirectory(root.display().to_string()));
        }

        let mut walker = WalkDir::new(root)
            .follow_links(self.follow_links)
            .sort_by_file_name();
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }

        let mut library = MemoryLibrary::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if entry.file_type().is_dir() || !is_audio_file(entry.path()) {
                continue;
            }

            library.insert(track_from_entry(root, &entry));
        }

        tracing::info!(root = %root.display(), tracks = library.len(), "Scan complete");
        Ok(library)
    }
}

/// Check if a file is a supported audio file
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

fn track_from_entry(root: &Path, entry: &DirEntry) -> TrackRef {
    let path = entry.path();
    let relative = path.strip_prefix(root).unwrap_or(path);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (number, title) = split_track_number(&stem);

    let mut track = TrackRef::new(relative.to_string_lossy(), title, path.to_path_buf());
    if let Some(number) = number {
        track = track.with_track_number(number);
    }

    // depth 1: loose file, 2: album folder, 3+: artist/album folders
    let album_dir = relative.parent().filter(|_| entry.depth() >= 2);
    if let Some(album_dir) = album_dir {
        let name = dir_name(album_dir);
        track = track.with_album(AlbumId::new(album_dir.to_string_lossy()), name);

        if let Some(artist_dir) = album_dir.parent().filter(|_| entry.depth() >= 3) {
            let name = dir_name(artist_dir);
            track = track.with_artist(ArtistId::new(artist_dir.to_string_lossy()), name);
        }
    }

    track
}

fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Split a leading track number off a file stem: "03 - Blue in Green"
fn split_track_number(stem: &str) -> (Option<u32>, String) {
    let digits: String = stem.chars().take_while(char::is_ascii_digit).collect();
    let Ok(number) = digits.parse::<u32>() else {
        return (None, stem.to_string());
    };

    let title = stem[digits.len()..]
        .trim_start_matches(|c: char| c.is_whitespace() || c == '-' || c == '.' || c == '_')
        .to_string();
    if title.is_empty() {
        (Some(number), stem.to_string())
    } else {
        (Some(number), title)
    }
}
