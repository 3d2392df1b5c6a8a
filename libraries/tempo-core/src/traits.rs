/// Collaborator traits consumed by the playback controller
use crate::error::Result;
use crate::types::{AlbumId, ArtistId, TrackId, TrackRef};
use async_trait::async_trait;
use std::path::Path;

/// Library store trait
///
/// Implementers own the persistent catalog of tracks, albums and artists. The
/// playback controller only ever asks it to expand an album or artist into an
/// ordered track list.
#[async_trait]
pub trait LibraryStore: Send + Sync {
    /// Get all tracks of an album, ordered by disc then track number
    ///
    /// # Errors
    /// Returns `CoreError::AlbumNotFound` if the album is unknown
    async fn album_tracks(&self, album: &AlbumId) -> Result<Vec<TrackRef>>;

    /// Get all tracks by an artist, grouped by album in album order
    ///
    /// # Errors
    /// Returns `CoreError::ArtistNotFound` if the artist is unknown
    async fn artist_tracks(&self, artist: &ArtistId) -> Result<Vec<TrackRef>>;

    /// Get a single track by ID
    async fn track(&self, id: &TrackId) -> Result<TrackRef>;
}

/// File-system trait
///
/// Consulted before every load so that a track whose file has disappeared is
/// skipped without bothering the audio engine.
pub trait FileSystem: Send + Sync {
    /// Whether the media resource at `path` exists
    fn exists(&self, path: &Path) -> bool;
}
