//! In-memory library store
//!
//! Used by the CLI after scanning a directory, and by tests as a stand-in for
//! the on-disk catalog.

use crate::error::{CoreError, Result};
use crate::traits::LibraryStore;
use crate::types::{AlbumId, ArtistId, TrackId, TrackRef};
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Library store holding every track in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryLibrary {
    tracks: Vec<TrackRef>,
}

impl MemoryLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a library from a list of tracks
    pub fn from_tracks(tracks: Vec<TrackRef>) -> Self {
        let mut library = Self::new();
        for track in tracks {
            library.insert(track);
        }
        library
    }

    /// Insert a track, replacing any existing track with the same ID
    pub fn insert(&mut self, track: TrackRef) {
        if let Some(existing) = self.tracks.iter_mut().find(|t| t.id == track.id) {
            *existing = track;
        } else {
            self.tracks.push(track);
        }
    }

    /// All tracks in insertion order
    pub fn tracks(&self) -> &[TrackRef] {
        &self.tracks
    }

    /// Albums known to the library, with their display names
    pub fn albums(&self) -> BTreeMap<AlbumId, String> {
        self.tracks
            .iter()
            .filter_map(|t| {
                let id = t.album_id.clone()?;
                Some((id, t.album.clone().unwrap_or_default()))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    fn sorted_by_album_order(mut tracks: Vec<TrackRef>) -> Vec<TrackRef> {
        tracks.sort_by(|a, b| a.album_order().cmp(&b.album_order()));
        tracks
    }
}

#[async_trait]
impl LibraryStore for MemoryLibrary {
    async fn album_tracks(&self, album: &AlbumId) -> Result<Vec<TrackRef>> {
        let tracks: Vec<TrackRef> = self
            .tracks
            .iter()
            .filter(|t| t.album_id.as_ref() == Some(album))
            .cloned()
            .collect();

        if tracks.is_empty() {
            return Err(CoreError::AlbumNotFound(album.clone()));
        }

        Ok(Self::sorted_by_album_order(tracks))
    }

    async fn artist_tracks(&self, artist: &ArtistId) -> Result<Vec<TrackRef>> {
        let mut by_album: BTreeMap<Option<String>, Vec<TrackRef>> = BTreeMap::new();
        for track in self.tracks.iter().filter(|t| t.artist_id.as_ref() == Some(artist)) {
            by_album
                .entry(track.album.clone())
                .or_default()
                .push(track.clone());
        }

        if by_album.is_empty() {
            return Err(CoreError::ArtistNotFound(artist.clone()));
        }

        Ok(by_album
            .into_values()
            .flat_map(Self::sorted_by_album_order)
            .collect())
    }

    async fn track(&self, id: &TrackId) -> Result<TrackRef> {
        self.tracks
            .iter()
            .find(|t| &t.id == id)
            .cloned()
            .ok_or_else(|| CoreError::TrackNotFound(id.clone()))
    }
}
