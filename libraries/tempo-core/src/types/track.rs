/// Track reference type
use crate::types::{AlbumId, ArtistId, TrackId};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::time::Duration;

/// Handle to a playable track: identity plus the display metadata the player needs.
///
/// Eagerly resolved from the library store so that no I/O happens while the queue is
/// being navigated. Equality and hashing use the track identifier only, so two refs
/// built from different catalog reads of the same track compare equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackRef {
    /// Unique track identifier from the library store
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist name
    pub artist: Option<String>,

    /// Album name
    pub album: Option<String>,

    /// Album the track belongs to
    pub album_id: Option<AlbumId>,

    /// Primary artist of the track
    pub artist_id: Option<ArtistId>,

    /// Track duration
    pub duration: Duration,

    /// Track number in album
    pub track_number: Option<u32>,

    /// Disc number in album
    pub disc_number: Option<u32>,

    /// Media resource handed to the audio engine
    pub path: PathBuf,
}

impl TrackRef {
    /// Create a new track reference with minimal metadata
    pub fn new(id: impl Into<String>, title: impl Into<String>, path: PathBuf) -> Self {
        Self {
            id: TrackId::new(id),
            title: title.into(),
            artist: None,
            album: None,
            album_id: None,
            artist_id: None,
            duration: Duration::ZERO,
            track_number: None,
            disc_number: None,
            path,
        }
    }

    /// Attach the album this track belongs to
    #[must_use]
    pub fn with_album(mut self, id: AlbumId, name: impl Into<String>) -> Self {
        self.album_id = Some(id);
        self.album = Some(name.into());
        self
    }

    /// Attach the artist of this track
    #[must_use]
    pub fn with_artist(mut self, id: ArtistId, name: impl Into<String>) -> Self {
        self.artist_id = Some(id);
        self.artist = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    #[must_use]
    pub fn with_track_number(mut self, number: u32) -> Self {
        self.track_number = Some(number);
        self
    }

    #[must_use]
    pub fn with_disc_number(mut self, number: u32) -> Self {
        self.disc_number = Some(number);
        self
    }

    /// Album ordering key: disc, then track number, then title
    ///
    /// Tracks without numbers sort after numbered ones.
    pub fn album_order(&self) -> (u32, u32, &str) {
        (
            self.disc_number.unwrap_or(u32::MAX),
            self.track_number.unwrap_or(u32::MAX),
            self.title.as_str(),
        )
    }
}

impl PartialEq for TrackRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TrackRef {}

impl Hash for TrackRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_uses_identifier_only() {
        let a = TrackRef::new("t1", "Original Title", PathBuf::from("/a.mp3"));
        let b = TrackRef::new("t1", "Retagged Title", PathBuf::from("/moved/a.mp3"));
        let c = TrackRef::new("t2", "Original Title", PathBuf::from("/a.mp3"));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn hash_matches_equality() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(TrackRef::new("t1", "One", PathBuf::from("/1.mp3")));
        set.insert(TrackRef::new("t1", "One (remaster)", PathBuf::from("/1r.mp3")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn album_order_puts_unnumbered_last() {
        let numbered = TrackRef::new("a", "Zed", PathBuf::from("/a.mp3"))
            .with_disc_number(1)
            .with_track_number(3);
        let unnumbered = TrackRef::new("b", "Alpha", PathBuf::from("/b.mp3"));

        assert!(numbered.album_order() < unnumbered.album_order());
    }
}
