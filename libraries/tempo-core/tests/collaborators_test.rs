//! Collaborator integration tests
//!
//! Exercises the in-memory library store and the local file system the way the
//! playback controller uses them.

use std::path::PathBuf;
use tempo_core::{
    AlbumId, ArtistId, CoreError, FileSystem, LibraryStore, LocalFileSystem, MemoryLibrary,
    TrackRef,
};

// ===== Test Helpers =====

fn album_track(id: &str, artist: &str, album: &str, disc: u32, number: u32) -> TrackRef {
    TrackRef::new(id, format!("Song {id}"), PathBuf::from(format!("/music/{id}.mp3")))
        .with_artist(ArtistId::new(artist), artist)
        .with_album(AlbumId::new(album), album)
        .with_disc_number(disc)
        .with_track_number(number)
}

fn two_disc_library() -> MemoryLibrary {
    MemoryLibrary::from_tracks(vec![
        album_track("d2t1", "band", "Double", 2, 1),
        album_track("d1t2", "band", "Double", 1, 2),
        album_track("d1t1", "band", "Double", 1, 1),
        album_track("s1", "band", "Single", 1, 1),
        album_track("o1", "other", "Elsewhere", 1, 1),
    ])
}

// ===== LibraryStore =====

#[tokio::test]
async fn test_album_resolution_orders_by_disc_then_track() {
    let library = two_disc_library();

    let tracks = library.album_tracks(&AlbumId::new("Double")).await.unwrap();
    let ids: Vec<&str> = tracks.iter().map(|t| t.id.as_str()).collect();

    assert_eq!(ids, vec!["d1t1", "d1t2", "d2t1"]);
}

#[tokio::test]
async fn test_artist_resolution_groups_albums() {
    let library = two_disc_library();

    let tracks = library.artist_tracks(&ArtistId::new("band")).await.unwrap();
    let ids: Vec<&str> = tracks.iter().map(|t| t.id.as_str()).collect();

    // Albums in name order, tracks in album order within each
    assert_eq!(ids, vec!["d1t1", "d1t2", "d2t1", "s1"]);
}

#[tokio::test]
async fn test_unknown_artist_reports_not_found() {
    let library = two_disc_library();

    let err = library
        .artist_tracks(&ArtistId::new("nobody"))
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::ArtistNotFound(id) if id.as_str() == "nobody"));
}

#[test]
fn test_albums_listing() {
    let library = two_disc_library();
    let albums = library.albums();

    assert_eq!(albums.len(), 3);
    assert_eq!(albums.get(&AlbumId::new("Single")).map(String::as_str), Some("Single"));
}

// ===== FileSystem =====

#[test]
fn test_local_file_system_sees_real_files_only() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("song.flac");
    std::fs::write(&file, b"fLaC").unwrap();

    let fs = LocalFileSystem::new();
    assert!(fs.exists(&file));
    assert!(!fs.exists(&dir.path().join("missing.flac")));
    // Directories are not playable resources
    assert!(!fs.exists(dir.path()));
}
