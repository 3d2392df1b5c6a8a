//! Tempo Player Core
//!
//! Platform-agnostic domain types and collaborator traits for Tempo Player.
//!
//! The playback crate never talks to a database or the disk directly. Everything it
//! needs from the outside world is described here:
//! - **Domain Types**: `TrackRef` and the identifier newtypes
//! - **Collaborator Traits**: `LibraryStore` (album/artist resolution), `FileSystem` (existence checks)
//! - **Error Handling**: Unified `CoreError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use tempo_core::{AlbumId, MemoryLibrary, TrackRef};
//! use std::path::PathBuf;
//! use std::time::Duration;
//!
//! let album = AlbumId::new("kind-of-blue");
//! let track = TrackRef::new("so-what", "So What", PathBuf::from("/music/so_what.flac"))
//!     .with_album(album.clone(), "Kind of Blue")
//!     .with_track_number(1)
//!     .with_duration(Duration::from_secs(562));
//!
//! let library = MemoryLibrary::from_tracks(vec![track]);
//! assert_eq!(library.len(), 1);
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod fs;
pub mod library;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use fs::LocalFileSystem;
pub use library::MemoryLibrary;
pub use traits::{FileSystem, LibraryStore};
pub use types::{AlbumId, ArtistId, TrackId, TrackRef};
