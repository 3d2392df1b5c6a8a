/// Core error types for Tempo Player
use crate::types::{AlbumId, ArtistId, TrackId};
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for Tempo Player
#[derive(Error, Debug)]
pub enum CoreError {
    /// Track not found
    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),

    /// Album not found
    #[error("Album not found: {0}")]
    AlbumNotFound(AlbumId),

    /// Artist not found
    #[error("Artist not found: {0}")]
    ArtistNotFound(ArtistId),

    /// Library store errors (backing catalog unavailable, corrupt, ...)
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_messages_include_id() {
        let err = CoreError::AlbumNotFound(AlbumId::new("a1"));
        assert_eq!(err.to_string(), "Album not found: a1");

        let err = CoreError::ArtistNotFound(ArtistId::new("miles"));
        assert_eq!(err.to_string(), "Artist not found: miles");
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: CoreError = io.into();
        assert!(matches!(err, CoreError::Io(_)));
    }
}
