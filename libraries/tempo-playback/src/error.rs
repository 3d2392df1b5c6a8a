//! Error types for playback management

use std::path::PathBuf;
use tempo_core::CoreError;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Media resource does not exist on disk
    #[error("Resource missing: {}", .0.display())]
    ResourceMissing(PathBuf),

    /// Audio engine rejected or failed to decode the resource
    #[error("Engine load failure: {0}")]
    EngineLoadFailure(String),

    /// Index out of bounds
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// Library store could not resolve an album or artist
    #[error("Library error: {0}")]
    Library(#[from] CoreError),

    /// The controller task has shut down
    #[error("Playback controller is no longer running")]
    ControllerClosed,

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;

/// Error reported by an `AudioEngine` implementation
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// The resource could not be opened or decoded
    #[error("Failed to decode {}: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },

    /// The output device is unavailable
    #[error("Audio output unavailable: {0}")]
    Output(String),
}

impl From<EngineError> for PlaybackError {
    fn from(err: EngineError) -> Self {
        PlaybackError::EngineLoadFailure(err.to_string())
    }
}
