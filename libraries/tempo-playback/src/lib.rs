//! Tempo Player - Playback Management
//!
//! Decides, at every moment, which track is current, what plays next, how
//! shuffle and repeat interact, and how to recover when a track cannot be loaded.
//!
//! This crate provides:
//! - Positional queue with cursor (`PlaybackQueue`)
//! - Shuffle without repeats within a pass (seedable generator)
//! - Repeat modes (Off, All, One)
//! - Previous with restart-current-track threshold
//! - Bounded skip-forward over unloadable tracks
//! - Single-writer controller task with stale-load protection
//!
//! # Architecture
//!
//! `tempo-playback` does no decoding and no disk access of its own:
//! - Audio output is an [`AudioEngine`] implementation
//! - File existence checks go through `tempo_core::FileSystem`
//! - Album/artist expansion goes through `tempo_core::LibraryStore`
//!
//! [`PlaybackController`] is a synchronous state machine; [`ControllerHandle`]
//! runs it on one tokio task and performs the asynchronous engine loads.
//!
//! # Example: Queue Navigation
//!
//! ```rust
//! use tempo_core::TrackRef;
//! use tempo_playback::PlaybackQueue;
//! use std::path::PathBuf;
//!
//! let tracks: Vec<TrackRef> = ["a", "b", "c"]
//!     .iter()
//!     .map(|id| TrackRef::new(*id, id.to_uppercase(), PathBuf::from(format!("/music/{id}.mp3"))))
//!     .collect();
//!
//! let mut queue = PlaybackQueue::with_seed(7);
//! queue.set_queue(tracks.clone(), &tracks[1]);
//!
//! assert_eq!(queue.current_index(), Some(1));
//! assert_eq!(queue.up_next().count(), 1);
//! assert_eq!(queue.next(false).map(|t| t.id.as_str()), Some("c"));
//! assert!(queue.next(false).is_none());
//! ```
//!
//! # Example: Driving the Controller
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tempo_core::{LocalFileSystem, MemoryLibrary};
//! use tempo_playback::{AudioEngine, ControllerConfig, ControllerHandle};
//!
//! # async fn run(engine: Arc<dyn AudioEngine>, library: MemoryLibrary) -> tempo_playback::Result<()> {
//! let tracks = library.tracks().to_vec();
//! let handle = ControllerHandle::spawn(
//!     ControllerConfig::default(),
//!     engine,
//!     Arc::new(LocalFileSystem::new()),
//!     Arc::new(library),
//! )?;
//!
//! let mut events = handle.subscribe();
//! handle.play(tracks[0].clone(), Some(tracks)).await?;
//! while let Ok(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

mod actor;
mod controller;
mod engine;
mod error;
mod events;
mod queue;
mod shuffle;
pub mod types;

// Public exports
pub use actor::ControllerHandle;
pub use controller::PlaybackController;
pub use engine::{AudioEngine, FinishNotifier};
pub use error::{EngineError, PlaybackError, Result};
pub use events::PlaybackEvent;
pub use queue::PlaybackQueue;
pub use shuffle::shuffle_rng;
pub use types::{
    ControllerConfig, LoadRequest, PlaybackState, PlayerSnapshot, RepeatMode, RequestId,
};
