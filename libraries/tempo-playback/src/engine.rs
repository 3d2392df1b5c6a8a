//! Audio engine abstraction
//!
//! Platform-specific playback (decoding, output device, timers) lives behind this
//! trait. The engine runs on its own execution context; the controller only
//! awaits `load` and receives end-of-track notifications through the
//! [`FinishNotifier`] handed over with each load.

use crate::error::EngineError;
use crate::types::RequestId;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;

/// Black-box media backend driven by the playback controller
///
/// Commands other than `load` are fire-and-forget. Implementations use interior
/// mutability so a single `Arc` can be shared with the controller.
#[async_trait]
pub trait AudioEngine: Send + Sync {
    /// Open `resource` and prepare it for playback
    ///
    /// `on_finish` belongs to this load only. The engine keeps it alongside the
    /// resource and calls it when that resource plays to its end.
    ///
    /// # Errors
    /// Returns an error if the resource cannot be opened or decoded
    async fn load(&self, resource: &Path, on_finish: FinishNotifier) -> Result<(), EngineError>;

    /// Start or resume output of the loaded resource
    fn play(&self);

    /// Pause output, keeping the position
    fn pause(&self);

    /// Stop output and unload
    ///
    /// No finish notification may be delivered for the stopped resource.
    fn stop(&self);

    /// Seek to an absolute position
    fn seek(&self, position: Duration);

    /// Seek to a fraction (0.0-1.0) of the duration
    fn seek_fraction(&self, fraction: f32);

    fn is_playing(&self) -> bool;

    /// Position within the loaded resource
    fn current_time(&self) -> Duration;

    /// Duration of the loaded resource, if known
    fn duration(&self) -> Option<Duration>;

    /// Output volume, 0.0-1.0
    fn volume(&self) -> f32;

    fn set_volume(&self, volume: f32);
}

/// Notifications flowing from the engine context back to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EngineNotification {
    TrackFinished(RequestId),
}

/// Handle the engine uses to report a natural end of playback
///
/// Each notifier is bound to the load it was issued with. A notification from a
/// resource that has since been replaced is discarded by the controller, so it
/// can never advance past the track that replaced it.
///
/// Sending never blocks, so it can be called from an audio callback or any other
/// thread. The notification is queued and handled on the controller task.
#[derive(Debug, Clone)]
pub struct FinishNotifier {
    tx: mpsc::UnboundedSender<EngineNotification>,
    request: RequestId,
}

impl FinishNotifier {
    pub(crate) fn new(tx: mpsc::UnboundedSender<EngineNotification>, request: RequestId) -> Self {
        Self { tx, request }
    }

    /// Notifier not connected to any controller
    ///
    /// `notify` always reports `false`. Lets an engine be exercised on its own.
    pub fn disconnected() -> Self {
        let (tx, _) = mpsc::unbounded_channel();
        Self {
            tx,
            request: RequestId(0),
        }
    }

    /// Load this notifier belongs to
    pub fn request(&self) -> RequestId {
        self.request
    }

    /// Report that the resource of this load played to its end
    ///
    /// Returns `false` if the controller has shut down.
    pub fn notify(&self) -> bool {
        self.tx
            .send(EngineNotification::TrackFinished(self.request))
            .is_ok()
    }
}
