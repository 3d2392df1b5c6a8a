//! Playback session loop
//!
//! Follows the controller's events until playback goes idle or the shutdown
//! future resolves, whichever comes first.

use crate::error::Result;
use std::future::Future;
use tempo_playback::{ControllerHandle, PlaybackEvent, PlaybackState};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Nothing left to play
    Finished,
    /// Shutdown requested; playback was stopped
    Interrupted,
}

/// Drive a session, handing every event to `on_event`
///
/// `shutdown` is armed once for the whole session, so a request arriving while
/// an event is being handled is still seen on the next turn.
pub async fn run_session<F>(
    handle: &ControllerHandle,
    events: &mut broadcast::Receiver<PlaybackEvent>,
    shutdown: F,
    mut on_event: impl FnMut(&PlaybackEvent),
) -> Result<SessionEnd>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    on_event(&event);
                    if event == (PlaybackEvent::StateChanged { state: PlaybackState::Idle }) {
                        return Ok(SessionEnd::Finished);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Missed {} playback events", skipped);
                }
                Err(RecvError::Closed) => return Ok(SessionEnd::Finished),
            },
            () = &mut shutdown => {
                handle.stop().await?;
                return Ok(SessionEnd::Interrupted);
            }
        }
    }
}
