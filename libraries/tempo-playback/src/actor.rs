//! Controller task and its handle
//!
//! One tokio task owns the [`PlaybackController`]; every mutation arrives as a
//! message and is applied in order. Three inputs are multiplexed:
//!
//! ```text
//!  UI ──ControllerCommand──▶ ┌──────────────────┐ ──load()──▶ spawned task ─┐
//!                            │ controller task  │                           │
//!  engine ──FinishNotifier─▶ │ (single writer)  │ ◀──────LoadOutcome────────┘
//!                            └────────┬─────────┘
//!                                     └──PlaybackEvent──▶ broadcast subscribers
//! ```
//!
//! Engine loads run in their own tasks so the controller keeps serving commands
//! while a load is in flight. Every load hands the engine a [`FinishNotifier`]
//! tagged with that load's request id.

use crate::{
    controller::PlaybackController,
    engine::{AudioEngine, EngineNotification, FinishNotifier},
    error::{EngineError, PlaybackError, Result},
    events::PlaybackEvent,
    types::{ControllerConfig, LoadRequest, PlayerSnapshot, RepeatMode, RequestId},
};
use std::sync::Arc;
use std::time::Duration;
use tempo_core::{AlbumId, ArtistId, FileSystem, LibraryStore, TrackRef};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info};

/// Commands sent to the controller task
#[derive(Debug)]
enum ControllerCommand {
    Play {
        track: TrackRef,
        from_queue: Option<Vec<TrackRef>>,
    },
    TogglePlayPause,
    PlayNext,
    PlayPrevious,
    Stop,
    Seek(Duration),
    SeekFraction(f32),
    SetVolume(f32),
    AddToQueue(TrackRef),
    AddToQueueEnd(TrackRef),
    AppendToQueue(Vec<TrackRef>),
    RemoveFromQueue {
        index: usize,
        reply: oneshot::Sender<Result<TrackRef>>,
    },
    MoveInQueue {
        offsets: Vec<usize>,
        destination: usize,
        reply: oneshot::Sender<Result<()>>,
    },
    SkipTo {
        index: usize,
        reply: oneshot::Sender<Result<()>>,
    },
    ClearQueue,
    ToggleShuffle,
    SetShuffle(bool),
    CycleRepeat,
    SetRepeat(RepeatMode),
    Snapshot {
        reply: oneshot::Sender<PlayerSnapshot>,
    },
}

/// Result of a load performed by a spawned task
#[derive(Debug)]
struct LoadOutcome {
    id: RequestId,
    result: std::result::Result<(), EngineError>,
}

/// Cloneable handle to a running controller task
///
/// The task stops once every handle has been dropped.
#[derive(Clone)]
pub struct ControllerHandle {
    commands: mpsc::Sender<ControllerCommand>,
    events: broadcast::Sender<PlaybackEvent>,
    library: Arc<dyn LibraryStore>,
}

impl ControllerHandle {
    /// Spawn the controller task on the current tokio runtime
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime
    pub fn spawn(
        config: ControllerConfig,
        engine: Arc<dyn AudioEngine>,
        fs: Arc<dyn FileSystem>,
        library: Arc<dyn LibraryStore>,
    ) -> Result<Self> {
        config.validate()?;

        let (command_tx, command_rx) = mpsc::channel(config.command_buffer);
        let (event_tx, _) = broadcast::channel(config.event_buffer);
        let (engine_tx, engine_rx) = mpsc::unbounded_channel();
        let (load_tx, load_rx) = mpsc::unbounded_channel();

        let actor = ControllerActor {
            controller: PlaybackController::new(&config, engine.clone(), fs),
            engine,
            commands: command_rx,
            engine_tx,
            engine_notifications: engine_rx,
            load_tx,
            load_rx,
            events: event_tx.clone(),
        };
        tokio::spawn(actor.run());

        info!("Playback controller started");

        Ok(Self {
            commands: command_tx,
            events: event_tx,
            library,
        })
    }

    /// Subscribe to playback events
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.events.subscribe()
    }

    // ===== Playback Control =====

    /// Play `track`, replacing the queue with `from_queue` (or with just `track`)
    pub async fn play(&self, track: TrackRef, from_queue: Option<Vec<TrackRef>>) -> Result<()> {
        self.send(ControllerCommand::Play { track, from_queue }).await
    }

    pub async fn toggle_play_pause(&self) -> Result<()> {
        self.send(ControllerCommand::TogglePlayPause).await
    }

    pub async fn play_next(&self) -> Result<()> {
        self.send(ControllerCommand::PlayNext).await
    }

    pub async fn play_previous(&self) -> Result<()> {
        self.send(ControllerCommand::PlayPrevious).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.send(ControllerCommand::Stop).await
    }

    /// Play the queue entry at `index`
    pub async fn skip_to(&self, index: usize) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(ControllerCommand::SkipTo { index, reply }).await?;
        rx.await.map_err(|_| PlaybackError::ControllerClosed)?
    }

    // ===== Seek & Volume =====

    pub async fn seek(&self, position: Duration) -> Result<()> {
        self.send(ControllerCommand::Seek(position)).await
    }

    pub async fn seek_fraction(&self, fraction: f32) -> Result<()> {
        self.send(ControllerCommand::SeekFraction(fraction)).await
    }

    pub async fn set_volume(&self, volume: f32) -> Result<()> {
        self.send(ControllerCommand::SetVolume(volume)).await
    }

    // ===== Queue Management =====

    /// Add track to play right after the current one
    pub async fn add_to_queue(&self, track: TrackRef) -> Result<()> {
        self.send(ControllerCommand::AddToQueue(track)).await
    }

    pub async fn add_to_queue_end(&self, track: TrackRef) -> Result<()> {
        self.send(ControllerCommand::AddToQueueEnd(track)).await
    }

    /// Resolve an album through the library store and append its tracks
    ///
    /// Returns the number of tracks appended.
    pub async fn add_album_to_queue(&self, album: &AlbumId) -> Result<usize> {
        let tracks = self.library.album_tracks(album).await?;
        debug!(album = %album, count = tracks.len(), "Appending album to queue");
        self.append(tracks).await
    }

    /// Resolve an artist through the library store and append their tracks
    ///
    /// Returns the number of tracks appended.
    pub async fn add_artist_to_queue(&self, artist: &ArtistId) -> Result<usize> {
        let tracks = self.library.artist_tracks(artist).await?;
        debug!(artist = %artist, count = tracks.len(), "Appending artist to queue");
        self.append(tracks).await
    }

    pub async fn remove_from_queue(&self, index: usize) -> Result<TrackRef> {
        let (reply, rx) = oneshot::channel();
        self.send(ControllerCommand::RemoveFromQueue { index, reply })
            .await?;
        rx.await.map_err(|_| PlaybackError::ControllerClosed)?
    }

    pub async fn move_in_queue(&self, offsets: Vec<usize>, destination: usize) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(ControllerCommand::MoveInQueue {
            offsets,
            destination,
            reply,
        })
        .await?;
        rx.await.map_err(|_| PlaybackError::ControllerClosed)?
    }

    pub async fn clear_queue(&self) -> Result<()> {
        self.send(ControllerCommand::ClearQueue).await
    }

    // ===== Shuffle & Repeat =====

    pub async fn toggle_shuffle(&self) -> Result<()> {
        self.send(ControllerCommand::ToggleShuffle).await
    }

    pub async fn set_shuffle(&self, enabled: bool) -> Result<()> {
        self.send(ControllerCommand::SetShuffle(enabled)).await
    }

    pub async fn cycle_repeat(&self) -> Result<()> {
        self.send(ControllerCommand::CycleRepeat).await
    }

    pub async fn set_repeat(&self, mode: RepeatMode) -> Result<()> {
        self.send(ControllerCommand::SetRepeat(mode)).await
    }

    // ===== State Queries =====

    /// Read the full player state
    ///
    /// Taken on the controller task, after every command sent before it.
    pub async fn snapshot(&self) -> Result<PlayerSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(ControllerCommand::Snapshot { reply }).await?;
        rx.await.map_err(|_| PlaybackError::ControllerClosed)
    }

    async fn append(&self, tracks: Vec<TrackRef>) -> Result<usize> {
        let count = tracks.len();
        self.send(ControllerCommand::AppendToQueue(tracks)).await?;
        Ok(count)
    }

    async fn send(&self, command: ControllerCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| PlaybackError::ControllerClosed)
    }
}

/// The task owning the controller
struct ControllerActor {
    controller: PlaybackController,
    engine: Arc<dyn AudioEngine>,
    commands: mpsc::Receiver<ControllerCommand>,
    engine_tx: mpsc::UnboundedSender<EngineNotification>,
    engine_notifications: mpsc::UnboundedReceiver<EngineNotification>,
    load_tx: mpsc::UnboundedSender<LoadOutcome>,
    load_rx: mpsc::UnboundedReceiver<LoadOutcome>,
    events: broadcast::Sender<PlaybackEvent>,
}

impl ControllerActor {
    async fn run(mut self) {
        loop {
            let request = tokio::select! {
                Some(outcome) = self.load_rx.recv() => {
                    self.controller.complete_load(outcome.id, outcome.result)
                }
                Some(notification) = self.engine_notifications.recv() => match notification {
                    EngineNotification::TrackFinished(id) => self.controller.track_finished(id),
                },
                command = self.commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
            };

            if let Some(request) = request {
                self.dispatch(request);
            }
            self.publish_events();
        }

        self.controller.stop();
        self.publish_events();
        info!("Playback controller stopped");
    }

    fn handle(&mut self, command: ControllerCommand) -> Option<LoadRequest> {
        let controller = &mut self.controller;
        match command {
            ControllerCommand::Play { track, from_queue } => controller.play(track, from_queue),
            ControllerCommand::TogglePlayPause => controller.toggle_play_pause(),
            ControllerCommand::PlayNext => controller.play_next(),
            ControllerCommand::PlayPrevious => controller.play_previous(),
            ControllerCommand::Stop => {
                controller.stop();
                None
            }
            ControllerCommand::Seek(position) => {
                controller.seek(position);
                None
            }
            ControllerCommand::SeekFraction(fraction) => {
                controller.seek_fraction(fraction);
                None
            }
            ControllerCommand::SetVolume(volume) => {
                controller.set_volume(volume);
                None
            }
            ControllerCommand::AddToQueue(track) => {
                controller.add_to_queue(track);
                None
            }
            ControllerCommand::AddToQueueEnd(track) => {
                controller.add_to_queue_end(track);
                None
            }
            ControllerCommand::AppendToQueue(tracks) => {
                controller.append_to_queue(tracks);
                None
            }
            ControllerCommand::RemoveFromQueue { index, reply } => {
                // Caller may have given up waiting
                let _ = reply.send(controller.remove_from_queue(index));
                None
            }
            ControllerCommand::MoveInQueue {
                offsets,
                destination,
                reply,
            } => {
                let _ = reply.send(controller.move_in_queue(&offsets, destination));
                None
            }
            ControllerCommand::SkipTo { index, reply } => match controller.skip_to(index) {
                Ok(request) => {
                    let _ = reply.send(Ok(()));
                    request
                }
                Err(err) => {
                    let _ = reply.send(Err(err));
                    None
                }
            },
            ControllerCommand::ClearQueue => {
                controller.clear_queue();
                None
            }
            ControllerCommand::ToggleShuffle => {
                controller.toggle_shuffle();
                None
            }
            ControllerCommand::SetShuffle(enabled) => {
                controller.set_shuffle(enabled);
                None
            }
            ControllerCommand::CycleRepeat => {
                controller.cycle_repeat();
                None
            }
            ControllerCommand::SetRepeat(mode) => {
                controller.set_repeat(mode);
                None
            }
            ControllerCommand::Snapshot { reply } => {
                let _ = reply.send(controller.snapshot());
                None
            }
        }
    }

    /// Run the engine load in its own task and feed the outcome back
    fn dispatch(&self, request: LoadRequest) {
        let engine = Arc::clone(&self.engine);
        let load_tx = self.load_tx.clone();
        let on_finish = FinishNotifier::new(self.engine_tx.clone(), request.id);

        tokio::spawn(async move {
            let result = engine.load(&request.resource, on_finish).await;
            // Controller gone: nobody is waiting for this load
            let _ = load_tx.send(LoadOutcome {
                id: request.id,
                result,
            });
        });
    }

    fn publish_events(&mut self) {
        for event in self.controller.drain_events() {
            // No subscribers is fine
            let _ = self.events.send(event);
        }
    }
}
