//! Playback controller - core orchestration
//!
//! Coordinates the queue, playback mode and the audio engine.
//!
//! The controller never awaits anything itself. Operations that need a track
//! loaded set the state to `Loading` and hand back a [`LoadRequest`]; the driver
//! (see [`crate::ControllerHandle`]) performs `AudioEngine::load` and reports the
//! outcome through [`PlaybackController::complete_load`]. Each request carries a
//! monotonically increasing [`RequestId`] and only the latest one is honoured, so
//! a load superseded by a newer `play` can never take over playback. The same
//! token tags end-of-track notifications: only the load that is actually playing
//! may advance the queue when it finishes.
//!
//! Load failures (missing file or engine error) never reach the caller. They
//! skip forward, at most `queue.len()` times per skip chain, then stop.

use crate::{
    engine::AudioEngine,
    error::{EngineError, PlaybackError, Result},
    events::PlaybackEvent,
    queue::PlaybackQueue,
    shuffle::shuffle_rng,
    types::{ControllerConfig, LoadRequest, PlaybackState, PlayerSnapshot, RepeatMode, RequestId},
};
use std::sync::Arc;
use std::time::Duration;
use tempo_core::{FileSystem, TrackRef};
use tracing::{debug, info, warn};

/// Central playback state machine
///
/// Owns the queue exclusively. Every mutation goes through `&mut self`, so the
/// owner decides which context serialises them.
pub struct PlaybackController {
    // State
    state: PlaybackState,
    current_track: Option<TrackRef>,

    // Queue
    queue: PlaybackQueue,

    // Settings
    shuffle: bool,
    repeat: RepeatMode,
    restart_threshold: Duration,

    // Collaborators
    engine: Arc<dyn AudioEngine>,
    fs: Arc<dyn FileSystem>,

    // Load tracking
    last_request: u64,
    active_request: Option<RequestId>,
    playing_request: Option<RequestId>,

    // Consecutive load failures in the current skip chain
    skip_attempts: usize,

    // Event queue for UI synchronization
    pending_events: Vec<PlaybackEvent>,
}

impl PlaybackController {
    /// Create new playback controller
    pub fn new(
        config: &ControllerConfig,
        engine: Arc<dyn AudioEngine>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        engine.set_volume(config.volume.clamp(0.0, 1.0));

        Self {
            state: PlaybackState::Idle,
            current_track: None,
            queue: PlaybackQueue::with_rng(shuffle_rng(config.shuffle_seed)),
            shuffle: config.shuffle,
            repeat: config.repeat,
            restart_threshold: config.restart_threshold(),
            engine,
            fs,
            last_request: 0,
            active_request: None,
            playing_request: None,
            skip_attempts: 0,
            pending_events: Vec::new(),
        }
    }

    // ===== Playback Control =====

    /// Play `track`, replacing the queue with `from_queue` (or with just `track`)
    pub fn play(&mut self, track: TrackRef, from_queue: Option<Vec<TrackRef>>) -> Option<LoadRequest> {
        let tracks = from_queue.unwrap_or_else(|| vec![track.clone()]);
        info!(track = %track.id, queue_len = tracks.len(), "Play requested");

        self.queue.set_queue(tracks, &track);
        self.emit_queue_changed();

        self.skip_attempts = 0;
        self.load_and_play(track)
    }

    /// Pause when playing, resume when paused
    ///
    /// When idle with a non-empty queue, starts the entry under the cursor.
    pub fn toggle_play_pause(&mut self) -> Option<LoadRequest> {
        match self.state {
            PlaybackState::Playing => {
                self.engine.pause();
                self.set_state(PlaybackState::Paused);
                None
            }
            PlaybackState::Paused => {
                self.engine.play();
                self.set_state(PlaybackState::Playing);
                None
            }
            PlaybackState::Loading => None,
            PlaybackState::Idle => {
                let track = self.queue.current().cloned()?;
                self.skip_attempts = 0;
                self.load_and_play(track)
            }
        }
    }

    /// Skip to next track
    ///
    /// Honours repeat mode: `One` reloads the current track, `All` wraps to the
    /// start of the queue, `Off` stops at the end.
    pub fn play_next(&mut self) -> Option<LoadRequest> {
        self.skip_attempts = 0;
        let track = self.next_candidate(false)?;
        self.load_and_play(track)
    }

    /// Go to previous track
    ///
    /// Past the restart threshold this restarts the current track instead.
    pub fn play_previous(&mut self) -> Option<LoadRequest> {
        if self.current_track.is_some() && self.engine.current_time() > self.restart_threshold {
            debug!("Restarting current track");
            self.engine.seek(Duration::ZERO);
            return None;
        }

        let track = self.queue.previous().cloned()?;
        self.skip_attempts = 0;
        self.load_and_play(track)
    }

    /// Stop playback
    ///
    /// Stops the engine and clears the current track (but not the queue).
    pub fn stop(&mut self) {
        info!("Stop requested");
        self.halt();
    }

    /// Play the queue entry at `index`
    pub fn skip_to(&mut self, index: usize) -> Result<Option<LoadRequest>> {
        let track = self
            .queue
            .jump_to(index)
            .cloned()
            .ok_or(PlaybackError::IndexOutOfBounds(index))?;

        self.skip_attempts = 0;
        Ok(self.load_and_play(track))
    }

    // ===== Engine Callbacks =====

    /// Outcome of a load issued through a [`LoadRequest`]
    ///
    /// Results for anything but the most recent request are discarded.
    pub fn complete_load(
        &mut self,
        id: RequestId,
        result: std::result::Result<(), EngineError>,
    ) -> Option<LoadRequest> {
        if self.active_request != Some(id) {
            debug!(request = id.0, "Discarding superseded load result");
            return None;
        }
        self.active_request = None;

        match result {
            Ok(()) => {
                self.playing_request = Some(id);
                self.skip_attempts = 0;
                self.engine.play();
                self.set_state(PlaybackState::Playing);
                None
            }
            Err(err) => {
                let track = self.current_track.clone()?;
                let next = self.skip_after_failure(&track, &err.into())?;
                self.load_and_play(next)
            }
        }
    }

    /// The engine played the resource of load `id` to its end
    ///
    /// Ignored unless `id` is the load currently playing, so a track that ended
    /// while its successor was loading cannot skip that successor.
    pub fn track_finished(&mut self, id: RequestId) -> Option<LoadRequest> {
        if self.state != PlaybackState::Playing || self.playing_request != Some(id) {
            debug!(request = id.0, state = ?self.state, "Ignoring finish notification");
            return None;
        }

        if let Some(track) = &self.current_track {
            self.pending_events.push(PlaybackEvent::TrackFinished {
                track_id: track.id.to_string(),
            });
        }

        self.skip_attempts = 0;
        let track = self.next_candidate(false)?;
        self.load_and_play(track)
    }

    // ===== Seek =====

    /// Seek to position in current track
    pub fn seek(&mut self, position: Duration) {
        if self.current_track.is_none() {
            debug!("Seek ignored, no track loaded");
            return;
        }
        self.engine.seek(position);
    }

    /// Seek to position in current track (0.0-1.0 of its duration)
    pub fn seek_fraction(&mut self, fraction: f32) {
        if self.current_track.is_none() {
            debug!("Seek ignored, no track loaded");
            return;
        }
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        self.engine.seek_fraction(fraction);
    }

    // ===== Volume =====

    /// Set volume (0.0-1.0)
    pub fn set_volume(&mut self, volume: f32) {
        let volume = if volume.is_nan() {
            0.0
        } else {
            volume.clamp(0.0, 1.0)
        };
        self.engine.set_volume(volume);
        self.pending_events.push(PlaybackEvent::VolumeChanged { volume });
    }

    // ===== Queue Management =====

    /// Add track to play right after the current one
    pub fn add_to_queue(&mut self, track: TrackRef) {
        self.queue.add_next(track);
        self.emit_queue_changed();
    }

    /// Add track to end of queue
    pub fn add_to_queue_end(&mut self, track: TrackRef) {
        self.queue.add_at_end(track);
        self.emit_queue_changed();
    }

    /// Append tracks to the end of the queue, in order
    pub fn append_to_queue(&mut self, tracks: Vec<TrackRef>) {
        for track in tracks {
            self.queue.add_at_end(track);
        }
        self.emit_queue_changed();
    }

    /// Remove track from queue by index
    ///
    /// The loaded track keeps playing even when its queue entry is removed.
    pub fn remove_from_queue(&mut self, index: usize) -> Result<TrackRef> {
        let removed = self
            .queue
            .remove_at(index)
            .ok_or(PlaybackError::IndexOutOfBounds(index))?;
        self.emit_queue_changed();
        Ok(removed)
    }

    /// Reorder queue entries
    pub fn move_in_queue(&mut self, offsets: &[usize], destination: usize) -> Result<()> {
        self.queue.move_entries(offsets, destination)?;
        self.emit_queue_changed();
        Ok(())
    }

    /// Clear entire queue
    pub fn clear_queue(&mut self) {
        self.queue.clear();
        self.emit_queue_changed();
    }

    // ===== Shuffle & Repeat =====

    /// Flip shuffle
    ///
    /// Queue order is untouched; only future `next` picks are affected.
    pub fn toggle_shuffle(&mut self) {
        self.set_shuffle(!self.shuffle);
    }

    pub fn set_shuffle(&mut self, enabled: bool) {
        if self.shuffle != enabled {
            self.shuffle = enabled;
            self.emit_mode_changed();
        }
    }

    /// Cycle repeat: off → all → one → off
    pub fn cycle_repeat(&mut self) {
        self.set_repeat(self.repeat.cycle());
    }

    pub fn set_repeat(&mut self, mode: RepeatMode) {
        if self.repeat != mode {
            self.repeat = mode;
            self.emit_mode_changed();
        }
    }

    // ===== State Queries =====

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Load whose resource the engine is currently playing or paused on
    pub fn playing_request(&self) -> Option<RequestId> {
        self.playing_request
    }

    /// Track loaded (or being loaded) in the engine
    pub fn current_track(&self) -> Option<&TrackRef> {
        self.current_track.as_ref()
    }

    pub fn queue(&self) -> &PlaybackQueue {
        &self.queue
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    pub fn is_playing(&self) -> bool {
        self.engine.is_playing()
    }

    pub fn current_time(&self) -> Duration {
        self.engine.current_time()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.engine.duration()
    }

    pub fn volume(&self) -> f32 {
        self.engine.volume()
    }

    /// Everything the UI renders, read in one go
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            state: self.state,
            current_track: self.current_track.clone(),
            is_playing: self.is_playing(),
            current_time: self.current_time(),
            duration: self.duration(),
            volume: self.volume(),
            shuffle: self.shuffle,
            repeat: self.repeat,
            queue: self.queue.tracks().to_vec(),
            current_index: self.queue.current_index(),
            up_next: self.queue.up_next().cloned().collect(),
        }
    }

    // ===== Events =====

    /// Take all events emitted since the last call
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Internal =====

    /// Pick the track an advance lands on, or stop when there is none
    ///
    /// `skipping` marks an advance caused by a load failure; those always move
    /// forward, even under repeat-one.
    fn next_candidate(&mut self, skipping: bool) -> Option<TrackRef> {
        if self.repeat == RepeatMode::One && !skipping {
            if let Some(track) = self.current_track.clone() {
                return Some(track);
            }
        }

        if let Some(track) = self.queue.next(self.shuffle).cloned() {
            return Some(track);
        }

        if self.repeat == RepeatMode::All {
            self.queue.restart();
            if let Some(track) = self.queue.current().cloned() {
                debug!("Queue exhausted, repeating from the start");
                return Some(track);
            }
        }

        info!("Reached end of queue");
        self.halt();
        None
    }

    /// Issue a load for `track`, skipping forward past missing resources
    ///
    /// Iterative: a run of missing files never grows the stack.
    fn load_and_play(&mut self, track: TrackRef) -> Option<LoadRequest> {
        let mut candidate = track;
        loop {
            if self.fs.exists(&candidate.path) {
                return Some(self.issue_load(candidate));
            }
            let err = PlaybackError::ResourceMissing(candidate.path.clone());
            candidate = self.skip_after_failure(&candidate, &err)?;
        }
    }

    fn issue_load(&mut self, track: TrackRef) -> LoadRequest {
        self.last_request += 1;
        let id = RequestId(self.last_request);
        self.active_request = Some(id);
        self.playing_request = None;

        debug!(request = id.0, track = %track.id, path = %track.path.display(), "Issuing load");

        let resource = track.path.clone();
        self.set_current_track(Some(track.clone()));
        self.set_state(PlaybackState::Loading);

        LoadRequest {
            id,
            track,
            resource,
        }
    }

    /// Record a failed load and choose the next track to try
    ///
    /// Returns `None` once the chain has failed as many times as the queue is
    /// long, or the queue has nothing left.
    fn skip_after_failure(&mut self, track: &TrackRef, err: &PlaybackError) -> Option<TrackRef> {
        warn!(track = %track.id, error = %err, "Track failed to load, skipping");
        self.pending_events.push(PlaybackEvent::LoadFailed {
            track_id: track.id.to_string(),
            reason: err.to_string(),
        });

        self.skip_attempts += 1;
        if self.skip_attempts >= self.queue.len() {
            warn!(attempts = self.skip_attempts, "No playable track left in queue");
            self.halt();
            self.pending_events.push(PlaybackEvent::NothingPlayable);
            return None;
        }

        self.next_candidate(true)
    }

    /// Stop the engine and return to `Idle`
    fn halt(&mut self) {
        self.engine.stop();
        self.active_request = None;
        self.playing_request = None;
        self.set_current_track(None);
        self.set_state(PlaybackState::Idle);
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state != state {
            self.state = state;
            self.pending_events.push(PlaybackEvent::StateChanged { state });
        }
    }

    fn set_current_track(&mut self, track: Option<TrackRef>) {
        if self.current_track == track {
            return;
        }
        let previous = std::mem::replace(&mut self.current_track, track);
        self.pending_events.push(PlaybackEvent::TrackChanged {
            track_id: self.current_track.as_ref().map(|t| t.id.to_string()),
            previous_track_id: previous.map(|t| t.id.to_string()),
        });
    }

    fn emit_queue_changed(&mut self) {
        self.pending_events.push(PlaybackEvent::QueueChanged {
            length: self.queue.len(),
            current_index: self.queue.current_index(),
        });
    }

    fn emit_mode_changed(&mut self) {
        self.pending_events.push(PlaybackEvent::ModeChanged {
            shuffle: self.shuffle,
            repeat: self.repeat,
        });
    }
}
