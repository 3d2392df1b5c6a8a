//! Shared test doubles for the playback integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempo_core::{FileSystem, TrackRef};
use tempo_playback::{AudioEngine, EngineError, FinishNotifier, LoadRequest, PlaybackController};
use tokio::sync::Notify;

// ===== Tracks =====

pub fn create_track(id: &str) -> TrackRef {
    TrackRef::new(id, format!("Track {id}"), track_path(id))
        .with_duration(Duration::from_secs(180))
}

pub fn create_tracks(count: usize) -> Vec<TrackRef> {
    (0..count).map(|i| create_track(&format!("t{i}"))).collect()
}

pub fn track_path(id: &str) -> PathBuf {
    PathBuf::from(format!("/music/{id}.mp3"))
}

pub fn ids(tracks: &[TrackRef]) -> Vec<&str> {
    tracks.iter().map(|t| t.id.as_str()).collect()
}

// ===== Audio Engine =====

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Load(PathBuf),
    Play,
    Pause,
    Stop,
    Seek(Duration),
    SeekFraction(f32),
    SetVolume(f32),
}

/// Engine double that records every command
///
/// Loads fail for paths marked with `fail`, and block until `release` for paths
/// marked with `gate`. Loading a path marked with `end_previous_during` first
/// reports the end of whatever was loaded before it.
#[derive(Default)]
pub struct RecordingEngine {
    failing: Mutex<HashSet<PathBuf>>,
    gates: Mutex<HashMap<PathBuf, Arc<Notify>>>,
    ends_previous: Mutex<HashSet<PathBuf>>,
    on_finish: Mutex<Option<FinishNotifier>>,
    calls: Mutex<Vec<EngineCall>>,
    position: Mutex<Duration>,
    playing: AtomicBool,
    volume: Mutex<f32>,
}

impl RecordingEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail(&self, path: PathBuf) {
        self.failing.lock().unwrap().insert(path);
    }

    pub fn gate(&self, path: PathBuf) {
        self.gates
            .lock()
            .unwrap()
            .insert(path, Arc::new(Notify::new()));
    }

    pub fn release(&self, path: &Path) {
        if let Some(gate) = self.gates.lock().unwrap().get(path) {
            gate.notify_one();
        }
    }

    pub fn end_previous_during(&self, path: PathBuf) {
        self.ends_previous.lock().unwrap().insert(path);
    }

    /// Report that the loaded resource played to its end
    pub fn finish_current(&self) -> bool {
        self.on_finish
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(FinishNotifier::notify)
    }

    pub fn set_position(&self, position: Duration) {
        *self.position.lock().unwrap() = position;
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &EngineCall) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn loads(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, EngineCall::Load(_)))
            .count()
    }

    /// What `load` would return for `path`
    pub fn outcome(&self, path: &Path) -> Result<(), EngineError> {
        if self.failing.lock().unwrap().contains(path) {
            Err(EngineError::Decode {
                path: path.to_path_buf(),
                reason: "unsupported codec".to_string(),
            })
        } else {
            Ok(())
        }
    }

    fn record(&self, call: EngineCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AudioEngine for RecordingEngine {
    async fn load(&self, resource: &Path, on_finish: FinishNotifier) -> Result<(), EngineError> {
        self.record(EngineCall::Load(resource.to_path_buf()));
        if self.ends_previous.lock().unwrap().contains(resource) {
            self.finish_current();
        }

        let gate = self.gates.lock().unwrap().get(resource).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let outcome = self.outcome(resource);
        if outcome.is_ok() {
            *self.on_finish.lock().unwrap() = Some(on_finish);
        }
        outcome
    }

    fn play(&self) {
        self.playing.store(true, Ordering::SeqCst);
        self.record(EngineCall::Play);
    }

    fn pause(&self) {
        self.playing.store(false, Ordering::SeqCst);
        self.record(EngineCall::Pause);
    }

    fn stop(&self) {
        self.playing.store(false, Ordering::SeqCst);
        self.on_finish.lock().unwrap().take();
        self.set_position(Duration::ZERO);
        self.record(EngineCall::Stop);
    }

    fn seek(&self, position: Duration) {
        self.set_position(position);
        self.record(EngineCall::Seek(position));
    }

    fn seek_fraction(&self, fraction: f32) {
        self.record(EngineCall::SeekFraction(fraction));
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    fn current_time(&self) -> Duration {
        *self.position.lock().unwrap()
    }

    fn duration(&self) -> Option<Duration> {
        Some(Duration::from_secs(180))
    }

    fn volume(&self) -> f32 {
        *self.volume.lock().unwrap()
    }

    fn set_volume(&self, volume: f32) {
        *self.volume.lock().unwrap() = volume;
        self.record(EngineCall::SetVolume(volume));
    }
}

// ===== File System =====

/// File system where every path exists unless marked missing
#[derive(Default)]
pub struct FakeFileSystem {
    missing: Mutex<HashSet<PathBuf>>,
}

impl FakeFileSystem {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn remove(&self, path: PathBuf) {
        self.missing.lock().unwrap().insert(path);
    }
}

impl FileSystem for FakeFileSystem {
    fn exists(&self, path: &Path) -> bool {
        !self.missing.lock().unwrap().contains(path)
    }
}

// ===== Driving the controller =====

/// Complete loads the way the engine would until playback settles
///
/// Returns how many loads were completed.
pub fn settle(
    controller: &mut PlaybackController,
    engine: &RecordingEngine,
    mut request: Option<LoadRequest>,
) -> usize {
    let mut loads = 0;
    while let Some(pending) = request {
        loads += 1;
        request = controller.complete_load(pending.id, engine.outcome(&pending.resource));
    }
    loads
}
