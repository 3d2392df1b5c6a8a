//! Simulated audio engine
//!
//! Stands in for a real decoder and output device. Every file "plays" for the
//! same configured length; zero-length files fail to load the way a corrupt
//! file would fail to decode.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tempo_playback::{AudioEngine, EngineError, FinishNotifier};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

pub struct SimulatedEngine {
    track_length: Duration,
    state: Arc<Mutex<EngineState>>,
}

#[derive(Default)]
struct EngineState {
    loaded: Option<PathBuf>,
    on_finish: Option<FinishNotifier>,

    // Position at the last resume, pause or seek
    position: Duration,
    // Set while playing
    resumed_at: Option<Instant>,

    volume: f32,

    // Latest load started; older loads finishing late are ignored
    load_seq: u64,

    // Bumped whenever the finish timer is invalidated
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

impl EngineState {
    fn elapsed(&self, track_length: Duration) -> Duration {
        let running = self.resumed_at.map_or(Duration::ZERO, |at| at.elapsed());
        (self.position + running).min(track_length)
    }

    fn cancel_timer(&mut self) {
        self.generation += 1;
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl SimulatedEngine {
    pub fn new(track_length: Duration) -> Self {
        Self {
            track_length,
            state: Arc::new(Mutex::new(EngineState::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Arm the finish timer for the remainder of the loaded track
    fn schedule_finish(&self, state: &mut EngineState) {
        state.cancel_timer();

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime, finish notification disabled");
            return;
        };

        let remaining = self.track_length.saturating_sub(state.position);
        let generation = state.generation;
        let shared = Arc::clone(&self.state);
        let on_finish = state.on_finish.clone();
        let track_length = self.track_length;

        state.timer = Some(runtime.spawn(async move {
            tokio::time::sleep(remaining).await;

            {
                let mut state = shared.lock().unwrap_or_else(PoisonError::into_inner);
                if state.generation != generation {
                    return;
                }
                state.position = track_length;
                state.resumed_at = None;
                state.timer = None;
            }

            match on_finish {
                Some(on_finish) => {
                    on_finish.notify();
                }
                None => debug!("Track finished with no controller attached"),
            }
        }));
    }
}

#[async_trait]
impl AudioEngine for SimulatedEngine {
    async fn load(&self, resource: &Path, on_finish: FinishNotifier) -> Result<(), EngineError> {
        let seq = {
            let mut state = self.lock();
            state.load_seq += 1;
            state.load_seq
        };

        let metadata = tokio::fs::metadata(resource)
            .await
            .map_err(|e| EngineError::Decode {
                path: resource.to_path_buf(),
                reason: e.to_string(),
            })?;
        if metadata.len() == 0 {
            return Err(EngineError::Decode {
                path: resource.to_path_buf(),
                reason: "empty file".to_string(),
            });
        }

        let mut state = self.lock();
        if state.load_seq != seq {
            debug!(path = %resource.display(), "Load superseded");
            return Ok(());
        }

        state.cancel_timer();
        state.loaded = Some(resource.to_path_buf());
        state.on_finish = Some(on_finish);
        state.position = Duration::ZERO;
        state.resumed_at = None;
        Ok(())
    }

    fn play(&self) {
        let mut state = self.lock();
        if state.loaded.is_none() || state.resumed_at.is_some() {
            return;
        }
        state.resumed_at = Some(Instant::now());
        self.schedule_finish(&mut state);
    }

    fn pause(&self) {
        let mut state = self.lock();
        if state.resumed_at.is_none() {
            return;
        }
        state.position = state.elapsed(self.track_length);
        state.resumed_at = None;
        state.cancel_timer();
    }

    fn stop(&self) {
        let mut state = self.lock();
        state.cancel_timer();
        state.loaded = None;
        state.on_finish = None;
        state.position = Duration::ZERO;
        state.resumed_at = None;
    }

    fn seek(&self, position: Duration) {
        let mut state = self.lock();
        if state.loaded.is_none() {
            return;
        }
        state.position = position.min(self.track_length);
        if state.resumed_at.is_some() {
            state.resumed_at = Some(Instant::now());
            self.schedule_finish(&mut state);
        }
    }

    fn seek_fraction(&self, fraction: f32) {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        self.seek(self.track_length.mul_f32(fraction));
    }

    fn is_playing(&self) -> bool {
        self.lock().resumed_at.is_some()
    }

    fn current_time(&self) -> Duration {
        self.lock().elapsed(self.track_length)
    }

    fn duration(&self) -> Option<Duration> {
        self.lock().loaded.as_ref().map(|_| self.track_length)
    }

    fn volume(&self) -> f32 {
        self.lock().volume
    }

    fn set_volume(&self, volume: f32) {
        self.lock().volume = volume.clamp(0.0, 1.0);
    }
}
