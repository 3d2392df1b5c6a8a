/// CLI configuration
use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempo_playback::ControllerConfig;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default)]
    pub playback: ControllerConfig,

    #[serde(default)]
    pub scan: ScanSettings,

    #[serde(default)]
    pub simulation: SimulationSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanSettings {
    #[serde(default)]
    pub follow_links: bool,

    /// Maximum directory depth; unlimited when unset
    #[serde(default)]
    pub max_depth: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationSettings {
    /// How long each simulated track plays
    #[serde(default = "default_seconds_per_track")]
    pub seconds_per_track: f64,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            follow_links: false,
            max_depth: None,
        }
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            seconds_per_track: default_seconds_per_track(),
        }
    }
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist. Without one, `tempo.toml` in the working
    /// directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let config_path = PathBuf::from("tempo.toml");
                if config_path.exists() {
                    settings = settings.add_source(config::File::from(config_path));
                }
            }
        }

        // Override with environment variables, e.g. TEMPO_PLAYBACK__VOLUME=0.5
        settings = settings.add_source(
            config::Environment::with_prefix("TEMPO")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.playback
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))?;

        if !self.simulation.seconds_per_track.is_finite() || self.simulation.seconds_per_track <= 0.0
        {
            return Err(CliError::Config(format!(
                "seconds_per_track must be positive, got {}",
                self.simulation.seconds_per_track
            )));
        }

        Ok(())
    }

    pub fn track_length(&self) -> Duration {
        Duration::from_secs_f64(self.simulation.seconds_per_track)
    }
}

// Default values
fn default_seconds_per_track() -> f64 {
    5.0
}
