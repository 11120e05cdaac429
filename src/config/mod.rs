//! Configuration management

use crate::domain::media::{PlayerOptions, RecorderOptions};
use crate::domain::shared::error::DomainError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Prefix of environment overrides, e.g. `PLAYDECK__PROGRESS__POLL_INTERVAL_MS`
pub const ENV_PREFIX: &str = "PLAYDECK";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub media: MediaConfig,
    pub recorder: RecorderOptions,
    pub progress: ProgressConfig,
    pub logging: LoggingConfig,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MediaConfig {
    /// Audio source handed to every new player
    pub source_uri: String,
    /// Output target handed to every new recorder
    pub recording_target: String,
    pub auto_destroy: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProgressConfig {
    pub poll_interval_ms: u64,
    pub seek_debounce_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset
    pub filter: String,
}

/// Behaviour of the in-memory engine used by the demo binary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub duration_secs: f64,
    pub fail_prepare: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            media: MediaConfig::default(),
            recorder: RecorderOptions::default(),
            progress: ProgressConfig::default(),
            logging: LoggingConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            source_uri: "https://media.example.com/audio/body_scan.mp3".to_string(),
            recording_target: "file.mp4".to_string(),
            auto_destroy: false,
        }
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            seek_debounce_ms: 200,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "playdeck=info".to_string(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            duration_secs: 30.0,
            fail_prepare: false,
        }
    }
}

impl ProgressConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn seek_debounce(&self) -> Duration {
        Duration::from_millis(self.seek_debounce_ms)
    }
}

impl MediaConfig {
    pub fn player_options(&self) -> PlayerOptions {
        PlayerOptions {
            auto_destroy: self.auto_destroy,
        }
    }
}

impl Config {
    /// Layer defaults, an optional TOML file and `PLAYDECK__*` variables
    pub fn load(path: Option<&Path>) -> Result<Self, DomainError> {
        let defaults = ::config::Config::try_from(&Config::default())
            .map_err(|e| DomainError::Config(e.to_string()))?;

        let mut builder = ::config::Config::builder().add_source(defaults);
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(false));
        }

        let loaded: Config = builder
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| DomainError::Config(e.to_string()))?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(input: &str) -> Result<Self, DomainError> {
        let parsed: Config = toml::from_str(input).map_err(|e| DomainError::Config(e.to_string()))?;
        parsed.validate()?;
        Ok(parsed)
    }

    pub fn to_toml_string(&self) -> Result<String, DomainError> {
        toml::to_string_pretty(self).map_err(|e| DomainError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.progress.poll_interval_ms == 0 {
            return Err(DomainError::Config(
                "progress.poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        let recorder = &self.recorder;
        if recorder.bitrate == 0 || recorder.channels == 0 || recorder.sample_rate == 0 {
            return Err(DomainError::Config(
                "recorder bitrate, channels and sample_rate must be positive".to_string(),
            ));
        }
        if self.media.source_uri.trim().is_empty() {
            return Err(DomainError::Config("media.source_uri is empty".to_string()));
        }
        let duration = self.simulation.duration_secs;
        if !duration.is_finite() || duration <= 0.0 {
            return Err(DomainError::Config(format!(
                "simulation.duration_secs must be finite and positive, got {}",
                duration
            )));
        }
        Ok(())
    }
}
