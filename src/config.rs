//! TOML settings.
//!
//! Each section maps to a TOML table and every field has a default, so a
//! partial (or empty) file is valid.

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::remote::{ProbeSettings, RemoteOptions};
use crate::backend::Slot;
use crate::core::offset::MAX_OFFSET_SECONDS;
use crate::logging::LogLevel;

/// Errors that can occur during config operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Root settings structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub sync: SyncSettings,

    #[serde(default)]
    pub remote: RemoteSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Controller behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Overlay lead in seconds, 0 to 20.
    #[serde(default = "default_offset")]
    pub default_offset: f64,

    /// Start playing as soon as a source is attached.
    #[serde(default)]
    pub autoplay: bool,

    /// Engine poll interval in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_offset() -> f64 {
    1.0
}

fn default_poll_interval_ms() -> u64 {
    50
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            default_offset: default_offset(),
            autoplay: false,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl SyncSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Embedded player behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteSettings {
    /// Base URL the embed paths are appended to.
    #[serde(default = "default_embed_host")]
    pub embed_host: String,

    /// Delay between duration probe attempts while the embedding API loads.
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// How often a playing remote backend reports its estimated position.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    #[serde(default = "default_true")]
    pub primary_controls: bool,

    #[serde(default)]
    pub overlay_controls: bool,
}

fn default_embed_host() -> String {
    "https://www.youtube.com".to_string()
}

fn default_retry_interval_ms() -> u64 {
    100
}

fn default_max_attempts() -> u32 {
    50
}

fn default_tick_interval_ms() -> u64 {
    100
}

fn default_true() -> bool {
    true
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            embed_host: default_embed_host(),
            retry_interval_ms: default_retry_interval_ms(),
            max_attempts: default_max_attempts(),
            tick_interval_ms: default_tick_interval_ms(),
            primary_controls: true,
            overlay_controls: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default)]
    pub level: LogLevel,
}

impl Settings {
    /// Load and validate settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let offset = self.sync.default_offset;
        if !offset.is_finite() || !(0.0..=MAX_OFFSET_SECONDS).contains(&offset) {
            return Err(ConfigError::Invalid(format!(
                "sync.default_offset must be between 0 and {MAX_OFFSET_SECONDS}, got {offset}"
            )));
        }
        if self.sync.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("sync.poll_interval_ms must be positive".into()));
        }
        if self.remote.retry_interval_ms == 0 || self.remote.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("remote intervals must be positive".into()));
        }
        if self.remote.max_attempts == 0 {
            return Err(ConfigError::Invalid("remote.max_attempts must be at least 1".into()));
        }
        let host = url::Url::parse(&self.remote.embed_host)
            .map_err(|err| ConfigError::Invalid(format!("remote.embed_host: {err}")))?;
        if host.cannot_be_a_base() {
            return Err(ConfigError::Invalid(format!(
                "remote.embed_host must be a hierarchical URL, got {}",
                self.remote.embed_host
            )));
        }
        Ok(())
    }

    /// Remote backend options for a slot. Only the primary probes for the
    /// duration.
    pub fn remote_options(&self, slot: Slot) -> RemoteOptions {
        let remote = &self.remote;
        RemoteOptions {
            embed_host: remote.embed_host.clone(),
            show_controls: match slot {
                Slot::Primary => remote.primary_controls,
                Slot::Overlay => remote.overlay_controls,
            },
            probe_duration: slot == Slot::Primary,
            probe: ProbeSettings {
                retry_interval: Duration::from_millis(remote.retry_interval_ms),
                max_attempts: remote.max_attempts,
            },
            tick_interval: Duration::from_millis(remote.tick_interval_ms),
        }
    }
}
