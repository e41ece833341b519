//! TOML-based application configuration.
//!
//! Stores:
//! - Clock source and renderer tick periods
//! - Expiry notifier settings
//! - An optional default timer duration
//! - Log filter and log file
//!
//! Configuration is read from `<config dir>/ticktock/config.toml`. A missing
//! file at the default location yields the defaults; nothing is written back.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::timer::parse_duration;

/// Clock source configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockConfig {
    #[serde(default = "default_clock_tick_ms")]
    pub tick_ms: u64,
}

/// Renderer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_render_tick_ms")]
    pub tick_ms: u64,
}

/// Expiry notifier configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Program and arguments to run on expiry. Empty rings the terminal bell.
    #[serde(default)]
    pub command: Vec<String>,
}

/// Timer mode configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// `HH:MM:SS` the timer starts configured with.
    #[serde(default)]
    pub default_duration: Option<String>,
}

/// Diagnostics configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directive, overridden by `TICKTOCK_LOG`.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Append diagnostics here instead of stderr.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub log: LogConfig,
}

// Default functions
fn default_clock_tick_ms() -> u64 {
    30
}
fn default_render_tick_ms() -> u64 {
    200
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "warn".into()
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_clock_tick_ms(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_render_tick_ms(),
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: Vec::new(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Returns `~/.config/ticktock/` (or the platform equivalent).
///
/// Set `TICKTOCK_CONFIG_DIR` to use another directory.
pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("TICKTOCK_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ticktock")
}

impl Config {
    pub fn default_path() -> PathBuf {
        config_dir().join("config.toml")
    }

    /// Load from `path`, or from the default location when `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly given file cannot be read, if the
    /// file cannot be parsed, or if a value fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (Self::default_path(), false),
        };

        let config = match std::fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content, &path)?,
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(source) => return Err(ConfigError::LoadFailed { path, source }),
        };
        config.validate()?;
        Ok(config)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns `InvalidValue` naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.clock.tick_ms == 0 {
            return Err(invalid("clock.tick_ms", "must be greater than zero"));
        }
        if self.render.tick_ms == 0 {
            return Err(invalid("render.tick_ms", "must be greater than zero"));
        }
        if self.render.tick_ms < self.clock.tick_ms {
            return Err(invalid(
                "render.tick_ms",
                format!(
                    "must not be finer than clock.tick_ms ({} ms)",
                    self.clock.tick_ms
                ),
            ));
        }
        self.default_duration()?;
        Ok(())
    }

    pub fn clock_period(&self) -> Duration {
        Duration::from_millis(self.clock.tick_ms)
    }

    pub fn render_period(&self) -> Duration {
        Duration::from_millis(self.render.tick_ms)
    }

    /// The parsed `timer.default_duration`, if set.
    pub fn default_duration(&self) -> Result<Option<Duration>, ConfigError> {
        self.timer
            .default_duration
            .as_deref()
            .map(parse_duration)
            .transpose()
            .map_err(|e| invalid("timer.default_duration", e.to_string()))
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeFailed(e.to_string()))
    }
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.into(),
    }
}
