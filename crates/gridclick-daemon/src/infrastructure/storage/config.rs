//! TOML configuration for the daemon.
//!
//! Read once at startup from an explicit path or the platform config file:
//! - Windows:  `%APPDATA%\GridClick\config.toml`
//! - Linux:    `$XDG_CONFIG_HOME/gridclick/config.toml` or `~/.config/gridclick/config.toml`
//! - macOS:    `~/Library/Application Support/GridClick/config.toml`
//!
//! Every field is optional:
//!
//! ```toml
//! [daemon]
//! log_level = "info"
//!
//! [grid]
//! rows = 26
//! cols = 26
//!
//! [pointer]
//! nudge_step = 15.0
//! scroll_lines = 5
//!
//! [gesture]
//! tap_threshold_ms = 300
//! ```
//!
//! # Serde default values
//!
//! Sections carry `#[serde(default)]` and fields `#[serde(default = "...")]`,
//! so an empty file, a missing section and a missing field all fall back to
//! the values above.  Keybindings are fixed and not configurable.

use std::path::{Path, PathBuf};
use std::time::Duration;

use gridclick_core::domain::grid::{DEFAULT_DIMENSION, MAX_DIMENSION};
use gridclick_core::{GridGeometry, Key};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::handle_keys::ControllerSettings;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be rendered as TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value parsed but is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub daemon: DaemonConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub pointer: PointerConfig,
    #[serde(default)]
    pub gesture: GestureConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DaemonConfig {
    /// `tracing` filter directive, e.g. `"info"` or `"gridclick_daemon=debug"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GridConfig {
    #[serde(default = "default_dimension")]
    pub rows: u8,
    #[serde(default = "default_dimension")]
    pub cols: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PointerConfig {
    /// Pixels moved per fine-tuning nudge.
    #[serde(default = "default_nudge_step")]
    pub nudge_step: f64,
    /// Lines scrolled per J/K press in scroll mode.
    #[serde(default = "default_scroll_lines")]
    pub scroll_lines: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GestureConfig {
    /// A toggle-key press shorter than this counts as a tap.
    #[serde(default = "default_tap_threshold_ms")]
    pub tap_threshold_ms: u64,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_dimension() -> u8 {
    DEFAULT_DIMENSION
}
fn default_nudge_step() -> f64 {
    15.0
}
fn default_scroll_lines() -> i32 {
    5
}
fn default_tap_threshold_ms() -> u64 {
    300
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: default_dimension(),
            cols: default_dimension(),
        }
    }
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            nudge_step: default_nudge_step(),
            scroll_lines: default_scroll_lines(),
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            tap_threshold_ms: default_tap_threshold_ms(),
        }
    }
}

impl AppConfig {
    /// Parses and validates TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Renders the effective configuration, for `--print-config`.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Range checks that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dimension_ok = |n: u8| (1..=MAX_DIMENSION).contains(&n);
        if !dimension_ok(self.grid.rows) || !dimension_ok(self.grid.cols) {
            return Err(ConfigError::Invalid(format!(
                "grid must be between 1x1 and {MAX_DIMENSION}x{MAX_DIMENSION}, got {}x{}",
                self.grid.rows, self.grid.cols
            )));
        }
        if !self.pointer.nudge_step.is_finite() || self.pointer.nudge_step <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "pointer.nudge_step must be a positive number, got {}",
                self.pointer.nudge_step
            )));
        }
        if self.pointer.scroll_lines <= 0 {
            return Err(ConfigError::Invalid(format!(
                "pointer.scroll_lines must be positive, got {}",
                self.pointer.scroll_lines
            )));
        }
        if self.gesture.tap_threshold_ms == 0 {
            return Err(ConfigError::Invalid("gesture.tap_threshold_ms must be positive".to_string()));
        }
        Ok(())
    }

    /// Builds the state machine settings for the given toggle key.
    pub fn controller_settings(&self, toggle_key: Key) -> Result<ControllerSettings, ConfigError> {
        let geometry = GridGeometry::new(self.grid.rows, self.grid.cols)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(ControllerSettings {
            geometry,
            nudge_step: self.pointer.nudge_step,
            scroll_lines: self.pointer.scroll_lines,
            tap_threshold: Duration::from_millis(self.gesture.tap_threshold_ms),
            toggle_key,
        })
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Resolves the default config file path.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the base directory cannot
/// be determined from the environment.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads the configuration.
///
/// With `explicit` set the file must exist.  Otherwise the platform file is
/// used if present and defaults are returned if it is not.
///
/// # Errors
///
/// [`ConfigError::Io`] for file-system failures, [`ConfigError::Parse`] for
/// malformed TOML and [`ConfigError::Invalid`] for out-of-range values.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => match config_file_path() {
            Ok(path) => (path, false),
            Err(ConfigError::NoPlatformConfigDir) => return Ok(AppConfig::default()),
            Err(e) => return Err(e),
        },
    };

    match std::fs::read_to_string(&path) {
        Ok(content) => AppConfig::from_toml(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => Ok(AppConfig::default()),
        Err(source) => Err(ConfigError::Io { path, source }),
    }
}

/// Platform config directory including the `GridClick` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("GridClick"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(|h| PathBuf::from(h).join("Library").join("Application Support").join("GridClick"))
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("gridclick"))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
