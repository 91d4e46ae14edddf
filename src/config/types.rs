//! Configuration type definitions
//!
//! The animation sections (`[cursor]`, `[spring]`, `[spotlight]`) reuse the
//! component config types directly; the rest live here.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Frame clock configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameConfig {
    /// Frames per second for trace replay and the desktop window
    #[serde(default = "default_refresh_hz")]
    pub refresh_hz: u32,

    /// Seconds simulated after the last trace sample
    #[serde(default = "default_tail_secs")]
    pub tail_secs: f64,
}

fn default_refresh_hz() -> u32 {
    60
}

fn default_tail_secs() -> f64 {
    0.5
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            refresh_hz: default_refresh_hz(),
            tail_secs: default_tail_secs(),
        }
    }
}

/// Theme persistence configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// Preference file (default: user config dir)
    #[serde(default)]
    pub preferences_path: Option<PathBuf>,
}

/// Content source configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Content TOML replacing the bundled copy
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level ("trace", "debug", "info", "warn", "error")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for log files (None = console only)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: None,
        }
    }
}
