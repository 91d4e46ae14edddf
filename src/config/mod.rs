//! Configuration management
//!
//! Handles loading, validation, and merging of configuration from:
//! - TOML files
//! - Environment variables
//! - CLI arguments

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub mod types;

pub use types::{ContentConfig, FrameConfig, LoggingConfig, ThemeConfig};

pub use crate::background::BackgroundConfig;
pub use crate::cursor::CursorConfig;
pub use crate::spotlight::SpotlightConfig;
pub use crate::spring::SpringConfig;

use crate::content::Portfolio;
use crate::scene::SceneSettings;
use crate::target::TargetSelector;
use crate::theme::PreferenceStore;
use crate::trace::{ReplayOptions, MAX_TAIL_SECS};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Strictly positive and not NaN
fn positive(value: f32) -> bool {
    value > 0.0
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Custom cursor
    #[serde(default)]
    pub cursor: CursorConfig,
    /// Springs shared by the cursor and card tilt
    #[serde(default)]
    pub spring: SpringConfig,
    /// Card spotlights
    #[serde(default)]
    pub spotlight: SpotlightConfig,
    /// Hero background
    #[serde(default)]
    pub background: BackgroundConfig,
    /// Frame clock
    #[serde(default)]
    pub frame: FrameConfig,
    /// Theme persistence
    #[serde(default)]
    pub theme: ThemeConfig,
    /// Content source
    #[serde(default)]
    pub content: ContentConfig,
    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("prism-folio").join("config.toml"))
    }

    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            warn!("Config file {} not found, using defaults", path.display());
            Ok(Self::default_config())
        }
    }

    /// Create default configuration
    pub fn default_config() -> Self {
        Config {
            cursor: CursorConfig::default(),
            spring: SpringConfig::default(),
            spotlight: SpotlightConfig::default(),
            background: BackgroundConfig::default(),
            frame: FrameConfig::default(),
            theme: ThemeConfig::default(),
            content: ContentConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        // Cursor
        self.cursor
            .target_selector
            .parse::<TargetSelector>()
            .map_err(anyhow::Error::msg)
            .context("Invalid cursor.target_selector")?;

        if !positive(self.cursor.spin_duration_secs) {
            anyhow::bail!(
                "cursor.spin_duration_secs must be positive, got {}",
                self.cursor.spin_duration_secs
            );
        }
        if self.cursor.inset < 0.0 {
            anyhow::bail!("cursor.inset cannot be negative, got {}", self.cursor.inset);
        }
        if !positive(self.cursor.ring_size) || self.cursor.corner_size < 0.0 {
            anyhow::bail!(
                "cursor.ring_size ({}) must be positive and corner_size ({}) non-negative",
                self.cursor.ring_size,
                self.cursor.corner_size
            );
        }

        // Spring
        if !positive(self.spring.stiffness) || !positive(self.spring.mass) {
            anyhow::bail!(
                "spring.stiffness ({}) and spring.mass ({}) must be positive",
                self.spring.stiffness,
                self.spring.mass
            );
        }
        if self.spring.damping < 0.0 {
            anyhow::bail!("spring.damping cannot be negative, got {}", self.spring.damping);
        }
        if !positive(self.spring.rest_epsilon) {
            anyhow::bail!(
                "spring.rest_epsilon must be positive, got {}",
                self.spring.rest_epsilon
            );
        }
        if !self.spring.is_critically_damped() {
            warn!(
                "spring damping ratio is {:.2}; the cursor may overshoot or lag",
                self.spring.damping_ratio()
            );
        }

        // Spotlight
        if !positive(self.spotlight.radius) {
            anyhow::bail!("spotlight.radius must be positive, got {}", self.spotlight.radius);
        }
        if self.spotlight.fade_duration_secs < 0.0 {
            anyhow::bail!(
                "spotlight.fade_duration_secs cannot be negative, got {}",
                self.spotlight.fade_duration_secs
            );
        }
        if !(0.0..=1.0).contains(&self.spotlight.intensity) {
            anyhow::bail!(
                "spotlight.intensity must be between 0 and 1, got {}",
                self.spotlight.intensity
            );
        }
        if !(0.0..=45.0).contains(&self.spotlight.max_tilt_degrees) {
            anyhow::bail!(
                "spotlight.max_tilt_degrees must be between 0 and 45, got {}",
                self.spotlight.max_tilt_degrees
            );
        }
        if !positive(self.spotlight.tilt_range) {
            anyhow::bail!(
                "spotlight.tilt_range must be positive, got {}",
                self.spotlight.tilt_range
            );
        }

        // Background
        if !positive(self.background.pulse_secs) || !positive(self.background.orb_period_secs) {
            anyhow::bail!(
                "background.pulse_secs ({}) and background.orb_period_secs ({}) must be positive",
                self.background.pulse_secs,
                self.background.orb_period_secs
            );
        }
        if self.background.orb_count > 32 {
            anyhow::bail!(
                "background.orb_count must be at most 32, got {}",
                self.background.orb_count
            );
        }

        // Frame clock
        if !(1..=240).contains(&self.frame.refresh_hz) {
            anyhow::bail!(
                "frame.refresh_hz must be between 1 and 240, got {}",
                self.frame.refresh_hz
            );
        }

        if !(0.0..=MAX_TAIL_SECS).contains(&self.frame.tail_secs) {
            anyhow::bail!(
                "frame.tail_secs must be between 0 and {}, got {}",
                MAX_TAIL_SECS,
                self.frame.tail_secs
            );
        }

        // Logging
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!("Invalid log level: {}", self.logging.level);
        }

        Ok(())
    }

    /// Override config with CLI arguments
    pub fn with_overrides(
        mut self,
        refresh_hz: Option<u32>,
        content: Option<PathBuf>,
        preferences: Option<PathBuf>,
    ) -> Self {
        if let Some(hz) = refresh_hz {
            self.frame.refresh_hz = hz;
        }
        if let Some(path) = content {
            self.content.path = Some(path);
        }
        if let Some(path) = preferences {
            self.theme.preferences_path = Some(path);
        }
        self
    }

    /// Settings for the interactive scene
    pub fn scene_settings(&self) -> SceneSettings {
        SceneSettings {
            cursor: self.cursor.clone(),
            spring: self.spring,
            spotlight: self.spotlight.clone(),
            background: self.background.clone(),
        }
    }

    /// Replay pacing for pointer traces
    pub fn replay_options(&self) -> ReplayOptions {
        ReplayOptions {
            refresh_hz: self.frame.refresh_hz,
            tail_secs: self.frame.tail_secs,
        }
    }

    /// Content from the configured file, or the bundled copy
    pub fn portfolio(&self) -> Result<Portfolio> {
        match &self.content.path {
            Some(path) => Portfolio::load(path)
                .with_context(|| format!("Failed to load content from {}", path.display())),
            None => Portfolio::bundled().context("Bundled content is invalid"),
        }
    }

    /// Open the theme preference store
    pub fn preference_store(&self) -> Result<PreferenceStore> {
        let path = self
            .theme
            .preferences_path
            .clone()
            .or_else(PreferenceStore::default_path);
        match path {
            Some(path) => PreferenceStore::open(&path)
                .with_context(|| format!("Failed to open preferences at {}", path.display())),
            None => {
                warn!("No config directory available; theme preference will not persist");
                Ok(PreferenceStore::in_memory())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default_config();
        assert_eq!(config.cursor.target_selector, ".cursor-target");
        assert_eq!(config.cursor.spin_duration_secs, 2.0);
        assert!(config.cursor.hide_native_cursor);
        assert_eq!(config.frame.refresh_hz, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [cursor]
            spin_duration_secs = 4.0

            [spring]
            stiffness = 100.0
            damping = 20.0
            "#,
        )
        .unwrap();
        assert_eq!(config.cursor.spin_duration_secs, 4.0);
        assert_eq!(config.cursor.inset, 10.0);
        assert!(config.spring.is_critically_damped());
        assert_eq!(config.spotlight.radius, 300.0);
    }

    #[test]
    fn test_config_validation_invalid_selector() {
        let mut config = Config::default_config();
        config.cursor.target_selector = "div > a".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_spin() {
        let mut config = Config::default_config();
        config.cursor.spin_duration_secs = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_refresh() {
        let mut config = Config::default_config();
        config.frame.refresh_hz = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_background() {
        let mut config = Config::default_config();
        config.background.pulse_secs = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default_config();
        config.background.orb_count = 1000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_tail() {
        for tail_secs in [f64::NAN, f64::INFINITY, -0.5, 1e6] {
            let mut config = Config::default_config();
            config.frame.tail_secs = tail_secs;
            assert!(config.validate().is_err(), "tail {} accepted", tail_secs);
        }
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = Config::default_config();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_and_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert_eq!(Config::load_or_default(&missing).unwrap(), Config::default_config());
        assert!(Config::load(&missing).is_err());

        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[frame]\nrefresh_hz = 120\n").unwrap();
        assert_eq!(Config::load_or_default(&path).unwrap().frame.refresh_hz, 120);
    }

    #[test]
    fn test_overrides() {
        let config = Config::default_config().with_overrides(Some(30), Some(PathBuf::from("c.toml")), None);
        assert_eq!(config.frame.refresh_hz, 30);
        assert_eq!(config.content.path, Some(PathBuf::from("c.toml")));
        assert_eq!(config.theme.preferences_path, None);
    }
}
