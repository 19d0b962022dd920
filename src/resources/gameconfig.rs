//! Game configuration resource.
//!
//! Manages settings loaded from an INI configuration file. Provides defaults
//! for safe startup and methods to load/save configuration.
//!
//! # Configuration File Format
//!
//! ```ini
//! [events]
//! ; warn when one drain handles more events than this (0 disables)
//! warn_drain_len = 1024
//!
//! [images]
//! placeholder_width = 32
//! placeholder_height = 32
//!
//! [demo]
//! frames = 3
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

use crate::events::runner::EventRunner;

/// Default safe values for startup
const DEFAULT_WARN_DRAIN_LEN: usize = 1024;
const DEFAULT_PLACEHOLDER_WIDTH: u32 = 32;
const DEFAULT_PLACEHOLDER_HEIGHT: u32 = 32;
const DEFAULT_FRAMES: u32 = 3;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Runtime configuration resource.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Warn when a single drain handles more events than this. `0` disables.
    pub warn_drain_len: usize,
    /// Width of images produced by the placeholder loader.
    pub placeholder_width: u32,
    /// Height of images produced by the placeholder loader.
    pub placeholder_height: u32,
    /// Frames the demo runs before exiting.
    pub frames: u32,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            warn_drain_len: DEFAULT_WARN_DRAIN_LEN,
            placeholder_width: DEFAULT_PLACEHOLDER_WIDTH,
            placeholder_height: DEFAULT_PLACEHOLDER_HEIGHT,
            frames: DEFAULT_FRAMES,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [events] section
        if let Some(len) = config.getuint("events", "warn_drain_len").ok().flatten() {
            self.warn_drain_len = len as usize;
        }

        // [images] section
        if let Some(width) = config.getuint("images", "placeholder_width").ok().flatten() {
            self.placeholder_width = width as u32;
        }
        if let Some(height) = config.getuint("images", "placeholder_height").ok().flatten() {
            self.placeholder_height = height as u32;
        }

        // [demo] section
        if let Some(frames) = config.getuint("demo", "frames").ok().flatten() {
            self.frames = frames as u32;
        }

        info!(
            "Loaded config: warn_drain_len={}, placeholder={}x{}, frames={}",
            self.warn_drain_len, self.placeholder_width, self.placeholder_height, self.frames
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        config.set("events", "warn_drain_len", Some(self.warn_drain_len.to_string()));
        config.set(
            "images",
            "placeholder_width",
            Some(self.placeholder_width.to_string()),
        );
        config.set(
            "images",
            "placeholder_height",
            Some(self.placeholder_height.to_string()),
        );
        config.set("demo", "frames", Some(self.frames.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// A runner configured with this drain warning threshold.
    pub fn event_runner(&self) -> EventRunner {
        match self.warn_drain_len {
            0 => EventRunner::new(),
            len => EventRunner::new().with_warn_drain_len(len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!("raydsl_{}_{}_{}.ini", tag, std::process::id(), nanos))
    }

    #[test]
    fn test_missing_file_keeps_defaults() {
        let mut config = GameConfig::with_path(temp_path("missing"));
        assert!(config.load_from_file().is_err());
        assert_eq!(config.frames, DEFAULT_FRAMES);
        assert_eq!(config.warn_drain_len, DEFAULT_WARN_DRAIN_LEN);
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("roundtrip");
        let mut saved = GameConfig::with_path(&path);
        saved.frames = 10;
        saved.placeholder_width = 4;
        saved.warn_drain_len = 0;
        saved.save_to_file().unwrap();

        let mut loaded = GameConfig::with_path(&path);
        loaded.load_from_file().unwrap();
        assert_eq!(loaded, saved);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_partial_file_overrides_only_given_keys() {
        let path = temp_path("partial");
        std::fs::write(&path, "[demo]\nframes = 7\n").unwrap();
        let mut config = GameConfig::with_path(&path);
        config.load_from_file().unwrap();
        assert_eq!(config.frames, 7);
        assert_eq!(config.placeholder_height, DEFAULT_PLACEHOLDER_HEIGHT);
        let _ = std::fs::remove_file(path);
    }
}
