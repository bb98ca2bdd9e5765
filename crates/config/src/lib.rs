//! Audioshelf configuration
//!
//! Settings live in a single TOML file under the platform config directory.
//! Each group of settings is a section type implementing [`ConfigSection`],
//! so it validates and merges itself.
//!
//! Loading never panics. A missing file yields defaults; a file that fails to
//! parse is an error; values that fail validation are reported as warnings so
//! a hand-edited file is not discarded.
//!
//! # Example
//!
//! ```rust,no_run
//! use audioshelf_config::{Config, ConfigManager};
//!
//! let manager = ConfigManager::new().expect("Failed to initialize config");
//! let config = manager.load().unwrap_or_else(|e| {
//!     eprintln!("Config error: {}, using defaults", e);
//!     Config::default()
//! });
//!
//! println!("Shelf file: {}", manager.shelf_path(&config).display());
//! ```

mod error;
mod manager;
mod migration;
mod persistence;
mod validation;

// Config sections
pub mod app_config;
pub mod playback_config;

pub use error::{ConfigError, ConfigResult, ValidationError};
pub use manager::ConfigManager;
pub use validation::{ConfigSection, Validator};

pub use app_config::{AppConfig, LogLevel};
pub use playback_config::PlaybackConfig;

use serde::{Deserialize, Serialize};

/// Current config file format version for migrations
pub const CONFIG_VERSION: u32 = 1;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Config file format version
    pub version: u32,

    /// Application-level settings
    pub app: AppConfig,

    /// Listening behaviour
    pub playback: PlaybackConfig,
}

impl Config {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the entire configuration
    ///
    /// Returns all validation errors found across all sections.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(mut e) = self.app.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.playback.validate() {
            errors.append(&mut e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Merges this config with another, preferring values from `other`
    ///
    /// Override chain: defaults < file < env vars < command line.
    pub fn merge(&mut self, other: Config) {
        self.app.merge(other.app);
        self.playback.merge(other.playback);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            app: AppConfig::default(),
            playback: PlaybackConfig::default(),
        }
    }
}
