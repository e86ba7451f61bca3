//! Dictionary configuration.
//!
//! Provides configuration file support via TOML files and environment
//! variables.
//!
//! # Priority (highest to lowest)
//!
//! 1. Environment variables (`HASHDICT_*`, `__` separates sections, e.g.
//!    `HASHDICT_ARENA__CHUNK_SIZE=8192`)
//! 2. Configuration file
//! 3. Default values
//!
//! # Example
//!
//! ```toml
//! name = "vat_rates"
//! require_nonempty = true
//!
//! [[structure.key]]
//! name = "country"
//! type = "String"
//!
//! [[structure.key]]
//! name = "year"
//! type = "UInt16"
//!
//! [[structure.attribute]]
//! name = "rate"
//! type = "Decimal32(4)"
//! null_value = "0"
//!
//! [lifetime]
//! min_sec = 300
//! max_sec = 360
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::arena::DEFAULT_CHUNK_SIZE;
use crate::lifetime::DictionaryLifetime;
use crate::structure::DictionaryStructure;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "HASHDICT_";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to parse configuration file.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue {
        /// Configuration key that failed validation.
        key: String,
        /// Validation error message.
        message: String,
    },

    /// Configuration file not found.
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Arena configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Chunk size in bytes of the key arena and string value arenas.
    pub chunk_size: usize,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace.
    pub level: String,
    /// Log format: text or json.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Complete configuration of one dictionary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionaryConfig {
    /// Dictionary name, used in logs and statistics.
    pub name: String,
    /// Fail the load when the source yields no rows.
    pub require_nonempty: bool,
    /// Key columns and attributes.
    pub structure: DictionaryStructure,
    /// Reload interval.
    pub lifetime: DictionaryLifetime,
    /// Arena sizing.
    pub arena: ArenaConfig,
    /// Logging.
    pub logging: LoggingConfig,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            name: "dictionary".to_string(),
            require_nonempty: false,
            structure: DictionaryStructure::default(),
            lifetime: DictionaryLifetime::default(),
            arena: ArenaConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl DictionaryConfig {
    /// Loads configuration from a file, with environment overrides.
    ///
    /// Priority: defaults < file < environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FileNotFound`] if the file does not exist and
    /// [`ConfigError::ParseError`] if extraction fails.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Creates a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::string(toml_str));

        figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "name".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        self.structure
            .validate()
            .map_err(|e| ConfigError::InvalidValue {
                key: "structure".to_string(),
                message: e.to_string(),
            })?;

        if self.lifetime.min_sec > self.lifetime.max_sec {
            return Err(ConfigError::InvalidValue {
                key: "lifetime".to_string(),
                message: format!(
                    "min_sec {} is greater than max_sec {}",
                    self.lifetime.min_sec, self.lifetime.max_sec
                ),
            });
        }

        if !(64..=64 * 1024 * 1024).contains(&self.arena.chunk_size) {
            return Err(ConfigError::InvalidValue {
                key: "arena.chunk_size".to_string(),
                message: format!(
                    "value {} is out of range [64, 67108864]",
                    self.arena.chunk_size
                ),
            });
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.level".to_string(),
                message: format!(
                    "value '{}' is invalid, expected one of: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.format".to_string(),
                message: format!(
                    "value '{}' is invalid, expected one of: {:?}",
                    self.logging.format, valid_formats
                ),
            });
        }

        Ok(())
    }

    /// Serializes the configuration to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}
