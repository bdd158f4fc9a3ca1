//! # Datakit Runtime Configuration
//!
//! Settings that shape discovery and finalization, loadable from JSON and,
//! behind the `yaml-config` and `toml-config` features, YAML or TOML files.
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::kernel::constants::DEFAULT_CONFIG_FILE;

pub mod error;

pub use error::ConfigError;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }
}

/// How [`finalize_data_extensions`](crate::extension::ExtensionRepository::finalize_data_extensions)
/// treats references resolved by an earlier call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinalizeMode {
    /// Keep available references as they are; recompute everything else.
    #[default]
    Incremental,
    /// Recompute every reference on each call.
    Full,
}

/// Runtime settings for discovery and dependency resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub finalize_mode: FinalizeMode,
    /// Identities skipped during discovery: a cooker path, a processor id or a table guid.
    pub disabled_extensions: Vec<String>,
    /// Log rejected candidate types at warn level; debug otherwise.
    pub log_discovery_rejections: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            finalize_mode: FinalizeMode::default(),
            disabled_extensions: Vec::new(),
            log_discovery_rejections: true,
        }
    }
}

impl RuntimeConfig {
    pub fn is_disabled(&self, identity: &str) -> bool {
        self.disabled_extensions.iter().any(|d| d == identity)
    }

    /// Deserialize from string based on format
    pub fn from_str(data: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        match format {
            ConfigFormat::Json => serde_json::from_str(data).map_err(|e| ConfigError::DeserializationError {
                format: "json".to_string(),
                source: Box::new(e),
            }),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| ConfigError::DeserializationError {
                format: "yaml".to_string(),
                source: Box::new(e),
            }),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| ConfigError::DeserializationError {
                format: "toml".to_string(),
                source: Box::new(e),
            }),
        }
    }

    /// Serialize to string based on format
    pub fn to_string(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializationError {
                format: "json".to_string(),
                source: Box::new(e),
            }),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::to_string(self).map_err(|e| ConfigError::SerializationError {
                format: "yaml".to_string(),
                source: Box::new(e),
            }),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::to_string_pretty(self).map_err(|e| ConfigError::SerializationError {
                format: "toml".to_string(),
                source: Box::new(e),
            }),
        }
    }

    /// Load from a file, choosing the format from its extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let format = ConfigFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            operation: "read".to_string(),
            source,
        })?;
        let config = Self::from_str(&data, format)?;
        log::info!("Loaded runtime configuration from {}", path.display());
        Ok(config)
    }

    /// Load `dir`'s default configuration file, or the defaults if it does not exist.
    pub fn load_or_default(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(DEFAULT_CONFIG_FILE);
        if !path.exists() {
            log::debug!("No runtime configuration at {}; using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    /// Write to a file, choosing the format from its extension.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let format = ConfigFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;
        let data = self.to_string(format)?;
        std::fs::write(path, data).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            operation: "write".to_string(),
            source,
        })
    }
}

// Test module declaration
#[cfg(test)]
mod tests;
