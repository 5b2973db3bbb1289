//! Target configuration (target.toml)
//!
//! Describes the target the description is lowered for. Only the pointer
//! size affects lowering; `os` and `arch` are carried for reporting.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading a target configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read target config: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse target config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid target config: {0}")]
    Invalid(String),
}

/// Lowering target
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TargetConfig {
    /// Operating system name
    #[serde(default = "default_os")]
    pub os: String,

    /// Architecture name
    #[serde(default = "default_arch")]
    pub arch: String,

    /// Size of a pointer and of `intptr` in bytes
    #[serde(default = "default_ptr_size")]
    pub ptr_size: u64,
}

fn default_os() -> String {
    "linux".to_string()
}

fn default_arch() -> String {
    "amd64".to_string()
}

fn default_ptr_size() -> u64 {
    8
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            os: default_os(),
            arch: default_arch(),
            ptr_size: default_ptr_size(),
        }
    }
}

impl TargetConfig {
    /// Load and validate a target config from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse and validate a target config from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: TargetConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the config
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.os.is_empty() {
            return Err(ConfigError::Invalid("os cannot be empty".to_string()));
        }
        if self.arch.is_empty() {
            return Err(ConfigError::Invalid("arch cannot be empty".to_string()));
        }
        if self.ptr_size != 4 && self.ptr_size != 8 {
            return Err(ConfigError::Invalid(format!(
                "ptr_size must be 4 or 8, got {}",
                self.ptr_size
            )));
        }
        Ok(())
    }
}
