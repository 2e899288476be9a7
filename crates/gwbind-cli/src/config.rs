use std::path::PathBuf;
use std::time::Duration;

use gwbind_arm::{ArmConfig, DEFAULT_API_VERSION, DEFAULT_ENDPOINT};
use gwbind_core::PriorityAllocator;
use gwbind_core::priority::{DEFAULT_MAX_PRIORITY, DEFAULT_MIN_PRIORITY};
use serde::{Deserialize, Serialize};

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "gwbind.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub azure: AzureConfig,
    #[serde(default)]
    pub priority: PriorityConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        // Azure
        let endpoint = url::Url::parse(&self.azure.endpoint)
            .map_err(|e| format!("azure.endpoint is not a valid URL: {e}"))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err("azure.endpoint must be an http(s) URL".into());
        }
        if self.azure.api_version.trim().is_empty() {
            return Err("azure.api_version must not be empty".into());
        }
        if self.azure.timeout_secs == 0 {
            return Err("azure.timeout_secs must be > 0".into());
        }
        // Priority range
        if self.priority.min == 0 {
            return Err("priority.min must be > 0".into());
        }
        if self.priority.min > self.priority.max {
            return Err("priority.min must be <= priority.max".into());
        }
        // Logging
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        Ok(())
    }

    pub fn allocator(&self) -> PriorityAllocator {
        PriorityAllocator::new(self.priority.min, self.priority.max)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Pre-acquired ARM bearer token.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Replace with `If-Match` so concurrent edits fail instead of being lost.
    #[serde(default)]
    pub conditional_writes: bool,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.into()
}
fn default_api_version() -> String {
    DEFAULT_API_VERSION.into()
}
fn default_timeout_secs() -> u64 {
    60
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_version: default_api_version(),
            token: None,
            timeout_secs: default_timeout_secs(),
            conditional_writes: false,
        }
    }
}

impl AzureConfig {
    pub fn arm_config(&self) -> ArmConfig {
        ArmConfig {
            endpoint: self.endpoint.clone(),
            api_version: self.api_version.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            conditional_writes: self.conditional_writes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityConfig {
    #[serde(default = "default_priority_min")]
    pub min: u32,
    #[serde(default = "default_priority_max")]
    pub max: u32,
}

fn default_priority_min() -> u32 {
    DEFAULT_MIN_PRIORITY
}
fn default_priority_max() -> u32 {
    DEFAULT_MAX_PRIORITY
}

impl Default for PriorityConfig {
    fn default() -> Self {
        Self {
            min: default_priority_min(),
            max: default_priority_max(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub mod loader {
    use super::*;
    use config::{Config, Environment, File};

    /// Loads `path` (or `gwbind.toml` when present), then applies
    /// `GWBIND__SECTION__KEY` environment overrides and validates.
    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                let pathbuf = PathBuf::from(p);
                if !pathbuf.exists() {
                    return Err(format!("config file not found: {p}"));
                }
                builder = builder.add_source(File::from(pathbuf));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // Environment variable overrides, e.g., GWBIND__AZURE__TOKEN=...
        builder = builder.add_source(
            Environment::with_prefix("GWBIND")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = AppConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.azure.endpoint, "https://management.azure.com");
        assert_eq!(cfg.azure.api_version, "2023-09-01");
        assert_eq!(cfg.azure.timeout_secs, 60);
        assert!(!cfg.azure.conditional_writes);
        assert_eq!((cfg.priority.min, cfg.priority.max), (1, 299));
    }

    #[test]
    fn test_priority_range_validation() {
        let mut cfg = AppConfig::default();
        cfg.priority.min = 300;
        assert!(cfg.validate().unwrap_err().contains("priority.min"));
        cfg.priority.min = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_endpoint_validation() {
        let mut cfg = AppConfig::default();
        cfg.azure.endpoint = "ftp://example.com".into();
        assert!(cfg.validate().is_err());
        cfg.azure.endpoint = "::".into();
        assert!(cfg.validate().unwrap_err().contains("azure.endpoint"));
    }

    #[test]
    fn test_arm_config_mapping() {
        let mut cfg = AppConfig::default();
        cfg.azure.timeout_secs = 5;
        cfg.azure.conditional_writes = true;
        let arm = cfg.azure.arm_config();
        assert_eq!(arm.timeout, Duration::from_secs(5));
        assert!(arm.conditional_writes);
        assert_eq!(cfg.allocator().max(), 299);
    }
}
