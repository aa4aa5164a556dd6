//! Configuration schema types
//!
//! The root [`DocStoreConfig`] maps to the TOML file; every section validates
//! itself before any network call so a broken setup fails fast with a
//! `Configuration` error.

use crate::config::SecretString;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocStoreConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Service account connection settings
    pub connection: ConnectionConfig,

    /// Target database/container addressing
    #[serde(default)]
    pub container: ContainerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DocStoreConfig {
    /// Validates all sections
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid value found.
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.connection.validate()?;
        self.container.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name used in logs
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    pub fn validate(&self) -> Result<(), String> {
        const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(format!(
                "log_level must be one of {LEVELS:?}, got '{}'",
                self.log_level
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

/// Service account connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Account endpoint, e.g. `https://account.documents.azure.com:443/`
    pub endpoint: String,

    /// Account key; redacted in Debug output
    pub key: SecretString,

    /// Per-request deadline in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl ConnectionConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.trim().is_empty() {
            return Err("connection.endpoint must not be empty".to_string());
        }
        if !self.endpoint.starts_with("https://") {
            return Err(format!(
                "connection.endpoint must use https, got '{}'",
                self.endpoint
            ));
        }
        if self.key.expose_secret().is_empty() {
            return Err("connection.key must not be empty".to_string());
        }
        if self.request_timeout_seconds == 0 {
            return Err("connection.request_timeout_seconds must be positive".to_string());
        }
        Ok(())
    }
}

/// Target database/container addressing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerConfig {
    /// Database id, created on first use if absent
    #[serde(default = "default_database_id")]
    pub database_id: String,

    /// Container id, created on first use if absent
    #[serde(default = "default_container_id")]
    pub container_id: String,

    /// Partition-key path fixed at container creation, e.g. `/partitionKey`
    #[serde(default = "default_partition_key_path")]
    pub partition_key_path: String,

    /// Default documents per round trip for paged reads
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl ContainerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.database_id.trim().is_empty() {
            return Err("container.database_id must not be empty".to_string());
        }
        if self.container_id.trim().is_empty() {
            return Err("container.container_id must not be empty".to_string());
        }
        if !self.partition_key_path.starts_with('/') {
            return Err(format!(
                "container.partition_key_path must start with '/', got '{}'",
                self.partition_key_path
            ));
        }
        if self.page_size == 0 {
            return Err("container.page_size must be positive".to_string());
        }
        Ok(())
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            database_id: default_database_id(),
            container_id: default_container_id(),
            partition_key_path: default_partition_key_path(),
            page_size: default_page_size(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write JSON logs to a rolling local file in addition to the console
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for local log files
    #[serde(default = "default_log_path")]
    pub local_path: String,

    /// Rotation policy: `daily` or `hourly`
    #[serde(default = "default_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path must not be empty when local_enabled".to_string());
        }
        if !["daily", "hourly"].contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "logging.local_rotation must be 'daily' or 'hourly', got '{}'",
                self.local_rotation
            ));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_log_path(),
            local_rotation: default_rotation(),
        }
    }
}

fn default_app_name() -> String {
    "docstore".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_database_id() -> String {
    "ecommerce".to_string()
}

fn default_container_id() -> String {
    "orders".to_string()
}

fn default_partition_key_path() -> String {
    "/partitionKey".to_string()
}

fn default_page_size() -> usize {
    10
}

fn default_log_path() -> String {
    "logs".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}
