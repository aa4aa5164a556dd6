//! Configuration loading
//!
//! Two entry points:
//!
//! - [`load_config`] reads a TOML file, substitutes `${VAR}` environment
//!   placeholders, applies `DOCSTORE_*` overrides, and validates.
//! - [`from_env`] builds a configuration purely from environment variables
//!   (`ACCOUNT_HOST`, `ACCOUNT_KEY`, `COSMOS_DATABASE`, `COSMOS_CONTAINER`),
//!   the way the quickstart environment is usually provisioned.

use super::schema::DocStoreConfig;
use crate::config::secret_string;
use crate::domain::{Result, StoreError};
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads and validates configuration from a TOML file
///
/// # Errors
///
/// Returns [`StoreError::Configuration`] if the file is missing or
/// unreadable, a `${VAR}` placeholder references an unset variable, the TOML
/// fails to parse, or validation rejects a value.
pub fn load_config(path: impl AsRef<Path>) -> Result<DocStoreConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(StoreError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        StoreError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: DocStoreConfig = toml::from_str(&contents)
        .map_err(|e| StoreError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config
        .validate()
        .map_err(|e| StoreError::Configuration(format!("Configuration validation failed: {e}")))?;

    Ok(config)
}

/// Builds configuration from environment variables alone
///
/// Required: `ACCOUNT_HOST` (endpoint) and `ACCOUNT_KEY`. Optional:
/// `COSMOS_DATABASE` and `COSMOS_CONTAINER`, defaulting to
/// `ecommerce`/`orders`.
///
/// # Errors
///
/// Returns [`StoreError::Configuration`] when a required variable is unset
/// or validation rejects a value. Fails before any network call.
pub fn from_env() -> Result<DocStoreConfig> {
    let endpoint = require_env("ACCOUNT_HOST")?;
    let key = require_env("ACCOUNT_KEY")?;

    let mut config = DocStoreConfig {
        application: Default::default(),
        connection: super::schema::ConnectionConfig {
            endpoint,
            key: secret_string(key),
            request_timeout_seconds: 30,
        },
        container: Default::default(),
        logging: Default::default(),
    };

    if let Ok(database_id) = std::env::var("COSMOS_DATABASE") {
        config.container.database_id = database_id;
    }
    if let Ok(container_id) = std::env::var("COSMOS_CONTAINER") {
        config.container.container_id = container_id;
    }

    apply_env_overrides(&mut config);

    config
        .validate()
        .map_err(|e| StoreError::Configuration(format!("Configuration validation failed: {e}")))?;

    Ok(config)
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| {
        StoreError::Configuration(format!("Required environment variable {name} is not set"))
    })
}

/// Substitutes `${VAR_NAME}` placeholders, skipping comment lines
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("placeholder pattern is valid");
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed = processed.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(StoreError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies `DOCSTORE_<SECTION>_<KEY>` environment overrides
fn apply_env_overrides(config: &mut DocStoreConfig) {
    if let Ok(val) = std::env::var("DOCSTORE_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    if let Ok(val) = std::env::var("DOCSTORE_CONNECTION_ENDPOINT") {
        config.connection.endpoint = val;
    }
    if let Ok(val) = std::env::var("DOCSTORE_CONNECTION_KEY") {
        config.connection.key = secret_string(val);
    }
    if let Ok(val) = std::env::var("DOCSTORE_CONNECTION_REQUEST_TIMEOUT_SECONDS") {
        if let Ok(seconds) = val.parse() {
            config.connection.request_timeout_seconds = seconds;
        }
    }

    if let Ok(val) = std::env::var("DOCSTORE_CONTAINER_DATABASE_ID") {
        config.container.database_id = val;
    }
    if let Ok(val) = std::env::var("DOCSTORE_CONTAINER_CONTAINER_ID") {
        config.container.container_id = val;
    }
    if let Ok(val) = std::env::var("DOCSTORE_CONTAINER_PARTITION_KEY_PATH") {
        config.container.partition_key_path = val;
    }
    if let Ok(val) = std::env::var("DOCSTORE_CONTAINER_PAGE_SIZE") {
        if let Ok(size) = val.parse() {
            config.container.page_size = size;
        }
    }

    if let Ok(val) = std::env::var("DOCSTORE_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("DOCSTORE_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}
