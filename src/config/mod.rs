//! Configuration management.
//!
//! TOML-based configuration with environment variable substitution and a
//! pure-environment fallback, validated before any network call.
//!
//! # Example configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [connection]
//! endpoint = "https://your-account.documents.azure.com:443/"
//! key = "${ACCOUNT_KEY}"
//!
//! [container]
//! database_id = "ecommerce"
//! container_id = "orders"
//! partition_key_path = "/partitionKey"
//! page_size = 10
//! ```
//!
//! Overrides follow the `DOCSTORE_<SECTION>_<KEY>` pattern, e.g.
//! `DOCSTORE_CONNECTION_ENDPOINT` or `DOCSTORE_CONTAINER_PAGE_SIZE`.

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{from_env, load_config};
pub use schema::{
    ApplicationConfig, ConnectionConfig, ContainerConfig, DocStoreConfig, LoggingConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
