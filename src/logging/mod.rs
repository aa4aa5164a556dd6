//! Logging and observability
//!
//! Structured logging via `tracing`: console output always, JSON file output
//! with rotation when enabled in [`LoggingConfig`](crate::config::LoggingConfig).
//!
//! ```no_run
//! use docstore::config::LoggingConfig;
//! use docstore::logging::init_logging;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//! tracing::info!(container = "orders", "ready");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};
