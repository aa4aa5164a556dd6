//! Validate command implementation
//!
//! This module implements the `validate` command for checking the docstore
//! configuration and, optionally, probing account connectivity.

use crate::cli::resolve_config;
use crate::domain::Result;
use crate::transport::CosmosTransport;
use clap::Args;

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Also probe the account by reading the configured database
    #[arg(long)]
    pub probe: bool,
}

impl ValidateArgs {
    /// Execute the validate command, returning a process exit code
    pub async fn execute(&self, config_path: Option<&str>) -> Result<i32> {
        match config_path {
            Some(path) => println!("🔍 Validating configuration file: {path}"),
            None => println!("🔍 Validating configuration from environment"),
        }
        println!();

        // resolve_config validates every section before returning
        let config = match resolve_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        println!();
        println!("Configuration Summary:");
        println!("  Application: {}", config.application.name);
        println!("  Log Level: {}", config.application.log_level);
        println!("  Endpoint: {}", config.connection.endpoint);
        println!("  Request Timeout: {}s", config.connection.request_timeout_seconds);
        println!("  Database: {}", config.container.database_id);
        println!("  Container: {}", config.container.container_id);
        println!("  Partition Key Path: {}", config.container.partition_key_path);
        println!("  Page Size: {}", config.container.page_size);
        println!();

        if !self.probe {
            return Ok(0);
        }

        tracing::info!(
            endpoint = %config.connection.endpoint,
            database = %config.container.database_id,
            "Probing account connectivity"
        );

        let transport = match CosmosTransport::new(&config.connection) {
            Ok(t) => t,
            Err(e) => {
                println!("❌ Failed to build client");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        match transport.test_connection(&config.container.database_id).await {
            Ok(()) => {
                println!("✅ Account reachable, database exists");
                Ok(0)
            }
            Err(e) => {
                println!("❌ Connectivity probe failed");
                println!("   Error: {e}");
                Ok(1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_args_creation() {
        let args = ValidateArgs { probe: false };
        // Just ensure it compiles and can be created
        let _ = format!("{args:?}");
    }
}
