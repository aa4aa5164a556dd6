//! CLI interface and argument parsing
//!
//! The binary is a thin demonstration driver around the library: it is the
//! only layer allowed to log-and-continue on recoverable errors.

pub mod commands;

use crate::config::{from_env, load_config, DocStoreConfig};
use crate::domain::Result;
use clap::{Parser, Subcommand};

/// docstore - document container client
#[derive(Parser, Debug)]
#[command(name = "docstore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file; falls back to environment variables
    /// (ACCOUNT_HOST, ACCOUNT_KEY, COSMOS_DATABASE, COSMOS_CONTAINER)
    #[arg(short, long, env = "DOCSTORE_CONFIG")]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "DOCSTORE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the sales-order walkthrough against the configured container
    Demo(commands::demo::DemoArgs),

    /// Validate configuration and optionally probe connectivity
    Validate(commands::validate::ValidateArgs),
}

/// Loads configuration from the given file, or from the environment when no
/// file was specified
pub fn resolve_config(path: Option<&str>) -> Result<DocStoreConfig> {
    match path {
        Some(path) => load_config(path),
        None => from_env(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_demo() {
        let cli = Cli::parse_from(["docstore", "demo"]);
        assert!(matches!(cli.command, Commands::Demo(_)));
        assert_eq!(cli.config, None);
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["docstore", "--config", "docstore.toml", "demo"]);
        assert_eq!(cli.config, Some("docstore.toml".to_string()));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["docstore", "--log-level", "debug", "validate"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_demo_memory() {
        let cli = Cli::parse_from(["docstore", "demo", "--memory"]);
        match cli.command {
            Commands::Demo(args) => assert!(args.memory),
            other => panic!("expected demo, got {other:?}"),
        }
    }
}
