// docstore - Azure Cosmos DB document container client
// Licensed under the MIT License

use clap::Parser;
use docstore::cli::{resolve_config, Cli, Commands};
use docstore::config::LoggingConfig;
use docstore::domain::Result;
use docstore::logging::init_logging;
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    // This is optional - if .env doesn't exist, it's silently ignored
    let _ = dotenvy::dotenv();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging with console-only config (no file logging for CLI)
    let log_level = cli.log_level.as_deref().unwrap_or("info");
    let logging_config = LoggingConfig {
        local_enabled: false,
        local_path: String::new(),
        local_rotation: "daily".to_string(),
    };
    if let Err(e) = init_logging(log_level, &logging_config) {
        eprintln!("Failed to initialize logging: {e}");
        process::exit(5);
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "docstore - document container client"
    );

    // Execute command and get exit code; Ctrl+C drops the in-flight
    // operation, which is how requests are cancelled
    let exit_code = tokio::select! {
        result = execute_command(&cli) => match result {
            Ok(code) => code,
            Err(e) => {
                tracing::error!(error = %e, "Command execution failed");
                eprintln!("Error: {e}");
                5 // Fatal error exit code
            }
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received SIGINT (Ctrl+C), aborting");
            println!("\n⚠️  Interrupted");
            130
        }
    };

    // Exit with appropriate code
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> Result<i32> {
    match &cli.command {
        Commands::Demo(args) => {
            let config = resolve_config(cli.config.as_deref())?;
            args.execute(&config).await
        }
        Commands::Validate(args) => args.execute(cli.config.as_deref()).await,
    }
}
