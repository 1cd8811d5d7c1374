// crates/fluxion-cli/src/main.rs
//
// CLI entrypoint for the Fluxion ledger developer tools.
//
// Initializes tracing, loads the TOML configuration (falling back to
// defaults), and dispatches to the `config` or `simulate` subcommand.

mod commands;
mod config;
mod output;
mod shared;

use clap::{Parser, Subcommand};
use config::CliConfig;
use output::OutputFormat;

/// Fluxion CLI: inspect genesis configuration and replay ledger scenarios.
#[derive(Parser, Debug)]
#[command(
    name = "fluxion",
    version = "0.1.0",
    about = "Fluxion governance token ledger CLI"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true)]
    config: Option<String>,

    /// Output format; overrides the config file.
    #[arg(long, global = true, value_enum)]
    output: Option<OutputFormat>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the effective genesis configuration.
    Config,

    /// Replay a JSON scenario against a fresh ledger.
    Simulate {
        /// Path to the scenario file.
        scenario: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let loaded = CliConfig::load(&config_path);
    let log_level = loaded
        .as_ref()
        .map(|cfg| cfg.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());

    // Initialize tracing subscriber for structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli_config = match loaded {
        Ok(cfg) => {
            tracing::info!("Loaded configuration from {}", config_path);
            cfg
        }
        Err(e) => {
            tracing::warn!(
                "Could not load config from {}: {}. Using defaults.",
                config_path,
                e
            );
            CliConfig::default()
        }
    };

    let format = cli.output.unwrap_or(cli_config.output);

    match &cli.command {
        Commands::Config => commands::config::run(&cli_config, format).await?,
        Commands::Simulate { scenario } => {
            commands::simulate::run(&cli_config.token, scenario, format).await?
        }
    }

    Ok(())
}
