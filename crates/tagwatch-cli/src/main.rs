//! tagwatch: UHF RFID presence reader.
//!
//! Commands:
//! - `run`           Poll the reader and announce tags as they arrive
//! - `request`       Print the inventory request frame
//! - `check-config`  Validate and print the effective configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(
    name = "tagwatch",
    about = "tagwatch: UHF RFID presence reader",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML); defaults are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the reader and announce tags until Ctrl-C
    Run {
        /// Override the serial port
        #[arg(short, long)]
        port: Option<String>,
    },

    /// Print the encoded inventory request in hex
    Request,

    /// Load, validate and print the effective configuration
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = config::ReaderConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run { port } => {
            let config = match port {
                Some(port) => config.port(port),
                None => config,
            };
            commands::run(config).await?
        }
        Commands::Request => commands::request(&config),
        Commands::CheckConfig => commands::check_config(&config)?,
    }

    Ok(())
}
