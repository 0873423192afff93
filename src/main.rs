//! CLI for the Unity Validation API
//!
//! Subcommands:
//! - `serve` (default): connect to the broker and run the HTTP server
//! - `check <file>`: validate a JSON file against the message schema

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use unity_validation_api::app;
use unity_validation_api::config::load_config;
use unity_validation_api::schema::{check_file, exit_status};
use unity_validation_api::utils::logging;

#[derive(Parser)]
#[command(name = "unity-validation-api", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Connect to the broker and start the HTTP server
    Serve,
    /// Validate a JSON file against the message schema and print the verdict
    Check {
        /// Path to the JSON document
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => match run_server().await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                logging::init("info");
                error!("Server failed: {e}");
                ExitCode::FAILURE
            }
        },
        Command::Check { file } => {
            let result = check_file(&file);
            match &result {
                Ok(verdict) => match serde_json::to_string_pretty(verdict) {
                    Ok(json) => println!("{json}"),
                    Err(e) => eprintln!("check failed: {e}"),
                },
                Err(e) => eprintln!("check failed: {e}"),
            }
            ExitCode::from(exit_status(&result))
        }
    }
}

async fn run_server() -> Result<(), Box<dyn std::error::Error>> {
    let settings = load_config()?;
    logging::init(&settings.server.log_level);
    info!(broker = %settings.broker.uri, "starting");

    let server = app::start(&settings).await?;
    server
        .serve(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received. Exiting gracefully.");
            }
        })
        .await?;

    Ok(())
}
