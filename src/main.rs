//! fhir-import-batcher - batches NDJSON files into FHIR bulk import jobs

#![allow(missing_docs)]

use clap::Parser;
use fhir_import_batcher::{Config, server, utils::logging};
use std::path::PathBuf;
use std::process::ExitCode;

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "importer", version, about)]
struct Cli {
    /// Configuration file; missing files fall back to defaults
    #[arg(
        short,
        long,
        env = "IMPORTER_CONFIG",
        default_value = "config/importer.yaml"
    )]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // A missing .env file is not an error
    dotenvy::dotenv().ok();

    let config = match Config::load(&cli.config).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init_logging(config.logging()) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match server::builder::run_service(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Print error using Display (not Debug) to preserve newlines
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
