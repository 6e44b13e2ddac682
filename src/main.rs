use clap::Parser;

use log::{error, info};
use std::process::ExitCode;

use predict2yolo::{merge, redact, Args, Mode, PredictionFile};

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if !args.input_dir.exists() {
        error!(
            "The specified input_dir does not exist: {}",
            args.input_dir.display()
        );
        return ExitCode::FAILURE;
    }

    let config = args.to_config();
    let provider = match PredictionFile::open(&config.model_path) {
        Ok(provider) => provider,
        Err(e) => {
            error!("Failed to load predictions: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match args.mode {
        Mode::Merge => {
            info!("Starting the merge process...");
            merge(&provider, &config)
        }
        Mode::Redact => {
            info!("Starting the redaction process...");
            redact(&provider, &config)
        }
    };

    match result {
        Ok(project) => {
            info!("Output written to {}", project.root().display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to process project: {}", e);
            ExitCode::FAILURE
        }
    }
}
