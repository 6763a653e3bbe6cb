pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

use clap::Parser;
use cli::{Cli, Commands};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

pub use error::AppError;
pub use models::job_types::{ConversionJob, EncodeOptions, JobFlags, Quality, Rgb};
pub use models::progress_types::{ProgressEvent, RunOutcome, RunPhase, StartResponse};
pub use services::color_service::parse_color;
pub use services::progress_channel::{progress_channel, ProgressReceiver, ProgressSender};
pub use services::runner::{BatchRunner, RunState};

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("png_jpg_converter_lib={}", default_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let settings = match config::load_settings_or_default(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match &cli.command {
        Commands::Convert(args) => commands::convert::convert(args, &settings),
        Commands::Scan(args) => commands::scan::scan(args, &settings),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
