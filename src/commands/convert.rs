use crate::cli::ConvertArgs;
use crate::config::Settings;
use crate::error::AppError;
use crate::models::job_types::{ConversionJob, JobFlags, Quality};
use crate::models::progress_types::{ProgressEvent, RunOutcome, StartResponse};
use crate::services::color_service;
use crate::services::progress_channel::progress_channel;
use crate::services::runner::BatchRunner;
use std::process::ExitCode;
use std::sync::Arc;

/// Layer command-line flags over the loaded settings.
pub fn build_job(args: &ConvertArgs, settings: &Settings) -> ConversionJob {
    let destination = args
        .output
        .clone()
        .unwrap_or_else(|| settings.default_output_dir(&args.input));
    let background = args.background.as_deref().unwrap_or(&settings.background);

    ConversionJob {
        source_root: args.input.clone(),
        destination_root: destination,
        quality: Quality::new(args.quality.unwrap_or(settings.quality)),
        flags: JobFlags {
            recurse_subfolders: settings.recurse_subfolders && !args.no_recursive,
            progressive: settings.progressive && !args.no_progressive,
            optimize: settings.optimize && !args.no_optimize,
            overwrite_existing: layer(settings.overwrite_existing, args.overwrite, args.no_overwrite),
            archive_after: layer(settings.archive_after, args.zip, args.no_zip),
        },
        background: color_service::parse_color(background),
    }
}

// clap keeps `on` and `off` mutually exclusive.
fn layer(setting: bool, on: bool, off: bool) -> bool {
    (setting || on) && !off
}

pub fn convert(args: &ConvertArgs, settings: &Settings) -> Result<ExitCode, AppError> {
    let job = build_job(args, settings);
    tracing::debug!("Starting job: {:?}", job);

    let (tx, mut rx) = progress_channel();
    let runner = Arc::new(BatchRunner::new(tx));

    let response = runner.start_run(job);
    if let StartResponse::Rejected(outcome) = &response {
        if args.json {
            print_json(&ProgressEvent::Finished { outcome: outcome.clone() })?;
        } else if let Some(reason) = response.reason() {
            eprintln!("{}", reason);
        }
        return Ok(exit_code(outcome));
    }
    if !response.accepted() {
        return Err("A conversion is already running".into());
    }

    cancel_on_ctrl_c(runner.clone());

    let mut outcome = None;
    while let Some(event) = rx.recv_blocking() {
        if args.json {
            print_json(&event)?;
        } else {
            print_human(&event);
        }
        if let ProgressEvent::Finished { outcome: finished } = event {
            outcome = Some(finished);
            break;
        }
    }
    runner.wait();

    Ok(outcome.as_ref().map(exit_code).unwrap_or(ExitCode::FAILURE))
}

pub fn exit_code(outcome: &RunOutcome) -> ExitCode {
    ExitCode::from(exit_status(outcome))
}

fn exit_status(outcome: &RunOutcome) -> u8 {
    match outcome {
        RunOutcome::Completed { .. } | RunOutcome::RejectedZeroFiles => 0,
        RunOutcome::RejectedBadInput { .. } => 1,
        RunOutcome::Canceled { .. } => 130,
    }
}

fn print_json(event: &ProgressEvent) -> Result<(), AppError> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

fn print_human(event: &ProgressEvent) {
    match event {
        ProgressEvent::Log { text } => println!("{}", text),
        ProgressEvent::Status { text } => eprintln!("{}", text),
        ProgressEvent::Progress { .. } | ProgressEvent::Finished { .. } => {}
    }
}

/// First Ctrl-C cancels after the current file; a second one exits at once.
fn cancel_on_ctrl_c(runner: Arc<BatchRunner>) {
    let spawned = std::thread::Builder::new()
        .name("ctrl-c".to_string())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
                Ok(rt) => rt,
                Err(e) => {
                    tracing::warn!("Ctrl-C handling unavailable: {}", e);
                    return;
                }
            };
            rt.block_on(async {
                if tokio::signal::ctrl_c().await.is_err() {
                    return;
                }
                runner.request_cancel();
                if tokio::signal::ctrl_c().await.is_ok() {
                    std::process::exit(130);
                }
            });
        });

    if let Err(e) = spawned {
        tracing::warn!("Failed to spawn Ctrl-C listener: {}", e);
    }
}
