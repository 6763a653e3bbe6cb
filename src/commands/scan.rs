use crate::cli::ScanArgs;
use crate::config::Settings;
use crate::error::AppError;
use crate::services::fs_service;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Serialize)]
struct ScanReport {
    count: usize,
    files: Vec<PathBuf>,
}

pub fn scan(args: &ScanArgs, settings: &Settings) -> Result<ExitCode, AppError> {
    let recurse = settings.recurse_subfolders && !args.no_recursive;
    let tasks = fs_service::discover_source_files(&args.input, recurse)?;

    if args.json {
        let report = ScanReport {
            count: tasks.len(),
            files: tasks.into_iter().map(|t| t.relative).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(ExitCode::SUCCESS);
    }

    if args.list {
        for task in &tasks {
            println!("{}", task.relative.display());
        }
    }
    println!("{} PNG found", tasks.len());
    Ok(ExitCode::SUCCESS)
}
