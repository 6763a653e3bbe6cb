use crate::error::AppError;
use crate::models::fs_types::FileTask;
use crate::models::job_types::{ConversionJob, EncodeOptions};
use crate::models::progress_types::{ConversionResult, ProgressEvent, RunOutcome, RunPhase, StartResponse};
use crate::services::archive_service;
use crate::services::convert_service;
use crate::services::fs_service;
use crate::services::output_path_service::OutputPathResolver;
use crate::services::progress_channel::ProgressSender;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;

/// Counters and the cancellation flag for one run.
///
/// The worker owns the counters; the only thing written from outside is the
/// cancellation flag, which the worker polls before each file.
pub struct RunState {
    total: usize,
    attempted: AtomicUsize,
    converted: AtomicUsize,
    cancel_flag: AtomicBool,
}

impl RunState {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            attempted: AtomicUsize::new(0),
            converted: AtomicUsize::new(0),
            cancel_flag: AtomicBool::new(false),
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn attempted(&self) -> usize {
        self.attempted.load(Ordering::Relaxed)
    }

    pub fn converted(&self) -> usize {
        self.converted.load(Ordering::Relaxed)
    }

    pub fn request_cancel(&self) {
        self.cancel_flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.cancel_flag.load(Ordering::Relaxed)
    }

    fn record(&self, result: &ConversionResult) {
        self.attempted.fetch_add(1, Ordering::Relaxed);
        if result.is_converted() {
            self.converted.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Runs conversion jobs on a dedicated worker thread, one job at a time.
pub struct BatchRunner {
    events: ProgressSender,
    phase: Arc<Mutex<RunPhase>>,
    current: Mutex<Option<Arc<RunState>>>,
    worker: Mutex<Option<JoinHandle<RunOutcome>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl BatchRunner {
    pub fn new(events: ProgressSender) -> Self {
        Self {
            events,
            phase: Arc::new(Mutex::new(RunPhase::Idle)),
            current: Mutex::new(None),
            worker: Mutex::new(None),
        }
    }

    pub fn phase(&self) -> RunPhase {
        *lock(&self.phase)
    }

    pub fn is_running(&self) -> bool {
        self.phase() == RunPhase::Running
    }

    /// `(converted, total)` of the current or most recent run.
    pub fn counters(&self) -> Option<(usize, usize)> {
        lock(&self.current)
            .as_ref()
            .map(|state| (state.converted(), state.total()))
    }

    /// Validate `job` and start it in the background.
    ///
    /// A request while a run is active is ignored and answered with `Busy`.
    pub fn start_run(&self, job: ConversionJob) -> StartResponse {
        let mut worker = lock(&self.worker);
        if self.is_running() {
            tracing::debug!("Start requested while a run is active; ignoring");
            return StartResponse::Busy;
        }

        // The previous worker has already reported its outcome.
        if let Some(previous) = worker.take() {
            let _ = previous.join();
        }

        let tasks = match prepare(&job) {
            Ok(tasks) => tasks,
            Err(outcome) => {
                tracing::info!("Run rejected: {:?}", outcome);
                *lock(&self.phase) = RunPhase::Idle;
                return StartResponse::Rejected(outcome);
            }
        };

        let total = tasks.len();
        let state = Arc::new(RunState::new(total));
        *lock(&self.current) = Some(state.clone());
        *lock(&self.phase) = RunPhase::Running;

        let events = self.events.clone();
        let phase = self.phase.clone();
        let spawned = std::thread::Builder::new()
            .name("png-jpg-worker".to_string())
            .spawn(move || {
                let options = EncodeOptions::from(&job);
                let outcome = execute(&job, &tasks, &state, &events, |source, dest| {
                    convert_guarded(source, dest, &options)
                });
                finish(outcome, &state, &events, &phase)
            });

        match spawned {
            Ok(handle) => {
                *worker = Some(handle);
                tracing::info!("Run started with {} file(s)", total);
                StartResponse::Accepted { total }
            }
            Err(e) => {
                *lock(&self.phase) = RunPhase::Idle;
                StartResponse::Rejected(RunOutcome::RejectedBadInput {
                    reason: format!("Failed to start worker: {}", e),
                })
            }
        }
    }

    /// Ask the active run to stop before its next file.
    ///
    /// No-op when idle or once every file has been attempted.
    pub fn request_cancel(&self) {
        if !self.is_running() {
            return;
        }
        if let Some(state) = lock(&self.current).as_ref() {
            if !state.is_cancel_requested() && state.attempted() < state.total() {
                state.request_cancel();
                self.events.status("Canceling …");
            }
        }
    }

    /// Join the worker of the most recent run and return its outcome.
    pub fn wait(&self) -> Option<RunOutcome> {
        let handle = lock(&self.worker).take()?;
        match handle.join() {
            Ok(outcome) => Some(outcome),
            Err(_) => {
                tracing::error!("Conversion worker panicked");
                None
            }
        }
    }
}

/// Precondition checks. Nothing is created unless the run will start.
fn prepare(job: &ConversionJob) -> Result<Vec<FileTask>, RunOutcome> {
    let bad_input = |reason: String| RunOutcome::RejectedBadInput { reason };

    if job.source_root.as_os_str().is_empty() || !job.source_root.is_dir() {
        return Err(bad_input(format!(
            "Please select a valid input folder (got {:?})",
            job.source_root
        )));
    }
    if job.destination_root.as_os_str().is_empty() {
        return Err(bad_input("Please select an output folder".to_string()));
    }

    let tasks = fs_service::discover_source_files(&job.source_root, job.flags.recurse_subfolders)
        .map_err(|e| bad_input(e.to_string()))?;
    if tasks.is_empty() {
        return Err(RunOutcome::RejectedZeroFiles);
    }

    std::fs::create_dir_all(&job.destination_root).map_err(|e| {
        bad_input(format!(
            "Cannot create output folder {}: {}",
            job.destination_root.display(),
            e
        ))
    })?;
    Ok(tasks)
}

/// The per-file loop. Returns `Completed` or `Canceled`.
fn execute<F>(
    job: &ConversionJob,
    tasks: &[FileTask],
    state: &RunState,
    events: &ProgressSender,
    mut convert: F,
) -> RunOutcome
where
    F: FnMut(&Path, &Path) -> Result<(), AppError>,
{
    let total = state.total();
    let mut resolver = OutputPathResolver::new(
        &job.destination_root,
        job.flags.overwrite_existing,
        job.flags.recurse_subfolders,
    );

    events.status(format!("Converting 0/{} …", total));
    events.log(format!("Start converting {} file(s)", total));

    for task in tasks {
        if state.is_cancel_requested() {
            return canceled(state, events);
        }

        let result = match resolver.resolve(task) {
            Ok(dest) => match convert(&task.path, &dest) {
                Ok(()) => ConversionResult::Converted(dest),
                Err(e) => ConversionResult::Failed(e.to_string()),
            },
            Err(e) => ConversionResult::Failed(e.to_string()),
        };
        state.record(&result);

        let converted = state.converted();
        events.progress(converted, total);
        events.status(format!("Converting {}/{} …", converted, total));
        match result {
            ConversionResult::Converted(dest) => {
                events.log(format!("✓ {} → {}", task.path.display(), dest.display()));
            }
            ConversionResult::Failed(message) => {
                tracing::warn!("Failed to convert {}: {}", task.path.display(), message);
                events.log(format!("✗ {} — ERROR: {}", task.path.display(), message));
            }
        }
    }

    // A cancel that arrived while the last file was converting still counts.
    if state.is_cancel_requested() {
        return canceled(state, events);
    }

    let converted = state.converted();
    events.status(format!("Done: {}/{} converted.", converted, total));
    events.log("Conversion finished.");

    if job.flags.archive_after {
        archive(&job.destination_root, events);
    }

    RunOutcome::Completed { converted, total }
}

fn canceled(state: &RunState, events: &ProgressSender) -> RunOutcome {
    events.log("Canceled by user.");
    RunOutcome::Canceled {
        converted: state.converted(),
        total: state.total(),
    }
}

fn archive(destination_root: &Path, events: &ProgressSender) {
    match archive_service::archive_path(destination_root) {
        Ok(path) => events.log(format!("Creating ZIP: {}", path.display())),
        Err(e) => {
            events.log(format!("✗ ZIP failed: {}", e));
            return;
        }
    }
    match archive_service::create_archive(destination_root) {
        Ok(_) => events.log("ZIP created."),
        Err(e) => {
            tracing::warn!("Archive of {} failed: {}", destination_root.display(), e);
            events.log(format!("✗ ZIP failed: {}", e));
        }
    }
}

fn finish(
    outcome: RunOutcome,
    state: &RunState,
    events: &ProgressSender,
    phase: &Mutex<RunPhase>,
) -> RunOutcome {
    events.progress(state.converted(), state.total());
    *lock(phase) = match outcome {
        RunOutcome::Canceled { .. } => RunPhase::Canceled,
        _ => RunPhase::Completed,
    };
    tracing::info!("Run finished: {:?}", outcome);
    events.send(ProgressEvent::Finished {
        outcome: outcome.clone(),
    });
    outcome
}

// A decoder panic on one hostile file must not take the batch down with it.
fn convert_guarded(source: &Path, dest: &Path, options: &EncodeOptions) -> Result<(), AppError> {
    match panic::catch_unwind(AssertUnwindSafe(|| {
        convert_service::convert_file(source, dest, options)
    })) {
        Ok(result) => result,
        Err(_) => Err(format!("Decoder panicked on {}", source.display()).into()),
    }
}
