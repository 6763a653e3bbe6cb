use serde::Serialize;
use std::path::PathBuf;

/// Messages carried from the worker to the observer, in emission order.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    Log { text: String },
    Status { text: String },
    Progress { current: usize, total: usize },
    /// Sent once after the run has ended; controls may be re-enabled.
    Finished { outcome: RunOutcome },
}

impl ProgressEvent {
    pub fn log(text: impl Into<String>) -> Self {
        ProgressEvent::Log { text: text.into() }
    }

    pub fn status(text: impl Into<String>) -> Self {
        ProgressEvent::Status { text: text.into() }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed { converted: usize, total: usize },
    Canceled { converted: usize, total: usize },
    RejectedZeroFiles,
    RejectedBadInput { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionResult {
    Converted(PathBuf),
    Failed(String),
}

impl ConversionResult {
    pub fn is_converted(&self) -> bool {
        matches!(self, ConversionResult::Converted(_))
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Idle,
    Running,
    Completed,
    Canceled,
}

/// Answer to a start request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartResponse {
    Accepted { total: usize },
    /// Another run is active; the request was ignored.
    Busy,
    Rejected(RunOutcome),
}

impl StartResponse {
    pub fn accepted(&self) -> bool {
        matches!(self, StartResponse::Accepted { .. })
    }

    pub fn reason(&self) -> Option<String> {
        match self {
            StartResponse::Accepted { .. } => None,
            StartResponse::Busy => Some("A conversion is already running".to_string()),
            StartResponse::Rejected(RunOutcome::RejectedZeroFiles) => {
                Some("No PNG files found in the selected folder.".to_string())
            }
            StartResponse::Rejected(RunOutcome::RejectedBadInput { reason }) => Some(reason.clone()),
            StartResponse::Rejected(_) => None,
        }
    }
}
