use serde::Serialize;
use std::path::PathBuf;

/// One discovered source file.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct FileTask {
    pub path: PathBuf,
    /// Path relative to the source root, file name included.
    pub relative: PathBuf,
}
