use crate::error::AppError;
use crate::models::fs_types::FileTask;
use crate::services::fs_service::TARGET_EXTENSION;
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Picks destination paths for one run.
///
/// A candidate is taken when it already exists on disk (unless overwriting)
/// or when this resolver already handed it out. Taken candidates are retried
/// as `stem_1.jpg`, `stem_2.jpg`, … and the first free one wins.
pub struct OutputPathResolver {
    destination_root: PathBuf,
    overwrite: bool,
    mirror_subfolders: bool,
    claimed: HashSet<PathBuf>,
}

impl OutputPathResolver {
    pub fn new(destination_root: impl Into<PathBuf>, overwrite: bool, mirror_subfolders: bool) -> Self {
        Self {
            destination_root: destination_root.into(),
            overwrite,
            mirror_subfolders,
            claimed: HashSet::new(),
        }
    }

    /// Resolve the output path for `task`, creating its parent directories.
    pub fn resolve(&mut self, task: &FileTask) -> Result<PathBuf, AppError> {
        let out_dir = match task.relative.parent() {
            Some(rel_dir) if self.mirror_subfolders => self.destination_root.join(rel_dir),
            _ => self.destination_root.clone(),
        };
        std::fs::create_dir_all(&out_dir)?;

        let stem = task
            .path
            .file_stem()
            .ok_or_else(|| AppError::from(format!("No file name: {}", task.path.display())))?;

        let mut candidate = out_dir.join(with_suffix(stem, None));
        let mut counter = 1u64;
        while self.is_taken(&candidate) {
            candidate = out_dir.join(with_suffix(stem, Some(counter)));
            counter += 1;
        }

        self.claimed.insert(candidate.clone());
        Ok(candidate)
    }

    fn is_taken(&self, candidate: &Path) -> bool {
        self.claimed.contains(candidate) || (!self.overwrite && candidate.exists())
    }
}

fn with_suffix(stem: &std::ffi::OsStr, counter: Option<u64>) -> OsString {
    let mut name = stem.to_os_string();
    if let Some(n) = counter {
        name.push(format!("_{}", n));
    }
    name.push(".");
    name.push(TARGET_EXTENSION);
    name
}
