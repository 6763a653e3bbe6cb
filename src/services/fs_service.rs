use crate::error::AppError;
use crate::models::fs_types::FileTask;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const SOURCE_EXTENSION: &str = "png";
pub const TARGET_EXTENSION: &str = "jpg";

pub fn is_source_file(path: &Path) -> bool {
    has_extension(path, SOURCE_EXTENSION)
}

pub fn is_target_file(path: &Path) -> bool {
    has_extension(path, TARGET_EXTENSION)
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(wanted))
        .unwrap_or(false)
}

/// Hidden sibling used while `dest` is being written.
pub fn partial_path(dest: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(dest.file_name().unwrap_or_default());
    name.push(".part");
    dest.with_file_name(name)
}

/// List every PNG under `root`, sorted by path.
///
/// Only direct children are considered unless `recurse` is set. A missing
/// root is an error; unreadable entries below it are skipped.
pub fn discover_source_files(root: &Path, recurse: bool) -> Result<Vec<FileTask>, AppError> {
    if !root.is_dir() {
        return Err(AppError::NotFound(root.to_path_buf()));
    }

    let mut walker = WalkDir::new(root).min_depth(1).sort_by_file_name();
    if !recurse {
        walker = walker.max_depth(1);
    }

    let mut tasks = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_source_file(entry.path()) {
            continue;
        }

        let path = entry.into_path();
        let relative = match path.strip_prefix(root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => path.file_name().map(Into::into).unwrap_or_default(),
        };
        tasks.push(FileTask { path, relative });
    }

    tasks.sort_by(|a, b| a.relative.cmp(&b.relative));
    tracing::debug!("Discovered {} PNG file(s) under {}", tasks.len(), root.display());
    Ok(tasks)
}
