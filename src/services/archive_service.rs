use crate::error::AppError;
use crate::services::fs_service::{is_target_file, partial_path};
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Sibling archive path: the directory name with its extension replaced by `.zip`.
pub fn archive_path(destination_root: &Path) -> Result<PathBuf, AppError> {
    if destination_root.file_name().is_none() {
        return Err(format!("Cannot name an archive after {}", destination_root.display()).into());
    }
    Ok(destination_root.with_extension("zip"))
}

/// Zip every JPEG under `destination_root` into its sibling archive.
///
/// Entry names are relative to the root with `/` separators. Returns the
/// archive path and the number of entries written.
pub fn create_archive(destination_root: &Path) -> Result<(PathBuf, usize), AppError> {
    let zip_path = archive_path(destination_root)?;
    let files = collect_outputs(destination_root);
    let partial = partial_path(&zip_path);

    let result = write_archive(&files, &partial)
        .and_then(|_| fs::rename(&partial, &zip_path).map_err(AppError::from));
    if let Err(e) = result {
        let _ = fs::remove_file(&partial);
        return Err(e);
    }

    tracing::info!("Wrote {} entries to {}", files.len(), zip_path.display());
    Ok((zip_path, files.len()))
}

fn collect_outputs(root: &Path) -> Vec<(PathBuf, String)> {
    let mut files: Vec<(PathBuf, String)> = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_target_file(entry.path()))
        .filter_map(|entry| {
            let name = entry_name(root, entry.path())?;
            Some((entry.into_path(), name))
        })
        .collect();
    files.sort_by(|a, b| a.1.cmp(&b.1));
    files
}

fn entry_name(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

fn write_archive(files: &[(PathBuf, String)], out: &Path) -> Result<(), AppError> {
    let mut zip = ZipWriter::new(BufWriter::new(File::create(out)?));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (path, name) in files {
        tracing::trace!("Adding {} to archive", name);
        zip.start_file(name.as_str(), options)?;
        let mut input = File::open(path)?;
        io::copy(&mut input, &mut zip)?;
    }

    let mut writer = zip.finish()?;
    io::Write::flush(&mut writer)?;
    Ok(())
}
