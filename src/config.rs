//! Settings file handling.
//!
//! Built-in defaults are overridden by an optional TOML file, which the
//! command line then overrides again.

use crate::error::AppError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "png-jpg-converter.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// JPEG quality; clamped to 60..=100 when the job is built
    pub quality: u32,
    pub progressive: bool,
    pub optimize: bool,
    pub recurse_subfolders: bool,
    pub overwrite_existing: bool,
    pub archive_after: bool,
    /// `#RRGGBB` or `#RGB`; anything else means white
    pub background: String,
    /// Output folder created inside the input folder when none is given
    pub output_dir_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: 92,
            progressive: true,
            optimize: true,
            recurse_subfolders: true,
            overwrite_existing: false,
            archive_after: false,
            background: "#FFFFFF".to_string(),
            output_dir_name: "jpg_out".to_string(),
        }
    }
}

impl Settings {
    pub fn default_output_dir(&self, input: &Path) -> PathBuf {
        input.join(&self.output_dir_name)
    }
}

pub fn parse_settings(content: &str) -> Result<Settings, AppError> {
    let settings: Settings = toml::from_str(content)?;
    if settings.output_dir_name.trim().is_empty() {
        return Err("output_dir_name must not be empty".into());
    }
    Ok(settings)
}

/// Load settings from a TOML file.
pub fn load_settings(path: &Path) -> Result<Settings, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::from(format!("Failed to read settings file {}: {}", path.display(), e)))?;
    let settings = parse_settings(&content)?;
    tracing::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

/// Load `custom_path`, else `./png-jpg-converter.toml` when present, else defaults.
pub fn load_settings_or_default(custom_path: Option<&Path>) -> Result<Settings, AppError> {
    if let Some(path) = custom_path {
        return load_settings(path);
    }

    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    if default_path.is_file() {
        return load_settings(default_path);
    }

    Ok(Settings::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_means_defaults() {
        assert_eq!(parse_settings("").unwrap(), Settings::default());
    }

    #[test]
    fn partial_file_overrides_only_named_keys() {
        let settings = parse_settings("quality = 75\nbackground = \"#000\"\narchive_after = true\n").unwrap();
        assert_eq!(settings.quality, 75);
        assert_eq!(settings.background, "#000");
        assert!(settings.archive_after);
        assert!(settings.progressive);
        assert_eq!(settings.output_dir_name, "jpg_out");
    }

    #[test]
    fn unknown_keys_and_bad_types_are_rejected() {
        assert!(matches!(parse_settings("qualty = 80"), Err(AppError::Config(_))));
        assert!(matches!(parse_settings("quality = \"high\""), Err(AppError::Config(_))));
        assert!(parse_settings("output_dir_name = \"  \"").is_err());
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_settings_or_default(Some(&dir.path().join("missing.toml"))).is_err());

        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "overwrite_existing = true").unwrap();
        assert!(load_settings_or_default(Some(&path)).unwrap().overwrite_existing);
    }

    #[test]
    fn default_output_lives_inside_input() {
        let settings = Settings::default();
        assert_eq!(
            settings.default_output_dir(Path::new("/photos")),
            PathBuf::from("/photos/jpg_out")
        );
    }
}
