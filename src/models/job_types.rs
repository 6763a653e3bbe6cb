use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub const MIN_QUALITY: u8 = 60;
pub const MAX_QUALITY: u8 = 100;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Rgb::WHITE
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// JPEG quality, always within `MIN_QUALITY..=MAX_QUALITY`.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    /// Clamps `value` into the accepted range.
    pub fn new(value: u32) -> Self {
        let clamped = value.clamp(MIN_QUALITY as u32, MAX_QUALITY as u32) as u8;
        if clamped as u32 != value {
            tracing::warn!("Quality {} out of range, using {}", value, clamped);
        }
        Quality(clamped)
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Quality(92)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct JobFlags {
    pub recurse_subfolders: bool,
    pub progressive: bool,
    pub optimize: bool,
    pub overwrite_existing: bool,
    pub archive_after: bool,
}

impl Default for JobFlags {
    fn default() -> Self {
        Self {
            recurse_subfolders: true,
            progressive: true,
            optimize: true,
            overwrite_existing: false,
            archive_after: false,
        }
    }
}

/// Everything a run needs. Not modified once handed to the runner.
#[derive(Debug, Serialize, Clone)]
pub struct ConversionJob {
    pub source_root: PathBuf,
    pub destination_root: PathBuf,
    pub quality: Quality,
    pub flags: JobFlags,
    pub background: Rgb,
}

impl ConversionJob {
    pub fn new(source_root: impl Into<PathBuf>, destination_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            destination_root: destination_root.into(),
            quality: Quality::default(),
            flags: JobFlags::default(),
            background: Rgb::default(),
        }
    }
}

/// Encoder settings for a single file.
#[derive(Debug, Clone, Copy)]
pub struct EncodeOptions {
    pub quality: Quality,
    pub progressive: bool,
    pub optimize: bool,
    pub background: Rgb,
}

impl From<&ConversionJob> for EncodeOptions {
    fn from(job: &ConversionJob) -> Self {
        Self {
            quality: job.quality,
            progressive: job.flags.progressive,
            optimize: job.flags.optimize,
            background: job.background,
        }
    }
}
