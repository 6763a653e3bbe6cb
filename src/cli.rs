use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "png-jpg-converter")]
#[command(author, version, about = "Batch convert PNG images to JPEG")]
pub struct Cli {
    /// Path to a TOML settings file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert every PNG in a folder to JPEG
    Convert(ConvertArgs),

    /// Count the PNG files a conversion would pick up
    Scan(ScanArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// Folder containing PNG files
    pub input: PathBuf,

    /// Output folder (defaults to <INPUT>/jpg_out)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// JPEG quality, 60-100
    #[arg(short, long)]
    pub quality: Option<u32>,

    /// Background for transparent images, #RRGGBB or #RGB
    #[arg(short, long)]
    pub background: Option<String>,

    /// Only convert files directly inside INPUT
    #[arg(long)]
    pub no_recursive: bool,

    /// Write baseline instead of progressive JPEGs
    #[arg(long)]
    pub no_progressive: bool,

    /// Skip Huffman table optimization
    #[arg(long)]
    pub no_optimize: bool,

    /// Replace existing output files instead of numbering new ones
    #[arg(long, conflicts_with = "no_overwrite")]
    pub overwrite: bool,

    /// Number new output files even if the settings file enables overwrite
    #[arg(long)]
    pub no_overwrite: bool,

    /// Create a ZIP of the output folder after a completed run
    #[arg(long, conflicts_with = "no_zip")]
    pub zip: bool,

    /// Skip the ZIP even if the settings file enables it
    #[arg(long)]
    pub no_zip: bool,

    /// Print every progress event as a JSON line
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Folder containing PNG files
    pub input: PathBuf,

    /// Only look at files directly inside INPUT
    #[arg(long)]
    pub no_recursive: bool,

    /// Also list the files found
    #[arg(long)]
    pub list: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
