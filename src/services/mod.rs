pub mod archive_service;
pub mod color_service;
pub mod convert_service;
pub mod exif_service;
pub mod fs_service;
pub mod output_path_service;
pub mod progress_channel;
pub mod runner;
