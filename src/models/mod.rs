pub mod fs_types;
pub mod job_types;
pub mod progress_types;
