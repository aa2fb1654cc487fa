pub mod compression;
pub mod job;
pub mod retention;

pub use job::{run_backup, BackupReport};
