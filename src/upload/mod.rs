mod drive;
mod uploader;

pub use drive::GoogleDriveUploader;
pub use uploader::{BackupMetadata, BackupUploader};

use crate::config::DriveSettings;
use crate::error::Result;

pub fn create_uploader(config: &DriveSettings) -> Result<Box<dyn BackupUploader>> {
    let uploader = GoogleDriveUploader::new(config)?;
    Ok(Box::new(uploader))
}
