use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::Path;
#[derive(Debug, Clone)]
pub struct BackupMetadata {
    pub database: String,
    pub timestamp: DateTime<Utc>,
    pub file_size: u64,
    pub file_hash: Option<String>,
    pub duration_secs: u64,
}
#[async_trait]
pub trait BackupUploader: Send + Sync {
    /// Transfer the archive to the destination, returning the remote file id.
    async fn upload(&self, metadata: &BackupMetadata, file_path: &Path) -> Result<String>;
    async fn test_connection(&self) -> Result<()>;
    fn name(&self) -> &'static str;
}
