use crate::backup::compression::{calculate_sha256, compress_to_zip};
use crate::backup::retention::prune_backups;
use crate::config::AppConfig;
use crate::database::{create_driver, DatabaseDriver};
use crate::error::Result;
use crate::upload::{create_uploader, BackupMetadata, BackupUploader};
use chrono::Utc;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

#[derive(Debug)]
pub struct BackupReport {
    pub database: String,
    pub archive_path: PathBuf,
    pub file_size: u64,
    pub duration_secs: u64,
    pub drive_file_id: String,
}

/// One full run: dump the configured database, compress the dump, upload
/// the archive, prune old local archives. Exactly one artifact is produced
/// and exactly one upload attempt is made; the first failure aborts.
pub async fn run_backup(config: &AppConfig) -> Result<BackupReport> {
    // Building the uploader validates the credential before any dump work.
    let uploader = create_uploader(&config.drive)?;
    let driver = create_driver(config.settings.engine, &config.connection)?;
    execute_backup(config, driver.as_ref(), uploader.as_ref()).await
}

async fn execute_backup(
    config: &AppConfig,
    driver: &dyn DatabaseDriver,
    uploader: &dyn BackupUploader,
) -> Result<BackupReport> {
    let start = Instant::now();
    let timestamp = Utc::now();
    let timestamp_str = timestamp.format("%Y%m%d%H%M%S").to_string();
    let database = config.connection.database.clone();

    info!(
        "Starting backup of database '{}' ({})",
        database,
        driver.engine_name()
    );

    driver.test_connection().await?;
    uploader.test_connection().await?;

    let backup_dir = &config.settings.backup_dir;
    fs::create_dir_all(backup_dir)?;

    let sql_filename = format!("backup-{}.sql", timestamp_str);
    let sql_path = backup_dir.join(&sql_filename);
    let sql_file = File::create(&sql_path)?;
    let writer = BufWriter::new(sql_file);

    if let Err(e) = driver.dump_database(&database, Box::new(writer)).await {
        remove_intermediate(&sql_path);
        return Err(e);
    }

    let zip_filename = format!("backup-{}.zip", timestamp_str);
    let zip_path = backup_dir.join(&zip_filename);

    if let Err(e) = compress_to_zip(&sql_path, &zip_path, &sql_filename) {
        remove_intermediate(&sql_path);
        remove_intermediate(&zip_path);
        return Err(e);
    }
    remove_intermediate(&sql_path);

    let file_size = fs::metadata(&zip_path)?.len();
    let file_hash = calculate_sha256(&zip_path).ok();

    let metadata = BackupMetadata {
        database: database.clone(),
        timestamp,
        file_size,
        file_hash,
        duration_secs: start.elapsed().as_secs(),
    };

    info!("Uploading backup to {}", uploader.name());
    let drive_file_id = uploader.upload(&metadata, &zip_path).await?;

    // The archive is already uploaded, so a prune failure is not fatal.
    if let Err(e) = prune_backups(backup_dir, config.settings.max_backups) {
        warn!("Retention pruning failed: {}", e);
    }

    let duration_secs = start.elapsed().as_secs();
    info!(
        "Backup completed: {:.2} MB in {} seconds",
        file_size as f64 / 1024.0 / 1024.0,
        duration_secs
    );

    Ok(BackupReport {
        database,
        archive_path: zip_path,
        file_size,
        duration_secs,
        drive_file_id,
    })
}

/// The archive is the deliverable; losing the intermediate SQL file only
/// wastes staging space, so removal failures are logged and swallowed.
fn remove_intermediate(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!(
            "Failed to remove intermediate file {}: {}",
            path.display(),
            e
        );
    }
}
