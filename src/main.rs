mod backup;
mod config;
mod database;
mod error;
mod log;
mod upload;

use tracing::{error, info};

#[tokio::main]
async fn main() {
    log::init();

    info!("sql-drive-backup starting...");

    // Fail fast on missing configuration, before any network activity.
    let config = match config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    };

    match backup::run_backup(&config).await {
        Ok(report) => {
            info!(
                "Backup of '{}' finished in {} seconds: {} ({} bytes) uploaded as {}",
                report.database,
                report.duration_secs,
                report.archive_path.display(),
                report.file_size,
                report.drive_file_id
            );
        }
        Err(e) => {
            error!("Backup failed: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}
