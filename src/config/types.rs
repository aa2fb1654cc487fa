use serde::{Deserialize, Serialize};
use std::path::PathBuf;
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseEngine {
    Postgres,
    MySQL,
}

impl DatabaseEngine {
    pub fn default_port(&self) -> u16 {
        match self {
            DatabaseEngine::Postgres => 5432,
            DatabaseEngine::MySQL => 3306,
        }
    }
}

impl std::fmt::Display for DatabaseEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseEngine::Postgres => write!(f, "Postgres"),
            DatabaseEngine::MySQL => write!(f, "MySQL"),
        }
    }
}
/// Where and how to reach the database. Assembled from `DB_URL`, `DB_USER`
/// and `DB_NAME`; immutable for the run.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}
/// Service-account key plus the destination folder.
#[derive(Debug, Clone)]
pub struct DriveSettings {
    pub service_account_key: String,
    pub folder_id: String,
}
/// Non-secret tunables, read from the optional settings file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerSettings {
    #[serde(default = "default_engine")]
    pub engine: DatabaseEngine,
    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,
    #[serde(default = "default_max_backups")]
    pub max_backups: usize,
}

fn default_engine() -> DatabaseEngine {
    DatabaseEngine::Postgres
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from("/tmp/backups")
}

fn default_max_backups() -> usize {
    7
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            backup_dir: default_backup_dir(),
            max_backups: default_max_backups(),
        }
    }
}
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub connection: ConnectionSettings,
    pub drive: DriveSettings,
    pub settings: RunnerSettings,
}
