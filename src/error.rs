use std::fmt;
use std::io;
#[derive(Debug)]
pub enum BackupError {
    Config(String),
    Connection(String),
    Export(String),
    Auth(String),
    Upload(String),
    Io(io::Error),
    Serialization(String),
}

impl BackupError {
    /// Exit code reported to the invoking scheduler, one per failure class.
    pub fn exit_code(&self) -> i32 {
        match self {
            BackupError::Config(_) => 2,
            BackupError::Connection(_) => 3,
            BackupError::Export(_) => 4,
            BackupError::Auth(_) => 5,
            BackupError::Upload(_) => 6,
            BackupError::Io(_) | BackupError::Serialization(_) => 1,
        }
    }
}

impl fmt::Display for BackupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackupError::Config(msg) => write!(f, "Configuration error: {}", msg),
            BackupError::Connection(msg) => write!(f, "Connection error: {}", msg),
            BackupError::Export(msg) => write!(f, "Export error: {}", msg),
            BackupError::Auth(msg) => write!(f, "Authentication error: {}", msg),
            BackupError::Upload(msg) => write!(f, "Upload error: {}", msg),
            BackupError::Io(err) => write!(f, "IO error: {}", err),
            BackupError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for BackupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BackupError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for BackupError {
    fn from(err: io::Error) -> Self {
        BackupError::Io(err)
    }
}

impl From<toml::de::Error> for BackupError {
    fn from(err: toml::de::Error) -> Self {
        BackupError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for BackupError {
    fn from(err: serde_json::Error) -> Self {
        BackupError::Serialization(err.to_string())
    }
}

impl From<mysql_async::Error> for BackupError {
    fn from(err: mysql_async::Error) -> Self {
        BackupError::Export(err.to_string())
    }
}

impl From<sqlx::Error> for BackupError {
    fn from(err: sqlx::Error) -> Self {
        BackupError::Export(err.to_string())
    }
}

impl From<reqwest::Error> for BackupError {
    fn from(err: reqwest::Error) -> Self {
        BackupError::Upload(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for BackupError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        BackupError::Auth(err.to_string())
    }
}

impl From<zip::result::ZipError> for BackupError {
    fn from(err: zip::result::ZipError) -> Self {
        BackupError::Export(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BackupError>;
