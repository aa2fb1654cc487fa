mod types;

pub use types::*;

use crate::error::{BackupError, Result};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

pub const ENV_DB_URL: &str = "DB_URL";
pub const ENV_DB_USER: &str = "DB_USER";
pub const ENV_DB_NAME: &str = "DB_NAME";
pub const ENV_SERVICE_ACCOUNT_KEY: &str = "GOOGLE_SERVICE_ACCOUNT_KEY";
pub const ENV_DRIVE_FOLDER_ID: &str = "GOOGLE_DRIVE_FOLDER_ID";

const REQUIRED_VARS: [&str; 5] = [
    ENV_DB_URL,
    ENV_DB_USER,
    ENV_DB_NAME,
    ENV_SERVICE_ACCOUNT_KEY,
    ENV_DRIVE_FOLDER_ID,
];
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".sql_drive_backup"))
        .unwrap_or_else(|| PathBuf::from(".sql_drive_backup"))
}
pub fn config_path() -> PathBuf {
    match std::env::var("BACKUP_CONFIG") {
        Ok(path) if !path.is_empty() => PathBuf::from(path),
        _ => config_dir().join("config.toml"),
    }
}
/// Load the full run configuration: settings file plus required
/// environment variables. Fails before any network activity if a required
/// variable is missing or empty.
pub fn load() -> Result<AppConfig> {
    let env: HashMap<String, String> = std::env::vars().collect();
    let settings = load_settings_from(&config_path())?;
    from_env(&env, settings)
}
pub fn load_settings_from(path: &PathBuf) -> Result<RunnerSettings> {
    if !path.exists() {
        debug!("Settings file not found at {:?}, using defaults", path);
        return Ok(RunnerSettings::default());
    }

    info!("Loading settings from {:?}", path);
    let contents = fs::read_to_string(path)?;
    let settings: RunnerSettings = toml::from_str(&contents)?;
    Ok(settings)
}
pub fn from_env(env: &HashMap<String, String>, settings: RunnerSettings) -> Result<AppConfig> {
    for var in REQUIRED_VARS {
        match env.get(var) {
            Some(value) if !value.trim().is_empty() => {}
            _ => {
                return Err(BackupError::Config(format!(
                    "required environment variable {} is missing or empty",
                    var
                )))
            }
        }
    }

    let (host, port, password) = parse_db_url(&env[ENV_DB_URL])?;

    Ok(AppConfig {
        connection: ConnectionSettings {
            host,
            port: port.unwrap_or_else(|| settings.engine.default_port()),
            username: env[ENV_DB_USER].clone(),
            password: password.unwrap_or_default(),
            database: env[ENV_DB_NAME].clone(),
        },
        drive: DriveSettings {
            service_account_key: env[ENV_SERVICE_ACCOUNT_KEY].clone(),
            folder_id: env[ENV_DRIVE_FOLDER_ID].clone(),
        },
        settings,
    })
}
/// `DB_URL` is a `&`-separated list of `key=value` pairs, e.g.
/// `host=db.example.com&password=secret&port=5433`. `host` is mandatory,
/// `port` and `password` optional. Unknown keys are ignored.
pub fn parse_db_url(url: &str) -> Result<(String, Option<u16>, Option<String>)> {
    let mut fields: HashMap<&str, &str> = HashMap::new();
    for pair in url.split('&') {
        if let Some((key, value)) = pair.split_once('=') {
            fields.insert(key.trim(), value);
        }
    }

    let host = fields
        .get("host")
        .filter(|h| !h.is_empty())
        .map(|h| h.to_string())
        .ok_or_else(|| {
            BackupError::Config(format!("{} must contain a host=... entry", ENV_DB_URL))
        })?;

    let port = match fields.get("port") {
        Some(raw) => Some(raw.parse::<u16>().map_err(|_| {
            BackupError::Config(format!("invalid port '{}' in {}", raw, ENV_DB_URL))
        })?),
        None => None,
    };

    let password = fields.get("password").map(|p| p.to_string());

    Ok((host, port, password))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn full_env() -> HashMap<String, String> {
        HashMap::from([
            (ENV_DB_URL.into(), "host=db.example.com&password=secret".into()),
            (ENV_DB_USER.into(), "backup".into()),
            (ENV_DB_NAME.into(), "appdb".into()),
            (ENV_SERVICE_ACCOUNT_KEY.into(), "{\"type\":\"service_account\"}".into()),
            (ENV_DRIVE_FOLDER_ID.into(), "folder123".into()),
        ])
    }

    #[test]
    fn test_parse_db_url() {
        let (host, port, password) =
            parse_db_url("host=db.example.com&password=secret&port=5433").unwrap();
        assert_eq!(host, "db.example.com");
        assert_eq!(port, Some(5433));
        assert_eq!(password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_parse_db_url_without_host_fails() {
        let err = parse_db_url("password=secret").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_parse_db_url_bad_port_fails() {
        assert!(parse_db_url("host=db&port=notaport").is_err());
    }

    #[test]
    fn test_from_env_complete() {
        let config = from_env(&full_env(), RunnerSettings::default()).unwrap();
        assert_eq!(config.connection.host, "db.example.com");
        assert_eq!(config.connection.port, 5432);
        assert_eq!(config.connection.username, "backup");
        assert_eq!(config.connection.database, "appdb");
        assert_eq!(config.drive.folder_id, "folder123");
    }

    #[test]
    fn test_from_env_missing_var_fails_fast() {
        for var in REQUIRED_VARS {
            let mut env = full_env();
            env.remove(var);
            let err = from_env(&env, RunnerSettings::default()).unwrap_err();
            assert_eq!(err.exit_code(), 2, "missing {} must be a config error", var);
        }
    }

    #[test]
    fn test_from_env_empty_db_url_fails_fast() {
        let mut env = full_env();
        env.insert(ENV_DB_URL.into(), "  ".into());
        assert!(from_env(&env, RunnerSettings::default()).is_err());
    }

    #[test]
    fn test_load_settings_defaults_when_file_missing() {
        let dir = tempdir().unwrap();
        let settings = load_settings_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(settings.engine, DatabaseEngine::Postgres);
        assert_eq!(settings.max_backups, 7);
        assert_eq!(settings.backup_dir, PathBuf::from("/tmp/backups"));
    }

    #[test]
    fn test_load_settings_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "engine = \"mysql\"\nmax_backups = 3\n").unwrap();

        let settings = load_settings_from(&path).unwrap();
        assert_eq!(settings.engine, DatabaseEngine::MySQL);
        assert_eq!(settings.max_backups, 3);
        assert_eq!(settings.backup_dir, PathBuf::from("/tmp/backups"));
    }
}
