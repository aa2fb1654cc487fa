use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info};

/// Prune the local staging directory down to `max_backups` archives,
/// deleting the oldest first (by modification time). Only `.zip` files are
/// considered.
pub fn prune_backups(dir: &Path, max_backups: usize) -> Result<usize> {
    let mut archives: Vec<(PathBuf, SystemTime)> = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some("zip") {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        archives.push((path, modified));
    }

    archives.sort_by_key(|(_, modified)| *modified);

    let mut removed = 0;
    while archives.len() > max_backups {
        let (oldest, _) = archives.remove(0);
        debug!("Removing old backup: {}", oldest.display());
        fs::remove_file(&oldest)?;
        removed += 1;
    }

    if removed > 0 {
        info!(
            "Retention: removed {} old backup(s), {} retained",
            removed,
            archives.len()
        );
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::thread::sleep;
    use std::time::Duration;
    use tempfile::tempdir;

    fn write_archive(dir: &Path, name: &str) {
        let mut file = File::create(dir.join(name)).unwrap();
        file.write_all(b"zip bytes").unwrap();
        // Distinct mtimes so the oldest-first ordering is deterministic.
        sleep(Duration::from_millis(20));
    }

    #[test]
    fn test_prune_keeps_newest() {
        let dir = tempdir().unwrap();
        for i in 0..5 {
            write_archive(dir.path(), &format!("backup-{}.zip", i));
        }

        let removed = prune_backups(dir.path(), 2).unwrap();
        assert_eq!(removed, 3);

        let mut remaining: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        remaining.sort();
        assert_eq!(remaining, vec!["backup-3.zip", "backup-4.zip"]);
    }

    #[test]
    fn test_prune_ignores_non_archives() {
        let dir = tempdir().unwrap();
        write_archive(dir.path(), "backup-0.zip");
        File::create(dir.path().join("notes.txt")).unwrap();

        let removed = prune_backups(dir.path(), 1).unwrap();
        assert_eq!(removed, 0);
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_prune_under_limit_is_noop() {
        let dir = tempdir().unwrap();
        write_archive(dir.path(), "backup-0.zip");

        let removed = prune_backups(dir.path(), 7).unwrap();
        assert_eq!(removed, 0);
        assert!(dir.path().join("backup-0.zip").exists());
    }
}
