//! Filesystem locations.
//!
//! Everything lives in one data directory: `$KOTO_HOME` when set, otherwise
//! `~/.koto`. The database path can be overridden with `--db`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

/// Environment variable overriding the data directory.
pub const HOME_ENV: &str = "KOTO_HOME";

const DATA_DIR_NAME: &str = ".koto";
const DB_FILE: &str = "koto.db";
const LOG_FILE: &str = "koto.log";

/// Resolved paths for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub log_path: PathBuf,
}

impl Config {
    /// Paths rooted at `data_dir`, with an optional database override.
    pub fn new(data_dir: PathBuf, db_override: Option<PathBuf>) -> Self {
        let db_path = db_override.unwrap_or_else(|| data_dir.join(DB_FILE));
        let log_path = data_dir.join(LOG_FILE);
        Self { data_dir, db_path, log_path }
    }

    /// Resolve from the environment and make sure the data directory exists.
    pub fn resolve(db_override: Option<PathBuf>) -> anyhow::Result<Self> {
        let data_dir = match std::env::var_os(HOME_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => {
                let home = std::env::var_os("HOME").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
                home.join(DATA_DIR_NAME)
            },
        };
        let config = Self::new(data_dir, db_override);
        config.ensure_data_dir()?;
        Ok(config)
    }

    fn ensure_data_dir(&self) -> anyhow::Result<()> {
        fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("failed to create data directory {}", self.data_dir.display()))?;
        restrict_dir(&self.data_dir)
    }
}

#[cfg(unix)]
fn restrict_dir(dir: &Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(dir, fs::Permissions::from_mode(0o700))
        .with_context(|| format!("failed to set permissions on {}", dir.display()))
}

#[cfg(not(unix))]
fn restrict_dir(_dir: &Path) -> anyhow::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_under_data_dir() {
        let config = Config::new(PathBuf::from("/home/ada/.koto"), None);
        assert_eq!(config.db_path, PathBuf::from("/home/ada/.koto/koto.db"));
        assert_eq!(config.log_path, PathBuf::from("/home/ada/.koto/koto.log"));
    }

    #[test]
    fn test_db_override() {
        let config = Config::new(PathBuf::from("/data"), Some(PathBuf::from("/tmp/other.db")));
        assert_eq!(config.db_path, PathBuf::from("/tmp/other.db"));
        assert_eq!(config.log_path, PathBuf::from("/data/koto.log"));
    }

    #[test]
    fn test_ensure_data_dir_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::new(tmp.path().join("nested").join(".koto"), None);
        config.ensure_data_dir().unwrap();
        assert!(config.data_dir.is_dir());
    }
}
