//! JSON export and import of the task list.
//!
//! Export writes every stored task as a pretty-printed JSON array. Import reads
//! the same shape, discards ids and timestamps, validates every record and then
//! inserts them all in one batch, so a bad file leaves the store untouched.

use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::db::TaskStore;
use crate::error::TransferError;
use crate::fields::*;
use crate::task::{NewTask, Task};

/// File name used when `/export` is given no path.
pub const DEFAULT_EXPORT_FILE: &str = "tasks_export.json";

/// The fields an imported record may carry; anything else is ignored.
#[derive(Debug, Deserialize)]
struct ImportRecord {
    title: String,
    #[serde(default)]
    description: String,
    status: Status,
    priority: Priority,
    #[serde(default)]
    due_date: Option<NaiveDate>,
    #[serde(default)]
    work_duration: i64,
}

impl From<ImportRecord> for NewTask {
    fn from(record: ImportRecord) -> Self {
        NewTask {
            title: record.title,
            description: record.description,
            status: record.status,
            priority: record.priority,
            due_date: record.due_date,
            work_duration: record.work_duration,
        }
    }
}

/// Serialise tasks to the export format.
pub fn encode(tasks: &[Task]) -> Result<String, TransferError> {
    serde_json::to_string_pretty(tasks).map_err(|e| TransferError::InvalidJson(e.to_string()))
}

/// Parse and validate an export document into insertable tasks.
pub fn decode(json: &str) -> Result<Vec<NewTask>, TransferError> {
    let records: Vec<ImportRecord> =
        serde_json::from_str(json).map_err(|e| TransferError::InvalidJson(e.to_string()))?;
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            NewTask::from(record)
                .normalised()
                .map_err(|source| TransferError::InvalidRecord { index, source })
        })
        .collect()
}

/// Write every stored task to `path`. Returns the number exported.
pub fn export_tasks(store: &dyn TaskStore, path: &Path) -> Result<usize, TransferError> {
    let tasks = store.list()?;
    let json = encode(&tasks)?;
    write_private(path, &json).map_err(|e| TransferError::Io { path: path.to_path_buf(), message: e.to_string() })?;
    info!(path = %path.display(), count = tasks.len(), "exported tasks");
    Ok(tasks.len())
}

/// Write `contents` to `path`; a newly created file is readable by the owner only.
fn write_private(path: &Path, contents: &str) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(contents.as_bytes())
}

/// Import every task in `path`. Returns the number imported.
pub fn import_tasks(store: &dyn TaskStore, path: &Path) -> Result<usize, TransferError> {
    let json = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => TransferError::FileNotFound(path.to_path_buf()),
        _ => TransferError::Io { path: path.to_path_buf(), message: e.to_string() },
    })?;
    let tasks = decode(&json)?;
    let ids = store.create_batch(tasks)?;
    info!(path = %path.display(), count = ids.len(), "imported tasks");
    Ok(ids.len())
}

/// Expand a leading `~/` using the given home directory.
pub fn expand_home(path: &Path, home: Option<&Path>) -> PathBuf {
    match (path.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// [`expand_home`] with `$HOME`.
pub fn resolve_path(path: &Path) -> PathBuf {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    expand_home(path, home.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteStore;
    use crate::error::ValidationError;

    fn seeded() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut a = NewTask::new("Write report", "quarterly", Priority::High);
        a.due_date = NaiveDate::from_ymd_opt(2025, 6, 1);
        let a = store.create(a).unwrap();
        store.add_work_duration(a, 50).unwrap();
        let b = store.create(NewTask::new("日本語のタスク", "", Priority::Low)).unwrap();
        store.complete(b).unwrap();
        store
    }

    fn summary(tasks: &[Task]) -> Vec<(String, String, Status, Priority, Option<NaiveDate>, i64)> {
        let mut rows: Vec<_> = tasks
            .iter()
            .map(|t| (t.title.clone(), t.description.clone(), t.status, t.priority, t.due_date, t.work_duration))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    }

    #[test]
    fn test_export_then_import_preserves_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let source = seeded();
        assert_eq!(export_tasks(&source, &path).unwrap(), 2);

        let target = SqliteStore::open_in_memory().unwrap();
        assert_eq!(import_tasks(&target, &path).unwrap(), 2);
        assert_eq!(summary(&source.list().unwrap()), summary(&target.list().unwrap()));
    }

    #[cfg(unix)]
    #[test]
    fn test_export_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("private.json");
        export_tasks(&seeded(), &path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_export_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        fs::write(&path, "x".repeat(100_000)).unwrap();
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(export_tasks(&store, &path).unwrap(), 0);
        assert_eq!(decode(&fs::read_to_string(&path).unwrap()).unwrap(), vec![]);
    }

    #[test]
    fn test_import_missing_file() {
        let store = SqliteStore::open_in_memory().unwrap();
        let path = PathBuf::from("/definitely/not/here.json");
        assert_eq!(import_tasks(&store, &path).unwrap_err(), TransferError::FileNotFound(path));
    }

    #[test]
    fn test_decode_requires_fields() {
        let err = decode(r#"[{"title": "x", "priority": 1}]"#).unwrap_err();
        assert!(matches!(err, TransferError::InvalidJson(_)));
        assert!(matches!(decode("not json"), Err(TransferError::InvalidJson(_))));
        assert!(matches!(decode(r#"[{"title": "x", "status": 0, "priority": 5}]"#), Err(TransferError::InvalidJson(_))));
    }

    #[test]
    fn test_decode_ignores_ids_and_timestamps() {
        let tasks = decode(
            r#"[{"id": 99, "title": " Plan ", "status": 1, "priority": 2,
                 "created_at": "2020-01-01T00:00:00Z", "extra": true}]"#,
        )
        .unwrap();
        assert_eq!(tasks, vec![NewTask { status: Status::Completed, ..NewTask::new("Plan", "", Priority::High) }]);
    }

    #[test]
    fn test_invalid_record_aborts_whole_import() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(
            &path,
            r#"[{"title": "good", "status": 0, "priority": 1},
                {"title": "bad", "status": 0, "priority": 1, "work_duration": -3}]"#,
        )
        .unwrap();
        let store = SqliteStore::open_in_memory().unwrap();
        let err = import_tasks(&store, &path).unwrap_err();
        assert_eq!(err, TransferError::InvalidRecord { index: 1, source: ValidationError::InvalidWorkDuration });
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_expand_home() {
        let home = Path::new("/home/ada");
        assert_eq!(expand_home(Path::new("~/todos.json"), Some(home)), PathBuf::from("/home/ada/todos.json"));
        assert_eq!(expand_home(Path::new("todos.json"), Some(home)), PathBuf::from("todos.json"));
        assert_eq!(expand_home(Path::new("~/x"), None), PathBuf::from("~/x"));
    }
}
