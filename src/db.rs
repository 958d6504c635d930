//! Task persistence.
//!
//! `TaskStore` is the seam the interactive view and the CLI talk to; it is
//! object-safe and `Send + Sync` so a single store can be shared with the
//! blocking worker threads that execute store effects. `SqliteStore` is the
//! shipped implementation, a single SQLite connection behind a mutex.

use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::error::{StoreError, ValidationError};
use crate::fields::*;
use crate::task::{validate_title, NewTask, Task};

/// Durable task storage with validation.
pub trait TaskStore: Send + Sync {
    /// Insert a task and return its id.
    fn create(&self, task: NewTask) -> Result<i64, StoreError>;

    /// Insert every task or none of them.
    fn create_batch(&self, tasks: Vec<NewTask>) -> Result<Vec<i64>, StoreError>;

    fn get(&self, id: i64) -> Result<Task, StoreError>;

    /// All tasks, newest first.
    fn list(&self) -> Result<Vec<Task>, StoreError>;

    /// Tasks with the given status, newest first.
    fn list_by_status(&self, status: Status) -> Result<Vec<Task>, StoreError>;

    /// Overwrite the editable fields of an existing task.
    fn update(&self, task: &Task) -> Result<(), StoreError>;

    fn delete(&self, id: i64) -> Result<(), StoreError>;

    /// Mark a task completed.
    fn complete(&self, id: i64) -> Result<(), StoreError>;

    /// Add `minutes` (> 0) of recorded work to a task.
    fn add_work_duration(&self, id: i64, minutes: i64) -> Result<(), StoreError>;
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    status INTEGER NOT NULL DEFAULT 0,
    priority INTEGER NOT NULL DEFAULT 1,
    due_date TEXT,
    work_duration INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
CREATE INDEX IF NOT EXISTS idx_tasks_due_date ON tasks(due_date);
CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks(created_at);
";

const SELECT_COLUMNS: &str =
    "SELECT id, title, description, status, priority, due_date, work_duration, created_at, updated_at FROM tasks";

/// SQLite-backed [`TaskStore`].
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database file at `path` and apply the schema.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        let conn = Connection::open(path)?;
        restrict_permissions(path);
        info!(path = %path.display(), "opened task database");
        Self::with_connection(conn)
    }

    /// A private in-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Backend("database connection lock poisoned".to_string()))
    }

    fn query_tasks(&self, status: Option<Status>) -> Result<Vec<Task>, StoreError> {
        let conn = self.conn()?;
        let tasks = match status {
            Some(status) => {
                let sql = format!("{SELECT_COLUMNS} WHERE status = ?1 ORDER BY created_at DESC, id DESC");
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params![i64::from(status)], row_to_task)?;
                rows.collect::<Result<Vec<_>, _>>()?
            },
            None => {
                let sql = format!("{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC");
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map([], row_to_task)?;
                rows.collect::<Result<Vec<_>, _>>()?
            },
        };
        Ok(tasks)
    }
}

impl TaskStore for SqliteStore {
    fn create(&self, task: NewTask) -> Result<i64, StoreError> {
        let task = task.normalised()?;
        let conn = self.conn()?;
        let id = insert_task(&conn, &task, Utc::now())?;
        debug!(id, title = %task.title, "created task");
        Ok(id)
    }

    fn create_batch(&self, tasks: Vec<NewTask>) -> Result<Vec<i64>, StoreError> {
        let tasks = tasks
            .into_iter()
            .map(NewTask::normalised)
            .collect::<Result<Vec<_>, _>>()?;
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let now = Utc::now();
        let mut ids = Vec::with_capacity(tasks.len());
        for task in &tasks {
            ids.push(insert_task(&tx, task, now)?);
        }
        tx.commit()?;
        debug!(count = ids.len(), "created task batch");
        Ok(ids)
    }

    fn get(&self, id: i64) -> Result<Task, StoreError> {
        let conn = self.conn()?;
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        conn.query_row(&sql, params![id], row_to_task)
            .optional()?
            .ok_or(StoreError::NotFound(id))
    }

    fn list(&self) -> Result<Vec<Task>, StoreError> {
        self.query_tasks(None)
    }

    fn list_by_status(&self, status: Status) -> Result<Vec<Task>, StoreError> {
        self.query_tasks(Some(status))
    }

    fn update(&self, task: &Task) -> Result<(), StoreError> {
        let title = validate_title(&task.title)?;
        if task.work_duration < 0 {
            return Err(ValidationError::InvalidWorkDuration.into());
        }
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE tasks SET title = ?1, description = ?2, status = ?3, priority = ?4, due_date = ?5,
                work_duration = ?6, updated_at = ?7 WHERE id = ?8",
            params![
                title,
                task.description.trim(),
                i64::from(task.status),
                i64::from(task.priority),
                task.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
                task.work_duration,
                format_timestamp(Utc::now()),
                task.id,
            ],
        )?;
        expect_one_row(changed, task.id)
    }

    fn delete(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        expect_one_row(changed, id)
    }

    fn complete(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE tasks SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![i64::from(Status::Completed), format_timestamp(Utc::now()), id],
        )?;
        expect_one_row(changed, id)
    }

    fn add_work_duration(&self, id: i64, minutes: i64) -> Result<(), StoreError> {
        if minutes <= 0 {
            return Err(ValidationError::InvalidWorkDuration.into());
        }
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE tasks SET work_duration = work_duration + ?1, updated_at = ?2 WHERE id = ?3",
            params![minutes, format_timestamp(Utc::now()), id],
        )?;
        expect_one_row(changed, id)
    }
}

fn insert_task(conn: &Connection, task: &NewTask, now: DateTime<Utc>) -> Result<i64, StoreError> {
    let ts = format_timestamp(now);
    conn.execute(
        "INSERT INTO tasks (title, description, status, priority, due_date, work_duration, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        params![
            task.title,
            task.description,
            i64::from(task.status),
            i64::from(task.priority),
            task.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
            task.work_duration,
            ts,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn expect_one_row(changed: usize, id: i64) -> Result<(), StoreError> {
    if changed == 0 {
        Err(StoreError::NotFound(id))
    } else {
        Ok(())
    }
}

/// Fixed-precision RFC 3339 so stored timestamps sort lexically.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error(index: usize, err: impl std::error::Error + Send + Sync + 'static) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err))
}

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    let status: i64 = row.get(3)?;
    let priority: i64 = row.get(4)?;
    let due_date: Option<String> = row.get(5)?;
    let created_at: String = row.get(7)?;
    let updated_at: String = row.get(8)?;
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: Status::try_from(status).map_err(|e| conversion_error(3, e))?,
        priority: Priority::try_from(priority).map_err(|e| conversion_error(4, e))?,
        due_date: due_date
            .map(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d"))
            .transpose()
            .map_err(|e| conversion_error(5, e))?,
        work_duration: row.get(6)?,
        created_at: parse_timestamp(&created_at).map_err(|e| conversion_error(7, e))?,
        updated_at: parse_timestamp(&updated_at).map_err(|e| conversion_error(8, e))?,
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|ts| ts.with_timezone(&Utc))
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::warn!(path = %path.display(), error = %e, "could not restrict database permissions");
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    #[test]
    fn test_create_and_get_trims_fields() {
        let store = store();
        let id = store.create(NewTask::new("  Buy milk  ", " 2 litres ", Priority::Medium)).unwrap();
        let task = store.get(id).unwrap();
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.description, "2 litres");
        assert_eq!(task.status, Status::Pending);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.work_duration, 0);
    }

    #[test]
    fn test_create_rejects_empty_title() {
        let store = store();
        let err = store.create(NewTask::new("   ", "", Priority::Low)).unwrap_err();
        assert_eq!(err, StoreError::Validation(ValidationError::EmptyTitle));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_list_newest_first_and_by_status() {
        let store = store();
        let first = store.create(NewTask::new("first", "", Priority::Low)).unwrap();
        let second = store.create(NewTask::new("second", "", Priority::High)).unwrap();
        store.complete(first).unwrap();

        let all: Vec<i64> = store.list().unwrap().iter().map(|t| t.id).collect();
        assert_eq!(all, vec![second, first]);

        let done = store.list_by_status(Status::Completed).unwrap();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].id, first);
        assert_eq!(store.list_by_status(Status::Pending).unwrap()[0].id, second);
    }

    #[test]
    fn test_missing_ids_are_not_found() {
        let store = store();
        assert_eq!(store.get(42).unwrap_err(), StoreError::NotFound(42));
        assert_eq!(store.delete(42).unwrap_err(), StoreError::NotFound(42));
        assert_eq!(store.complete(42).unwrap_err(), StoreError::NotFound(42));
        assert_eq!(store.add_work_duration(42, 5).unwrap_err(), StoreError::NotFound(42));
    }

    #[test]
    fn test_add_work_duration_accumulates() {
        let store = store();
        let id = store.create(NewTask::new("focus", "", Priority::Medium)).unwrap();
        store.add_work_duration(id, 25).unwrap();
        store.add_work_duration(id, 7).unwrap();
        assert_eq!(store.get(id).unwrap().work_duration, 32);
        assert_eq!(
            store.add_work_duration(id, 0).unwrap_err(),
            StoreError::Validation(ValidationError::InvalidWorkDuration)
        );
    }

    #[test]
    fn test_update_keeps_due_date_and_work() {
        let store = store();
        let mut new = NewTask::new("draft", "", Priority::Low);
        new.due_date = NaiveDate::from_ymd_opt(2030, 1, 2);
        let id = store.create(new).unwrap();
        store.add_work_duration(id, 10).unwrap();

        let mut task = store.get(id).unwrap();
        task.title = "final".into();
        task.priority = Priority::High;
        store.update(&task).unwrap();

        let stored = store.get(id).unwrap();
        assert_eq!(stored.title, "final");
        assert_eq!(stored.priority, Priority::High);
        assert_eq!(stored.due_date, NaiveDate::from_ymd_opt(2030, 1, 2));
        assert_eq!(stored.work_duration, 10);
    }

    #[test]
    fn test_batch_is_all_or_nothing() {
        let store = store();
        let batch = vec![NewTask::new("ok", "", Priority::Low), NewTask::new(" ", "", Priority::Low)];
        assert!(store.create_batch(batch).is_err());
        assert!(store.list().unwrap().is_empty());

        let ids = store
            .create_batch(vec![NewTask::new("a", "", Priority::Low), NewTask::new("b", "", Priority::High)])
            .unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn test_open_file_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("koto.db");
        let id = {
            let store = SqliteStore::open(&path).unwrap();
            store.create(NewTask::new("persisted", "", Priority::Medium)).unwrap()
        };
        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.get(id).unwrap().title, "persisted");
    }
}
