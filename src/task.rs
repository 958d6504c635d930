//! Task data structure and related functionality.
//!
//! This module defines the `Task` record owned by the store, the insertable
//! `NewTask` subset and the `TaskEdit` produced by the edit wizard, together
//! with the formatting helpers the list, detail and CLI views share.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::fields::*;

/// Minutes credited for a completed Pomodoro session.
pub const POMODORO_MINUTES: i64 = 25;

/// A stored task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Accumulated focused work in minutes.
    #[serde(default)]
    pub work_duration: i64,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// A pending task past its due date.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == Status::Pending && self.due_date.is_some_and(|due| due < today)
    }

    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }
}

/// Fields supplied when creating a task; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub work_duration: i64,
}

impl NewTask {
    /// A pending task with no recorded work.
    pub fn new(title: impl Into<String>, description: impl Into<String>, priority: Priority) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status: Status::Pending,
            priority,
            due_date: None,
            work_duration: 0,
        }
    }

    /// Trim text fields and check the invariants the store enforces.
    pub fn normalised(mut self) -> Result<Self, ValidationError> {
        self.title = validate_title(&self.title)?;
        self.description = self.description.trim().to_string();
        if self.work_duration < 0 {
            return Err(ValidationError::InvalidWorkDuration);
        }
        Ok(self)
    }
}

/// The fields the edit wizard changes on an existing task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEdit {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

impl TaskEdit {
    /// Apply the edit to a stored task, keeping status, due date and work time.
    pub fn apply_to(&self, task: &mut Task) {
        task.title = self.title.clone();
        task.description = self.description.clone();
        task.priority = self.priority;
    }
}

/// Trimmed title, or an error when nothing is left.
pub fn validate_title(title: &str) -> Result<String, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

/// Compact work time for table cells: `-`, `45m` or `2h 5m`.
pub fn format_work_duration(minutes: i64) -> String {
    if minutes <= 0 {
        return "-".to_string();
    }
    let (hours, mins) = (minutes / 60, minutes % 60);
    if hours == 0 {
        format!("{mins}m")
    } else {
        format!("{hours}h {mins}m")
    }
}

/// Format a creation date for list cells.
pub fn format_date(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

/// Format a timestamp for the detail view.
pub fn format_datetime(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Fixed textual form used for exported timestamps.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}
