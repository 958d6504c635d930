//! Error types shared across the store, transfer and UI layers.
//!
//! Each layer owns one `thiserror` enum; `AppError` joins the two that can be
//! reported back to the interactive view as the result of a command.

use std::path::PathBuf;

use thiserror::Error;

/// Field-level validation failures detected before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title cannot be empty")]
    EmptyTitle,
    #[error("invalid priority code {0} (expected 0, 1 or 2)")]
    InvalidPriority(i64),
    #[error("invalid status code {0} (expected 0 or 1)")]
    InvalidStatus(i64),
    #[error("work duration must be positive")]
    InvalidWorkDuration,
}

/// Failures reported by a [`crate::db::TaskStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("task #{0} not found")]
    NotFound(i64),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("storage error: {0}")]
    Backend(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Failures while exporting to or importing from a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("invalid JSON format: {0}")]
    InvalidJson(String),
    #[error("record {index}: {source}")]
    InvalidRecord { index: usize, source: ValidationError },
    #[error("failed to access {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Any failure a background command can report to the view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Transfer(#[from] TransferError),
}
