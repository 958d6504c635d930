//! Slash-command parsing for the list view input line.

use std::path::PathBuf;

use thiserror::Error;

use crate::fields::StatusFilter;

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add,
    Edit(i64),
    /// Start a Pomodoro session, optionally tied to a task.
    Pomodoro(Option<i64>),
    Delete(i64),
    Done(i64),
    List(StatusFilter),
    /// Export to the given file, or the default export file.
    Export(Option<PathBuf>),
    Import(PathBuf),
    Help,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("commands must start with /")]
    NotACommand,
    #[error("unknown command: /{0}")]
    UnknownCommand(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("invalid task ID: {0}")]
    InvalidId(String),
    #[error("invalid status '{0}' (use: pending, completed, all)")]
    InvalidStatus(String),
}

const EDIT_USAGE: &str = "/edit <id>";
const POMO_USAGE: &str = "/pomo [id]";
const DELETE_USAGE: &str = "/delete <id>";
const DONE_USAGE: &str = "/done <id>";
const LIST_USAGE: &str = "/list [--status=pending|completed|all]";
const EXPORT_USAGE: &str = "/export [path]";
const IMPORT_USAGE: &str = "/import <path>";

/// Parse one input line. Pure: no store access, no side effects.
pub fn parse_command(line: &str) -> Result<Command, ParseError> {
    let body = line.trim().strip_prefix('/').ok_or(ParseError::NotACommand)?;
    let mut parts = body.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    match name {
        "add" => no_args(&args, "/add").map(|_| Command::Add),
        "edit" => single_id(&args, EDIT_USAGE).map(Command::Edit),
        "pomo" => match args.as_slice() {
            [] => Ok(Command::Pomodoro(None)),
            [id] => parse_id(id).map(|id| Command::Pomodoro(Some(id))),
            _ => Err(ParseError::Usage(POMO_USAGE)),
        },
        "delete" => single_id(&args, DELETE_USAGE).map(Command::Delete),
        "done" => single_id(&args, DONE_USAGE).map(Command::Done),
        "list" => match args.as_slice() {
            [] => Ok(Command::List(StatusFilter::All)),
            [flag] => {
                let value = flag.strip_prefix("--status=").ok_or(ParseError::Usage(LIST_USAGE))?;
                parse_status(value).map(Command::List)
            },
            _ => Err(ParseError::Usage(LIST_USAGE)),
        },
        "export" => match args.as_slice() {
            [] => Ok(Command::Export(None)),
            [path] => Ok(Command::Export(Some(PathBuf::from(path)))),
            _ => Err(ParseError::Usage(EXPORT_USAGE)),
        },
        "import" => match args.as_slice() {
            [path] => Ok(Command::Import(PathBuf::from(path))),
            _ => Err(ParseError::Usage(IMPORT_USAGE)),
        },
        "help" => no_args(&args, "/help").map(|_| Command::Help),
        "exit" | "quit" => no_args(&args, "/exit").map(|_| Command::Exit),
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}

fn no_args(args: &[&str], usage: &'static str) -> Result<(), ParseError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(ParseError::Usage(usage))
    }
}

fn single_id(args: &[&str], usage: &'static str) -> Result<i64, ParseError> {
    match args {
        [id] => parse_id(id),
        _ => Err(ParseError::Usage(usage)),
    }
}

fn parse_id(raw: &str) -> Result<i64, ParseError> {
    raw.parse().map_err(|_| ParseError::InvalidId(raw.to_string()))
}

fn parse_status(raw: &str) -> Result<StatusFilter, ParseError> {
    match raw {
        "all" => Ok(StatusFilter::All),
        "pending" => Ok(StatusFilter::Pending),
        "completed" => Ok(StatusFilter::Completed),
        other => Err(ParseError::InvalidStatus(other.to_string())),
    }
}
