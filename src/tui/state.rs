//! The view state aggregate and the messages and effects that drive it.

use std::path::PathBuf;

use crossterm::event::KeyEvent;

use crate::error::{AppError, StoreError};
use crate::fields::StatusFilter;
use crate::task::{NewTask, Task, TaskEdit};
use crate::tui::enums::Mode;
use crate::tui::input::InputField;
use crate::tui::pomodoro::Pomodoro;

/// Everything the renderer needs, owned by the event loop.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub mode: Mode,
    /// Snapshot of the store, replaced wholesale on every reload.
    pub tasks: Vec<Task>,
    /// Filter the snapshot was loaded with.
    pub filter: StatusFilter,
    /// Index into `tasks`; 0 when the list is empty.
    pub cursor: usize,
    pub input: InputField,
    pub pomodoro: Pomodoro,
    pub message: Option<String>,
    pub error: Option<String>,
    pub width: u16,
    pub height: u16,
    pub should_quit: bool,
}

impl ViewState {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            mode: Mode::Banner,
            tasks: Vec::new(),
            filter: StatusFilter::All,
            cursor: 0,
            input: InputField::new(),
            pomodoro: Pomodoro::default(),
            message: None,
            error: None,
            width,
            height,
            should_quit: false,
        }
    }

    pub fn selected(&self) -> Option<&Task> {
        self.tasks.get(self.cursor)
    }

    pub fn find_task(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.tasks.len().saturating_sub(1));
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
        self.error = None;
    }

    pub fn set_error(&mut self, error: impl ToString) {
        self.error = Some(error.to_string());
        self.message = None;
    }

    pub fn clear_notices(&mut self) {
        self.message = None;
        self.error = None;
    }
}

/// Inputs to [`crate::tui::update::update`].
#[derive(Debug)]
pub enum Msg {
    Key(KeyEvent),
    Resize { width: u16, height: u16 },
    /// One second of Pomodoro time elapsed for the given session.
    Tick { session: u64 },
    TasksLoaded(Result<Vec<Task>, StoreError>),
    /// A mutating command finished; `Ok` carries the message to show.
    CommandFinished(Result<String, AppError>),
    /// A full session ended and its work was (or failed to be) recorded.
    PomodoroFinished {
        session: u64,
        task_id: Option<i64>,
        result: Result<(), StoreError>,
    },
}

/// Work requested by a transition, executed outside of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadTasks(StatusFilter),
    CreateTask(NewTask),
    UpdateTask(TaskEdit),
    DeleteTask(i64),
    CompleteTask(i64),
    /// Credit an early-stopped session.
    RecordWork { task_id: i64, minutes: i64 },
    /// Credit a full session when it has a target, then report back.
    CompletePomodoro { session: u64, task_id: Option<i64> },
    /// Deliver [`Msg::Tick`] for the session after one second.
    ScheduleTick { session: u64 },
    Export(PathBuf),
    Import(PathBuf),
}
