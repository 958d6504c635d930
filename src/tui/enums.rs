//! View modes and the add/edit wizard.

use crate::fields::Priority;
use crate::task::{NewTask, Task, TaskEdit};

/// The active top-level view. Exactly one is active at a time, and data that
/// only makes sense inside a view travels with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Splash screen shown at startup.
    Banner,
    /// Task table with the command line.
    List,
    /// Command and key reference, scrolled by `scroll` lines.
    Help { scroll: u16 },
    AddWizard(Wizard),
    EditWizard(Wizard),
    Pomodoro,
    /// Full view of one task.
    Detail { task_id: i64 },
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Banner => "banner",
            Mode::List => "list",
            Mode::Help { .. } => "help",
            Mode::AddWizard(_) => "add",
            Mode::EditWizard(_) => "edit",
            Mode::Pomodoro => "pomodoro",
            Mode::Detail { .. } => "detail",
        }
    }
}

/// Wizard progression: title, then description, then an optional priority step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Title,
    Description,
    Priority,
}

impl WizardStep {
    pub fn number(self) -> usize {
        match self {
            WizardStep::Title => 1,
            WizardStep::Description => 2,
            WizardStep::Priority => 3,
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            WizardStep::Title => "Enter title",
            WizardStep::Description => "Enter description (optional)",
            WizardStep::Priority => "Choose priority",
        }
    }
}

/// Fields collected so far by the add or edit wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wizard {
    pub step: WizardStep,
    /// Task being edited; `None` when adding.
    pub task_id: Option<i64>,
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

impl Wizard {
    pub fn for_add() -> Self {
        Self {
            step: WizardStep::Title,
            task_id: None,
            title: String::new(),
            description: String::new(),
            priority: Priority::default(),
        }
    }

    /// Prefilled from an existing task.
    pub fn for_edit(task: &Task) -> Self {
        Self {
            step: WizardStep::Title,
            task_id: Some(task.id),
            title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority,
        }
    }

    pub fn is_edit(&self) -> bool {
        self.task_id.is_some()
    }

    pub fn new_task(&self) -> NewTask {
        NewTask::new(self.title.clone(), self.description.clone(), self.priority)
    }

    pub fn edit(&self, id: i64) -> TaskEdit {
        TaskEdit {
            id,
            title: self.title.clone(),
            description: self.description.clone(),
            priority: self.priority,
        }
    }
}
