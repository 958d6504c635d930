//! State transitions.
//!
//! `update` is the only place the view state changes. It never touches the
//! store or the clock; anything asynchronous is returned as an [`Effect`] and
//! comes back later as a [`Msg`].

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::fields::Priority;
use crate::task::{validate_title, POMODORO_MINUTES};
use crate::transfer::DEFAULT_EXPORT_FILE;
use crate::tui::command::{parse_command, Command};
use crate::tui::enums::{Mode, Wizard, WizardStep};
use crate::tui::help;
use crate::tui::input::InputField;
use crate::tui::pomodoro::TickOutcome;
use crate::tui::state::{Effect, Msg, ViewState};

/// Apply one message, returning the next state and the effects to run.
pub fn update(mut state: ViewState, msg: Msg) -> (ViewState, Vec<Effect>) {
    let from = state.mode.name();
    let effects = match msg {
        Msg::Key(key) => handle_key(&mut state, key),
        Msg::Resize { width, height } => {
            state.width = width;
            state.height = height;
            if let Mode::Help { scroll } = &mut state.mode {
                *scroll = (*scroll).min(help::max_scroll(height));
            }
            Vec::new()
        },
        Msg::Tick { session } => handle_tick(&mut state, session),
        Msg::TasksLoaded(Ok(tasks)) => {
            debug!(count = tasks.len(), "task snapshot replaced");
            state.tasks = tasks;
            state.clamp_cursor();
            Vec::new()
        },
        Msg::TasksLoaded(Err(e)) => {
            warn!(error = %e, "loading tasks failed");
            state.set_error(format!("failed to load tasks: {e}"));
            Vec::new()
        },
        Msg::CommandFinished(result) => {
            match result {
                Ok(message) => state.set_message(message),
                Err(e) => state.set_error(e),
            }
            vec![Effect::LoadTasks(state.filter)]
        },
        Msg::PomodoroFinished { session, task_id, result } => {
            // A report from an earlier session must not close the running one.
            if matches!(state.mode, Mode::Pomodoro) && state.pomodoro.session == session && state.pomodoro.completed {
                state.mode = Mode::List;
            }
            match (task_id, result) {
                (Some(id), Ok(())) => state.set_message(format!(
                    "Pomodoro completed! {POMODORO_MINUTES} minutes recorded for task #{id}"
                )),
                (None, Ok(())) => state.set_message("Pomodoro completed!"),
                (_, Err(e)) => state.set_error(format!("Pomodoro completed, but recording work failed: {e}")),
            }
            vec![Effect::LoadTasks(state.filter)]
        },
    };
    let to = state.mode.name();
    if to != from {
        debug!(from, to, "mode changed");
    }
    (state, effects)
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

fn has_ctrl(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
}

fn handle_key(state: &mut ViewState, key: KeyEvent) -> Vec<Effect> {
    if key.kind == KeyEventKind::Release {
        return Vec::new();
    }
    state.clear_notices();

    // From help, Ctrl+C only closes the help screen.
    if is_ctrl_c(&key) && !matches!(state.mode, Mode::Help { .. }) {
        state.should_quit = true;
        return Vec::new();
    }

    match state.mode {
        Mode::Banner => {
            state.mode = Mode::List;
            Vec::new()
        },
        Mode::List => handle_list_key(state, key),
        Mode::Help { scroll } => {
            handle_help_key(state, scroll, key);
            Vec::new()
        },
        Mode::AddWizard(_) | Mode::EditWizard(_) => handle_wizard_key(state, key),
        Mode::Pomodoro => handle_pomodoro_key(state, key),
        Mode::Detail { task_id } => handle_detail_key(state, task_id, key),
    }
}

/// Line-editing keys shared by the command line and the wizards.
fn edit_input(input: &mut InputField, key: &KeyEvent) {
    match key.code {
        KeyCode::Char(c) if !has_ctrl(key) => input.handle_char(c),
        KeyCode::Backspace => input.handle_backspace(),
        KeyCode::Delete => input.handle_delete(),
        KeyCode::Left => input.move_cursor_left(),
        KeyCode::Right => input.move_cursor_right(),
        KeyCode::Home => input.move_home(),
        KeyCode::End => input.move_end(),
        _ => {},
    }
}

fn handle_list_key(state: &mut ViewState, key: KeyEvent) -> Vec<Effect> {
    let line_empty = state.input.is_empty();
    match key.code {
        KeyCode::Up => move_cursor(state, -1),
        KeyCode::Down => move_cursor(state, 1),
        KeyCode::Char('k') if line_empty && !has_ctrl(&key) => move_cursor(state, -1),
        KeyCode::Char('j') if line_empty && !has_ctrl(&key) => move_cursor(state, 1),
        KeyCode::Char('?') if line_empty => state.mode = Mode::Help { scroll: 0 },
        KeyCode::Esc => state.input.clear(),
        KeyCode::Enter => return submit_line(state),
        _ => edit_input(&mut state.input, &key),
    }
    Vec::new()
}

fn move_cursor(state: &mut ViewState, delta: isize) {
    if state.tasks.is_empty() {
        state.cursor = 0;
        return;
    }
    let last = state.tasks.len() - 1;
    state.cursor = state.cursor.saturating_add_signed(delta).min(last);
}

fn submit_line(state: &mut ViewState) -> Vec<Effect> {
    let line = state.input.take();
    if line.trim().is_empty() {
        if let Some(task_id) = state.selected().map(|t| t.id) {
            state.mode = Mode::Detail { task_id };
        }
        return Vec::new();
    }
    match parse_command(&line) {
        Ok(command) => {
            debug!(?command, "running command");
            run_command(state, command)
        },
        Err(e) => {
            state.set_error(e);
            Vec::new()
        },
    }
}

fn run_command(state: &mut ViewState, command: Command) -> Vec<Effect> {
    match command {
        Command::Add => {
            state.mode = Mode::AddWizard(Wizard::for_add());
            state.input.clear();
            Vec::new()
        },
        Command::Edit(id) => {
            open_edit(state, id);
            Vec::new()
        },
        Command::Pomodoro(target) => start_pomodoro(state, target),
        Command::Delete(id) => vec![Effect::DeleteTask(id)],
        Command::Done(id) => vec![Effect::CompleteTask(id)],
        Command::List(filter) => {
            state.filter = filter;
            state.cursor = 0;
            state.set_message(format!("Showing {} tasks", filter.label()));
            vec![Effect::LoadTasks(filter)]
        },
        Command::Export(path) => {
            vec![Effect::Export(path.unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_FILE)))]
        },
        Command::Import(path) => vec![Effect::Import(path)],
        Command::Help => {
            state.mode = Mode::Help { scroll: 0 };
            Vec::new()
        },
        Command::Exit => {
            state.should_quit = true;
            Vec::new()
        },
    }
}

/// Enter the edit wizard for a cached task, or report it missing.
fn open_edit(state: &mut ViewState, id: i64) {
    match state.find_task(id).map(Wizard::for_edit) {
        Some(wizard) => {
            state.input.set(&wizard.title);
            state.mode = Mode::EditWizard(wizard);
        },
        None => state.set_error(StoreError::NotFound(id)),
    }
}

fn start_pomodoro(state: &mut ViewState, target: Option<i64>) -> Vec<Effect> {
    if let Some(id) = target {
        if state.find_task(id).is_none() {
            state.set_error(StoreError::NotFound(id));
            return Vec::new();
        }
    }
    state.pomodoro = state.pomodoro.restart(target);
    state.mode = Mode::Pomodoro;
    state.input.clear();
    debug!(task_id = ?target, session = state.pomodoro.session, "pomodoro started");
    vec![Effect::ScheduleTick { session: state.pomodoro.session }]
}

fn handle_tick(state: &mut ViewState, session: u64) -> Vec<Effect> {
    if !matches!(state.mode, Mode::Pomodoro) {
        return Vec::new();
    }
    match state.pomodoro.tick(session) {
        TickOutcome::Ignored => Vec::new(),
        TickOutcome::Continue => vec![Effect::ScheduleTick { session }],
        TickOutcome::Finished => vec![Effect::CompletePomodoro { session, task_id: state.pomodoro.task_id }],
    }
}

fn handle_pomodoro_key(state: &mut ViewState, key: KeyEvent) -> Vec<Effect> {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => {
            let completed = state.pomodoro.completed;
            let work = state.pomodoro.stop();
            state.mode = Mode::List;
            if completed {
                // The completion report is already on its way.
                return Vec::new();
            }
            let verb = if key.code == KeyCode::Esc { "cancelled" } else { "stopped" };
            state.set_message(format!("Pomodoro {verb}"));
            match work {
                Some(work) => vec![Effect::RecordWork { task_id: work.task_id, minutes: work.minutes }],
                None => vec![Effect::LoadTasks(state.filter)],
            }
        },
        KeyCode::Char(' ') | KeyCode::Char('p') => {
            if state.pomodoro.running {
                state.pomodoro.pause();
                Vec::new()
            } else {
                state
                    .pomodoro
                    .resume()
                    .map(|session| vec![Effect::ScheduleTick { session }])
                    .unwrap_or_default()
            }
        },
        _ => Vec::new(),
    }
}

fn handle_detail_key(state: &mut ViewState, task_id: i64, key: KeyEvent) -> Vec<Effect> {
    match key.code {
        KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q') => {
            state.mode = Mode::List;
            Vec::new()
        },
        KeyCode::Char('e') => {
            state.mode = Mode::List;
            open_edit(state, task_id);
            Vec::new()
        },
        KeyCode::Char('d') => {
            state.mode = Mode::List;
            vec![Effect::CompleteTask(task_id)]
        },
        KeyCode::Char('p') => {
            state.mode = Mode::List;
            start_pomodoro(state, Some(task_id))
        },
        _ => Vec::new(),
    }
}

fn handle_help_key(state: &mut ViewState, scroll: u16, key: KeyEvent) {
    let page = u16::try_from(help::visible_rows(state.height)).unwrap_or(u16::MAX);
    let max = help::max_scroll(state.height);
    let next = match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            state.mode = Mode::List;
            return;
        },
        KeyCode::Char('c') if has_ctrl(&key) => {
            state.mode = Mode::List;
            return;
        },
        KeyCode::Up | KeyCode::Char('k') => scroll.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => scroll.saturating_add(1),
        KeyCode::PageUp | KeyCode::Char('b') => scroll.saturating_sub(page),
        KeyCode::PageDown | KeyCode::Char('f') | KeyCode::Char(' ') => scroll.saturating_add(page),
        KeyCode::Home | KeyCode::Char('g') => 0,
        KeyCode::End | KeyCode::Char('G') => max,
        _ => scroll,
    };
    state.mode = Mode::Help { scroll: next.min(max) };
}

/// What a key did to the wizard.
enum WizardOutcome {
    Stay,
    Cancel,
    Submit,
}

fn handle_wizard_key(state: &mut ViewState, key: KeyEvent) -> Vec<Effect> {
    let mut wizard = match std::mem::replace(&mut state.mode, Mode::List) {
        Mode::AddWizard(wizard) | Mode::EditWizard(wizard) => wizard,
        other => {
            state.mode = other;
            return Vec::new();
        },
    };

    match wizard_key(state, &mut wizard, &key) {
        WizardOutcome::Stay => {
            state.mode = if wizard.is_edit() { Mode::EditWizard(wizard) } else { Mode::AddWizard(wizard) };
            Vec::new()
        },
        WizardOutcome::Cancel => {
            state.input.clear();
            state.set_message(if wizard.is_edit() { "Edit cancelled" } else { "Add task cancelled" });
            Vec::new()
        },
        WizardOutcome::Submit => {
            state.input.clear();
            let effect = match wizard.task_id {
                Some(id) => Effect::UpdateTask(wizard.edit(id)),
                None => Effect::CreateTask(wizard.new_task()),
            };
            vec![effect]
        },
    }
}

fn wizard_key(state: &mut ViewState, wizard: &mut Wizard, key: &KeyEvent) -> WizardOutcome {
    match (wizard.step, key.code) {
        (WizardStep::Title, KeyCode::Esc) => WizardOutcome::Cancel,
        (_, KeyCode::Esc) => {
            wizard.step = WizardStep::Title;
            state.input.set(&wizard.title);
            WizardOutcome::Stay
        },
        (WizardStep::Title, KeyCode::Enter) => {
            match validate_title(&state.input.value) {
                Ok(title) => {
                    wizard.title = title;
                    wizard.step = WizardStep::Description;
                    state.input.set(&wizard.description);
                },
                Err(e) => state.set_error(e),
            }
            WizardOutcome::Stay
        },
        (WizardStep::Description, KeyCode::Enter) => {
            wizard.description = state.input.value.trim().to_string();
            WizardOutcome::Submit
        },
        (WizardStep::Description, KeyCode::Tab) => {
            wizard.description = state.input.value.trim().to_string();
            wizard.step = WizardStep::Priority;
            state.input.clear();
            WizardOutcome::Stay
        },
        (WizardStep::Priority, KeyCode::Enter) => WizardOutcome::Submit,
        (WizardStep::Priority, code) => {
            wizard.priority = match code {
                KeyCode::Char('1') => Priority::Low,
                KeyCode::Char('2') => Priority::Medium,
                KeyCode::Char('3') => Priority::High,
                KeyCode::Left | KeyCode::Up => wizard.priority.prev(),
                KeyCode::Right | KeyCode::Down => wizard.priority.next(),
                _ => wizard.priority,
            };
            WizardOutcome::Stay
        },
        _ => {
            edit_input(&mut state.input, key);
            WizardOutcome::Stay
        },
    }
}
