//! TUI entry point, terminal setup and the event loop.

use std::{io, sync::Arc, thread, time::Duration};

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen}
};
use ratatui::{prelude::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info, warn};

use crate::db::TaskStore;
use crate::fields::StatusFilter;
use crate::tui::effects::EffectRunner;
use crate::tui::state::{Effect, Msg, ViewState};
use crate::tui::theme::Theme;
use crate::tui::{update::update, view};

const INPUT_POLL: Duration = Duration::from_millis(50);
/// How long pending store writes may run after the user quits.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Initialise and run the terminal user interface until the user quits.
pub fn run_tui(store: Arc<dyn TaskStore>) -> io::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    let entered = execute!(stdout, EnterAlternateScreen)
        .and_then(|()| Terminal::new(CrosstermBackend::new(stdout)));
    let mut terminal = undo_on_error(entered, abandon_terminal_setup)?;

    let result = runtime.block_on(event_loop(&mut terminal, store));

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    result
}

/// Run `undo` when a setup step failed, then pass the result through.
fn undo_on_error<T>(result: io::Result<T>, undo: impl FnOnce()) -> io::Result<T> {
    if result.is_err() {
        undo();
    }
    result
}

/// Put the terminal back after a failed setup. Errors are logged, the setup error wins.
fn abandon_terminal_setup() {
    if let Err(e) = execute!(io::stdout(), LeaveAlternateScreen) {
        warn!(error = %e, "could not leave alternate screen");
    }
    if let Err(e) = disable_raw_mode() {
        warn!(error = %e, "could not disable raw mode");
    }
}

fn theme_from_env() -> Theme {
    if std::env::var_os("NO_COLOR").is_some() {
        Theme::plain()
    } else {
        Theme::default()
    }
}

async fn event_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    store: Arc<dyn TaskStore>,
) -> io::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    spawn_input_reader(tx.clone());

    let runner = EffectRunner::new(store, tx);
    let theme = theme_from_env();
    let size = terminal.size()?;
    let mut state = ViewState::new(size.width, size.height);
    info!(width = size.width, height = size.height, "tui started");

    runner.dispatch(Effect::LoadTasks(StatusFilter::All));

    loop {
        terminal.draw(|frame| view::draw(frame, &state, &theme))?;
        if state.should_quit {
            break;
        }
        let Some(msg) = rx.recv().await else {
            break;
        };
        let (next, effects) = update(state, msg);
        state = next;
        for effect in effects {
            runner.dispatch(effect);
        }
    }

    info!("tui stopped");
    Ok(())
}

/// Forward key presses and resizes from a dedicated thread. The thread exits
/// once the event loop drops its receiver.
fn spawn_input_reader(tx: UnboundedSender<Msg>) {
    thread::spawn(move || {
        if let Err(e) = read_input(&tx) {
            warn!(error = %e, "input reader stopped");
        }
    });
}

fn read_input(tx: &UnboundedSender<Msg>) -> io::Result<()> {
    while !tx.is_closed() {
        if !event::poll(INPUT_POLL)? {
            continue;
        }
        let msg = match event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => Msg::Key(key),
            Event::Resize(width, height) => Msg::Resize { width, height },
            _ => continue,
        };
        if tx.send(msg).is_err() {
            break;
        }
    }
    debug!("input reader finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_failed_setup_is_undone() {
        let undone = Cell::new(false);
        let result: io::Result<()> = undo_on_error(Err(io::Error::other("no tty")), || undone.set(true));
        assert_eq!(result.unwrap_err().to_string(), "no tty");
        assert!(undone.get());
    }

    #[test]
    fn test_successful_setup_is_kept() {
        let undone = Cell::new(false);
        assert_eq!(undo_on_error(Ok(7), || undone.set(true)).unwrap(), 7);
        assert!(!undone.get());
    }
}
