//! # koto - terminal task manager
//!
//! A keyboard-driven task list with a built-in Pomodoro timer.
//!
//! ## Quick Start
//!
//! ```bash
//! # Open the interactive interface
//! koto
//!
//! # Print pending tasks
//! koto list --status pending
//!
//! # Back up and restore
//! koto export ~/tasks.json
//! koto import ~/tasks.json
//! ```
//!
//! Inside the interface, type slash commands at the prompt: `/add`, `/edit 3`,
//! `/done 3`, `/delete 3`, `/list --status=completed`, `/pomo 3`,
//! `/export`, `/import FILE`, `/help`, `/exit`. Completing a 25 minute
//! Pomodoro records the time against the task; stopping early records the
//! whole minutes worked.
//!
//! ## Architecture
//!
//! - [`tui::update`] is a pure state machine from a view state and a message
//!   to a new view state and a list of effects.
//! - [`tui::effects`] runs those effects against a [`db::TaskStore`] on the
//!   tokio blocking pool and feeds the results back as messages.
//! - [`tui::view`] renders the view state with ratatui.
//!
//! Data lives in `~/.koto/` (or `$KOTO_HOME`): `koto.db` holds the tasks and
//! `koto.log` the diagnostics.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

pub mod cli;
pub mod cmd;
pub mod config;
pub mod db;
pub mod error;
pub mod fields;
pub mod logging;
pub mod task;
pub mod transfer;
pub mod tui {
    pub mod command;
    pub mod effects;
    pub mod enums;
    pub mod help;
    pub mod input;
    pub mod layout;
    pub mod pomodoro;
    pub mod run;
    pub mod state;
    pub mod theme;
    pub mod update;
    pub mod view;
}

use cli::Cli;
use cmd::*;
use config::Config;
use db::{SqliteStore, TaskStore};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Completions touch neither the data directory nor the database.
    if let Some(Commands::Completions { shell }) = cli.command {
        cmd_completions(shell);
        return Ok(());
    }

    let config = Config::resolve(cli.db)?;
    logging::init_to_file(&config.log_path, cli.log_level)
        .with_context(|| format!("failed to open log file {}", config.log_path.display()))?;
    info!(version = env!("CARGO_PKG_VERSION"), db = %config.db_path.display(), "starting koto");

    let store = SqliteStore::open(&config.db_path)
        .with_context(|| format!("failed to open database {}", config.db_path.display()))?;
    let store: Arc<dyn TaskStore> = Arc::new(store);

    match cli.command.unwrap_or(Commands::Ui) {
        Commands::Ui => cmd_ui(store),
        Commands::List { status } => cmd_list(store.as_ref(), status),
        Commands::Export { output } => cmd_export(store.as_ref(), output),
        Commands::Import { input } => cmd_import(store.as_ref(), &input),
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        },
    }
}
