//! Command implementations for the CLI interface.
//!
//! `ui` (the default) opens the interactive interface; the other subcommands
//! are scriptable shortcuts over the same store.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Subcommand;
use clap_complete::{generate, Shell};
use tracing::info;

use crate::db::TaskStore;
use crate::fields::StatusFilter;
use crate::task::{format_date, format_work_duration, Task};
use crate::transfer::{self, DEFAULT_EXPORT_FILE};
use crate::tui::layout::{ResponsiveLayout, MIN_TERMINAL_WIDTH};
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive interface.
    Ui,

    /// Print tasks as a table.
    List {
        /// Which tasks to show.
        #[arg(long, value_enum, default_value_t = StatusFilter::All)]
        status: StatusFilter,
    },

    /// Export every task to JSON.
    Export {
        /// Output file path (default: tasks_export.json)
        output: Option<PathBuf>,
    },

    /// Import tasks from a JSON export.
    Import {
        /// File produced by `koto export`.
        input: PathBuf,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Launch the interactive terminal user interface.
pub fn cmd_ui(store: std::sync::Arc<dyn TaskStore>) -> anyhow::Result<()> {
    run_tui(store).context("terminal UI failed")
}

/// Print tasks in a table sized to the terminal.
pub fn cmd_list(store: &dyn TaskStore, status: StatusFilter) -> anyhow::Result<()> {
    let tasks = match status.status() {
        Some(s) => store.list_by_status(s)?,
        None => store.list()?,
    };
    if tasks.is_empty() {
        println!("No {} tasks.", status.label());
        return Ok(());
    }
    let width = crossterm::terminal::size().map(|(w, _)| w).unwrap_or(MIN_TERMINAL_WIDTH);
    let layout = ResponsiveLayout::for_width(width.max(MIN_TERMINAL_WIDTH));
    let mut out = io::stdout().lock();
    for line in table_lines(&tasks, &layout) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn table_lines(tasks: &[Task], layout: &ResponsiveLayout) -> Vec<String> {
    let mut lines = Vec::with_capacity(tasks.len() + 1);
    lines.push(layout.format_row(["No.", "Title", "Priority", "Total time", "Created"]));
    for task in tasks {
        let title = if task.is_completed() { format!("✓ {}", task.title) } else { task.title.clone() };
        lines.push(layout.format_row([
            &task.id.to_string(),
            &title,
            task.priority.label(),
            &format_work_duration(task.work_duration),
            &format_date(&task.created_at),
        ]));
    }
    lines
}

/// Export all tasks to a JSON file.
pub fn cmd_export(store: &dyn TaskStore, output: Option<PathBuf>) -> anyhow::Result<()> {
    let path = transfer::resolve_path(&output.unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_FILE)));
    let count = transfer::export_tasks(store, &path)?;
    info!(count, path = %path.display(), "exported from cli");
    println!("Exported {count} tasks to {}", path.display());
    Ok(())
}

/// Import tasks from a JSON file. Nothing is written if any record is invalid.
pub fn cmd_import(store: &dyn TaskStore, input: &Path) -> anyhow::Result<()> {
    let path = transfer::resolve_path(input);
    let count = transfer::import_tasks(store, &path)?;
    info!(count, path = %path.display(), "imported from cli");
    println!("Imported {count} tasks from {}", path.display());
    Ok(())
}

/// Generate shell completions.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteStore;
    use crate::fields::Priority;
    use crate::task::NewTask;
    use crate::tui::layout::display_width;

    #[test]
    fn test_table_lines_align() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.create(NewTask::new("Write report", "", Priority::High)).unwrap();
        store.create(NewTask::new("日本語のとても長いタスクのタイトルです", "", Priority::Low)).unwrap();
        store.complete(1).unwrap();
        let layout = ResponsiveLayout::for_width(MIN_TERMINAL_WIDTH);
        let lines = table_lines(&store.list().unwrap(), &layout);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Total time"));
        assert!(lines.iter().all(|l| display_width(l) == layout.row_width()));
        assert!(lines.iter().any(|l| l.contains("✓ Write report")));
    }

    #[test]
    fn test_export_then_import() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let source = SqliteStore::open_in_memory().unwrap();
        source.create(NewTask::new("a", "", Priority::Medium)).unwrap();
        cmd_export(&source, Some(path.clone())).unwrap();

        let target = SqliteStore::open_in_memory().unwrap();
        cmd_import(&target, &path).unwrap();
        assert_eq!(target.list().unwrap()[0].title, "a");
    }

    #[test]
    fn test_import_missing_file_fails() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = cmd_import(&store, Path::new("/nonexistent/koto.json")).unwrap_err();
        assert!(err.to_string().contains("file not found"));
    }
}
