//! Help screen content and scrolling bounds.

/// One line of the help screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpLine {
    Section(&'static str),
    /// Key or command, then what it does.
    Entry(&'static str, &'static str),
    Blank,
}

use HelpLine::*;

pub const HELP_LINES: &[HelpLine] = &[
    Section("Commands"),
    Entry("/add", "Add a task (title, description, optional priority)"),
    Entry("/edit <id>", "Edit a task"),
    Entry("/done <id>", "Mark a task as completed"),
    Entry("/delete <id>", "Delete a task"),
    Entry("/list [--status=S]", "Filter the list: pending, completed or all"),
    Entry("/pomo [id]", "Start a 25 minute Pomodoro, optionally for a task"),
    Entry("/export [path]", "Export every task to JSON (default tasks_export.json)"),
    Entry("/import <path>", "Import tasks from a JSON export"),
    Entry("/help", "Show this help"),
    Entry("/exit", "Quit"),
    Blank,
    Section("Task list"),
    Entry("Up / k", "Move selection up (k only with an empty command line)"),
    Entry("Down / j", "Move selection down (j only with an empty command line)"),
    Entry("Enter", "Run the command, or open the selected task"),
    Entry("Esc", "Clear the command line"),
    Entry("?", "Show this help"),
    Entry("Ctrl+C", "Quit"),
    Blank,
    Section("Add / edit wizard"),
    Entry("Enter", "Next step, or save on the last step"),
    Entry("Tab", "From the description step, choose a priority"),
    Entry("1 / 2 / 3", "Priority low / medium / high"),
    Entry("Esc", "Back to the title step, or cancel from it"),
    Blank,
    Section("Task details"),
    Entry("e", "Edit"),
    Entry("d", "Mark as completed"),
    Entry("p", "Start a Pomodoro for this task"),
    Entry("Enter / Esc / q", "Back to the list"),
    Blank,
    Section("Pomodoro"),
    Entry("Space", "Pause or resume"),
    Entry("Enter", "Stop and record whole minutes worked"),
    Entry("Esc", "Cancel and record whole minutes worked"),
    Blank,
    Section("This screen"),
    Entry("Up / k, Down / j", "Scroll one line"),
    Entry("PgUp / b, PgDn / f / Space", "Scroll one page"),
    Entry("g / G", "Jump to top / bottom"),
    Entry("q / Esc / ?", "Back to the list"),
];

/// Rows available for help content: the screen minus title and footer.
pub fn visible_rows(height: u16) -> usize {
    usize::from(height).saturating_sub(4).max(1)
}

pub fn max_scroll(height: u16) -> u16 {
    let max = HELP_LINES.len().saturating_sub(visible_rows(height));
    u16::try_from(max).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tall_terminal_needs_no_scroll() {
        assert_eq!(max_scroll(200), 0);
    }

    #[test]
    fn test_short_terminal_scrolls_to_last_line() {
        let height = 20;
        let max = usize::from(max_scroll(height));
        assert_eq!(max + visible_rows(height), HELP_LINES.len());
    }
}
