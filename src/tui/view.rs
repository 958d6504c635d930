//! Frame rendering.
//!
//! `render` maps a view state to styled text and never mutates anything.
//! Every measurement goes through [`crate::tui::layout`], so wide characters
//! keep the table columns aligned.

use chrono::Utc;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::fields::Priority;
use crate::task::{format_date, format_datetime, format_work_duration, Task};
use crate::tui::enums::{Mode, Wizard, WizardStep};
use crate::tui::help::{self, HelpLine, HELP_LINES};
use crate::tui::layout::*;
use crate::tui::state::ViewState;
use crate::tui::theme::Theme;

const INDENT: &str = "  ";
const BANNER_RECENT: usize = 5;
const BANNER_TITLE_WIDTH: usize = 22;
/// Lines of the list view that are not task rows.
const LIST_CHROME: usize = 8;

const LOGO: [&str; 6] = [
    "██╗  ██╗ ██████╗ ████████╗ ██████╗ ",
    "██║ ██╔╝██╔═══██╗╚══██╔══╝██╔═══██╗",
    "█████╔╝ ██║   ██║   ██║   ██║   ██║",
    "██╔═██╗ ██║   ██║   ██║   ██║   ██║",
    "██║  ██╗╚██████╔╝   ██║   ╚██████╔╝",
    "╚═╝  ╚═╝ ╚═════╝    ╚═╝    ╚═════╝ ",
];

/// Draw the whole screen.
pub fn draw(frame: &mut Frame, state: &ViewState, theme: &Theme) {
    frame.render_widget(Paragraph::new(render(state, theme)), frame.area());
}

/// Build the text for the current state.
pub fn render(state: &ViewState, theme: &Theme) -> Text<'static> {
    let layout = ResponsiveLayout::for_width(state.width);
    if state.should_quit {
        return Text::from(vec![Line::default(), line("Goodbye!", theme.muted)]);
    }
    if layout.is_too_narrow() {
        return Text::from(narrow_view(state, theme));
    }
    let lines = match &state.mode {
        Mode::Banner => banner_view(state, &layout, theme),
        Mode::List => list_view(state, &layout, theme),
        Mode::Help { scroll } => help_view(state, *scroll, &layout, theme),
        Mode::AddWizard(wizard) | Mode::EditWizard(wizard) => wizard_view(state, wizard, &layout, theme),
        Mode::Pomodoro => pomodoro_view(state, &layout, theme),
        Mode::Detail { task_id } => detail_view(state, *task_id, &layout, theme),
    };
    Text::from(lines)
}

fn line(text: impl Into<String>, style: Style) -> Line<'static> {
    Line::from(vec![Span::raw(INDENT), Span::styled(text.into(), style)])
}

fn centered(text: &str, width: usize, style: Style) -> Line<'static> {
    Line::styled(center(text, width), style)
}

fn push_notices(lines: &mut Vec<Line<'static>>, state: &ViewState, layout: &ResponsiveLayout, theme: &Theme) {
    if let Some(message) = &state.message {
        lines.push(line(truncate(message, layout.content_width), theme.message));
    }
    if let Some(error) = &state.error {
        lines.push(line(truncate(&format!("Error: {error}"), layout.content_width), theme.error));
    }
}

fn narrow_view(state: &ViewState, theme: &Theme) -> Vec<Line<'static>> {
    vec![
        Line::default(),
        Line::styled(
            format!("Terminal too narrow: {} columns (need at least {MIN_TERMINAL_WIDTH}).", state.width),
            theme.error,
        ),
        Line::styled("Widen the window, or press Ctrl+C to quit.", theme.muted),
    ]
}

fn banner_view(state: &ViewState, layout: &ResponsiveLayout, theme: &Theme) -> Vec<Line<'static>> {
    let width = layout.terminal_width;
    let mut lines = vec![Line::default()];
    lines.extend(LOGO.iter().map(|row| centered(row, width, theme.title)));
    lines.push(Line::default());
    lines.push(centered("✨ Your terminal task manager with a Pomodoro timer ✨", width, theme.text));
    lines.push(centered(&format!("v{}", env!("CARGO_PKG_VERSION")), width, theme.muted));
    lines.push(Line::default());

    if state.tasks.is_empty() {
        lines.push(centered("No tasks yet. Type /add to create your first one.", width, theme.muted));
    } else {
        lines.push(centered("Recent tasks", width, theme.header));
        for task in state.tasks.iter().take(BANNER_RECENT) {
            let entry = format!("• {}", pad(&truncate(&task.title, BANNER_TITLE_WIDTH), BANNER_TITLE_WIDTH));
            lines.push(centered(&entry, width, theme.text));
        }
        let more = state.tasks.len().saturating_sub(BANNER_RECENT);
        if more > 0 {
            lines.push(centered(&format!("+ {more} more tasks..."), width, theme.muted));
        }
    }
    lines.push(Line::default());
    lines.push(centered("Press any key to continue...", width, theme.muted));
    push_notices(&mut lines, state, layout, theme);
    lines
}

fn table_header(layout: &ResponsiveLayout) -> String {
    layout.format_row(["No.", "Title", "Priority", "Total time", "Created"])
}

fn task_row(task: &Task, layout: &ResponsiveLayout, theme: &Theme, selected: bool) -> Line<'static> {
    let title = if task.is_completed() { format!("✓ {}", task.title) } else { task.title.clone() };
    let title_style = if task.is_completed() {
        theme.completed
    } else if task.is_overdue(Utc::now().date_naive()) {
        theme.overdue
    } else {
        theme.text
    };
    let spans = vec![
        Span::raw(INDENT),
        Span::raw(" "),
        Span::raw(fit(&task.id.to_string(), ID_WIDTH)),
        Span::raw("   "),
        Span::styled(fit(&title, layout.title_width), title_style),
        Span::raw("   "),
        Span::styled(fit(task.priority.label(), PRIORITY_WIDTH), theme.priority(task.priority)),
        Span::raw("   "),
        Span::raw(fit(&format_work_duration(task.work_duration), WORK_TIME_WIDTH)),
        Span::raw("   "),
        Span::raw(fit(&format_date(&task.created_at), DATE_WIDTH)),
        Span::raw(" "),
    ];
    let row = Line::from(spans);
    if selected {
        row.style(theme.selected)
    } else {
        row
    }
}

fn input_line(state: &ViewState, prompt: &str, theme: &Theme) -> Line<'static> {
    let (before, after) = state.input.split_at_cursor();
    let mut rest = after.chars();
    let caret = rest.next().map_or_else(|| " ".to_string(), |c| c.to_string());
    Line::from(vec![
        Span::raw(INDENT),
        Span::styled(prompt.to_string(), theme.title),
        Span::raw(before.to_string()),
        Span::styled(caret, Style::default().add_modifier(Modifier::REVERSED)),
        Span::raw(rest.as_str().to_string()),
    ])
}

fn list_view(state: &ViewState, layout: &ResponsiveLayout, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let filter = match state.filter.status() {
        Some(_) => format!(" ({})", state.filter.label()),
        None => String::new(),
    };
    let count = if state.tasks.is_empty() {
        String::new()
    } else {
        format!("  {}/{}", state.cursor + 1, state.tasks.len())
    };
    lines.push(line(format!("📝 Tasks{filter}{count}"), theme.title));
    lines.push(Line::default());

    if state.tasks.is_empty() {
        lines.push(line("No tasks yet. Type /add to create your first task!", theme.muted));
    } else {
        lines.push(Line::styled(format!("{INDENT}{}", table_header(layout)), theme.header));
        let capacity = usize::from(state.height).saturating_sub(LIST_CHROME).max(1);
        for index in visible_window(state.tasks.len(), state.cursor, capacity) {
            lines.push(task_row(&state.tasks[index], layout, theme, index == state.cursor));
        }
    }

    lines.push(Line::default());
    lines.push(input_line(state, "> ", theme));
    push_notices(&mut lines, state, layout, theme);
    let hints = "/add · /edit <id> · /done <id> · /delete <id> · /pomo [id] · /list · /help · /exit · ↑↓ move · Enter open · ? help";
    lines.push(line(truncate(hints, layout.content_width), theme.muted));
    lines
}

fn help_view(state: &ViewState, scroll: u16, layout: &ResponsiveLayout, theme: &Theme) -> Vec<Line<'static>> {
    let key_width = 28;
    let desc_width = layout.content_width.saturating_sub(key_width + 2);
    let mut lines = vec![line("Help", theme.title), Line::default()];
    let visible = help::visible_rows(state.height);
    for entry in HELP_LINES.iter().skip(usize::from(scroll)).take(visible) {
        lines.push(match entry {
            HelpLine::Section(title) => line(*title, theme.header),
            HelpLine::Entry(key, desc) => Line::from(vec![
                Span::raw(INDENT),
                Span::raw("  "),
                Span::styled(fit(key, key_width), theme.title),
                Span::raw(truncate(desc, desc_width)),
            ]),
            HelpLine::Blank => Line::default(),
        });
    }
    lines.push(Line::default());
    let last = (usize::from(scroll) + visible).min(HELP_LINES.len());
    let footer = format!(
        "↑/↓ scroll · PgUp/PgDn page · g/G top/bottom · q back   lines {}-{} of {}",
        usize::from(scroll) + 1,
        last,
        HELP_LINES.len()
    );
    lines.push(line(truncate(&footer, layout.content_width), theme.muted));
    lines
}

fn wizard_view(state: &ViewState, wizard: &Wizard, layout: &ResponsiveLayout, theme: &Theme) -> Vec<Line<'static>> {
    let heading = match wizard.task_id {
        Some(id) => format!("Edit Task #{id}"),
        None => "Add New Task".to_string(),
    };
    let field_width = layout.content_width.saturating_sub(16).max(40);
    let mut lines = vec![
        line(heading, theme.title),
        line(
            format!("Step {} of 3: {}", wizard.step.number(), wizard.step.prompt()),
            theme.muted,
        ),
        Line::default(),
    ];

    let field = |label: &str, value: &str, style: Style| {
        Line::from(vec![
            Span::raw(INDENT),
            Span::styled(fit(label, 14), theme.header),
            Span::styled(truncate(value, field_width), style),
        ])
    };
    match wizard.step {
        WizardStep::Title => {},
        WizardStep::Description => lines.push(field("Title", &wizard.title, theme.text)),
        WizardStep::Priority => {
            lines.push(field("Title", &wizard.title, theme.text));
            let description = if wizard.description.is_empty() { "(none)" } else { wizard.description.as_str() };
            lines.push(field("Description", description, theme.muted));
        },
    }

    if wizard.step == WizardStep::Priority {
        let mut spans = vec![Span::raw(INDENT), Span::styled(fit("Priority", 14), theme.header)];
        for (n, priority) in Priority::ALL.iter().enumerate() {
            let label = format!("[{}] {}", n + 1, priority.label());
            let style = if *priority == wizard.priority {
                theme.priority(*priority).add_modifier(Modifier::REVERSED)
            } else {
                theme.muted
            };
            spans.push(Span::styled(label, style));
            spans.push(Span::raw("  "));
        }
        lines.push(Line::from(spans));
    } else {
        lines.push(field("Priority", wizard.priority.label(), theme.priority(wizard.priority)));
        lines.push(Line::default());
        lines.push(input_line(state, &format!("{} > ", step_label(wizard.step)), theme));
    }

    lines.push(Line::default());
    push_notices(&mut lines, state, layout, theme);
    let hint = match wizard.step {
        WizardStep::Title => "Enter: next · Esc: cancel",
        WizardStep::Description => "Enter: save · Tab: choose priority · Esc: back to title",
        WizardStep::Priority => "1/2/3 or ←/→: choose · Enter: save · Esc: back to title",
    };
    lines.push(line(hint, theme.muted));
    lines
}

fn step_label(step: WizardStep) -> &'static str {
    match step {
        WizardStep::Title => "Title",
        WizardStep::Description => "Description",
        WizardStep::Priority => "Priority",
    }
}

/// Five-row block glyph for a clock character.
fn glyph(c: char) -> [&'static str; 5] {
    match c {
        '0' => ["█████", "█   █", "█   █", "█   █", "█████"],
        '1' => ["  █  ", " ██  ", "  █  ", "  █  ", " ███ "],
        '2' => ["█████", "    █", "█████", "█    ", "█████"],
        '3' => ["█████", "    █", "█████", "    █", "█████"],
        '4' => ["█   █", "█   █", "█████", "    █", "    █"],
        '5' => ["█████", "█    ", "█████", "    █", "█████"],
        '6' => ["█████", "█    ", "█████", "█   █", "█████"],
        '7' => ["█████", "    █", "   █ ", "  █  ", "  █  "],
        '8' => ["█████", "█   █", "█████", "█   █", "█████"],
        '9' => ["█████", "█   █", "█████", "    █", "█████"],
        ':' => ["   ", " █ ", "   ", " █ ", "   "],
        _ => ["     "; 5],
    }
}

/// `MM:SS` drawn in large block digits.
pub fn big_clock(clock: &str) -> Vec<String> {
    (0..5)
        .map(|row| clock.chars().map(|c| glyph(c)[row]).collect::<Vec<_>>().join(" "))
        .collect()
}

/// Bordered box exactly `width` cells wide.
fn boxed(title: &str, body: &[String], width: usize) -> Vec<String> {
    let width = width.max(6);
    let inner = width - 4;
    let label = if title.is_empty() { String::new() } else { format!("─ {} ", truncate(title, width - 6)) };
    let rule = "─".repeat((width - 2).saturating_sub(display_width(&label)));
    let mut out = vec![format!("┌{label}{rule}┐")];
    out.extend(body.iter().map(|text| format!("│ {} │", fit(text, inner))));
    out.push(format!("└{}┘", "─".repeat(width - 2)));
    out
}

/// Place equal-height blocks side by side.
fn join_columns(columns: &[Vec<String>], gap: usize) -> Vec<String> {
    let height = columns.iter().map(Vec::len).max().unwrap_or(0);
    (0..height)
        .map(|row| {
            columns
                .iter()
                .map(|col| {
                    let width = col.first().map_or(0, |l| display_width(l));
                    pad(col.get(row).map_or("", String::as_str), width)
                })
                .collect::<Vec<_>>()
                .join(&" ".repeat(gap))
        })
        .collect()
}

fn pomodoro_view(state: &ViewState, layout: &ResponsiveLayout, theme: &Theme) -> Vec<Line<'static>> {
    let pomodoro = &state.pomodoro;
    let width = layout.content_width;
    let mut lines = vec![line("🍅 Pomodoro", theme.title), Line::default()];

    for row in big_clock(&pomodoro.clock()) {
        lines.push(Line::from(vec![Span::raw(INDENT), Span::styled(center(&row, width), theme.timer)]));
    }
    lines.push(Line::default());

    let bar_width = layout.progress_bar_width;
    let progress = pomodoro.progress().clamp(0.0, 1.0);
    let filled = ((progress * bar_width as f64).round() as usize).min(bar_width);
    let percent = format!(" {:>3}%", (progress * 100.0).round() as u32);
    let left = width.saturating_sub(bar_width + display_width(&percent)) / 2;
    lines.push(Line::from(vec![
        Span::raw(INDENT),
        Span::raw(" ".repeat(left)),
        Span::styled("█".repeat(filled), theme.progress_filled),
        Span::styled("░".repeat(bar_width - filled), theme.progress_empty),
        Span::raw(percent),
    ]));
    lines.push(Line::default());

    let body = match pomodoro.task_id {
        Some(id) => {
            let title = state.find_task(id).map_or_else(|| "(task not loaded)".to_string(), |t| t.title.clone());
            vec![format!("#{id} {title}")]
        },
        None => vec!["General focus session (no task)".to_string()],
    };
    let box_width = layout.pomodoro_box_width;
    let box_left = " ".repeat(width.saturating_sub(box_width) / 2);
    for row in boxed("Focusing on", &body, box_width) {
        lines.push(Line::styled(format!("{INDENT}{box_left}{row}"), theme.border));
    }
    lines.push(Line::default());

    let (status, style) = if pomodoro.completed {
        ("Timer complete! Recording your work...", theme.message)
    } else if pomodoro.running {
        ("Timer is running...", theme.text)
    } else {
        ("Timer paused", theme.muted)
    };
    lines.push(Line::from(vec![Span::raw(INDENT), Span::styled(center(status, width), style)]));
    lines.push(Line::default());
    push_notices(&mut lines, state, layout, theme);
    lines.push(line("Space: pause/resume · Enter: stop and record · Esc: cancel", theme.muted));
    lines
}

fn format_work_detail(minutes: i64) -> String {
    if minutes <= 0 {
        "(no records)".to_string()
    } else {
        format!("🍅 {}h {}m", minutes / 60, minutes % 60)
    }
}

fn detail_view(state: &ViewState, task_id: i64, layout: &ResponsiveLayout, theme: &Theme) -> Vec<Line<'static>> {
    let Some(task) = state.find_task(task_id) else {
        return vec![
            line(format!("Task #{task_id} is no longer available."), theme.error),
            Line::default(),
            line("Enter/Esc: back", theme.muted),
        ];
    };

    let mut status = task.status.label().to_string();
    if task.is_overdue(Utc::now().date_naive()) {
        status.push_str(" (overdue)");
    }
    let mut lines = vec![line(format!("Task #{} · {status}", task.id), theme.title), Line::default()];

    let box_width = layout.detail_box_width;
    let inner = box_width - 4;
    let description = if task.description.is_empty() {
        vec!["(no description)".to_string()]
    } else {
        wrap(&task.description, inner)
    };
    let mut rows = boxed("Title", &wrap(&task.title, inner), box_width);
    rows.extend(boxed("Description", &description, box_width));

    let column = layout.detail_column_width;
    let due = task.due_date.map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string());
    rows.extend(join_columns(
        &[
            boxed("Priority", &[task.priority.label().to_string(), String::new()], column),
            boxed("Work time", &[format_work_detail(task.work_duration), String::new()], column),
            boxed("Dates", &[format_datetime(&task.created_at), format!("due {due}")], column),
        ],
        2,
    ));
    lines.extend(rows.into_iter().map(|row| line(row, theme.border)));

    lines.push(Line::default());
    push_notices(&mut lines, state, layout, theme);
    lines.push(line("Enter/Esc: back · e: edit · d: done · p: pomodoro", theme.muted));
    lines
}
