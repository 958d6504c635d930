//! Colours and styles for the terminal user interface.
//!
//! Views receive a `Theme` instead of reaching for colour constants, so the
//! renderer stays a pure function of its inputs.

use ratatui::style::{Color, Modifier, Style};

use crate::fields::Priority;

/// Accent used for titles and the timer.
pub const TOMATO: Color = Color::Rgb(255, 99, 71);
/// Selected row background.
pub const SLATE: Color = Color::Rgb(50, 60, 80);
/// Confirmation messages.
pub const MINT: Color = Color::Rgb(80, 200, 120);
/// Error messages and high priority.
pub const CRIMSON: Color = Color::Rgb(220, 20, 60);
/// Medium priority.
pub const AMBER: Color = Color::Rgb(255, 191, 0);
/// Low priority.
pub const SKY: Color = Color::Rgb(100, 170, 255);
/// Secondary text.
pub const GREY: Color = Color::Rgb(128, 128, 128);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub title: Style,
    pub header: Style,
    pub text: Style,
    pub muted: Style,
    pub selected: Style,
    pub completed: Style,
    pub overdue: Style,
    pub message: Style,
    pub error: Style,
    pub border: Style,
    pub timer: Style,
    pub progress_filled: Style,
    pub progress_empty: Style,
    pub priority_low: Style,
    pub priority_medium: Style,
    pub priority_high: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            title: Style::default().fg(TOMATO).add_modifier(Modifier::BOLD),
            header: Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            text: Style::default(),
            muted: Style::default().fg(GREY),
            selected: Style::default().bg(SLATE).add_modifier(Modifier::BOLD),
            completed: Style::default().fg(GREY).add_modifier(Modifier::CROSSED_OUT),
            overdue: Style::default().fg(CRIMSON),
            message: Style::default().fg(MINT),
            error: Style::default().fg(CRIMSON).add_modifier(Modifier::BOLD),
            border: Style::default().fg(GREY),
            timer: Style::default().fg(TOMATO).add_modifier(Modifier::BOLD),
            progress_filled: Style::default().fg(TOMATO),
            progress_empty: Style::default().fg(GREY),
            priority_low: Style::default().fg(SKY),
            priority_medium: Style::default().fg(AMBER),
            priority_high: Style::default().fg(CRIMSON).add_modifier(Modifier::BOLD),
        }
    }
}

impl Theme {
    /// Unstyled theme, for terminals without colour and for tests.
    pub fn plain() -> Self {
        let s = Style::default();
        Self {
            title: s,
            header: s,
            text: s,
            muted: s,
            selected: s.add_modifier(Modifier::REVERSED),
            completed: s,
            overdue: s,
            message: s,
            error: s,
            border: s,
            timer: s,
            progress_filled: s,
            progress_empty: s,
            priority_low: s,
            priority_medium: s,
            priority_high: s,
        }
    }

    pub fn priority(&self, priority: Priority) -> Style {
        match priority {
            Priority::Low => self.priority_low,
            Priority::Medium => self.priority_medium,
            Priority::High => self.priority_high,
        }
    }
}
