//! Column widths and display-width aware string helpers.
//!
//! All measurements are in terminal cells. Wide characters (CJK, most emoji)
//! occupy two cells, combining marks and control characters none.

use std::ops::Range;

use unicode_width::UnicodeWidthChar;

/// Narrowest terminal the list table is laid out for.
pub const MIN_TERMINAL_WIDTH: u16 = 80;
/// Cells reserved around the content area.
pub const MARGIN: usize = 4;
pub const MIN_TITLE_WIDTH: usize = 20;

pub const ID_WIDTH: usize = 5;
pub const PRIORITY_WIDTH: usize = 12;
pub const WORK_TIME_WIDTH: usize = 12;
pub const DATE_WIDTH: usize = 13;
/// A row reads `" id   title   priority   work   date "`: one leading space,
/// four three-space gaps and one trailing space.
pub const SEPARATOR_WIDTH: usize = 14;

const FIXED_COLUMNS: usize = ID_WIDTH + PRIORITY_WIDTH + WORK_TIME_WIDTH + DATE_WIDTH + SEPARATOR_WIDTH;

const ELLIPSIS: &str = "...";

/// Widths derived from the current terminal width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponsiveLayout {
    pub terminal_width: usize,
    pub content_width: usize,
    pub title_width: usize,
    pub detail_box_width: usize,
    pub detail_column_width: usize,
    pub pomodoro_box_width: usize,
    pub progress_bar_width: usize,
}

impl ResponsiveLayout {
    pub fn for_width(width: u16) -> Self {
        let terminal_width = usize::from(width);
        let content_width = terminal_width.saturating_sub(MARGIN);
        Self {
            terminal_width,
            content_width,
            title_width: content_width.saturating_sub(FIXED_COLUMNS).max(MIN_TITLE_WIDTH),
            detail_box_width: content_width.saturating_sub(6).max(60),
            detail_column_width: (content_width.saturating_sub(12) / 3).max(20),
            pomodoro_box_width: content_width.saturating_sub(26).max(50),
            progress_bar_width: content_width.saturating_sub(36).max(40),
        }
    }

    /// Total cells of one list row.
    #[cfg(test)]
    pub fn row_width(&self) -> usize {
        self.title_width + FIXED_COLUMNS
    }

    pub fn is_too_narrow(&self) -> bool {
        self.terminal_width < usize::from(MIN_TERMINAL_WIDTH)
    }

    /// One plain table row from id, title, priority, work time and date cells.
    pub fn format_row(&self, cells: [&str; 5]) -> String {
        let [id, title, priority, work, date] = cells;
        format!(
            " {}   {}   {}   {}   {} ",
            fit(id, ID_WIDTH),
            fit(title, self.title_width),
            fit(priority, PRIORITY_WIDTH),
            fit(work, WORK_TIME_WIDTH),
            fit(date, DATE_WIDTH),
        )
    }
}

/// Rows of a `len`-row list to show in `capacity` lines so `cursor` stays visible.
pub fn visible_window(len: usize, cursor: usize, capacity: usize) -> Range<usize> {
    if len <= capacity {
        return 0..len;
    }
    let start = (cursor + 1).saturating_sub(capacity).min(len - capacity);
    start..start + capacity
}

/// Cells occupied by one character.
pub fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(0)
}

/// Cells occupied by a string.
pub fn display_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

/// Shorten `s` to at most `width` cells, marking the cut with `...`.
///
/// Strings that already fit are returned unchanged. Below three cells there
/// is no room for text, so the result is `width` dots.
pub fn truncate(s: &str, width: usize) -> String {
    if display_width(s) <= width {
        return s.to_string();
    }
    if width < ELLIPSIS.len() {
        return ".".repeat(width);
    }
    let budget = width - ELLIPSIS.len();
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = char_width(ch);
        if used + w > budget {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push_str(ELLIPSIS);
    out
}

/// Right-pad with spaces to exactly `width` cells; wider strings are untouched.
pub fn pad(s: &str, width: usize) -> String {
    let w = display_width(s);
    let mut out = String::with_capacity(s.len() + width.saturating_sub(w));
    out.push_str(s);
    out.extend(std::iter::repeat(' ').take(width.saturating_sub(w)));
    out
}

/// Truncate then pad: always exactly `width` cells.
pub fn fit(s: &str, width: usize) -> String {
    pad(&truncate(s, width), width)
}

/// Left-pad so `s` sits in the middle of `width` cells.
pub fn center(s: &str, width: usize) -> String {
    let w = display_width(s);
    let left = width.saturating_sub(w) / 2;
    format!("{}{}", " ".repeat(left), s)
}

/// Greedy word wrap to `width` cells. Words wider than a line are split.
pub fn wrap(s: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for paragraph in s.lines() {
        let mut line = String::new();
        let mut used = 0;
        for word in paragraph.split_whitespace() {
            let ww = display_width(word);
            let gap = usize::from(!line.is_empty());
            if used + gap + ww <= width {
                if gap == 1 {
                    line.push(' ');
                }
                line.push_str(word);
                used += gap + ww;
                continue;
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                used = 0;
            }
            for ch in word.chars() {
                let cw = char_width(ch);
                if used + cw > width && !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                    used = 0;
                }
                line.push(ch);
                used += cw;
            }
        }
        lines.push(line);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_column_at_minimum_width() {
        let layout = ResponsiveLayout::for_width(MIN_TERMINAL_WIDTH);
        assert_eq!(layout.content_width, 76);
        assert_eq!(layout.title_width, MIN_TITLE_WIDTH);
        assert_eq!(layout.row_width(), layout.content_width);
        assert!(!layout.is_too_narrow());
    }

    #[test]
    fn test_title_column_grows_with_width() {
        let layout = ResponsiveLayout::for_width(120);
        assert_eq!(layout.title_width, 60);
        assert_eq!(layout.row_width(), 116);
        assert_eq!(layout.detail_column_width, 34);
        assert_eq!(layout.progress_bar_width, 80);
    }

    #[test]
    fn test_minimums_hold_when_narrow() {
        let layout = ResponsiveLayout::for_width(40);
        assert!(layout.is_too_narrow());
        assert_eq!(layout.title_width, MIN_TITLE_WIDTH);
        assert_eq!(layout.detail_box_width, 60);
        assert_eq!(layout.detail_column_width, 20);
        assert_eq!(layout.pomodoro_box_width, 50);
        assert_eq!(layout.progress_bar_width, 40);
    }

    #[test]
    fn test_format_row_has_row_width() {
        let layout = ResponsiveLayout::for_width(100);
        let row = layout.format_row(["12", "日本語のタスク", "High", "1h 5m", "2024-03-01"]);
        assert_eq!(display_width(&row), layout.row_width());
        assert!(row.starts_with(" 12   "));
    }

    #[test]
    fn test_visible_window() {
        assert_eq!(visible_window(3, 2, 10), 0..3);
        assert_eq!(visible_window(50, 0, 10), 0..10);
        assert_eq!(visible_window(50, 9, 10), 0..10);
        assert_eq!(visible_window(50, 10, 10), 1..11);
        assert_eq!(visible_window(50, 49, 10), 40..50);
    }

    #[test]
    fn test_display_width() {
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width("日本語"), 6);
        assert_eq!(display_width("🍅 25m"), 6);
        assert_eq!(display_width("e\u{301}"), 1);
        assert_eq!(display_width(""), 0);
    }

    #[test]
    fn test_truncate_unchanged_when_fits() {
        assert_eq!(truncate("hello", 5), "hello");
        assert_eq!(truncate("日本", 4), "日本");
    }

    #[test]
    fn test_truncate_ascii_and_wide() {
        assert_eq!(truncate("hello world", 8), "hello...");
        // Only one wide char fits in the 3 cells before the ellipsis.
        assert_eq!(truncate("日本語テキスト", 6), "日...");
        assert_eq!(display_width(&truncate("日本語テキスト", 7)), 7);
    }

    #[test]
    fn test_truncate_tiny_widths() {
        assert_eq!(truncate("hello", 2), "..");
        assert_eq!(truncate("hello", 0), "");
        assert_eq!(truncate("hello", 3), "...");
    }

    #[test]
    fn test_truncate_never_exceeds_width() {
        let samples = ["plain ascii text", "日本語のタスクです", "mixed 日本 text 🍅🍅", "e\u{301}e\u{301}e\u{301}e\u{301}"];
        for s in samples {
            for w in 0..20 {
                assert!(display_width(&truncate(s, w)) <= w, "{s:?} at {w}");
            }
        }
    }

    #[test]
    fn test_pad() {
        assert_eq!(pad("ab", 4), "ab  ");
        assert_eq!(display_width(&pad("日本", 7)), 7);
        assert_eq!(pad("toolong", 3), "toolong");
    }

    #[test]
    fn test_fit_is_exact() {
        assert_eq!(display_width(&fit("日本語テキスト", 9)), 9);
        assert_eq!(fit("a", 3), "a  ");
    }

    #[test]
    fn test_center() {
        assert_eq!(center("ab", 6), "  ab");
        assert_eq!(center("toolong", 3), "toolong");
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("the quick brown fox", 10), vec!["the quick", "brown fox"]);
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap("one\ntwo", 10), vec!["one", "two"]);
        assert_eq!(wrap("", 10), vec![""]);
        assert!(wrap("日本語のタスク", 5).iter().all(|l| display_width(l) <= 5));
    }
}
