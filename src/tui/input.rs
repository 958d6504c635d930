//! Single-line text input for the command line and the wizards.

/// A text input with a cursor measured in characters, so editing stays on
/// character boundaries for any UTF-8 text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputField {
    pub value: String,
    pub cursor: usize,
}

impl InputField {
    /// Create a new empty input field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an input field with initial text value, cursor at the end.
    pub fn with_value(value: &str) -> Self {
        Self {
            value: value.to_string(),
            cursor: value.chars().count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Replace the contents, cursor at the end.
    pub fn set(&mut self, value: &str) {
        *self = Self::with_value(value);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Take the contents, leaving the field empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.value)
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn char_count(&self) -> usize {
        self.value.chars().count()
    }

    /// Insert a character at the current cursor position.
    pub fn handle_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    /// Delete the character before the cursor.
    pub fn handle_backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    /// Delete the character at the cursor position.
    pub fn handle_delete(&mut self) {
        if self.cursor < self.char_count() {
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    /// Move cursor one position to the left.
    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move cursor one position to the right.
    pub fn move_cursor_right(&mut self) {
        if self.cursor < self.char_count() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    /// Text before and after the cursor, for drawing a caret between them.
    pub fn split_at_cursor(&self) -> (&str, &str) {
        self.value.split_at(self.byte_index(self.cursor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typing_and_backspace() {
        let mut input = InputField::new();
        for c in "/add".chars() {
            input.handle_char(c);
        }
        assert_eq!(input.value, "/add");
        input.handle_backspace();
        assert_eq!(input.value, "/ad");
        assert_eq!(input.cursor, 3);
    }

    #[test]
    fn test_multibyte_editing() {
        let mut input = InputField::with_value("日本");
        assert_eq!(input.cursor, 2);
        input.move_cursor_left();
        input.handle_char('語');
        assert_eq!(input.value, "日語本");
        input.handle_delete();
        assert_eq!(input.value, "日語");
        input.move_home();
        input.handle_delete();
        assert_eq!(input.value, "語");
        assert_eq!(input.split_at_cursor(), ("", "語"));
    }

    #[test]
    fn test_cursor_bounds() {
        let mut input = InputField::with_value("ab");
        input.move_cursor_right();
        assert_eq!(input.cursor, 2);
        input.move_home();
        input.move_cursor_left();
        input.handle_backspace();
        assert_eq!(input.cursor, 0);
        assert_eq!(input.value, "ab");
    }

    #[test]
    fn test_take_empties() {
        let mut input = InputField::with_value("/help");
        assert_eq!(input.take(), "/help");
        assert!(input.is_empty());
        assert_eq!(input.cursor, 0);
    }
}
