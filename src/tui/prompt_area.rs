//! Prompt text area: a small line editor plus the auto-grow height rule.

/// Rows of a `text` wrapped hard at `width` columns.
///
/// A line that exactly fills the width is followed by an empty row, which is
/// where the cursor sits after typing its last character.
pub fn wrap_lines(text: &str, width: u16) -> Vec<String> {
    let width = usize::from(width.max(1));
    let mut rows = Vec::new();

    for line in text.split('\n') {
        let chars: Vec<char> = line.chars().collect();
        for chunk in chars.chunks(width) {
            rows.push(chunk.iter().collect());
        }
        if chars.len() % width == 0 {
            rows.push(String::new());
        }
    }

    rows
}

/// Grows the prompt box with its content, never past `max_height` rows.
#[derive(Debug, Clone, Copy)]
pub struct AutoGrow {
    max_height: u16,
}

impl AutoGrow {
    pub fn new(max_height: u16) -> Self {
        Self {
            max_height: max_height.max(1),
        }
    }

    pub fn max_height(&self) -> u16 {
        self.max_height
    }

    /// Visible rows for `text` at `width` columns
    pub fn height(&self, text: &str, width: u16) -> u16 {
        let content = wrap_lines(text, width).len();
        u16::try_from(content)
            .unwrap_or(u16::MAX)
            .clamp(1, self.max_height)
    }
}

/// Editable prompt with a cursor counted in characters
#[derive(Debug, Default, Clone)]
pub struct PromptInput {
    text: String,
    cursor: usize,
}

impl PromptInput {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn insert(&mut self, c: char) {
        let idx = self.byte_index(self.cursor);
        self.text.insert(idx, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let idx = self.byte_index(self.cursor);
            self.text.remove(idx);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.len() {
            let idx = self.byte_index(self.cursor);
            self.text.remove(idx);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        if self.cursor < self.len() {
            self.cursor += 1;
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.len();
    }

    /// (row, column) of the cursor in the rows of [`wrap_lines`]
    pub fn cursor_position(&self, width: u16) -> (u16, u16) {
        let width = width.max(1);
        let (mut row, mut col) = (0u16, 0u16);
        for c in self.text.chars().take(self.cursor) {
            if c == '\n' {
                row = row.saturating_add(1);
                col = 0;
            } else {
                col += 1;
                if col == width {
                    row = row.saturating_add(1);
                    col = 0;
                }
            }
        }
        (row, col)
    }
}
