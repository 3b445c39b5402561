//! Multi-line editor buffer
//!
//! The text model behind the editor pane. Columns are counted in
//! characters, not bytes. A selection exists while `anchor` is set; it spans
//! from the anchor to the cursor in either direction.

/// A caret position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone)]
pub struct EditorBuffer {
    lines: Vec<String>,
    cursor: Position,
    anchor: Option<Position>,
}

impl Default for EditorBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorBuffer {
    pub fn new() -> Self {
        EditorBuffer {
            lines: vec![String::new()],
            cursor: Position::default(),
            anchor: None,
        }
    }

    /// Buffer preloaded with `text`, cursor at the start
    pub fn from_text(text: &str) -> Self {
        let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
        if lines.is_empty() {
            lines.push(String::new());
        }
        EditorBuffer {
            lines,
            cursor: Position::default(),
            anchor: None,
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    pub fn current_line(&self) -> &str {
        &self.lines[self.cursor.row]
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines[row].chars().count()
    }

    fn byte_offset(&self, row: usize, col: usize) -> usize {
        let line = &self.lines[row];
        line.char_indices()
            .nth(col)
            .map(|(offset, _)| offset)
            .unwrap_or(line.len())
    }

    /// Ordered `(start, end)` of the selection, if any text is selected
    pub fn selection(&self) -> Option<(Position, Position)> {
        let anchor = self.anchor?;
        if anchor == self.cursor {
            return None;
        }
        Some((anchor.min(self.cursor), anchor.max(self.cursor)))
    }

    pub fn selected_text(&self) -> Option<String> {
        let (start, end) = self.selection()?;
        let mut text = String::new();
        for row in start.row..=end.row {
            let line = &self.lines[row];
            let from = if row == start.row {
                self.byte_offset(row, start.col)
            } else {
                0
            };
            let to = if row == end.row {
                self.byte_offset(row, end.col)
            } else {
                line.len()
            };
            text.push_str(&line[from..to]);
            if row != end.row {
                text.push('\n');
            }
        }
        Some(text)
    }

    /// The code a "run" trigger submits: the selection, or the whole buffer
    pub fn run_target(&self) -> String {
        self.selected_text().unwrap_or_else(|| self.text())
    }

    /// Return the current line and move the cursor to the next one
    pub fn take_line_for_run(&mut self) -> String {
        let line = self.current_line().to_string();
        self.anchor = None;
        if self.cursor.row + 1 < self.lines.len() {
            self.cursor.row += 1;
            self.cursor.col = self.cursor.col.min(self.line_len(self.cursor.row));
        }
        line
    }

    fn delete_selection(&mut self) -> bool {
        let Some((start, end)) = self.selection() else {
            self.anchor = None;
            return false;
        };
        let tail_from = self.byte_offset(end.row, end.col);
        let tail = self.lines[end.row][tail_from..].to_string();
        let head_to = self.byte_offset(start.row, start.col);
        self.lines[start.row].truncate(head_to);
        self.lines[start.row].push_str(&tail);
        self.lines.drain(start.row + 1..=end.row);
        self.cursor = start;
        self.anchor = None;
        true
    }

    pub fn insert_char(&mut self, c: char) {
        if c == '\n' {
            self.newline();
            return;
        }
        self.delete_selection();
        let at = self.byte_offset(self.cursor.row, self.cursor.col);
        self.lines[self.cursor.row].insert(at, c);
        self.cursor.col += 1;
    }

    /// Insert text at the cursor, as a paste would
    pub fn insert_text(&mut self, text: &str) {
        for c in text.chars() {
            if c != '\r' {
                self.insert_char(c);
            }
        }
    }

    pub fn newline(&mut self) {
        self.delete_selection();
        let at = self.byte_offset(self.cursor.row, self.cursor.col);
        let rest = self.lines[self.cursor.row].split_off(at);
        self.lines.insert(self.cursor.row + 1, rest);
        self.cursor = Position {
            row: self.cursor.row + 1,
            col: 0,
        };
    }

    pub fn backspace(&mut self) {
        if self.delete_selection() {
            return;
        }
        if self.cursor.col > 0 {
            self.cursor.col -= 1;
            let at = self.byte_offset(self.cursor.row, self.cursor.col);
            self.lines[self.cursor.row].remove(at);
        } else if self.cursor.row > 0 {
            let line = self.lines.remove(self.cursor.row);
            self.cursor.row -= 1;
            self.cursor.col = self.line_len(self.cursor.row);
            self.lines[self.cursor.row].push_str(&line);
        }
    }

    pub fn delete(&mut self) {
        if self.delete_selection() {
            return;
        }
        if self.cursor.col < self.line_len(self.cursor.row) {
            let at = self.byte_offset(self.cursor.row, self.cursor.col);
            self.lines[self.cursor.row].remove(at);
        } else if self.cursor.row + 1 < self.lines.len() {
            let next = self.lines.remove(self.cursor.row + 1);
            self.lines[self.cursor.row].push_str(&next);
        }
    }

    /// Start or drop the selection before a cursor movement
    fn prepare_move(&mut self, select: bool) {
        if select {
            self.anchor.get_or_insert(self.cursor);
        } else {
            self.anchor = None;
        }
    }

    pub fn move_left(&mut self, select: bool) {
        self.prepare_move(select);
        if self.cursor.col > 0 {
            self.cursor.col -= 1;
        } else if self.cursor.row > 0 {
            self.cursor.row -= 1;
            self.cursor.col = self.line_len(self.cursor.row);
        }
    }

    pub fn move_right(&mut self, select: bool) {
        self.prepare_move(select);
        if self.cursor.col < self.line_len(self.cursor.row) {
            self.cursor.col += 1;
        } else if self.cursor.row + 1 < self.lines.len() {
            self.cursor.row += 1;
            self.cursor.col = 0;
        }
    }

    pub fn move_up(&mut self, select: bool) {
        self.prepare_move(select);
        if self.cursor.row > 0 {
            self.cursor.row -= 1;
            self.cursor.col = self.cursor.col.min(self.line_len(self.cursor.row));
        }
    }

    pub fn move_down(&mut self, select: bool) {
        self.prepare_move(select);
        if self.cursor.row + 1 < self.lines.len() {
            self.cursor.row += 1;
            self.cursor.col = self.cursor.col.min(self.line_len(self.cursor.row));
        }
    }

    pub fn home(&mut self, select: bool) {
        self.prepare_move(select);
        self.cursor.col = 0;
    }

    pub fn end(&mut self, select: bool) {
        self.prepare_move(select);
        self.cursor.col = self.line_len(self.cursor.row);
    }

    /// Place the cursor, clamped to the buffer
    pub fn set_cursor(&mut self, row: usize, col: usize) {
        self.anchor = None;
        let row = row.min(self.lines.len() - 1);
        self.cursor = Position {
            row,
            col: col.min(self.line_len(row)),
        };
    }
}
