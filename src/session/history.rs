//! REPL console history
//!
//! [`ReplHistory`] owns the console's live line, the list of past commands
//! (newest first) and a browsing cursor. `None` as cursor means the user is
//! editing the live line; `Some(i)` means entry `i` is loaded into it.
//!
//! History only grows through [`ReplHistory::submit`]. Code run from the
//! editor never lands here.

use std::collections::VecDeque;

#[derive(Debug, Clone, Default)]
pub struct ReplHistory {
    entries: VecDeque<String>,
    cursor: Option<usize>,
    buffer: String,
    /// Caret position in the live line, in characters
    caret: usize,
}

impl ReplHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit the live line
    ///
    /// Returns the trimmed command to run, or `None` when the line is blank
    /// (in which case nothing changes).
    pub fn submit(&mut self) -> Option<String> {
        let command = self.buffer.trim().to_string();
        if command.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.buffer);
        self.entries.push_front(line);
        self.cursor = None;
        self.caret = 0;
        Some(command)
    }

    /// Recall the next older entry
    pub fn navigate_up(&mut self) {
        let next = match self.cursor {
            None => 0,
            Some(index) => index + 1,
        };
        if next < self.entries.len() {
            self.cursor = Some(next);
            self.load_entry(next);
        }
    }

    /// Recall the next newer entry, or return to an empty live line
    pub fn navigate_down(&mut self) {
        match self.cursor {
            None => {}
            Some(0) => {
                self.cursor = None;
                self.buffer.clear();
                self.caret = 0;
            }
            Some(index) => {
                self.cursor = Some(index - 1);
                self.load_entry(index - 1);
            }
        }
    }

    fn load_entry(&mut self, index: usize) {
        if let Some(entry) = self.entries.get(index) {
            self.buffer = entry.clone();
            self.caret = self.buffer.chars().count();
        }
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_offset(self.caret);
        self.buffer.insert(at, c);
        self.caret += 1;
    }

    /// Delete the character before the caret
    pub fn backspace(&mut self) {
        if self.caret == 0 {
            return;
        }
        self.caret -= 1;
        let at = self.byte_offset(self.caret);
        self.buffer.remove(at);
    }

    /// Delete the character under the caret
    pub fn delete(&mut self) {
        if self.caret < self.buffer.chars().count() {
            let at = self.byte_offset(self.caret);
            self.buffer.remove(at);
        }
    }

    pub fn caret_left(&mut self) {
        self.caret = self.caret.saturating_sub(1);
    }

    pub fn caret_right(&mut self) {
        self.caret = (self.caret + 1).min(self.buffer.chars().count());
    }

    pub fn caret_home(&mut self) {
        self.caret = 0;
    }

    pub fn caret_end(&mut self) {
        self.caret = self.buffer.chars().count();
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(chars)
            .map(|(offset, _)| offset)
            .unwrap_or(self.buffer.len())
    }

    /// Past commands, newest first
    pub fn entries(&self) -> &VecDeque<String> {
        &self.entries
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn caret(&self) -> usize {
        self.caret
    }
}
