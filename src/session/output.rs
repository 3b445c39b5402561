// Output log for the session

use crate::interpreter::OutputRecord;

/// Prompt shown before the first line of an echoed command
pub const PROMPT: &str = "> ";

/// Prompt shown before continuation lines of an echoed command
pub const CONTINUATION_PROMPT: &str = "+ ";

/// Display category of an output line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// Echo of submitted code
    Command,
    Stdout,
    Stderr,
    /// A failed evaluation or bootstrap
    Error,
    /// Session notices (startup, readiness)
    Info,
}

/// A line of the output log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub kind: OutputKind,
    pub text: String,
}

/// Append-only display log
#[derive(Debug, Clone, Default)]
pub struct OutputSink {
    lines: Vec<OutputLine>,
}

impl OutputSink {
    pub fn new() -> Self {
        OutputSink { lines: Vec::new() }
    }

    pub fn push(&mut self, kind: OutputKind, text: impl Into<String>) {
        self.lines.push(OutputLine {
            kind,
            text: text.into(),
        });
    }

    /// Echo submitted code, one line per physical line of `code`
    pub fn echo_command(&mut self, code: &str) {
        for (index, line) in code.lines().enumerate() {
            let prompt = if index == 0 {
                PROMPT
            } else {
                CONTINUATION_PROMPT
            };
            self.push(OutputKind::Command, format!("{}{}", prompt, line));
        }
    }

    /// Route an interpreter record, dropping blank stream text
    ///
    /// Returns whether a line was appended.
    pub fn push_record(&mut self, record: OutputRecord) -> bool {
        if record.is_suppressed() {
            return false;
        }
        match record {
            OutputRecord::Stdout(text) => self.push(OutputKind::Stdout, text),
            OutputRecord::Stderr(text) | OutputRecord::Condition(text) => {
                self.push(OutputKind::Stderr, text)
            }
        }
        true
    }

    pub fn lines(&self) -> &[OutputLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_line_commands_use_continuation_prompt() {
        let mut sink = OutputSink::new();
        sink.echo_command("f <- function(x) {\n  x + 1\n}");

        let texts: Vec<&str> = sink.lines().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["> f <- function(x) {", "+   x + 1", "+ }"]);
        assert!(sink.lines().iter().all(|l| l.kind == OutputKind::Command));
    }

    #[test]
    fn conditions_render_in_stderr_style() {
        let mut sink = OutputSink::new();
        assert!(sink.push_record(OutputRecord::Stdout("[1] 2".to_string())));
        assert!(!sink.push_record(OutputRecord::Stderr("   ".to_string())));
        assert!(sink.push_record(OutputRecord::Condition(String::new())));

        let kinds: Vec<OutputKind> = sink.lines().iter().map(|l| l.kind).collect();
        assert_eq!(kinds, vec![OutputKind::Stdout, OutputKind::Stderr]);
    }
}
