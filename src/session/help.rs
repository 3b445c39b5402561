//! Help requests
//!
//! Code of the form `?topic` or `help(topic)` (optionally quoted) never
//! reaches an evaluation context. The topic is looked up through
//! [`Interpreter::lookup_documentation`] and the resulting text is shaped
//! into a [`HelpPage`] for the documentation panel.
//!
//! Lookup never fails from the caller's point of view: missing topics and
//! runtime errors both degrade to a message the panel can show.

use crate::interpreter::Interpreter;
use regex::Regex;
use std::sync::LazyLock;

static QUESTION_MARK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\?(.+)$").expect("valid help pattern"));

static HELP_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^help\(["']?([^"')]+)["']?\)$"#).expect("valid help pattern")
});

static UNDERSCORE_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^_([^_].*)_$").expect("valid heading pattern"));

static TITLE_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z][A-Za-z]*(?: [A-Z][A-Za-z]*)*):$").expect("valid heading pattern")
});

/// Topic of a help request, or `None` for ordinary code
pub fn help_topic(code: &str) -> Option<String> {
    let code = code.trim();
    [&*QUESTION_MARK, &*HELP_CALL]
        .iter()
        .find_map(|pattern| pattern.captures(code))
        .map(|captures| captures[1].trim().to_string())
        .filter(|topic| !topic.is_empty())
}

/// Documentation text for `topic`, degraded to a message on any failure
pub async fn resolve<I: Interpreter>(interpreter: &I, topic: &str) -> String {
    match interpreter.lookup_documentation(topic).await {
        Ok(Some(text)) => text,
        Ok(None) => format!("No documentation found for '{}'", topic),
        Err(e) => {
            tracing::warn!(topic, error = %e, "help lookup failed");
            format!("Error getting help for '{}': {}", topic, e)
        }
    }
}

/// One block of a formatted help page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelpBlock {
    Heading(String),
    Text(String),
}

/// Documentation ready for the help panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpPage {
    pub topic: String,
    pub blocks: Vec<HelpBlock>,
}

impl HelpPage {
    /// Sanitize `text` and split it into headings and plain lines
    pub fn format(topic: &str, text: &str) -> Self {
        let blocks = text
            .lines()
            .map(|line| {
                let line = sanitize(line);
                let trimmed = line.trim();
                if let Some(captures) = UNDERSCORE_HEADING.captures(trimmed) {
                    HelpBlock::Heading(captures[1].to_string())
                } else if let Some(captures) = TITLE_HEADING.captures(trimmed) {
                    HelpBlock::Heading(captures[1].to_string())
                } else {
                    HelpBlock::Text(line)
                }
            })
            .collect();

        HelpPage {
            topic: sanitize(topic),
            blocks,
        }
    }
}

/// Make runtime text inert for the terminal
///
/// Overstrike pairs (`_\x08c`, `c\x08c`) collapse to the printed character,
/// tabs expand to four spaces and every other control character is dropped.
fn sanitize(line: &str) -> String {
    let mut out: Vec<char> = Vec::with_capacity(line.len());
    for c in line.chars() {
        match c {
            '\u{8}' => {
                out.pop();
            }
            '\t' => out.extend([' '; 4]),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out.into_iter().collect()
}
