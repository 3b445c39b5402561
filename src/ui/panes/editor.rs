//! Editor pane rendering with syntax highlighting
//!
//! Renders the multi-line editor with line numbers, a highlighted cursor
//! line and the active selection. Highlighting uses a character tokenizer
//! that knows about `#` comments, quoted strings, numbers and the runtime's
//! reserved words; it does not need a full lexer.

use super::{border_style, pane_title};
use crate::ui::editor::EditorBuffer;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Width of the line-number gutter, including the trailing space
const GUTTER_WIDTH: u16 = 5;

/// Simple syntax highlighting for one line of code
fn highlight_code(line: &str) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut current_word = String::new();

    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        // Comments run to the end of the line
        if c == '#' {
            if !current_word.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_word)));
            }
            spans.push(Span::styled(
                chars[i..].iter().collect::<String>(),
                Style::default().fg(DEFAULT_THEME.comment),
            ));
            break;
        }

        if c == '"' || c == '\'' {
            if !current_word.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_word)));
            }
            let mut end = i + 1;
            while end < chars.len() && chars[end] != c {
                if chars[end] == '\\' {
                    end += 2;
                } else {
                    end += 1;
                }
            }
            let end = (end + 1).min(chars.len());
            spans.push(Span::styled(
                chars[i..end].iter().collect::<String>(),
                Style::default().fg(DEFAULT_THEME.string),
            ));
            i = end;
            continue;
        }

        if !c.is_alphanumeric() && c != '_' && c != '.' {
            if !current_word.is_empty() {
                let style = word_style(&current_word, c == '(');
                spans.push(Span::styled(std::mem::take(&mut current_word), style));
            }

            let style = match c {
                '{' | '}' | '(' | ')' | '[' | ']' => Style::default().fg(DEFAULT_THEME.primary),
                _ => Style::default().fg(DEFAULT_THEME.fg),
            };
            spans.push(Span::styled(c.to_string(), style));
            i += 1;
            continue;
        }

        current_word.push(c);
        i += 1;
    }

    if !current_word.is_empty() {
        let style = word_style(&current_word, false);
        spans.push(Span::styled(current_word, style));
    }

    spans
}

fn word_style(word: &str, is_function: bool) -> Style {
    match word {
        "function" | "if" | "else" | "for" | "while" | "repeat" | "in" | "next" | "break"
        | "return" | "library" | "require" => Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD),
        "TRUE" | "FALSE" | "NULL" | "NA" | "Inf" | "NaN" => {
            Style::default().fg(DEFAULT_THEME.number)
        }
        _ if word.chars().next().is_some_and(|c| c.is_ascii_digit()) => {
            Style::default().fg(DEFAULT_THEME.number)
        }
        _ if is_function => Style::default().fg(DEFAULT_THEME.function),
        _ => Style::default().fg(DEFAULT_THEME.fg),
    }
}

/// Render the editor pane
///
/// `scroll` is adjusted so the cursor row stays visible. When `read_only` is
/// set (an evaluation is in flight or the session is not ready) the border
/// dims and no terminal cursor is placed.
pub fn render_editor_pane(
    frame: &mut Frame,
    area: Rect,
    editor: &EditorBuffer,
    is_focused: bool,
    read_only: bool,
    scroll: &mut usize,
) {
    let title = if read_only {
        " Editor (read-only) "
    } else {
        " Editor "
    };
    let block = Block::default()
        .title(pane_title(title, is_focused))
        .borders(Borders::ALL)
        .border_style(border_style(is_focused && !read_only));

    let cursor = editor.cursor();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    if cursor.row < *scroll {
        *scroll = cursor.row;
    } else if cursor.row >= *scroll + visible_height {
        *scroll = cursor.row + 1 - visible_height;
    }

    let selection = editor.selection();

    let visible_lines: Vec<Line> = editor
        .lines()
        .iter()
        .enumerate()
        .skip(*scroll)
        .take(visible_height)
        .map(|(idx, line)| {
            let is_current = idx == cursor.row;
            let is_selected =
                selection.is_some_and(|(start, end)| idx >= start.row && idx <= end.row);

            let num_style = if is_current {
                Style::default()
                    .fg(DEFAULT_THEME.secondary)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.comment)
            };

            let mut spans = vec![Span::styled(format!("{:4} ", idx + 1), num_style)];
            let background = if is_selected {
                Some(Style::default().bg(DEFAULT_THEME.selection_bg))
            } else if is_current && is_focused {
                Some(Style::default().bg(DEFAULT_THEME.current_line_bg))
            } else {
                None
            };
            for mut span in highlight_code(line) {
                if let Some(bg) = background {
                    span.style = span.style.patch(bg);
                }
                spans.push(span);
            }
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(visible_lines).block(block), area);

    if is_focused && !read_only {
        let x = area.x + 1 + GUTTER_WIDTH + cursor.col as u16;
        let y = area.y + 1 + (cursor.row - *scroll) as u16;
        if x < area.right().saturating_sub(1) && y < area.bottom().saturating_sub(1) {
            frame.set_cursor_position(Position::new(x, y));
        }
    }
}
