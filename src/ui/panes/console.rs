//! Console line rendering

use super::{border_style, pane_title};
use crate::session::history::ReplHistory;
use crate::session::output::PROMPT;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the single-line console with its prompt
///
/// The title shows the history position while the user is browsing.
pub fn render_console_pane(
    frame: &mut Frame,
    area: Rect,
    history: &ReplHistory,
    is_focused: bool,
    read_only: bool,
) {
    let title = match (read_only, history.cursor()) {
        (true, _) => " Console (busy) ".to_string(),
        (false, Some(index)) => format!(
            " Console [history {}/{}] ",
            index + 1,
            history.entries().len()
        ),
        (false, None) => " Console ".to_string(),
    };

    let block = Block::default()
        .title(pane_title(&title, is_focused))
        .borders(Borders::ALL)
        .border_style(border_style(is_focused && !read_only));

    let prompt_style = Style::default()
        .fg(DEFAULT_THEME.primary)
        .add_modifier(Modifier::BOLD);
    let text_style = if read_only {
        Style::default().fg(DEFAULT_THEME.comment)
    } else {
        Style::default().fg(DEFAULT_THEME.fg)
    };

    let line = Line::from(vec![
        Span::styled(PROMPT, prompt_style),
        Span::styled(history.buffer().to_string(), text_style),
    ]);
    frame.render_widget(Paragraph::new(line).block(block), area);

    if is_focused && !read_only {
        let x = area.x + 1 + PROMPT.len() as u16 + history.caret() as u16;
        let y = area.y + 1;
        if x < area.right().saturating_sub(1) && y < area.bottom().saturating_sub(1) {
            frame.set_cursor_position(Position::new(x, y));
        }
    }
}
