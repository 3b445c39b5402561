//! Documentation panel rendering

use super::{border_style, pane_title};
use crate::session::help::{HelpBlock, HelpPage};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Render the help panel for the last requested topic
pub fn render_help_pane(
    frame: &mut Frame,
    area: Rect,
    page: Option<&HelpPage>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let title = match page {
        Some(page) => format!(" Help: {} ", page.topic),
        None => " Help ".to_string(),
    };
    let block = Block::default()
        .title(pane_title(&title, is_focused))
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    let Some(page) = page else {
        let paragraph = Paragraph::new("Type ?topic or help(topic) in the console")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    };

    let lines: Vec<Line> = page
        .blocks
        .iter()
        .map(|block| match block {
            HelpBlock::Heading(text) => Line::styled(
                text.clone(),
                Style::default()
                    .fg(DEFAULT_THEME.heading)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            ),
            HelpBlock::Text(text) => {
                Line::styled(text.clone(), Style::default().fg(DEFAULT_THEME.fg))
            }
        })
        .collect();

    let max_scroll = lines.len().saturating_sub(1);
    *scroll_offset = (*scroll_offset).min(max_scroll);

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((u16::try_from(*scroll_offset).unwrap_or(u16::MAX), 0));
    frame.render_widget(paragraph, area);
}
