//! Output log pane rendering

use super::{border_style, pane_title};
use crate::session::output::{OutputKind, OutputLine};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph},
    Frame,
};

fn line_style(kind: OutputKind) -> Style {
    match kind {
        OutputKind::Command => Style::default()
            .fg(DEFAULT_THEME.primary)
            .add_modifier(Modifier::BOLD),
        OutputKind::Stdout => Style::default().fg(DEFAULT_THEME.fg),
        OutputKind::Stderr => Style::default().fg(DEFAULT_THEME.warning),
        OutputKind::Error => Style::default()
            .fg(DEFAULT_THEME.error)
            .add_modifier(Modifier::BOLD),
        OutputKind::Info => Style::default().fg(DEFAULT_THEME.comment),
    }
}

/// Render the output log pane
///
/// Records holding several physical lines are split so scrolling works per
/// row. A `scroll_offset` of `usize::MAX` pins the view to the bottom.
pub fn render_output_pane(
    frame: &mut Frame,
    area: Rect,
    lines: &[OutputLine],
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = Block::default()
        .title(pane_title(" Output ", is_focused))
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    if lines.is_empty() {
        let paragraph = Paragraph::new("(no output)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let block = block.padding(Padding::new(1, 0, 0, 0));
    let all_items: Vec<ListItem> = lines
        .iter()
        .flat_map(|line| {
            let style = line_style(line.kind);
            line.text
                .split('\n')
                .map(move |row| ListItem::new(row.to_string()).style(style))
        })
        .collect();

    let total_items = all_items.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    if total_items > visible_height {
        let max_scroll = total_items - visible_height;
        *scroll_offset = (*scroll_offset).min(max_scroll);
    } else {
        *scroll_offset = 0;
    }

    let visible_items: Vec<ListItem> = all_items
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}
