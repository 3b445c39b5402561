//! Status bar rendering with keybindings and session state

use crate::session::status::{Indicator, SessionStatus};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Render the status bar at the bottom.
///
/// The left half carries the session indicator, the status label and the
/// last UI message; the right half lists keybindings.
pub fn render_status_bar(
    frame: &mut Frame,
    area: Rect,
    status: &SessionStatus,
    is_busy: bool,
    message: &str,
) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let (badge, badge_bg) = match (status.indicator(), is_busy) {
        (Indicator::Error, _) => (" ERROR ", DEFAULT_THEME.error),
        (Indicator::Loading, _) => (" LOADING ", DEFAULT_THEME.secondary),
        (Indicator::Ready, true) => (" RUNNING ", DEFAULT_THEME.secondary),
        (Indicator::Ready, false) => (" READY ", DEFAULT_THEME.success),
    };

    let label_fg = if status.indicator() == Indicator::Error {
        DEFAULT_THEME.error
    } else {
        DEFAULT_THEME.fg
    };

    let mut left_spans = vec![
        Span::styled(
            badge,
            Style::default()
                .bg(badge_bg)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {} ", status.label()),
            Style::default()
                .bg(DEFAULT_THEME.current_line_bg)
                .fg(label_fg),
        ),
    ];
    if !message.is_empty() {
        left_spans.push(Span::styled(
            " | ",
            Style::default()
                .bg(DEFAULT_THEME.current_line_bg)
                .fg(DEFAULT_THEME.comment),
        ));
        left_spans.push(Span::styled(
            format!("{} ", message),
            Style::default()
                .bg(DEFAULT_THEME.current_line_bg)
                .fg(DEFAULT_THEME.fg),
        ));
    }

    let left_paragraph = Paragraph::new(Line::from(left_spans))
        .style(Style::default().bg(DEFAULT_THEME.current_line_bg))
        .alignment(Alignment::Left);
    frame.render_widget(left_paragraph, layout[0]);

    // Right side: keybinds with visual grouping
    let key_style = Style::default().bg(DEFAULT_THEME.comment).fg(Color::Black);
    let desc_style = Style::default()
        .bg(DEFAULT_THEME.current_line_bg)
        .fg(DEFAULT_THEME.fg);
    let sep_style = Style::default()
        .bg(DEFAULT_THEME.current_line_bg)
        .fg(DEFAULT_THEME.comment);

    let right_spans = vec![
        Span::styled(" ⇥ ", key_style),
        Span::styled(" focus ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ", desc_style),
        Span::styled(" ^R ", key_style),
        Span::styled(" run ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ", desc_style),
        Span::styled(" ^L ", key_style),
        Span::styled(" run line ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ", desc_style),
        Span::styled(" ↑/↓ ", key_style),
        Span::styled(" history ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ", desc_style),
        Span::styled(" ^Q ", key_style),
        Span::styled(" quit ", desc_style),
    ];

    let right_paragraph = Paragraph::new(Line::from(right_spans))
        .style(Style::default().bg(DEFAULT_THEME.current_line_bg))
        .alignment(Alignment::Right);
    frame.render_widget(right_paragraph, layout[1]);
}
