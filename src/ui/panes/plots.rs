//! Plot viewport rendering
//!
//! A terminal cannot draw the image itself, so the viewport describes the
//! focused plot (format, pixel size, encoded size) together with the
//! 1-based position counter and the enabled navigation directions.

use super::{border_style, pane_title};
use crate::session::gallery::PlotGallery;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn nav_style(enabled: bool) -> Style {
    if enabled {
        Style::default()
            .fg(DEFAULT_THEME.primary)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.comment)
    }
}

/// Render the plot viewport
pub fn render_plots_pane(frame: &mut Frame, area: Rect, gallery: &PlotGallery, is_focused: bool) {
    let Some(view) = gallery.current_view() else {
        let block = Block::default()
            .title(pane_title(" Plots ", is_focused))
            .borders(Borders::ALL)
            .border_style(border_style(is_focused));
        let paragraph = Paragraph::new("(no plots)")
            .block(block)
            .alignment(Alignment::Center)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    };

    let block = Block::default()
        .title(pane_title(
            &format!(" Plots {}/{} ", view.position, view.total),
            is_focused,
        ))
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    let image = view.image;
    let size = match image.dimensions {
        Some((width, height)) => format!("{} x {} px", width, height),
        None => "size unknown".to_string(),
    };

    let lines = vec![
        Line::from(Span::styled(
            format!("{} image", image.format),
            Style::default()
                .fg(DEFAULT_THEME.success)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(size, Style::default().fg(DEFAULT_THEME.fg))),
        Line::from(Span::styled(
            format!("{} bytes", image.size()),
            Style::default().fg(DEFAULT_THEME.comment),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(" ◀ prev ", nav_style(gallery.can_prev())),
            Span::styled(
                format!(" {}/{} ", view.position, view.total),
                Style::default().fg(DEFAULT_THEME.fg),
            ),
            Span::styled(" next ▶ ", nav_style(gallery.can_next())),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
