//! TUI pane rendering modules
//!
//! Each pane is a stateless render function over session or UI state.
//!
//! # Pane Modules
//!
//! - [`editor`]: multi-line editor with syntax highlighting and selection
//! - [`console`]: single-line REPL input with prompt and history position
//! - [`output`]: the session's output log, styled by category
//! - [`help`]: documentation panel with section headings
//! - [`plots`]: plot viewport with position counter and navigation state
//! - [`status`]: status bar with session indicator and keybindings

pub mod console;
pub mod editor;
pub mod help;
pub mod output;
pub mod plots;
pub mod status;

pub use console::render_console_pane;
pub use editor::render_editor_pane;
pub use help::render_help_pane;
pub use output::render_output_pane;
pub use plots::render_plots_pane;
pub use status::render_status_bar;

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    style::{Modifier, Style},
    text::Span,
};

/// Border style shared by all panes
fn border_style(is_focused: bool) -> Style {
    if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    }
}

fn pane_title(title: &str, is_focused: bool) -> Span<'static> {
    let style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.fg)
    };
    Span::styled(title.to_string(), style)
}
