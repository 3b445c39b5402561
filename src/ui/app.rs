//! Main TUI application state and logic

use crate::interpreter::Interpreter;
use crate::session::history::ReplHistory;
use crate::session::Session;
use crate::ui::editor::EditorBuffer;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::rc::Rc;
use std::time::Duration;

/// How long the event loop yields to evaluation tasks between input polls
const IDLE_TICK: Duration = Duration::from_millis(30);

/// Rows scrolled by PageUp/PageDown
const PAGE_ROWS: usize = 10;

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Editor,
    Console,
    Output,
    Help,
    Plots,
}

impl FocusedPane {
    /// Move focus to the next pane (editor -> console -> output -> help -> plots)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Editor => FocusedPane::Console,
            FocusedPane::Console => FocusedPane::Output,
            FocusedPane::Output => FocusedPane::Help,
            FocusedPane::Help => FocusedPane::Plots,
            FocusedPane::Plots => FocusedPane::Editor,
        }
    }

    /// Move focus to the previous pane
    pub fn prev(self) -> Self {
        match self {
            FocusedPane::Editor => FocusedPane::Plots,
            FocusedPane::Console => FocusedPane::Editor,
            FocusedPane::Output => FocusedPane::Console,
            FocusedPane::Help => FocusedPane::Output,
            FocusedPane::Plots => FocusedPane::Help,
        }
    }
}

/// The main application state
pub struct App<I: Interpreter + 'static> {
    /// Shared session; evaluation tasks hold their own handle
    pub session: Rc<Session<I>>,

    pub editor: EditorBuffer,

    /// Console line and its command history
    pub console: ReplHistory,

    pub focused_pane: FocusedPane,

    /// Per-pane scroll offsets
    pub editor_scroll: usize,
    pub output_scroll: usize,
    pub help_scroll: usize,

    /// Output line count at the last render, for auto-scroll
    pub prev_output_lines: usize,

    pub should_quit: bool,

    /// Last UI message shown in the status bar
    pub status_message: String,
}

impl<I: Interpreter + 'static> App<I> {
    /// Create a new app over `session` with `source` preloaded into the editor
    pub fn new(session: Rc<Session<I>>, source: &str) -> Self {
        App {
            session,
            editor: EditorBuffer::from_text(source),
            console: ReplHistory::new(),
            focused_pane: FocusedPane::Console,
            editor_scroll: 0,
            output_scroll: 0,
            help_scroll: 0,
            prev_output_lines: 0,
            should_quit: false,
            status_message: String::new(),
        }
    }

    /// Run the TUI event loop
    ///
    /// Must be polled inside a `tokio::task::LocalSet`: submissions are
    /// spawned as local tasks so the loop keeps drawing while the runtime
    /// works.
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if event::poll(Duration::ZERO)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            } else {
                tokio::time::sleep(IDLE_TICK).await;
            }
        }

        Ok(())
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Panes above, status bar at the bottom
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(main_chunks[0]);

        // Left column: Editor | Output | Console
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(45),
                Constraint::Min(3),
                Constraint::Length(3),
            ])
            .split(columns[0]);

        // Right column: Help | Plots
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(columns[1]);

        let read_only = !self.session.accepts_input();

        super::panes::render_editor_pane(
            frame,
            left_rows[0],
            &self.editor,
            self.focused_pane == FocusedPane::Editor,
            read_only,
            &mut self.editor_scroll,
        );

        {
            let output = self.session.output();
            // Follow new output to the bottom
            if output.len() != self.prev_output_lines {
                self.prev_output_lines = output.len();
                self.output_scroll = usize::MAX;
            }
            super::panes::render_output_pane(
                frame,
                left_rows[1],
                output.lines(),
                self.focused_pane == FocusedPane::Output,
                &mut self.output_scroll,
            );
        }

        super::panes::render_console_pane(
            frame,
            left_rows[2],
            &self.console,
            self.focused_pane == FocusedPane::Console,
            read_only,
        );

        super::panes::render_help_pane(
            frame,
            right_rows[0],
            self.session.help_page().as_ref(),
            self.focused_pane == FocusedPane::Help,
            &mut self.help_scroll,
        );

        super::panes::render_plots_pane(
            frame,
            right_rows[1],
            &self.session.gallery(),
            self.focused_pane == FocusedPane::Plots,
        );

        super::panes::render_status_bar(
            frame,
            main_chunks[1],
            &self.session.status(),
            self.session.is_busy(),
            &self.status_message,
        );
    }

    /// Hand `code` to the session on a local task
    ///
    /// Input freezes right away; the task only starts on the next yield.
    fn submit(&mut self, code: String) {
        self.session.mark_pending();
        let session = Rc::clone(&self.session);
        tokio::task::spawn_local(async move {
            session.run(&code).await;
        });
    }

    /// Handle one key press
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('c') if ctrl => {
                self.should_quit = true;
                return;
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
                return;
            }
            KeyCode::BackTab => {
                self.focused_pane = self.focused_pane.prev();
                return;
            }
            KeyCode::Char('r') if ctrl => {
                self.run_editor();
                return;
            }
            KeyCode::Enter if ctrl => {
                self.run_editor();
                return;
            }
            _ => {}
        }

        match self.focused_pane {
            FocusedPane::Editor => self.handle_editor_key(key),
            FocusedPane::Console => self.handle_console_key(key),
            FocusedPane::Output => {
                Self::scroll(&mut self.output_scroll, key.code);
            }
            FocusedPane::Help => {
                Self::scroll(&mut self.help_scroll, key.code);
            }
            FocusedPane::Plots => self.handle_plots_key(key),
        }
    }

    /// Run the editor selection, or the whole buffer
    fn run_editor(&mut self) {
        if !self.session.accepts_input() {
            return;
        }
        let code = self.editor.run_target();
        if code.trim().is_empty() {
            return;
        }
        self.status_message = "Running editor code".to_string();
        self.submit(code);
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        if !self.session.accepts_input() {
            return;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);

        match key.code {
            KeyCode::Char('l') if ctrl => {
                let line = self.editor.take_line_for_run();
                if !line.trim().is_empty() {
                    self.status_message = "Running current line".to_string();
                    self.submit(line);
                }
            }
            KeyCode::Char(c) if !ctrl => self.editor.insert_char(c),
            KeyCode::Enter => self.editor.newline(),
            KeyCode::Backspace => self.editor.backspace(),
            KeyCode::Delete => self.editor.delete(),
            KeyCode::Left => self.editor.move_left(shift),
            KeyCode::Right => self.editor.move_right(shift),
            KeyCode::Up => self.editor.move_up(shift),
            KeyCode::Down => self.editor.move_down(shift),
            KeyCode::Home => self.editor.home(shift),
            KeyCode::End => self.editor.end(shift),
            _ => {}
        }
    }

    fn handle_console_key(&mut self, key: KeyEvent) {
        // Input stays frozen while busy, and for good after a failed bootstrap
        if !self.session.accepts_input() {
            return;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Enter => {
                if let Some(command) = self.console.submit() {
                    self.status_message.clear();
                    self.submit(command);
                }
            }
            KeyCode::Up => self.console.navigate_up(),
            KeyCode::Down => self.console.navigate_down(),
            KeyCode::Left => self.console.caret_left(),
            KeyCode::Right => self.console.caret_right(),
            KeyCode::Home => self.console.caret_home(),
            KeyCode::End => self.console.caret_end(),
            KeyCode::Backspace => self.console.backspace(),
            KeyCode::Delete => self.console.delete(),
            KeyCode::Char(c) if !ctrl => self.console.insert_char(c),
            _ => {}
        }
    }

    fn handle_plots_key(&mut self, key: KeyEvent) {
        let mut gallery = self.session.gallery_mut();
        match key.code {
            KeyCode::Left => gallery.prev(),
            KeyCode::Right => gallery.next(),
            KeyCode::Char('x') => {
                gallery.clear();
                self.status_message = "Plots cleared".to_string();
            }
            _ => {}
        }
    }

    fn scroll(offset: &mut usize, code: KeyCode) {
        match code {
            KeyCode::Up => *offset = offset.saturating_sub(1),
            KeyCode::Down => *offset = offset.saturating_add(1),
            KeyCode::PageUp => *offset = offset.saturating_sub(PAGE_ROWS),
            KeyCode::PageDown => *offset = offset.saturating_add(PAGE_ROWS),
            KeyCode::Home => *offset = 0,
            KeyCode::End => *offset = usize::MAX,
            _ => {}
        }
    }
}
