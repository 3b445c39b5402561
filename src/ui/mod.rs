//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is organized into four layers:
//!
//! - **[`app`]**: application state, keyboard event loop, pane focus and the
//!   hand-off of submitted code to the session
//! - **[`editor`]**: the text model behind the multi-line editor
//! - **[`panes`]**: stateless render functions for each visible pane (editor,
//!   console, output, help, plots, status bar)
//! - **[`theme`]**: centralized color palette used by all panes
//!
//! The entry point for consumers is [`App`]: construct it over a shared
//! [`Session`] and await [`App::run`] inside a `LocalSet`.
//!
//! [`Session`]: crate::session::Session
//! [`App::run`]: app::App::run

pub mod app;
pub mod editor;
pub mod panes;
pub mod theme;

pub use app::App;
