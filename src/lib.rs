//! # Introduction
//!
//! replterm is an interactive session manager for a sandboxed language
//! runtime. Code typed into a multi-line editor or a single-line console is
//! evaluated by an embedded interpreter inside a disposable shelter; the
//! resulting output is classified and logged, plots are collected into a
//! gallery, and help requests are answered in a documentation panel.
//!
//! ## Execution pipeline
//!
//! ```text
//! Editor / Console → Session::run → Shelter → Interpreter → Output log + Plot gallery
//!                              ↘ ?topic → Help panel
//! ```
//!
//! 1. [`interpreter`]: the async [`interpreter::Interpreter`] boundary and a
//!    subprocess-backed runtime.
//! 2. [`session`]: lifecycle, run lock, output classification, history and
//!    the plot gallery.
//! 3. [`config`]: runtime, bootstrap and graphics settings read from TOML.
//! 4. [`ui`]: ratatui-based TUI; not part of the stable library API.
//! 5. [`logging`]: `tracing` output to a log file.
//!
//! ## Concurrency
//!
//! Everything runs on one thread. Evaluations are serialized by the
//! session's run lock: a submission made while another is in flight is
//! dropped, not queued.

pub mod config;
pub mod interpreter;
pub mod logging;
pub mod session;
pub mod ui;
