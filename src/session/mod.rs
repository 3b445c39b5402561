//! Session core
//!
//! A [`Session`] is the one process-scoped object that owns everything the
//! input surfaces mutate: readiness status, the run lock, the output log,
//! the plot gallery and the documentation panel. It is shared by `Rc` and
//! driven from a single-threaded executor, so mutable state lives in
//! `Cell`/`RefCell` and no borrow is ever held across an await point.
//!
//! - [`status`]: lifecycle states and the status line
//! - [`lifecycle`]: one-time bootstrap
//! - [`runner`]: one evaluation, from echo to plot capture
//! - [`help`]: help-request interception and formatting
//! - [`history`]: console history and navigation
//! - [`output`]: the output log
//! - [`gallery`]: the plot buffer
//!
//! The console history is not part of the session: the console owns it and
//! forwards submitted lines to [`Session::run`].

pub mod gallery;
pub mod help;
pub mod history;
pub mod lifecycle;
pub mod output;
pub mod runner;
pub mod status;

use crate::interpreter::{GraphicsSize, Interpreter};
use gallery::PlotGallery;
use help::HelpPage;
use output::OutputSink;
use status::SessionStatus;
use std::cell::{Cell, Ref, RefCell, RefMut};

pub use lifecycle::BootstrapError;
pub use runner::{Rejection, RunOutcome};

pub struct Session<I> {
    interpreter: I,
    graphics: GraphicsSize,
    status: RefCell<SessionStatus>,
    /// Held while an evaluation is in flight
    run_lock: Cell<bool>,
    /// Set between handing code off and the run starting
    pending: Cell<bool>,
    output: RefCell<OutputSink>,
    gallery: RefCell<PlotGallery>,
    help: RefCell<Option<HelpPage>>,
}

impl<I: Interpreter> Session<I> {
    /// Create an uninitialized session; call [`Session::bootstrap`] before running code
    pub fn new(interpreter: I, graphics: GraphicsSize) -> Self {
        Session {
            interpreter,
            graphics,
            status: RefCell::new(SessionStatus::Uninitialized),
            run_lock: Cell::new(false),
            pending: Cell::new(false),
            output: RefCell::new(OutputSink::new()),
            gallery: RefCell::new(PlotGallery::new()),
            help: RefCell::new(None),
        }
    }

    pub fn interpreter(&self) -> &I {
        &self.interpreter
    }

    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.status.borrow().is_ready()
    }

    /// Whether an evaluation is in flight
    pub fn is_busy(&self) -> bool {
        self.run_lock.get()
    }

    /// Whether the input surfaces should accept edits and submissions
    pub fn accepts_input(&self) -> bool {
        self.is_ready() && !self.is_busy() && !self.pending.get()
    }

    /// Freeze input for a submission that has been handed off
    ///
    /// The flag clears as soon as [`Session::run`] starts, whatever it
    /// decides to do with the code.
    pub fn mark_pending(&self) {
        self.pending.set(true);
    }

    pub fn output(&self) -> Ref<'_, OutputSink> {
        self.output.borrow()
    }

    pub fn gallery(&self) -> Ref<'_, PlotGallery> {
        self.gallery.borrow()
    }

    /// Mutable gallery access for the plot viewport's navigation controls
    pub fn gallery_mut(&self) -> RefMut<'_, PlotGallery> {
        self.gallery.borrow_mut()
    }

    /// Page shown in the documentation panel
    pub fn help_page(&self) -> Ref<'_, Option<HelpPage>> {
        self.help.borrow()
    }

    /// Move to `next` if the lifecycle allows it
    fn advance(&self, next: SessionStatus) -> bool {
        let mut status = self.status.borrow_mut();
        if !status.can_transition_to(&next) {
            tracing::warn!(from = ?*status, to = ?next, "ignored status transition");
            return false;
        }
        tracing::info!(status = %next.label(), "session status changed");
        *status = next;
        true
    }
}
