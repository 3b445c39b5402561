//! Evaluation of submitted code
//!
//! # Run sequence
//!
//! 1. Reject silently when busy, blank or not ready.
//! 2. Divert help requests to the documentation panel (no shelter, no lock).
//! 3. Take the run lock and echo the command.
//! 4. Acquire a shelter, evaluate, release the shelter on every path.
//! 5. Route records to the output log and images to the gallery, or append
//!    one error line on failure.
//! 6. Drop the run lock.

use super::gallery::PlotImage;
use super::help::{self, HelpPage};
use super::output::OutputKind;
use super::Session;
use crate::interpreter::{EvalConfig, Interpreter, InterpreterError, OutputRecord, RawEvaluation};
use std::cell::Cell;

/// Why a submission was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Another evaluation is in flight
    Busy,
    Empty,
    /// Bootstrap has not finished, or failed
    NotReady,
}

/// What a call to [`Session::run`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Rejected(Rejection),
    /// The code was a help request and the panel now shows `topic`
    Help { topic: String },
    /// Evaluation succeeded; counts are lines appended and plots captured
    Completed { records: usize, plots: usize },
    /// Evaluation failed and one error line was appended
    Failed { message: String },
}

/// Holds the run lock; dropping it releases the lock
struct RunGuard<'a> {
    lock: &'a Cell<bool>,
}

impl<'a> RunGuard<'a> {
    fn acquire(lock: &'a Cell<bool>) -> Option<Self> {
        if lock.replace(true) {
            None
        } else {
            Some(RunGuard { lock })
        }
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.lock.set(false);
    }
}

impl<I: Interpreter> Session<I> {
    /// Run `code` from either input surface
    pub async fn run(&self, code: &str) -> RunOutcome {
        self.pending.set(false);
        if self.is_busy() {
            tracing::debug!("submission dropped: evaluation in flight");
            return RunOutcome::Rejected(Rejection::Busy);
        }
        let code = code.trim();
        if code.is_empty() {
            return RunOutcome::Rejected(Rejection::Empty);
        }
        if !self.is_ready() {
            tracing::debug!("submission dropped: session not ready");
            return RunOutcome::Rejected(Rejection::NotReady);
        }

        if let Some(topic) = help::help_topic(code) {
            return self.show_help(topic).await;
        }

        let Some(_guard) = RunGuard::acquire(&self.run_lock) else {
            return RunOutcome::Rejected(Rejection::Busy);
        };

        self.output.borrow_mut().echo_command(code);
        tracing::info!(lines = code.lines().count(), "evaluation started");

        match self.evaluate_sheltered(code).await {
            Ok(result) => {
                let (records, plots) = self.collect(result);
                tracing::info!(records, plots, "evaluation finished");
                RunOutcome::Completed { records, plots }
            }
            Err(e) => {
                let message = e.to_string();
                tracing::info!(error = %message, "evaluation failed");
                self.output
                    .borrow_mut()
                    .push(OutputKind::Error, format!("Error: {}", message));
                RunOutcome::Failed { message }
            }
        }
    }

    async fn show_help(&self, topic: String) -> RunOutcome {
        let text = help::resolve(&self.interpreter, &topic).await;
        *self.help.borrow_mut() = Some(HelpPage::format(&topic, &text));
        RunOutcome::Help { topic }
    }

    /// Evaluate inside a fresh shelter, releasing it whatever happens
    async fn evaluate_sheltered(&self, code: &str) -> Result<RawEvaluation, InterpreterError> {
        let context = self.interpreter.acquire_context().await?;
        let config = EvalConfig::for_session(self.graphics);
        let result = self.interpreter.evaluate(context, code, &config).await;

        if let Err(e) = self.interpreter.release_context(context).await {
            tracing::warn!(%context, error = %e, "failed to release shelter");
        }
        result
    }

    /// Route a successful result into the output log and the gallery
    fn collect(&self, result: RawEvaluation) -> (usize, usize) {
        let mut records = 0;
        {
            let mut output = self.output.borrow_mut();
            for raw in result.output {
                let kind = raw.kind.clone();
                match OutputRecord::from_raw(raw) {
                    Some(record) => {
                        if output.push_record(record) {
                            records += 1;
                        }
                    }
                    None => tracing::warn!(kind = %kind, "dropped output of unknown kind"),
                }
            }
        }

        let plots = result.images.len();
        let mut gallery = self.gallery.borrow_mut();
        for raw in result.images {
            gallery.append(PlotImage::normalize(raw));
        }

        (records, plots)
    }
}
