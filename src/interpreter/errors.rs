//! Error types for the interpreter boundary
//!
//! Every operation on [`Interpreter`](super::Interpreter) may fail with an
//! [`InterpreterError`]. The session core never lets one of these escape a
//! run: evaluation failures become a single error line in the output log and
//! help failures become a displayable string. Only bootstrap failures end a
//! session.

use super::ContextId;

/// Errors raised by an interpreter backend
#[derive(Debug, thiserror::Error)]
pub enum InterpreterError {
    /// The runtime program could not be started
    #[error("failed to start runtime `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Filesystem or pipe failure while talking to the runtime
    #[error("runtime i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The evaluated code raised (non-zero exit, interpreter error condition)
    #[error("{message}")]
    Evaluation { message: String },

    /// A bootstrap command (install, library load, version probe) failed
    #[error("`{command}` failed: {message}")]
    Command { command: String, message: String },

    /// No runtime process: `initialize` was never called or the process died
    #[error("runtime is not running")]
    NotRunning,

    /// The runtime process closed its output mid-request
    #[error("runtime exited unexpectedly: {message}")]
    Exited { message: String },

    /// The runtime answered a request with something unreadable
    #[error("runtime protocol error: {0}")]
    Protocol(String),

    /// A context handle that was never acquired or was already released
    #[error("unknown evaluation context {0}")]
    UnknownContext(ContextId),
}

impl InterpreterError {
    /// Shorthand for an evaluation failure carrying the runtime's message
    pub fn evaluation(message: impl Into<String>) -> Self {
        InterpreterError::Evaluation {
            message: message.into(),
        }
    }
}
