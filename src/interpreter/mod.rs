//! Interpreter boundary
//!
//! The session core never evaluates code itself. It talks to an embedded
//! runtime through the [`Interpreter`] trait:
//! - [`errors`]: the [`InterpreterError`] raised by every operation
//! - [`process`]: a runtime that runs each snippet as a subprocess inside a
//!   temporary shelter directory
//!
//! # Ingress
//!
//! Backends report output loosely, as `(kind, text)` pairs in
//! [`RawOutput`]. The runner translates each one into the closed
//! [`OutputRecord`] enum as soon as it arrives, so nothing past this module
//! inspects kind strings.
//!
//! # Shelters
//!
//! Every evaluation runs inside an isolated context acquired with
//! [`Interpreter::acquire_context`] and handed back with
//! [`Interpreter::release_context`]. A context that is never released leaks
//! runtime resources, so callers must release on every exit path.

pub mod errors;
pub mod process;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use errors::InterpreterError;

/// Handle for an isolated evaluation context ("shelter")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(pub u64);

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Pixel size of the graphics device opened for each evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphicsSize {
    pub width: u32,
    pub height: u32,
}

impl Default for GraphicsSize {
    fn default() -> Self {
        GraphicsSize {
            width: 800,
            height: 600,
        }
    }
}

/// Fixed evaluation settings sent with every request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalConfig {
    /// Print the value of top-level expressions
    pub autoprint: bool,
    pub capture_output: bool,
    pub capture_conditions: bool,
    /// `None` disables graphics capture
    pub capture_graphics: Option<GraphicsSize>,
}

impl EvalConfig {
    /// The configuration used for every submitted snippet
    pub fn for_session(graphics: GraphicsSize) -> Self {
        EvalConfig {
            autoprint: true,
            capture_output: true,
            capture_conditions: true,
            capture_graphics: Some(graphics),
        }
    }
}

/// Runtime options applied during bootstrap
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeOptions {
    /// Package repositories, in priority order
    pub repos: Vec<String>,
}

/// One unit of output exactly as the backend reported it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOutput {
    pub kind: String,
    pub text: String,
}

impl RawOutput {
    pub fn new(kind: impl Into<String>, text: impl Into<String>) -> Self {
        RawOutput {
            kind: kind.into(),
            text: text.into(),
        }
    }
}

/// Encoded image bytes produced by the graphics device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    pub bytes: Vec<u8>,
}

/// Everything one successful evaluation produced, in emission order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEvaluation {
    pub output: Vec<RawOutput>,
    pub images: Vec<RawImage>,
}

/// Categorized interpreter output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputRecord {
    Stdout(String),
    Stderr(String),
    /// Messages, warnings and other signalled conditions
    Condition(String),
}

impl OutputRecord {
    /// Translate a raw record, returning `None` for kinds the core does not know
    pub fn from_raw(raw: RawOutput) -> Option<Self> {
        match raw.kind.as_str() {
            "stdout" => Some(OutputRecord::Stdout(raw.text)),
            "stderr" => Some(OutputRecord::Stderr(raw.text)),
            "message" | "warning" | "error" | "condition" => {
                Some(OutputRecord::Condition(raw.text))
            }
            _ => None,
        }
    }

    /// Blank stream text is noise; conditions always carry meaning
    pub fn is_suppressed(&self) -> bool {
        match self {
            OutputRecord::Stdout(text) | OutputRecord::Stderr(text) => text.trim().is_empty(),
            OutputRecord::Condition(_) => false,
        }
    }
}

/// The embedded runtime the session drives
///
/// All operations are suspension points. The session calls them from a
/// single-threaded executor and never runs two of them concurrently against
/// the same shelter.
#[allow(async_fn_in_trait)]
pub trait Interpreter {
    /// Start the runtime
    async fn initialize(&self) -> Result<(), InterpreterError>;

    /// Apply runtime options such as package repositories
    async fn configure(&self, options: &RuntimeOptions) -> Result<(), InterpreterError>;

    /// Install a package from the given repositories
    async fn install_package(&self, name: &str, sources: &[String])
        -> Result<(), InterpreterError>;

    /// Attach an installed package so later evaluations can use it
    async fn load_library(&self, name: &str) -> Result<(), InterpreterError>;

    /// Open a fresh isolated evaluation context
    async fn acquire_context(&self) -> Result<ContextId, InterpreterError>;

    /// Evaluate `code` inside `context`
    async fn evaluate(
        &self,
        context: ContextId,
        code: &str,
        config: &EvalConfig,
    ) -> Result<RawEvaluation, InterpreterError>;

    /// Reclaim everything the context holds
    async fn release_context(&self, context: ContextId) -> Result<(), InterpreterError>;

    /// Documentation text for `topic`, or `None` when the runtime has none
    async fn lookup_documentation(&self, topic: &str) -> Result<Option<String>, InterpreterError>;
}
