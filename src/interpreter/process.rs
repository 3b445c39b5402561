//! Subprocess-backed runtime
//!
//! [`ProcessInterpreter`] keeps one long-lived runtime process (by default
//! `R`) for the whole session, so variables and attached packages survive
//! from one snippet to the next. Every operation is a request: one line
//! written to the runtime's stdin, wrapped by the configured request
//! template so the runtime finishes with a per-request marker on both
//! output streams.
//!
//! A shelter is a scratch directory for one evaluation. The snippet is
//! written there as a script, the graphics device writes image files into
//! its `plots/` subdirectory, and releasing the context deletes it.
//!
//! # Ordering
//!
//! Stdout and stderr are separate pipes read concurrently. Lines keep their
//! exact order within each stream; the interleaving between the two streams
//! is best-effort, since lines buffered on both pipes at once are taken in
//! whichever order the reader sees them.

use super::{
    ContextId, EvalConfig, Interpreter, InterpreterError, RawEvaluation, RawImage, RawOutput,
    RuntimeOptions,
};
use crate::config::RuntimeConfig;
use rustc_hash::FxHashMap;
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;

/// Subdirectory of a shelter that receives graphics output
const PLOT_DIR: &str = "plots";

/// Output of one request, up to its completion marker
struct Reply {
    status: i32,
    lines: Vec<RawOutput>,
}

impl Reply {
    fn succeeded(&self) -> bool {
        self.status == 0
    }

    /// Stderr text, used as the failure message
    fn stderr_text(&self) -> String {
        let text = joined(&self.lines, "stderr");
        let text = text.trim();
        if text.is_empty() {
            format!("runtime reported status {}", self.status)
        } else {
            text.to_string()
        }
    }

    fn stdout_text(&self) -> String {
        joined(&self.lines, "stdout")
    }
}

fn joined(lines: &[RawOutput], kind: &str) -> String {
    lines
        .iter()
        .filter(|line| line.kind == kind)
        .map(|line| line.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Which pipe produced a line
enum Stream {
    Stdout(Option<String>),
    Stderr(Option<String>),
}

/// The running runtime process and its pipes
struct Worker {
    // Held so the process is killed when the worker is dropped
    _child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    stderr: Lines<BufReader<ChildStderr>>,
}

impl Worker {
    fn spawn(config: &RuntimeConfig) -> Result<Self, InterpreterError> {
        let mut child = Command::new(&config.program)
            .args(&config.args)
            .current_dir(std::env::temp_dir())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| InterpreterError::Spawn {
                program: config.program.clone(),
                source,
            })?;

        let pipe = |name: &str| InterpreterError::Protocol(format!("runtime {name} unavailable"));
        let stdin = child.stdin.take().ok_or_else(|| pipe("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| pipe("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| pipe("stderr"))?;

        Ok(Worker {
            _child: child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            stderr: BufReader::new(stderr).lines(),
        })
    }

    /// Send one request line and read both streams up to `marker`
    async fn request(&mut self, command: &str, marker: &str) -> Result<Reply, InterpreterError> {
        self.stdin.write_all(command.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;

        let mut lines = Vec::new();
        let mut exit: Option<i32> = None;
        let mut stderr_done = false;

        let status = loop {
            if let (Some(status), true) = (exit, stderr_done) {
                break status;
            }

            let event = tokio::select! {
                line = self.stdout.next_line(), if exit.is_none() => Stream::Stdout(line?),
                line = self.stderr.next_line(), if !stderr_done => Stream::Stderr(line?),
            };

            match event {
                Stream::Stdout(Some(text)) => match text.find(marker) {
                    Some(at) => {
                        push_text(&mut lines, "stdout", &text[..at]);
                        exit = Some(parse_status(&text[at + marker.len()..])?);
                    }
                    None => lines.push(RawOutput::new("stdout", text)),
                },
                Stream::Stderr(Some(text)) => match text.find(marker) {
                    Some(at) => {
                        push_text(&mut lines, "stderr", &text[..at]);
                        stderr_done = true;
                    }
                    None => lines.push(RawOutput::new("stderr", text)),
                },
                Stream::Stdout(None) | Stream::Stderr(None) => {
                    return Err(InterpreterError::Exited {
                        message: joined(&lines, "stderr"),
                    });
                }
            }
        };

        Ok(Reply { status, lines })
    }
}

/// Keep the part of a marker line the snippet printed without a newline
fn push_text(lines: &mut Vec<RawOutput>, kind: &str, text: &str) {
    if !text.is_empty() {
        lines.push(RawOutput::new(kind, text));
    }
}

fn parse_status(rest: &str) -> Result<i32, InterpreterError> {
    let rest = rest.trim();
    rest.parse()
        .map_err(|_| InterpreterError::Protocol(format!("bad completion status `{rest}`")))
}

/// Runtime backed by one persistent subprocess
pub struct ProcessInterpreter {
    config: RuntimeConfig,
    repos: RefCell<Vec<String>>,
    worker: Mutex<Option<Worker>>,
    shelters: RefCell<FxHashMap<ContextId, TempDir>>,
    next_context: Cell<u64>,
    next_request: Cell<u64>,
}

impl ProcessInterpreter {
    pub fn new(config: RuntimeConfig) -> Self {
        ProcessInterpreter {
            config,
            repos: RefCell::new(Vec::new()),
            worker: Mutex::new(None),
            shelters: RefCell::new(FxHashMap::default()),
            next_context: Cell::new(1),
            next_request: Cell::new(1),
        }
    }

    /// Number of acquired and not yet released shelters
    pub fn open_shelters(&self) -> usize {
        self.shelters.borrow().len()
    }

    fn next_marker(&self) -> String {
        let id = self.next_request.get();
        self.next_request.set(id + 1);
        format!("@@replterm-{}-{}@@", std::process::id(), id)
    }

    /// Run single-line `code` in the runtime
    ///
    /// A runtime that dies mid-request is dropped; later requests fail with
    /// [`InterpreterError::NotRunning`].
    async fn request(&self, code: &str) -> Result<Reply, InterpreterError> {
        let marker = self.next_marker();
        let command = expand(
            &self.config.request_template,
            &[("code", code), ("marker", marker.as_str())],
        );

        let mut worker = self.worker.lock().await;
        let running = worker.as_mut().ok_or(InterpreterError::NotRunning)?;
        let reply = running.request(&command, &marker).await;
        if let Err(e @ (InterpreterError::Exited { .. } | InterpreterError::Io(_))) = &reply {
            tracing::error!(error = %e, "runtime process lost");
            *worker = None;
        }
        reply
    }

    /// Run a bootstrap request, turning a non-zero status into a command error
    async fn command(&self, code: &str, description: &str) -> Result<Reply, InterpreterError> {
        let reply = self.request(code).await?;
        if reply.succeeded() {
            Ok(reply)
        } else {
            Err(InterpreterError::Command {
                command: description.to_string(),
                message: reply.stderr_text(),
            })
        }
    }

    /// Assemble the script written into a shelter
    fn build_script(&self, code: &str, config: &EvalConfig, plot_dir: &Path) -> String {
        let mut script = String::new();

        if let (Some(size), Some(prelude)) =
            (config.capture_graphics, &self.config.graphics_prelude)
        {
            let width = size.width.to_string();
            let height = size.height.to_string();
            let plot_dir = escape_literal(&plot_dir.to_string_lossy());
            let vars = [
                ("width", width.as_str()),
                ("height", height.as_str()),
                ("plot_dir", plot_dir.as_str()),
            ];
            script.push_str(&expand(prelude, &vars));
            script.push('\n');
        }

        script.push_str(code);
        script.push('\n');
        script
    }

    fn shelter_path(&self, context: ContextId) -> Result<PathBuf, InterpreterError> {
        self.shelters
            .borrow()
            .get(&context)
            .map(|dir| dir.path().to_path_buf())
            .ok_or(InterpreterError::UnknownContext(context))
    }
}

impl Interpreter for ProcessInterpreter {
    async fn initialize(&self) -> Result<(), InterpreterError> {
        let worker = Worker::spawn(&self.config)?;
        *self.worker.lock().await = Some(worker);

        let reply = self
            .command(&self.config.version_code, "version probe")
            .await?;
        let version = reply.stdout_text();
        tracing::info!(
            program = %self.config.program,
            version = version.lines().next().unwrap_or("").trim(),
            "runtime started"
        );
        Ok(())
    }

    async fn configure(&self, options: &RuntimeOptions) -> Result<(), InterpreterError> {
        *self.repos.borrow_mut() = options.repos.clone();
        Ok(())
    }

    async fn install_package(
        &self,
        name: &str,
        sources: &[String],
    ) -> Result<(), InterpreterError> {
        // Fall back to the repositories given to `configure`
        let sources = if sources.is_empty() {
            self.repos.borrow().clone()
        } else {
            sources.to_vec()
        };
        let repos = sources
            .iter()
            .map(|repo| format!("'{}'", escape_literal(repo)))
            .collect::<Vec<_>>()
            .join(", ");
        let escaped = escape_literal(name);
        let code = expand(
            &self.config.install_template,
            &[("name", escaped.as_str()), ("repos", repos.as_str())],
        );
        self.command(&code, &format!("install {name}")).await?;
        Ok(())
    }

    async fn load_library(&self, name: &str) -> Result<(), InterpreterError> {
        let code = expand(&self.config.library_template, &[("name", name)]);
        self.command(&code, &format!("load {name}")).await?;
        tracing::info!(library = name, "library attached");
        Ok(())
    }

    async fn acquire_context(&self) -> Result<ContextId, InterpreterError> {
        let dir = tempfile::Builder::new()
            .prefix("replterm-shelter-")
            .tempdir()?;
        tokio::fs::create_dir(dir.path().join(PLOT_DIR)).await?;

        let context = ContextId(self.next_context.get());
        self.next_context.set(context.0 + 1);
        self.shelters.borrow_mut().insert(context, dir);
        tracing::debug!(%context, "shelter acquired");
        Ok(context)
    }

    async fn evaluate(
        &self,
        context: ContextId,
        code: &str,
        config: &EvalConfig,
    ) -> Result<RawEvaluation, InterpreterError> {
        let shelter = self.shelter_path(context)?;
        let plot_dir = shelter.join(PLOT_DIR);
        let script = shelter.join(&self.config.script_name);
        tokio::fs::write(&script, self.build_script(code, config, &plot_dir)).await?;

        let script = escape_literal(&script.to_string_lossy());
        let autoprint = if config.autoprint { "TRUE" } else { "FALSE" };
        let source = expand(
            &self.config.source_template,
            &[("script", script.as_str()), ("autoprint", autoprint)],
        );
        let reply = self.request(&source).await?;

        // Close the device even after a failure so the next snippet starts clean
        if config.capture_graphics.is_some() {
            if let Some(epilogue) = &self.config.graphics_epilogue {
                let closed = self.request(epilogue).await?;
                if !closed.succeeded() {
                    tracing::warn!(error = %closed.stderr_text(), "graphics epilogue failed");
                }
            }
        }

        if !reply.succeeded() {
            return Err(InterpreterError::evaluation(reply.stderr_text()));
        }

        let images = if config.capture_graphics.is_some() {
            collect_images(&plot_dir).await?
        } else {
            Vec::new()
        };

        let output = if config.capture_output {
            reply.lines
        } else {
            Vec::new()
        };
        Ok(RawEvaluation { output, images })
    }

    async fn release_context(&self, context: ContextId) -> Result<(), InterpreterError> {
        let dir = self
            .shelters
            .borrow_mut()
            .remove(&context)
            .ok_or(InterpreterError::UnknownContext(context))?;
        dir.close()?;
        tracing::debug!(%context, "shelter released");
        Ok(())
    }

    async fn lookup_documentation(&self, topic: &str) -> Result<Option<String>, InterpreterError> {
        let topic = escape_literal(topic);
        let code = expand(&self.config.help_template, &[("topic", topic.as_str())]);
        let reply = self.request(&code).await?;
        if !reply.succeeded() {
            return Err(InterpreterError::evaluation(reply.stderr_text()));
        }

        let text = reply.stdout_text();
        if text.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(text))
        }
    }
}

/// Read every file in `dir`, ordered by file name
async fn collect_images(dir: &Path) -> Result<Vec<RawImage>, InterpreterError> {
    let mut paths = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();

    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        images.push(RawImage {
            bytes: tokio::fs::read(&path).await?,
        });
    }
    Ok(images)
}

/// Substitute `{key}` placeholders
fn expand(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |text, (key, value)| {
        text.replace(&format!("{{{key}}}"), value)
    })
}

/// Escape a value for use inside a single-quoted string literal
fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::GraphicsSize;

    fn shell_runtime() -> RuntimeConfig {
        RuntimeConfig {
            program: "sh".to_string(),
            args: Vec::new(),
            script_name: "snippet.sh".to_string(),
            request_template: "{code}; printf '%s %s\\n' '{marker}' \"$?\"; echo '{marker}' 1>&2"
                .to_string(),
            source_template: ". '{script}'".to_string(),
            version_code: "echo sh".to_string(),
            graphics_prelude: Some("PLOT_DIR='{plot_dir}'".to_string()),
            graphics_epilogue: None,
            library_template: "LIBS=\"$LIBS {name}\"".to_string(),
            install_template: "echo installing {name} from {repos}".to_string(),
            help_template: "if [ '{topic}' = mean ]; then echo 'Arithmetic Mean'; fi"
                .to_string(),
        }
    }

    async fn started() -> ProcessInterpreter {
        let interpreter = ProcessInterpreter::new(shell_runtime());
        interpreter.initialize().await.expect("runtime starts");
        interpreter
    }

    async fn eval(
        interpreter: &ProcessInterpreter,
        code: &str,
    ) -> Result<RawEvaluation, InterpreterError> {
        let context = interpreter.acquire_context().await.expect("acquire");
        let result = interpreter
            .evaluate(context, code, &EvalConfig::for_session(GraphicsSize::default()))
            .await;
        interpreter.release_context(context).await.expect("release");
        result
    }

    fn texts(result: &RawEvaluation, kind: &str) -> Vec<String> {
        result
            .output
            .iter()
            .filter(|line| line.kind == kind)
            .map(|line| line.text.clone())
            .collect()
    }

    #[test]
    fn expand_replaces_every_placeholder() {
        assert_eq!(
            expand("png(w = {width}, h = {height}, {width})", &[("width", "5"), ("height", "7")]),
            "png(w = 5, h = 7, 5)"
        );
    }

    #[test]
    fn escape_literal_protects_quotes() {
        assert_eq!(escape_literal(r"it's \n"), r"it\'s \\n");
    }

    #[test]
    fn script_starts_with_the_graphics_prelude() {
        let mut config = shell_runtime();
        config.graphics_prelude = Some("open {width}x{height} in {plot_dir}".to_string());
        let interpreter = ProcessInterpreter::new(config);

        let script = interpreter.build_script(
            "echo hi",
            &EvalConfig::for_session(GraphicsSize {
                width: 10,
                height: 20,
            }),
            Path::new("/shelter/plots"),
        );
        assert_eq!(script, "open 10x20 in /shelter/plots\necho hi\n");
    }

    #[test]
    fn marker_status_must_be_numeric() {
        assert_eq!(parse_status(" 0 ").ok(), Some(0));
        assert!(matches!(parse_status("ok"), Err(InterpreterError::Protocol(_))));
    }

    #[tokio::test]
    async fn shelters_are_reclaimed_on_release() {
        let interpreter = ProcessInterpreter::new(shell_runtime());
        let context = interpreter.acquire_context().await.expect("acquire");
        let path = interpreter.shelter_path(context).expect("shelter exists");
        assert!(path.join(PLOT_DIR).is_dir());
        assert_eq!(interpreter.open_shelters(), 1);

        interpreter.release_context(context).await.expect("release");
        assert_eq!(interpreter.open_shelters(), 0);
        assert!(!path.exists());
        assert!(matches!(
            interpreter.release_context(context).await,
            Err(InterpreterError::UnknownContext(_))
        ));
    }

    #[tokio::test]
    async fn requests_need_a_started_runtime() {
        let interpreter = ProcessInterpreter::new(shell_runtime());
        assert!(matches!(
            eval(&interpreter, "echo hi").await,
            Err(InterpreterError::NotRunning)
        ));
        assert_eq!(interpreter.open_shelters(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn evaluate_collects_streams_and_plot_files() {
        let interpreter = started().await;
        let code = "echo out\necho err 1>&2\nprintf 'img' > \"$PLOT_DIR/plot-001.png\"";

        let result = eval(&interpreter, code).await.expect("evaluate");

        assert_eq!(texts(&result, "stdout"), vec!["out".to_string()]);
        assert_eq!(texts(&result, "stderr"), vec!["err".to_string()]);
        assert_eq!(result.images, vec![RawImage { bytes: b"img".to_vec() }]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn variables_persist_between_evaluations() {
        let interpreter = started().await;
        eval(&interpreter, "X=42").await.expect("assignment");

        let result = eval(&interpreter, "echo \"x is [$X]\"").await.expect("read back");
        assert_eq!(texts(&result, "stdout"), vec!["x is [42]".to_string()]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn libraries_are_attached_once() {
        let interpreter = started().await;
        interpreter.load_library("stats").await.expect("load");

        for _ in 0..2 {
            let result = eval(&interpreter, "echo \"libs:$LIBS\"").await.expect("evaluate");
            assert_eq!(texts(&result, "stdout"), vec!["libs: stats".to_string()]);
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stream_order_is_kept_within_each_stream() {
        let interpreter = started().await;
        let code = "echo a\necho b 1>&2\necho c\necho d 1>&2\nprintf 'tail'";

        let result = eval(&interpreter, code).await.expect("evaluate");
        assert_eq!(
            texts(&result, "stdout"),
            vec!["a".to_string(), "c".to_string(), "tail".to_string()]
        );
        assert_eq!(texts(&result, "stderr"), vec!["b".to_string(), "d".to_string()]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_status_reports_stderr() {
        let interpreter = started().await;

        let result = eval(&interpreter, "echo \"object 'x' not found\" 1>&2\nfalse").await;
        match result {
            Err(InterpreterError::Evaluation { message }) => {
                assert_eq!(message, "object 'x' not found")
            }
            other => panic!("expected evaluation error, got {:?}", other),
        }

        // The runtime survives a failed snippet
        let result = eval(&interpreter, "echo still here").await.expect("evaluate");
        assert_eq!(texts(&result, "stdout"), vec!["still here".to_string()]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn runtime_exit_is_reported_once_then_not_running() {
        let interpreter = started().await;

        assert!(matches!(
            eval(&interpreter, "exit 3").await,
            Err(InterpreterError::Exited { .. })
        ));
        assert!(matches!(
            eval(&interpreter, "echo hi").await,
            Err(InterpreterError::NotRunning)
        ));
        assert_eq!(interpreter.open_shelters(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn documentation_lookup_distinguishes_missing_topics() {
        let interpreter = started().await;
        let found = interpreter.lookup_documentation("mean").await;
        assert_eq!(found.ok().flatten().as_deref(), Some("Arithmetic Mean"));

        let missing = interpreter.lookup_documentation("nothing").await;
        assert!(matches!(missing, Ok(None)));
    }

    #[tokio::test]
    async fn missing_program_fails_to_initialize() {
        let mut config = shell_runtime();
        config.program = "replterm-definitely-not-installed".to_string();
        let interpreter = ProcessInterpreter::new(config);
        assert!(matches!(
            interpreter.initialize().await,
            Err(InterpreterError::Spawn { .. })
        ));
    }
}
