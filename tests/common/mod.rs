// Scripted interpreter for session tests

#![allow(dead_code)]

use replterm::config::{BootstrapConfig, RuntimeConfig};
use replterm::interpreter::{
    ContextId, EvalConfig, GraphicsSize, Interpreter, InterpreterError, RawEvaluation, RawImage,
    RawOutput, RuntimeOptions,
};
use replterm::session::status::LoadStage;
use replterm::session::Session;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use tokio::sync::Notify;

/// In-memory interpreter that replays queued results
#[derive(Default)]
pub struct ScriptedInterpreter {
    /// Results handed out by `evaluate`, front first; empty queue echoes the code
    pub results: RefCell<VecDeque<Result<RawEvaluation, InterpreterError>>>,
    /// Documentation by topic; `Err` entries make the lookup raise
    pub docs: RefCell<HashMap<String, Result<String, String>>>,
    /// Stage whose backend call should raise during bootstrap
    pub fail_stage: Option<LoadStage>,
    /// Fail context acquisition
    pub fail_acquire: Cell<bool>,
    /// When set, `evaluate` waits for a notification before returning
    pub gate: Option<Rc<Notify>>,
    /// When set, `install_package` waits for a notification before returning
    pub install_gate: Option<Rc<Notify>>,

    pub calls: RefCell<Vec<String>>,
    pub evaluated: RefCell<Vec<String>>,
    pub configs: RefCell<Vec<EvalConfig>>,
    pub acquired: Cell<usize>,
    pub released: Cell<usize>,
    live: RefCell<Vec<ContextId>>,
    next_id: Cell<u64>,
}

impl ScriptedInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(stage: LoadStage) -> Self {
        ScriptedInterpreter {
            fail_stage: Some(stage),
            ..Self::default()
        }
    }

    pub fn gated(gate: Rc<Notify>) -> Self {
        ScriptedInterpreter {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn gated_install(gate: Rc<Notify>) -> Self {
        ScriptedInterpreter {
            install_gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn push_result(&self, result: Result<RawEvaluation, InterpreterError>) {
        self.results.borrow_mut().push_back(result);
    }

    pub fn push_output(&self, output: &[(&str, &str)]) {
        self.push_result(Ok(RawEvaluation {
            output: output
                .iter()
                .map(|(kind, text)| RawOutput::new(*kind, *text))
                .collect(),
            images: Vec::new(),
        }));
    }

    pub fn add_doc(&self, topic: &str, doc: Result<&str, &str>) {
        self.docs.borrow_mut().insert(
            topic.to_string(),
            doc.map(str::to_string).map_err(str::to_string),
        );
    }

    /// Shelters acquired and not yet released
    pub fn live_contexts(&self) -> usize {
        self.live.borrow().len()
    }

    fn stage(&self, stage: LoadStage, call: &str) -> Result<(), InterpreterError> {
        self.calls.borrow_mut().push(call.to_string());
        if self.fail_stage == Some(stage) {
            return Err(InterpreterError::Command {
                command: call.to_string(),
                message: format!("{} exploded", call),
            });
        }
        Ok(())
    }
}

impl Interpreter for ScriptedInterpreter {
    async fn initialize(&self) -> Result<(), InterpreterError> {
        self.stage(LoadStage::Init, "initialize")
    }

    async fn configure(&self, options: &RuntimeOptions) -> Result<(), InterpreterError> {
        self.stage(
            LoadStage::Configuring,
            &format!("configure {}", options.repos.join(",")),
        )
    }

    async fn install_package(
        &self,
        name: &str,
        _sources: &[String],
    ) -> Result<(), InterpreterError> {
        if let Some(gate) = &self.install_gate {
            gate.notified().await;
        }
        self.stage(LoadStage::Installing, &format!("install {}", name))
    }

    async fn load_library(&self, name: &str) -> Result<(), InterpreterError> {
        self.stage(LoadStage::LoadingLibrary, &format!("load {}", name))
    }

    async fn acquire_context(&self) -> Result<ContextId, InterpreterError> {
        if self.fail_acquire.get() {
            return Err(InterpreterError::evaluation("shelter unavailable"));
        }
        let id = ContextId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.acquired.set(self.acquired.get() + 1);
        self.live.borrow_mut().push(id);
        Ok(id)
    }

    async fn evaluate(
        &self,
        context: ContextId,
        code: &str,
        config: &EvalConfig,
    ) -> Result<RawEvaluation, InterpreterError> {
        assert!(
            self.live.borrow().contains(&context),
            "evaluate called with a released context"
        );
        self.evaluated.borrow_mut().push(code.to_string());
        self.configs.borrow_mut().push(*config);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let queued = self.results.borrow_mut().pop_front();
        queued.unwrap_or_else(|| {
            Ok(RawEvaluation {
                output: vec![RawOutput::new("stdout", format!("[1] {}", code))],
                images: Vec::new(),
            })
        })
    }

    async fn release_context(&self, context: ContextId) -> Result<(), InterpreterError> {
        let mut live = self.live.borrow_mut();
        let index = live
            .iter()
            .position(|id| *id == context)
            .ok_or(InterpreterError::UnknownContext(context))?;
        live.remove(index);
        self.released.set(self.released.get() + 1);
        Ok(())
    }

    async fn lookup_documentation(&self, topic: &str) -> Result<Option<String>, InterpreterError> {
        match self.docs.borrow().get(topic) {
            Some(Ok(text)) => Ok(Some(text.clone())),
            Some(Err(message)) => Err(InterpreterError::evaluation(message.clone())),
            None => Ok(None),
        }
    }
}

/// PNG header with the given size
pub fn png(width: u32, height: u32) -> RawImage {
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.extend_from_slice(&13u32.to_be_bytes());
    bytes.extend_from_slice(b"IHDR");
    bytes.extend_from_slice(&width.to_be_bytes());
    bytes.extend_from_slice(&height.to_be_bytes());
    bytes.extend_from_slice(&[8, 6, 0, 0, 0]);
    RawImage { bytes }
}

/// A bootstrapped session over a fresh scripted interpreter
pub async fn ready_session() -> Session<ScriptedInterpreter> {
    ready_session_with(ScriptedInterpreter::new()).await
}

pub async fn ready_session_with(interpreter: ScriptedInterpreter) -> Session<ScriptedInterpreter> {
    let session = Session::new(interpreter, GraphicsSize::default());
    session
        .bootstrap(&BootstrapConfig::default())
        .await
        .expect("bootstrap succeeds");
    session
}

/// Runtime config driving a POSIX shell as the persistent process
pub fn shell_runtime() -> RuntimeConfig {
    RuntimeConfig {
        program: "sh".to_string(),
        args: Vec::new(),
        script_name: "snippet.sh".to_string(),
        request_template: "{code}; printf '%s %s\\n' '{marker}' \"$?\"; echo '{marker}' 1>&2"
            .to_string(),
        source_template: ". '{script}'".to_string(),
        version_code: "echo sh".to_string(),
        graphics_prelude: None,
        graphics_epilogue: None,
        library_template: "LIBS=\"$LIBS {name}\"".to_string(),
        install_template: "echo installing {name}".to_string(),
        help_template: "if [ '{topic}' = mean ]; then echo 'Arithmetic Mean'; fi".to_string(),
    }
}
