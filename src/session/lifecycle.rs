//! One-time session bootstrap
//!
//! `Uninitialized -> Loading(Init) -> Loading(Configuring) ->
//! Loading(Installing) -> Loading(LoadingLibrary) -> Ready`
//!
//! The two package stages only run when a package is configured. A failure
//! at any stage moves the session to `Error`, which is final: the runner
//! rejects all code and the UI keeps its inputs disabled.

use super::output::OutputKind;
use super::status::{LoadStage, SessionStatus};
use super::Session;
use crate::config::BootstrapConfig;
use crate::interpreter::{Interpreter, InterpreterError, RuntimeOptions};

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("session bootstrap already started")]
    AlreadyStarted,

    #[error("{stage} failed: {source}")]
    Stage {
        stage: LoadStage,
        #[source]
        source: InterpreterError,
    },
}

fn fail(stage: LoadStage) -> impl FnOnce(InterpreterError) -> BootstrapError {
    move |source| BootstrapError::Stage { stage, source }
}

impl<I: Interpreter> Session<I> {
    /// Bring the runtime up; only the first call does anything
    pub async fn bootstrap(&self, config: &BootstrapConfig) -> Result<(), BootstrapError> {
        if !self.advance(SessionStatus::Loading(LoadStage::Init)) {
            return Err(BootstrapError::AlreadyStarted);
        }

        match self.run_stages(config).await {
            Ok(()) => {
                self.advance(SessionStatus::Ready);
                self.output
                    .borrow_mut()
                    .push(OutputKind::Info, "Session ready.");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "bootstrap failed");
                self.advance(SessionStatus::Error(e.to_string()));
                self.output
                    .borrow_mut()
                    .push(OutputKind::Error, format!("Failed to start session: {}", e));
                Err(e)
            }
        }
    }

    async fn run_stages(&self, config: &BootstrapConfig) -> Result<(), BootstrapError> {
        self.interpreter
            .initialize()
            .await
            .map_err(fail(LoadStage::Init))?;

        self.advance(SessionStatus::Loading(LoadStage::Configuring));
        let options = RuntimeOptions {
            repos: config.repos.clone(),
        };
        self.interpreter
            .configure(&options)
            .await
            .map_err(fail(LoadStage::Configuring))?;

        let Some(package) = config.package.as_deref() else {
            return Ok(());
        };

        if config.install {
            self.advance(SessionStatus::Loading(LoadStage::Installing));
            tracing::info!(package, "installing package");
            self.interpreter
                .install_package(package, &config.repos)
                .await
                .map_err(fail(LoadStage::Installing))?;
        }

        self.advance(SessionStatus::Loading(LoadStage::LoadingLibrary));
        self.interpreter
            .load_library(package)
            .await
            .map_err(fail(LoadStage::LoadingLibrary))?;

        Ok(())
    }
}
