// Session readiness status

use std::fmt;

/// Bootstrap stages, in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadStage {
    Init,
    Configuring,
    Installing,
    LoadingLibrary,
}

impl fmt::Display for LoadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadStage::Init => "runtime initialization",
            LoadStage::Configuring => "runtime configuration",
            LoadStage::Installing => "package installation",
            LoadStage::LoadingLibrary => "library loading",
        };
        f.write_str(name)
    }
}

/// What the status bar shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Loading,
    Ready,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Uninitialized,
    Loading(LoadStage),
    Ready,
    /// Terminal: the session never becomes usable again
    Error(String),
}

impl SessionStatus {
    /// Whether moving to `next` keeps the lifecycle monotonic
    ///
    /// Loading stages may be skipped but never revisited, `Error` is only
    /// reachable while loading, and nothing leaves `Ready` or `Error`.
    pub fn can_transition_to(&self, next: &SessionStatus) -> bool {
        match (self, next) {
            (SessionStatus::Uninitialized, SessionStatus::Loading(LoadStage::Init)) => true,
            (SessionStatus::Loading(current), SessionStatus::Loading(stage)) => stage > current,
            (SessionStatus::Loading(_), SessionStatus::Ready) => true,
            (SessionStatus::Loading(_), SessionStatus::Error(_)) => true,
            _ => false,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, SessionStatus::Ready)
    }

    pub fn indicator(&self) -> Indicator {
        match self {
            SessionStatus::Uninitialized | SessionStatus::Loading(_) => Indicator::Loading,
            SessionStatus::Ready => Indicator::Ready,
            SessionStatus::Error(_) => Indicator::Error,
        }
    }

    /// Human-readable status line
    pub fn label(&self) -> String {
        match self {
            SessionStatus::Uninitialized => "Starting...".to_string(),
            SessionStatus::Loading(LoadStage::Init) => "Initializing runtime...".to_string(),
            SessionStatus::Loading(LoadStage::Configuring) => {
                "Configuring package repositories...".to_string()
            }
            SessionStatus::Loading(LoadStage::Installing) => "Installing package...".to_string(),
            SessionStatus::Loading(LoadStage::LoadingLibrary) => "Loading library...".to_string(),
            SessionStatus::Ready => "Ready".to_string(),
            SessionStatus::Error(message) => format!("Error: {}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_only_moves_forward() {
        use LoadStage::*;
        let status = SessionStatus::Loading(Installing);
        assert!(status.can_transition_to(&SessionStatus::Loading(LoadingLibrary)));
        assert!(status.can_transition_to(&SessionStatus::Ready));
        assert!(!status.can_transition_to(&SessionStatus::Loading(Configuring)));
        assert!(!status.can_transition_to(&SessionStatus::Loading(Installing)));

        assert!(SessionStatus::Uninitialized.can_transition_to(&SessionStatus::Loading(Init)));
        assert!(!SessionStatus::Uninitialized.can_transition_to(&SessionStatus::Ready));
    }

    #[test]
    fn ready_and_error_are_terminal() {
        let error = SessionStatus::Error("boom".to_string());
        assert!(!error.can_transition_to(&SessionStatus::Ready));
        assert!(!error.can_transition_to(&SessionStatus::Loading(LoadStage::Init)));
        assert!(!SessionStatus::Ready.can_transition_to(&SessionStatus::Error("x".into())));
        assert_eq!(error.indicator(), Indicator::Error);
        assert_eq!(error.label(), "Error: boom");
    }
}
