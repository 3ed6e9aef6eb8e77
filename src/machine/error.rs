//! Errors raised while binding, firing and advancing.

use crate::core::{ActionError, DetermineError, Event, State};
use crate::persistence::PersistError;
use std::fmt;
use thiserror::Error;

/// Failure to bind a configuration to a project.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BindError {
    #[error("project has type '{found}' but the configuration is for '{expected}'")]
    TypeMismatch { expected: String, found: String },

    #[error("project is in state '{state}', which project type '{project_type}' does not define")]
    UnknownState { state: State, project_type: String },
}

/// Which hook of a transition failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStage {
    Exit,
    Entry,
}

impl fmt::Display for ActionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exit => f.write_str("exit"),
            Self::Entry => f.write_str("entry"),
        }
    }
}

/// Outcome of a fire attempt that did not change state.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FireError {
    /// The event is not configured from the current state. A usage error.
    #[error(
        "event '{event}' is not configured from state '{state}' (available: {})",
        list(available)
    )]
    NotConfigured {
        state: State,
        event: Event,
        available: Vec<Event>,
    },

    /// The transition's guard refused. Expected and recoverable.
    #[error("transition '{event}' from state '{state}' is blocked: {reason}")]
    Blocked {
        state: State,
        event: Event,
        reason: String,
    },

    /// An entry or exit action failed; the project is unchanged.
    #[error("{stage} action of '{event}' from state '{state}' failed: {source}")]
    Action {
        state: State,
        event: Event,
        stage: ActionStage,
        #[source]
        source: ActionError,
    },
}

fn list(events: &[Event]) -> String {
    if events.is_empty() {
        "none".to_string()
    } else {
        events
            .iter()
            .map(Event::name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Rejected combination of advance arguments.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("--list cannot be combined with an event; use --dry-run to check one event")]
    ListWithEvent,

    #[error("--list and --dry-run cannot be combined")]
    ListWithDryRun,

    #[error("--dry-run requires an event")]
    DryRunWithoutEvent,
}

/// Broad classes of advance failures, for callers that map them to exit
/// codes or messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A guard refused; fix the project and retry.
    Blocked,
    /// The request itself was wrong for this project type or state.
    Usage,
    /// A discriminator value matched no branch; fix the project data.
    Unmatched,
    /// An action or determiner failed.
    Action,
    /// Storage failed. After a transition this means "advanced but not saved".
    Persistence,
}

/// Errors returned by [`advance`](super::advance).
#[derive(Debug, Error)]
pub enum AdvanceError {
    #[error(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    Fire(#[from] FireError),

    #[error(
        "state '{state}' has no automatic advance; list the available transitions and name one explicitly"
    )]
    NoDeterminer { state: State },

    #[error(transparent)]
    Determine(#[from] DetermineError),

    #[error("failed to load project: {0}")]
    Load(#[source] PersistError),

    /// The transition fired and the in-memory project holds the new state,
    /// but saving it failed. Retry the save; do not fire again.
    #[error("advanced from '{from}' to '{to}' via '{event}' but the project was not saved: {source}")]
    NotSaved {
        from: State,
        to: State,
        event: Event,
        #[source]
        source: PersistError,
    },
}

impl AdvanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Fire(FireError::Blocked { .. }) => ErrorKind::Blocked,
            Self::Bind(_) | Self::Fire(FireError::NotConfigured { .. }) | Self::NoDeterminer { .. } => {
                ErrorKind::Usage
            }
            Self::Determine(DetermineError::Unmatched { .. }) => ErrorKind::Unmatched,
            Self::Fire(FireError::Action { .. }) | Self::Determine(DetermineError::Failed { .. }) => {
                ErrorKind::Action
            }
            Self::Load(_) | Self::NotSaved { .. } => ErrorKind::Persistence,
        }
    }

    /// True for the expected "blocked by guard" outcome.
    pub fn is_blocked(&self) -> bool {
        self.kind() == ErrorKind::Blocked
    }
}
