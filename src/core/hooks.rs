//! Callback types stored in a project-type configuration.
//!
//! All callbacks receive the project explicitly. A machine bound to a
//! project passes that project to every callback it runs, which is how the
//! configuration's behavior is attached to live data.

use super::ids::{Event, State};
use super::project::Project;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Failure raised by a transition action.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct ActionError {
    pub message: String,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failure to pick an event for automatic advance.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DetermineError {
    /// A branch discriminator produced a value no path is keyed on.
    #[error(
        "no branch from state '{state}' matches value '{value}' (valid values: {})",
        valid.join(", ")
    )]
    Unmatched {
        state: State,
        value: String,
        valid: Vec<String>,
    },

    /// A hand-written determiner refused to choose.
    #[error("cannot determine event from state '{state}': {message}")]
    Failed { state: State, message: String },
}

/// Side-effecting hook run on transition exit or entry.
pub type Action = Arc<dyn Fn(&mut Project) -> Result<(), ActionError> + Send + Sync>;

/// Chooses which event to fire from a state during automatic advance.
pub type EventDeterminer = Arc<dyn Fn(&Project) -> Result<Event, DetermineError> + Send + Sync>;

/// Reads project state and returns the key selecting a branch path.
pub type Discriminator = Arc<dyn Fn(&Project) -> String + Send + Sync>;

/// Produces guidance text for a state.
pub type PromptGenerator = Arc<dyn Fn(&Project) -> String + Send + Sync>;

/// Hook run once when a new project of a type is created.
pub type Initializer = Arc<dyn Fn(&mut Project) -> Result<(), ActionError> + Send + Sync>;

/// Named wrapper so configuration structs can derive `Debug`.
pub(crate) struct Opaque<'a>(pub &'a str);

impl fmt::Debug for Opaque<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}
