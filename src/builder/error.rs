//! Configuration errors raised by [`ConfigBuilder::build`](super::ConfigBuilder::build).

use crate::core::{Event, State};
use crate::validation::SchemaError;
use thiserror::Error;

/// Errors that can occur when building a project-type configuration.
///
/// These are programming errors in a project type, detected at startup.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Initial state not specified. Call .set_initial_state(state) before .build()")]
    MissingInitialState,

    #[error("Branch at state '{state}' has no discriminator. Call .discriminator(f)")]
    BranchMissingDiscriminator { state: State },

    #[error("Branch at state '{state}' has no paths. Call .when(value, event, to)")]
    BranchMissingPaths { state: State },

    #[error("State '{state}' has more than one branch")]
    DuplicateBranch { state: State },

    #[error("State '{state}' has both a branch and an on_advance determiner")]
    ConflictingDeterminer { state: State },

    #[error("Event '{event}' is declared more than once from state '{state}'")]
    DuplicateEvent { state: State, event: Event },

    #[error("State '{state}' referenced by {referenced_by} is never declared by a transition")]
    UndeclaredState { state: State, referenced_by: String },

    #[error("State '{state}' has outgoing transitions but cannot be reached from the initial state")]
    UnreachableState { state: State },

    #[error("Metadata schema for phase '{phase}' does not compile: {source}")]
    InvalidMetadataSchema {
        phase: String,
        #[source]
        source: SchemaError,
    },
}
