//! Running a configuration against a project.
//!
//! [`Machine`] binds a [`Config`](crate::Config) to one borrowed project and
//! fires events against it. [`advance`] wraps that in the four modes callers
//! actually use and persists the result.

mod advance;
mod error;
#[allow(clippy::module_inception)]
mod machine;

pub use advance::{
    advance, advance_stored, determine, discover, dry_run, AdvanceOutcome, AdvanceRequest,
    DryRunReport, TransitionOption,
};
pub use error::{ActionStage, AdvanceError, BindError, ErrorKind, FireError, UsageError};
pub use machine::{evaluate, resolve_state, Fired, Machine};
