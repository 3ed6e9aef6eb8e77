//! Core vocabulary shared by every other module.
//!
//! - [`State`] and [`Event`] identifiers
//! - the [`Project`] data model a machine is bound to
//! - [`Guard`] predicates and the callback types stored in a configuration
//! - [`TransitionRecord`] history

mod guard;
mod history;
mod hooks;
mod ids;
mod project;

pub use guard::Guard;
pub use history::{elapsed, traversed_path, TransitionRecord};
pub(crate) use hooks::Opaque;
pub use hooks::{
    Action, ActionError, DetermineError, Discriminator, EventDeterminer, Initializer,
    PromptGenerator,
};
pub use ids::{Event, State};
pub use project::{
    Artifact, Metadata, Phase, PhaseStatus, Phases, Project, Statechart, Task, TaskStatus,
};
