//! Option mutators applied while describing phases, transitions and branches.
//!
//! Each `with_*`/`add_*` method on [`ConfigBuilder`](super::ConfigBuilder)
//! takes a closure that receives one of these option sets and returns it
//! with changes applied. Setting the same field twice keeps the last value.

use crate::core::{
    Action, ActionError, Discriminator, Event, Guard, Opaque, Project, State,
};
use std::fmt;
use std::sync::Arc;

/// Options for a phase.
#[derive(Clone, Debug, Default)]
pub struct PhaseOptions {
    pub(crate) start_state: Option<State>,
    pub(crate) end_state: Option<State>,
    pub(crate) input_types: Vec<String>,
    pub(crate) output_types: Vec<String>,
    pub(crate) supports_tasks: bool,
    pub(crate) metadata_schema: Option<String>,
}

impl PhaseOptions {
    /// State the machine is in when the phase begins.
    pub fn start_state(mut self, state: State) -> Self {
        self.start_state = Some(state);
        self
    }

    /// State the machine is in when the phase wraps up.
    pub fn end_state(mut self, state: State) -> Self {
        self.end_state = Some(state);
        self
    }

    /// Restrict input artifacts to these types. Empty means unrestricted.
    pub fn inputs<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict output artifacts to these types. Empty means unrestricted.
    pub fn outputs<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Allow tasks in this phase.
    pub fn tasks(mut self) -> Self {
        self.supports_tasks = true;
        self
    }

    /// Declare the shape of the phase's metadata as a JSON Schema document.
    /// The source is compiled when the configuration is built.
    pub fn metadata_schema(mut self, source: impl Into<String>) -> Self {
        self.metadata_schema = Some(source.into());
        self
    }
}

/// Options for a transition or a branch path.
#[derive(Clone, Default)]
pub struct TransitionOptions {
    pub(crate) guard: Option<Guard>,
    pub(crate) on_entry: Option<Action>,
    pub(crate) on_exit: Option<Action>,
    pub(crate) description: Option<String>,
}

impl TransitionOptions {
    pub fn guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Guard from a described predicate.
    pub fn when<F>(self, description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Project) -> bool + Send + Sync + 'static,
    {
        self.guard(Guard::new(description, predicate))
    }

    /// Run after the machine enters the target state.
    pub fn on_entry<F>(mut self, action: F) -> Self
    where
        F: Fn(&mut Project) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        self.on_entry = Some(Arc::new(action));
        self
    }

    /// Run before the machine leaves the source state.
    pub fn on_exit<F>(mut self, action: F) -> Self
    where
        F: Fn(&mut Project) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        self.on_exit = Some(Arc::new(action));
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }
}

impl fmt::Debug for TransitionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionOptions")
            .field("guard", &self.guard)
            .field("on_entry", &self.on_entry.as_ref().map(|_| Opaque("action")))
            .field("on_exit", &self.on_exit.as_ref().map(|_| Opaque("action")))
            .field("description", &self.description)
            .finish()
    }
}

/// One outcome of a branch: the discriminator value it answers to, and the
/// transition taken when it does.
#[derive(Clone, Debug)]
pub struct BranchPath {
    pub value: String,
    pub event: Event,
    pub to: State,
    pub(crate) options: TransitionOptions,
}

impl BranchPath {
    pub fn description(&self) -> Option<&str> {
        self.options.description.as_deref()
    }

    pub fn guard(&self) -> Option<&Guard> {
        self.options.guard.as_ref()
    }
}

/// Options for a branching state.
#[derive(Clone, Default)]
pub struct BranchOptions {
    pub(crate) discriminator: Option<Discriminator>,
    pub(crate) paths: Vec<BranchPath>,
}

impl BranchOptions {
    /// The function whose result picks a path.
    pub fn discriminator<F>(mut self, discriminator: F) -> Self
    where
        F: Fn(&Project) -> String + Send + Sync + 'static,
    {
        self.discriminator = Some(Arc::new(discriminator));
        self
    }

    /// Take `event` to `to` when the discriminator returns `value`.
    pub fn when(self, value: impl Into<String>, event: Event, to: State) -> Self {
        self.when_with(value, event, to, |options| options)
    }

    /// Like [`when`](Self::when), with guard, actions or description.
    pub fn when_with<F>(mut self, value: impl Into<String>, event: Event, to: State, configure: F) -> Self
    where
        F: FnOnce(TransitionOptions) -> TransitionOptions,
    {
        let path = BranchPath {
            value: value.into(),
            event,
            to,
            options: configure(TransitionOptions::default()),
        };
        match self.paths.iter_mut().find(|p| p.value == path.value) {
            Some(existing) => *existing = path,
            None => self.paths.push(path),
        }
        self
    }
}

impl fmt::Debug for BranchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BranchOptions")
            .field(
                "discriminator",
                &self.discriminator.as_ref().map(|_| Opaque("discriminator")),
            )
            .field("paths", &self.paths)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_phase_options_win() {
        let options = PhaseOptions::default()
            .outputs(["design"])
            .outputs(["plan", "review"])
            .start_state(State::new("A"))
            .start_state(State::new("B"));

        assert_eq!(options.output_types, vec!["plan", "review"]);
        assert_eq!(options.start_state, Some(State::new("B")));
        assert!(!options.supports_tasks);
    }

    #[test]
    fn repeated_branch_value_replaces_path_in_place() {
        let options = BranchOptions::default()
            .when("approved", Event::new("Approve"), State::new("Approved"))
            .when("rejected", Event::new("Reject"), State::new("Drafting"))
            .when("approved", Event::new("Ship"), State::new("Shipped"));

        let values: Vec<&str> = options.paths.iter().map(|p| p.value.as_str()).collect();
        assert_eq!(values, vec!["approved", "rejected"]);
        assert_eq!(options.paths[0].event, Event::new("Ship"));
    }

    #[test]
    fn transition_options_keep_description() {
        let options = TransitionOptions::default()
            .description("first")
            .description("second");
        assert_eq!(options.description.as_deref(), Some("second"));
    }
}
