//! Immutable description of a project type.

use super::options::BranchPath;
use crate::core::{
    Action, ActionError, Discriminator, Event, EventDeterminer, Guard, Initializer, Opaque,
    Phase, Project, PromptGenerator, State,
};
use crate::validation::Schema;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Per-phase settings.
#[derive(Clone, Debug)]
pub struct PhaseConfig {
    pub name: String,
    pub start_state: Option<State>,
    pub end_state: Option<State>,
    /// Allowed input artifact types; empty means unrestricted.
    pub input_types: Vec<String>,
    /// Allowed output artifact types; empty means unrestricted.
    pub output_types: Vec<String>,
    pub supports_tasks: bool,
    pub metadata_schema: Option<Arc<Schema>>,
}

impl PhaseConfig {
    pub fn allows_input(&self, artifact_type: &str) -> bool {
        self.input_types.is_empty() || self.input_types.iter().any(|t| t == artifact_type)
    }

    pub fn allows_output(&self, artifact_type: &str) -> bool {
        self.output_types.is_empty() || self.output_types.iter().any(|t| t == artifact_type)
    }
}

/// A configured transition, written explicitly or generated from a branch.
#[derive(Clone)]
pub struct TransitionConfig {
    pub from: State,
    pub to: State,
    pub event: Event,
    pub guard: Option<Guard>,
    pub on_entry: Option<Action>,
    pub on_exit: Option<Action>,
    pub description: Option<String>,
    /// Discriminator value when this transition came from a branch.
    pub branch_value: Option<String>,
}

impl fmt::Debug for TransitionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionConfig")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("event", &self.event)
            .field("guard", &self.guard)
            .field("on_entry", &self.on_entry.as_ref().map(|_| Opaque("action")))
            .field("on_exit", &self.on_exit.as_ref().map(|_| Opaque("action")))
            .field("description", &self.description)
            .field("branch_value", &self.branch_value)
            .finish()
    }
}

/// A branching state: the discriminator and the paths it selects between.
#[derive(Clone)]
pub struct BranchConfig {
    pub from: State,
    pub discriminator: Discriminator,
    pub paths: Vec<BranchPath>,
}

impl BranchConfig {
    /// Every value the discriminator may return, in declaration order.
    pub fn values(&self) -> Vec<&str> {
        self.paths.iter().map(|p| p.value.as_str()).collect()
    }
}

impl fmt::Debug for BranchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BranchConfig")
            .field("from", &self.from)
            .field("discriminator", &Opaque("discriminator"))
            .field("paths", &self.paths)
            .finish()
    }
}

/// Immutable configuration of one project type.
///
/// Produced by [`ConfigBuilder::build`](super::ConfigBuilder::build); safe to
/// share across threads for read-only use.
#[derive(Clone)]
pub struct Config {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) initial_state: State,
    pub(crate) phases: Vec<PhaseConfig>,
    pub(crate) transitions: Vec<TransitionConfig>,
    pub(crate) branches: Vec<BranchConfig>,
    pub(crate) determiners: HashMap<State, EventDeterminer>,
    pub(crate) prompts: HashMap<State, PromptGenerator>,
    pub(crate) orchestrator_prompt: Option<PromptGenerator>,
    pub(crate) initializer: Option<Initializer>,
}

impl Config {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn initial_state(&self) -> &State {
        &self.initial_state
    }

    /// Every state the configuration mentions: the initial state first, then
    /// transition endpoints in declaration order.
    pub fn states(&self) -> Vec<&State> {
        let mut states = vec![&self.initial_state];
        for t in &self.transitions {
            for state in [&t.from, &t.to] {
                if !states.contains(&state) {
                    states.push(state);
                }
            }
        }
        states
    }

    pub fn is_known_state(&self, state: &State) -> bool {
        *state == self.initial_state
            || self
                .transitions
                .iter()
                .any(|t| t.from == *state || t.to == *state)
    }

    pub fn phases(&self) -> &[PhaseConfig] {
        &self.phases
    }

    pub fn phase(&self, name: &str) -> Option<&PhaseConfig> {
        self.phases.iter().find(|p| p.name == name)
    }

    /// All transitions, explicit ones first, then branch-generated ones.
    pub fn transitions(&self) -> &[TransitionConfig] {
        &self.transitions
    }

    pub fn transitions_from<'a>(
        &'a self,
        state: &'a State,
    ) -> impl Iterator<Item = &'a TransitionConfig> + 'a {
        self.transitions.iter().filter(move |t| t.from == *state)
    }

    pub fn transition(&self, from: &State, event: &Event) -> Option<&TransitionConfig> {
        self.transitions
            .iter()
            .find(|t| t.from == *from && t.event == *event)
    }

    pub fn target_state(&self, from: &State, event: &Event) -> Option<&State> {
        self.transition(from, event).map(|t| &t.to)
    }

    pub fn transition_description(&self, from: &State, event: &Event) -> Option<&str> {
        self.transition(from, event)
            .and_then(|t| t.description.as_deref())
    }

    pub fn guard_description(&self, from: &State, event: &Event) -> Option<&str> {
        self.transition(from, event)
            .and_then(|t| t.guard.as_ref())
            .map(Guard::description)
    }

    pub fn is_branching_state(&self, state: &State) -> bool {
        self.branch(state).is_some()
    }

    pub fn branch(&self, state: &State) -> Option<&BranchConfig> {
        self.branches.iter().find(|b| b.from == *state)
    }

    pub fn branch_paths(&self, state: &State) -> &[BranchPath] {
        self.branch(state)
            .map(|b| b.paths.as_slice())
            .unwrap_or_default()
    }

    pub fn determiner(&self, state: &State) -> Option<&EventDeterminer> {
        self.determiners.get(state)
    }

    pub fn has_determiner(&self, state: &State) -> bool {
        self.determiners.contains_key(state)
    }

    /// Guidance for `state`, if the project type registered any.
    pub fn prompt(&self, state: &State, project: &Project) -> Option<String> {
        self.prompts.get(state).map(|generate| generate(project))
    }

    /// Project-type-wide guidance, independent of state.
    pub fn orchestrator_prompt(&self, project: &Project) -> Option<String> {
        self.orchestrator_prompt
            .as_ref()
            .map(|generate| generate(project))
    }

    /// Name of the phase that starts or ends at `state`.
    pub fn phase_for_state(&self, state: &State) -> Option<&str> {
        self.phases
            .iter()
            .find(|p| p.start_state.as_ref() == Some(state) || p.end_state.as_ref() == Some(state))
            .map(|p| p.name.as_str())
    }

    pub fn is_phase_start_state(&self, phase: &str, state: &State) -> bool {
        self.phase(phase)
            .is_some_and(|p| p.start_state.as_ref() == Some(state))
    }

    pub fn is_phase_end_state(&self, phase: &str, state: &State) -> bool {
        self.phase(phase)
            .is_some_and(|p| p.end_state.as_ref() == Some(state))
    }

    /// Names of phases that accept tasks, in declaration order.
    pub fn task_phases(&self) -> Vec<&str> {
        self.phases
            .iter()
            .filter(|p| p.supports_tasks)
            .map(|p| p.name.as_str())
            .collect()
    }

    pub fn phase_supports_tasks(&self, phase: &str) -> bool {
        self.phase(phase).is_some_and(|p| p.supports_tasks)
    }

    /// The phase new tasks should land in while the machine is in `state`:
    /// the task-capable phase bounding `state`, else the first task-capable
    /// phase.
    pub fn default_task_phase(&self, state: &State) -> Option<&str> {
        let bounding = self.phases.iter().find(|p| {
            p.supports_tasks
                && (p.start_state.as_ref() == Some(state) || p.end_state.as_ref() == Some(state))
        });
        bounding
            .or_else(|| self.phases.iter().find(|p| p.supports_tasks))
            .map(|p| p.name.as_str())
    }

    /// Compiled metadata schemas keyed by phase name.
    pub fn metadata_schemas(&self) -> HashMap<&str, &Schema> {
        self.phases
            .iter()
            .filter_map(|p| p.metadata_schema.as_deref().map(|s| (p.name.as_str(), s)))
            .collect()
    }

    /// Create a project of this type: one pending phase per configured
    /// phase, positioned at the initial state, then passed to the
    /// initializer if one was registered.
    pub fn new_project(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Project, ActionError> {
        let mut project = Project::new(name, self.name.clone(), self.initial_state.clone());
        project.description = description.into();
        for phase in &self.phases {
            project.phases.insert(phase.name.clone(), Phase::new());
        }
        if let Some(initialize) = &self.initializer {
            initialize(&mut project)?;
        }
        Ok(project)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut determined: Vec<&str> = self.determiners.keys().map(State::name).collect();
        determined.sort_unstable();
        let mut prompted: Vec<&str> = self.prompts.keys().map(State::name).collect();
        prompted.sort_unstable();

        f.debug_struct("Config")
            .field("name", &self.name)
            .field("initial_state", &self.initial_state)
            .field("phases", &self.phases)
            .field("transitions", &self.transitions)
            .field("branches", &self.branches)
            .field("determiners", &determined)
            .field("prompts", &prompted)
            .finish_non_exhaustive()
    }
}
