//! Builder for project-type configurations.

use super::branch;
use super::config::{BranchConfig, Config, PhaseConfig, TransitionConfig};
use super::error::BuildError;
use super::options::{BranchOptions, PhaseOptions, TransitionOptions};
use crate::core::{
    ActionError, DetermineError, Event, EventDeterminer, Initializer, Project, PromptGenerator,
    State,
};
use crate::validation::Schema;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Fluent builder that accumulates a project type's phases, transitions,
/// branches, determiners and prompts.
///
/// [`build`](Self::build) borrows the builder, so one builder can produce
/// any number of identical configurations.
///
/// # Example
///
/// ```rust
/// use phaseflow::builder::ConfigBuilder;
/// use phaseflow::core::{Event, State};
///
/// let config = ConfigBuilder::new("standard")
///     .set_initial_state(State::new("Planning"))
///     .with_phase("planning", |p| p.start_state(State::new("Planning")).tasks())
///     .add_transition(State::new("Planning"), State::new("Done"), Event::new("Finish"))
///     .build()
///     .unwrap();
///
/// assert_eq!(config.initial_state(), &State::new("Planning"));
/// assert_eq!(config.task_phases(), vec!["planning"]);
/// ```
#[derive(Clone, Default)]
pub struct ConfigBuilder {
    name: String,
    description: String,
    initial_state: Option<State>,
    phases: Vec<(String, PhaseOptions)>,
    transitions: Vec<TransitionConfig>,
    branches: Vec<(State, BranchOptions)>,
    determiners: Vec<(State, EventDeterminer)>,
    prompts: Vec<(State, PromptGenerator)>,
    orchestrator_prompt: Option<PromptGenerator>,
    initializer: Option<Initializer>,
}

impl ConfigBuilder {
    /// Start describing the project type `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Create or update a phase. Calling it again for the same name
    /// continues from the phase's current options.
    pub fn with_phase<F>(mut self, name: impl Into<String>, configure: F) -> Self
    where
        F: FnOnce(PhaseOptions) -> PhaseOptions,
    {
        let name = name.into();
        match self.phases.iter_mut().find(|(n, _)| *n == name) {
            Some((_, options)) => *options = configure(std::mem::take(options)),
            None => {
                let options = configure(PhaseOptions::default());
                self.phases.push((name, options));
            }
        }
        self
    }

    /// Set the state new projects start in (required).
    pub fn set_initial_state(mut self, state: State) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Add an unguarded transition without actions.
    pub fn add_transition(self, from: State, to: State, event: Event) -> Self {
        self.add_transition_with(from, to, event, |options| options)
    }

    /// Add a transition with guard, actions or description.
    pub fn add_transition_with<F>(mut self, from: State, to: State, event: Event, configure: F) -> Self
    where
        F: FnOnce(TransitionOptions) -> TransitionOptions,
    {
        let options = configure(TransitionOptions::default());
        self.transitions.push(TransitionConfig {
            from,
            to,
            event,
            guard: options.guard,
            on_entry: options.on_entry,
            on_exit: options.on_exit,
            description: options.description,
            branch_value: None,
        });
        self
    }

    /// Declare that `from` branches on a discriminator. Each path becomes a
    /// transition and the state gets a determiner for automatic advance.
    pub fn add_branch<F>(mut self, from: State, configure: F) -> Self
    where
        F: FnOnce(BranchOptions) -> BranchOptions,
    {
        let options = configure(BranchOptions::default());
        self.branches.push((from, options));
        self
    }

    /// Register a hand-written determiner for automatic advance from `state`.
    pub fn on_advance<F>(mut self, state: State, determiner: F) -> Self
    where
        F: Fn(&Project) -> Result<Event, DetermineError> + Send + Sync + 'static,
    {
        self.determiners.retain(|(s, _)| *s != state);
        self.determiners.push((state, Arc::new(determiner)));
        self
    }

    /// Register guidance text for `state`.
    pub fn with_prompt<F>(mut self, state: State, generator: F) -> Self
    where
        F: Fn(&Project) -> String + Send + Sync + 'static,
    {
        self.prompts.retain(|(s, _)| *s != state);
        self.prompts.push((state, Arc::new(generator)));
        self
    }

    /// Register project-type-wide guidance.
    pub fn with_orchestrator_prompt<F>(mut self, generator: F) -> Self
    where
        F: Fn(&Project) -> String + Send + Sync + 'static,
    {
        self.orchestrator_prompt = Some(Arc::new(generator));
        self
    }

    /// Hook run by [`Config::new_project`] after the phases are created.
    pub fn with_initializer<F>(mut self, initializer: F) -> Self
    where
        F: Fn(&mut Project) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        self.initializer = Some(Arc::new(initializer));
        self
    }

    /// Validate the accumulated description and produce a [`Config`].
    pub fn build(&self) -> Result<Config, BuildError> {
        let initial_state = self
            .initial_state
            .clone()
            .ok_or(BuildError::MissingInitialState)?;

        let branches = self.branch_configs()?;
        let mut transitions = self.transitions.clone();
        let mut determiners: HashMap<State, EventDeterminer> =
            self.determiners.iter().cloned().collect();

        for branch in &branches {
            if determiners.contains_key(&branch.from) {
                return Err(BuildError::ConflictingDeterminer {
                    state: branch.from.clone(),
                });
            }
            transitions.extend(branch::synthesize_transitions(branch));
            determiners.insert(branch.from.clone(), branch::synthesize_determiner(branch));
        }

        check_unique_events(&transitions)?;
        check_reachable(&initial_state, &transitions)?;

        let declared = |state: &State| {
            *state == initial_state
                || transitions
                    .iter()
                    .any(|t| t.from == *state || t.to == *state)
        };

        for (state, _) in &self.determiners {
            if !declared(state) {
                return Err(BuildError::UndeclaredState {
                    state: state.clone(),
                    referenced_by: "an on_advance determiner".to_string(),
                });
            }
        }
        for (state, _) in &self.prompts {
            if !declared(state) {
                return Err(BuildError::UndeclaredState {
                    state: state.clone(),
                    referenced_by: "a prompt".to_string(),
                });
            }
        }

        let mut phases = Vec::with_capacity(self.phases.len());
        for (name, options) in &self.phases {
            for (state, role) in [
                (&options.start_state, "start"),
                (&options.end_state, "end"),
            ] {
                if let Some(state) = state {
                    if !declared(state) {
                        return Err(BuildError::UndeclaredState {
                            state: state.clone(),
                            referenced_by: format!("phase '{name}' {role} state"),
                        });
                    }
                }
            }
            phases.push(phase_config(name, options)?);
        }

        debug!(
            project_type = %self.name,
            phases = phases.len(),
            transitions = transitions.len(),
            branches = branches.len(),
            "built project type configuration"
        );

        Ok(Config {
            name: self.name.clone(),
            description: self.description.clone(),
            initial_state,
            phases,
            transitions,
            branches,
            determiners,
            prompts: self.prompts.iter().cloned().collect(),
            orchestrator_prompt: self.orchestrator_prompt.clone(),
            initializer: self.initializer.clone(),
        })
    }

    fn branch_configs(&self) -> Result<Vec<BranchConfig>, BuildError> {
        let mut seen = HashSet::new();
        let mut branches = Vec::with_capacity(self.branches.len());
        for (from, options) in &self.branches {
            if !seen.insert(from) {
                return Err(BuildError::DuplicateBranch {
                    state: from.clone(),
                });
            }
            let discriminator = options.discriminator.clone().ok_or_else(|| {
                BuildError::BranchMissingDiscriminator {
                    state: from.clone(),
                }
            })?;
            if options.paths.is_empty() {
                return Err(BuildError::BranchMissingPaths {
                    state: from.clone(),
                });
            }
            branches.push(BranchConfig {
                from: from.clone(),
                discriminator,
                paths: options.paths.clone(),
            });
        }
        Ok(branches)
    }
}

fn phase_config(name: &str, options: &PhaseOptions) -> Result<PhaseConfig, BuildError> {
    let metadata_schema = match &options.metadata_schema {
        Some(source) => Some(Arc::new(Schema::compile(source).map_err(|source| {
            BuildError::InvalidMetadataSchema {
                phase: name.to_string(),
                source,
            }
        })?)),
        None => None,
    };

    Ok(PhaseConfig {
        name: name.to_string(),
        start_state: options.start_state.clone(),
        end_state: options.end_state.clone(),
        input_types: options.input_types.clone(),
        output_types: options.output_types.clone(),
        supports_tasks: options.supports_tasks,
        metadata_schema,
    })
}

fn check_unique_events(transitions: &[TransitionConfig]) -> Result<(), BuildError> {
    let mut seen = HashSet::new();
    for t in transitions {
        if !seen.insert((&t.from, &t.event)) {
            return Err(BuildError::DuplicateEvent {
                state: t.from.clone(),
                event: t.event.clone(),
            });
        }
    }
    Ok(())
}

fn check_reachable(initial: &State, transitions: &[TransitionConfig]) -> Result<(), BuildError> {
    let mut reached: HashSet<&State> = HashSet::from([initial]);
    let mut frontier = vec![initial];
    while let Some(state) = frontier.pop() {
        for t in transitions.iter().filter(|t| t.from == *state) {
            if reached.insert(&t.to) {
                frontier.push(&t.to);
            }
        }
    }

    match transitions.iter().find(|t| !reached.contains(&t.from)) {
        Some(t) => Err(BuildError::UnreachableState {
            state: t.from.clone(),
        }),
        None => Ok(()),
    }
}
