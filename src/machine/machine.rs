//! A configuration bound to one project.

use super::error::{ActionStage, BindError, FireError};
use crate::builder::{Config, TransitionConfig};
use crate::core::{Event, Project, State, TransitionRecord};
use chrono::Utc;
use tracing::{debug, info};

/// Result of a committed transition.
#[derive(Clone, Debug, PartialEq)]
pub struct Fired {
    pub from: State,
    pub to: State,
    pub event: Event,
}

/// The state `project` is in according to `config`. An unset state means
/// the project has not started and sits at the initial state. The project
/// must belong to the configured project type.
pub fn resolve_state(config: &Config, project: &Project) -> Result<State, BindError> {
    if project.project_type != config.name() {
        return Err(BindError::TypeMismatch {
            expected: config.name().to_string(),
            found: project.project_type.clone(),
        });
    }
    let state = project.current_state();
    if state.is_empty() {
        return Ok(config.initial_state().clone());
    }
    if !config.is_known_state(state) {
        return Err(BindError::UnknownState {
            state: state.clone(),
            project_type: config.name().to_string(),
        });
    }
    Ok(state.clone())
}

/// Run the guard of `transition`, if any. A refusal always carries a
/// non-empty reason, even for guards with a blank description.
pub(crate) fn guard_verdict(transition: &TransitionConfig, project: &Project) -> Result<(), String> {
    let Some(guard) = &transition.guard else {
        return Ok(());
    };
    guard.evaluate(project).map_err(|reason| {
        if reason.trim().is_empty() {
            format!("guard on '{}' refused", transition.event)
        } else {
            reason
        }
    })
}

/// Look up `event` from `state` and evaluate its guard against `project`.
pub fn evaluate<'c>(
    config: &'c Config,
    project: &Project,
    state: &State,
    event: &Event,
) -> Result<&'c TransitionConfig, FireError> {
    let transition = config
        .transition(state, event)
        .ok_or_else(|| FireError::NotConfigured {
            state: state.clone(),
            event: event.clone(),
            available: config
                .transitions_from(state)
                .map(|t| t.event.clone())
                .collect(),
        })?;

    guard_verdict(transition, project).map_err(|reason| FireError::Blocked {
        state: state.clone(),
        event: event.clone(),
        reason,
    })?;
    Ok(transition)
}

/// A runnable machine: a [`Config`] whose guards, actions and determiners
/// all act on one borrowed [`Project`].
///
/// The machine starts wherever the project's stored state says, so a
/// reloaded project resumes mid-lifecycle. Firing mutates the borrowed
/// project in place; blocked or failed fires leave it untouched.
pub struct Machine<'a> {
    config: &'a Config,
    project: &'a mut Project,
}

impl<'a> Machine<'a> {
    /// Bind `config` to `project`.
    pub fn bind(config: &'a Config, project: &'a mut Project) -> Result<Self, BindError> {
        let state = resolve_state(config, project)?;
        if project.statechart.current_state != state {
            project.statechart.current_state = state;
        }
        debug!(
            project = %project.name,
            project_type = %config.name(),
            state = %project.current_state(),
            "bound machine to project"
        );
        Ok(Self { config, project })
    }

    pub fn config(&self) -> &'a Config {
        self.config
    }

    pub fn state(&self) -> &State {
        self.project.current_state()
    }

    pub fn project(&self) -> &Project {
        self.project
    }

    /// Configured transitions out of the current state, guarded or not.
    pub fn transitions(&self) -> impl Iterator<Item = &TransitionConfig> + '_ {
        self.config.transitions_from(self.project.current_state())
    }

    /// Events whose guards currently pass, in declaration order.
    pub fn permitted_events(&self) -> Vec<Event> {
        self.transitions()
            .filter(|t| guard_verdict(t, self.project).is_ok())
            .map(|t| t.event.clone())
            .collect()
    }

    /// The transition `event` would take, or why it would not.
    pub fn check(&self, event: &Event) -> Result<&'a TransitionConfig, FireError> {
        evaluate(self.config, self.project, self.project.current_state(), event)
    }

    /// Whether `event` may fire now. Unconfigured events are an error, not
    /// `false`.
    pub fn can_fire(&self, event: &Event) -> Result<bool, FireError> {
        match self.check(event) {
            Ok(_) => Ok(true),
            Err(FireError::Blocked { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Fire `event`: exit action, state change, entry action, history
    /// record. The actions run against a staged copy that replaces the
    /// project only when everything succeeded.
    pub fn fire(&mut self, event: &Event) -> Result<Fired, FireError> {
        let transition = match self.check(event) {
            Ok(transition) => transition,
            Err(err) => {
                debug!(event = %event, error = %err, "fire refused");
                return Err(err);
            }
        };
        let from = self.state().clone();
        let to = transition.to.clone();

        let mut staged = self.project.clone();
        let failed = |stage, source| FireError::Action {
            state: from.clone(),
            event: event.clone(),
            stage,
            source,
        };

        if let Some(exit) = &transition.on_exit {
            exit(&mut staged).map_err(|source| failed(ActionStage::Exit, source))?;
        }

        let now = Utc::now();
        staged.statechart.current_state = to.clone();
        staged.statechart.updated_at = now;

        if let Some(entry) = &transition.on_entry {
            entry(&mut staged).map_err(|source| failed(ActionStage::Entry, source))?;
        }

        staged
            .history
            .push(TransitionRecord::now(from.clone(), to.clone(), event.clone()));
        staged.updated_at = now;
        *self.project = staged;

        info!(
            project = %self.project.name,
            from = %from,
            to = %to,
            event = %event,
            "transition fired"
        );

        Ok(Fired {
            from,
            to,
            event: event.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ConfigBuilder;
    use crate::core::{ActionError, Guard};
    use serde_json::Value;

    const PLANNING: State = State::from_static("Planning");
    const BUILDING: State = State::from_static("Building");
    const DONE: State = State::from_static("Done");
    const START: Event = Event::from_static("Start");
    const FINISH: Event = Event::from_static("Finish");
    const ABORT: Event = Event::from_static("Abort");

    fn config() -> Config {
        ConfigBuilder::new("build")
            .set_initial_state(PLANNING)
            .with_phase("plan", |p| p.start_state(PLANNING))
            .add_transition_with(PLANNING, BUILDING, START, |t| {
                t.guard(Guard::new("plan has a goal", |p: &Project| {
                    p.phase("plan").and_then(|ph| ph.meta_str("goal")).is_some()
                }))
                .on_exit(|p: &mut Project| {
                    p.phase_mut("plan")
                        .ok_or_else(|| ActionError::new("plan phase missing"))?
                        .set_meta("left", true);
                    Ok(())
                })
            })
            .add_transition_with(BUILDING, DONE, FINISH, |t| {
                t.on_entry(|_: &mut Project| Err(ActionError::new("disk full")))
            })
            .add_transition(BUILDING, PLANNING, ABORT)
            .build()
            .unwrap()
    }

    fn project(config: &Config) -> Project {
        config.new_project("widget", "").unwrap()
    }

    #[test]
    fn bind_starts_at_stored_state() {
        let config = config();
        let mut project = project(&config);
        project.statechart.current_state = BUILDING;

        let machine = Machine::bind(&config, &mut project).unwrap();
        assert_eq!(machine.state(), &BUILDING);
    }

    #[test]
    fn bind_fills_in_unset_state() {
        let config = config();
        let mut project = project(&config);
        project.statechart.current_state = State::default();

        let machine = Machine::bind(&config, &mut project).unwrap();
        assert_eq!(machine.state(), &PLANNING);
    }

    #[test]
    fn bind_rejects_unknown_state() {
        let config = config();
        let mut project = project(&config);
        project.statechart.current_state = State::new("Limbo");

        assert!(matches!(
            Machine::bind(&config, &mut project),
            Err(BindError::UnknownState { .. })
        ));
    }

    #[test]
    fn bind_rejects_project_of_another_type() {
        let config = config();
        let mut project = project(&config);
        project.project_type = "deploy".into();
        let before = project.clone();

        assert_eq!(
            Machine::bind(&config, &mut project).err(),
            Some(BindError::TypeMismatch {
                expected: "build".into(),
                found: "deploy".into(),
            })
        );
        assert_eq!(project, before);
    }

    #[test]
    fn blank_guard_description_still_gives_a_reason() {
        let config = ConfigBuilder::new("build")
            .set_initial_state(PLANNING)
            .add_transition_with(PLANNING, BUILDING, START, |t| {
                t.guard(Guard::new("", |_: &Project| false))
            })
            .build()
            .unwrap();
        let mut project = config.new_project("widget", "").unwrap();
        let mut machine = Machine::bind(&config, &mut project).unwrap();

        assert!(matches!(
            machine.fire(&START),
            Err(FireError::Blocked { reason, .. }) if reason == "guard on 'Start' refused"
        ));
    }

    #[test]
    fn guard_filters_permitted_events() {
        let config = config();
        let mut project = project(&config);
        {
            let machine = Machine::bind(&config, &mut project).unwrap();
            assert!(machine.permitted_events().is_empty());
            assert_eq!(machine.can_fire(&START), Ok(false));
        }

        project.phase_mut("plan").unwrap().set_meta("goal", "ship");
        let machine = Machine::bind(&config, &mut project).unwrap();
        assert_eq!(machine.permitted_events(), vec![START]);
    }

    #[test]
    fn blocked_fire_does_not_mutate_and_is_repeatable() {
        let config = config();
        let mut project = project(&config);
        let before = project.clone();

        let mut machine = Machine::bind(&config, &mut project).unwrap();
        let first = machine.fire(&START).unwrap_err();
        let second = machine.fire(&START).unwrap_err();

        assert_eq!(first, second);
        assert!(matches!(first, FireError::Blocked { ref reason, .. } if reason == "plan has a goal"));
        assert_eq!(project, before);
    }

    #[test]
    fn unconfigured_event_is_a_usage_error() {
        let config = config();
        let mut project = project(&config);
        let mut machine = Machine::bind(&config, &mut project).unwrap();

        assert!(matches!(
            machine.fire(&FINISH),
            Err(FireError::NotConfigured { available, .. }) if available == vec![START]
        ));
        assert!(machine.can_fire(&FINISH).is_err());
    }

    #[test]
    fn fire_runs_actions_and_records_history() {
        let config = config();
        let mut project = project(&config);
        project.phase_mut("plan").unwrap().set_meta("goal", "ship");

        let fired = Machine::bind(&config, &mut project)
            .unwrap()
            .fire(&START)
            .unwrap();

        assert_eq!(fired, Fired { from: PLANNING, to: BUILDING, event: START });
        assert_eq!(project.current_state(), &BUILDING);
        assert_eq!(project.phase("plan").unwrap().meta("left"), Some(&Value::Bool(true)));
        assert_eq!(project.history.len(), 1);
        assert_eq!(project.history[0].event, START);
    }

    #[test]
    fn failing_action_leaves_project_untouched() {
        let config = config();
        let mut project = project(&config);
        project.statechart.current_state = BUILDING;
        let before = project.clone();

        let err = Machine::bind(&config, &mut project)
            .unwrap()
            .fire(&FINISH)
            .unwrap_err();

        assert!(matches!(err, FireError::Action { stage: ActionStage::Entry, .. }));
        assert_eq!(project, before);
    }
}
