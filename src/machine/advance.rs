//! The advance operation: discovery, dry-run, explicit and automatic.

use super::error::{AdvanceError, FireError, UsageError};
use super::machine::{evaluate, guard_verdict, resolve_state, Fired, Machine};
use crate::builder::Config;
use crate::core::{Event, Project, State};
use crate::persistence::{Backend, Store};
use tracing::{debug, info, warn};

/// What the caller asked `advance` to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdvanceRequest {
    /// Let the state's determiner pick the event.
    Auto,
    /// Fire the named event.
    Explicit(Event),
    /// List every transition out of the current state. Read-only.
    Discover,
    /// Report whether the named event would fire. Read-only.
    DryRun(Event),
}

impl AdvanceRequest {
    /// Map command-line style arguments to a request.
    ///
    /// ```
    /// use phaseflow::machine::{AdvanceRequest, UsageError};
    ///
    /// assert_eq!(AdvanceRequest::from_args(None, false, false), Ok(AdvanceRequest::Auto));
    /// assert_eq!(
    ///     AdvanceRequest::from_args(None, false, true),
    ///     Err(UsageError::DryRunWithoutEvent)
    /// );
    /// ```
    pub fn from_args(event: Option<&str>, list: bool, dry_run: bool) -> Result<Self, UsageError> {
        match (event, list, dry_run) {
            (_, true, true) => Err(UsageError::ListWithDryRun),
            (Some(_), true, false) => Err(UsageError::ListWithEvent),
            (None, true, false) => Ok(Self::Discover),
            (None, false, true) => Err(UsageError::DryRunWithoutEvent),
            (Some(event), false, true) => Ok(Self::DryRun(Event::new(event))),
            (Some(event), false, false) => Ok(Self::Explicit(Event::new(event))),
            (None, false, false) => Ok(Self::Auto),
        }
    }

    /// Whether this request can change the project.
    pub fn is_mutating(&self) -> bool {
        matches!(self, Self::Auto | Self::Explicit(_))
    }
}

/// One transition out of the current state, as reported by discovery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionOption {
    pub event: Event,
    pub target: State,
    pub description: Option<String>,
    /// Set when the guard currently refuses; never empty.
    pub blocked_reason: Option<String>,
}

impl TransitionOption {
    pub fn is_permitted(&self) -> bool {
        self.blocked_reason.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DryRunReport {
    pub event: Event,
    pub target: State,
    pub permitted: bool,
    pub reason: Option<String>,
}

/// Successful result of [`advance`].
#[derive(Clone, Debug, PartialEq)]
pub enum AdvanceOutcome {
    /// A transition fired and the project was saved.
    Advanced { from: State, to: State, event: Event },
    /// Discovery listing for `state`.
    Options {
        state: State,
        options: Vec<TransitionOption>,
    },
    DryRun(DryRunReport),
}

/// List every transition out of the project's current state with its
/// target, description and, when blocked, the guard's reason.
pub fn discover(config: &Config, project: &Project) -> Result<Vec<TransitionOption>, AdvanceError> {
    let state = resolve_state(config, project)?;
    let options = config
        .transitions_from(&state)
        .map(|t| TransitionOption {
            event: t.event.clone(),
            target: t.to.clone(),
            description: t.description.clone(),
            blocked_reason: guard_verdict(t, project).err(),
        })
        .collect();
    Ok(options)
}

/// Report whether `event` would fire from the current state without firing
/// it. An unconfigured event is still an error.
pub fn dry_run(config: &Config, project: &Project, event: &Event) -> Result<DryRunReport, AdvanceError> {
    let state = resolve_state(config, project)?;
    match evaluate(config, project, &state, event) {
        Ok(transition) => Ok(DryRunReport {
            event: event.clone(),
            target: transition.to.clone(),
            permitted: true,
            reason: None,
        }),
        Err(FireError::Blocked { reason, .. }) => Ok(DryRunReport {
            event: event.clone(),
            target: config
                .target_state(&state, event)
                .cloned()
                .unwrap_or_default(),
            permitted: false,
            reason: Some(reason),
        }),
        Err(err) => Err(err.into()),
    }
}

/// Ask the current state's determiner which event to fire.
pub fn determine(config: &Config, project: &Project) -> Result<Event, AdvanceError> {
    let state = resolve_state(config, project)?;
    let determiner = config
        .determiner(&state)
        .ok_or(AdvanceError::NoDeterminer { state })?;
    Ok(determiner(project)?)
}

/// Run one advance request against `project`, saving through `store` after
/// every committed transition.
///
/// Read-only requests never touch the store. When the save after a
/// transition fails the project in memory already holds the new state and
/// [`AdvanceError::NotSaved`] is returned; retry with [`Store::save`]
/// instead of advancing again.
pub fn advance<B: Backend>(
    config: &Config,
    project: &mut Project,
    store: &Store<B>,
    request: AdvanceRequest,
) -> Result<AdvanceOutcome, AdvanceError> {
    let event = match request {
        AdvanceRequest::Discover => {
            let options = discover(config, project)?;
            let state = resolve_state(config, project)?;
            debug!(state = %state, count = options.len(), "listed transitions");
            return Ok(AdvanceOutcome::Options { state, options });
        }
        AdvanceRequest::DryRun(event) => {
            let report = dry_run(config, project, &event)?;
            debug!(event = %event, permitted = report.permitted, "dry run");
            return Ok(AdvanceOutcome::DryRun(report));
        }
        AdvanceRequest::Explicit(event) => event,
        AdvanceRequest::Auto => {
            let event = determine(config, project)?;
            debug!(event = %event, "determiner selected event");
            event
        }
    };

    let Fired { from, to, event } = Machine::bind(config, project)?.fire(&event)?;

    if let Err(source) = store.save(project) {
        warn!(from = %from, to = %to, event = %event, error = %source, "advanced but not saved");
        return Err(AdvanceError::NotSaved {
            from,
            to,
            event,
            source,
        });
    }

    info!(project = %project.name, from = %from, to = %to, event = %event, "advanced");
    Ok(AdvanceOutcome::Advanced { from, to, event })
}

/// Load the project from `store`, advance it, and return the project with
/// the outcome.
pub fn advance_stored<B: Backend>(
    config: &Config,
    store: &Store<B>,
    request: AdvanceRequest,
) -> Result<(Project, AdvanceOutcome), AdvanceError> {
    let mut project = store.load().map_err(AdvanceError::Load)?;
    let outcome = advance(config, &mut project, store, request)?;
    Ok((project, outcome))
}
