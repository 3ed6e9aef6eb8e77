//! Guard predicates for controlling state transitions.
//!
//! Guards read the bound project and decide whether a transition may fire.
//! They must not have side effects: discovery and dry-run evaluate them
//! freely and repeatedly.

use super::project::Project;
use std::fmt;
use std::sync::Arc;

type Check = Arc<dyn Fn(&Project) -> Result<(), String> + Send + Sync>;

/// Predicate that gates a transition, with a human-readable description.
///
/// # Example
///
/// ```rust
/// use phaseflow::core::{Guard, Project, State};
///
/// let guard = Guard::new("project has a description", |p: &Project| {
///     !p.description.is_empty()
/// });
///
/// let mut project = Project::new("demo", "standard", State::new("Start"));
/// assert!(!guard.check(&project));
///
/// project.description = "ship it".into();
/// assert!(guard.check(&project));
/// ```
#[derive(Clone)]
pub struct Guard {
    description: String,
    check: Check,
}

impl Guard {
    /// Guard from a boolean predicate. When it blocks, the reason is the
    /// description.
    pub fn new<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Project) -> bool + Send + Sync + 'static,
    {
        let description = description.into();
        let reason = description.clone();
        Self {
            description,
            check: Arc::new(move |project: &Project| {
                if predicate(project) {
                    Ok(())
                } else {
                    Err(reason.clone())
                }
            }),
        }
    }

    /// Guard whose predicate explains itself when it blocks.
    pub fn with_reason<F>(description: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Project) -> Result<(), String> + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            check: Arc::new(check),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Evaluate the guard.
    pub fn check(&self, project: &Project) -> bool {
        self.evaluate(project).is_ok()
    }

    /// Evaluate the guard, returning the blocking reason on failure.
    ///
    /// An empty reason from a custom check falls back to the description so
    /// a blocked transition always says why.
    pub fn evaluate(&self, project: &Project) -> Result<(), String> {
        (self.check)(project).map_err(|reason| {
            if reason.trim().is_empty() {
                self.description.clone()
            } else {
                reason
            }
        })
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
