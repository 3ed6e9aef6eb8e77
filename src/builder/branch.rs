//! Expansion of branches into ordinary transitions and an event determiner.

use super::config::{BranchConfig, TransitionConfig};
use crate::core::{DetermineError, Event, EventDeterminer, Project};
use std::sync::Arc;

/// One transition per branch path, indistinguishable from explicit ones
/// apart from `branch_value`.
pub(crate) fn synthesize_transitions(branch: &BranchConfig) -> Vec<TransitionConfig> {
    branch
        .paths
        .iter()
        .map(|path| TransitionConfig {
            from: branch.from.clone(),
            to: path.to.clone(),
            event: path.event.clone(),
            guard: path.options.guard.clone(),
            on_entry: path.options.on_entry.clone(),
            on_exit: path.options.on_exit.clone(),
            description: path.options.description.clone(),
            branch_value: Some(path.value.clone()),
        })
        .collect()
}

/// Determiner that runs the discriminator and maps its value to the event of
/// the matching path.
pub(crate) fn synthesize_determiner(branch: &BranchConfig) -> EventDeterminer {
    let state = branch.from.clone();
    let discriminator = Arc::clone(&branch.discriminator);
    let table: Vec<(String, Event)> = branch
        .paths
        .iter()
        .map(|p| (p.value.clone(), p.event.clone()))
        .collect();

    Arc::new(move |project: &Project| {
        let value = discriminator(project);
        match table.iter().find(|(key, _)| *key == value) {
            Some((_, event)) => Ok(event.clone()),
            None => Err(DetermineError::Unmatched {
                state: state.clone(),
                value,
                valid: table.iter().map(|(key, _)| key.clone()).collect(),
            }),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::options::BranchOptions;
    use crate::core::{Project, State};

    fn review_branch() -> BranchConfig {
        let options = BranchOptions::default()
            .discriminator(|p: &Project| p.description.clone())
            .when("approved", Event::new("Approve"), State::new("Approved"))
            .when_with("rejected", Event::new("Reject"), State::new("Drafting"), |t| {
                t.description("send back for another draft")
            });

        BranchConfig {
            from: State::new("Drafting"),
            discriminator: options.discriminator.unwrap(),
            paths: options.paths,
        }
    }

    #[test]
    fn each_path_becomes_a_transition() {
        let transitions = synthesize_transitions(&review_branch());

        assert_eq!(transitions.len(), 2);
        assert_eq!(transitions[1].from, State::new("Drafting"));
        assert_eq!(transitions[1].to, State::new("Drafting"));
        assert_eq!(transitions[1].event, Event::new("Reject"));
        assert_eq!(
            transitions[1].description.as_deref(),
            Some("send back for another draft")
        );
        assert_eq!(transitions[0].branch_value.as_deref(), Some("approved"));
    }

    #[test]
    fn determiner_maps_value_to_event() {
        let determine = synthesize_determiner(&review_branch());
        let mut project = Project::new("p", "t", State::new("Drafting"));

        project.description = "approved".into();
        assert_eq!(determine(&project), Ok(Event::new("Approve")));

        project.description = "rejected".into();
        assert_eq!(determine(&project), Ok(Event::new("Reject")));
    }

    #[test]
    fn determiner_lists_valid_values_on_mismatch() {
        let determine = synthesize_determiner(&review_branch());
        let mut project = Project::new("p", "t", State::new("Drafting"));
        project.description = "unknown".into();

        assert_eq!(
            determine(&project),
            Err(DetermineError::Unmatched {
                state: State::new("Drafting"),
                value: "unknown".into(),
                valid: vec!["approved".into(), "rejected".into()],
            })
        );
    }
}
