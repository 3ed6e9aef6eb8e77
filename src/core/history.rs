//! Transition history recorded on the project.
//!
//! Every committed transition appends one [`TransitionRecord`] so a reloaded
//! project can show how it got where it is.

use super::ids::{Event, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single fired transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: State,
    pub to: State,
    pub event: Event,
    pub timestamp: DateTime<Utc>,
}

impl TransitionRecord {
    pub fn now(from: State, to: State, event: Event) -> Self {
        Self {
            from,
            to,
            event,
            timestamp: Utc::now(),
        }
    }
}

/// States traversed by `history`: the first `from`, then every `to`.
pub fn traversed_path(history: &[TransitionRecord]) -> Vec<&State> {
    let mut path = Vec::with_capacity(history.len() + 1);
    if let Some(first) = history.first() {
        path.push(&first.from);
    }
    path.extend(history.iter().map(|record| &record.to));
    path
}

/// Time between the first and last record, `None` when empty.
pub fn elapsed(history: &[TransitionRecord]) -> Option<Duration> {
    let (first, last) = (history.first()?, history.last()?);
    last.timestamp
        .signed_duration_since(first.timestamp)
        .to_std()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(from: &str, to: &str, event: &str) -> TransitionRecord {
        TransitionRecord::now(State::new(from), State::new(to), Event::new(event))
    }

    #[test]
    fn empty_history_has_no_path() {
        assert!(traversed_path(&[]).is_empty());
        assert!(elapsed(&[]).is_none());
    }

    #[test]
    fn path_follows_records_in_order() {
        let history = vec![
            record("Drafting", "Reviewing", "Submit"),
            record("Reviewing", "Drafting", "Reject"),
            record("Drafting", "Reviewing", "Submit"),
        ];

        let path = traversed_path(&history);
        let names: Vec<&str> = path.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["Drafting", "Reviewing", "Drafting", "Reviewing"]);
    }

    #[test]
    fn single_record_has_zero_duration() {
        let history = vec![record("A", "B", "go")];
        assert_eq!(elapsed(&history), Some(Duration::from_secs(0)));
    }
}
