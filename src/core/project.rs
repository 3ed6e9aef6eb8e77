//! Project data: the mutable root entity a machine is bound to.

use super::history::TransitionRecord;
use super::ids::State;
use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Open, per-phase metadata. Its shape is declared by the project type.
pub type Metadata = Map<String, Value>;

/// Lifecycle status of a phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
    Skipped,
}

/// Status of a single task.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    NeedsReview,
    Completed,
    Abandoned,
}

impl TaskStatus {
    /// Completed and abandoned tasks are finished; nothing else is.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Abandoned)
    }
}

/// A tracked output (or input) of a phase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(rename = "type")]
    pub artifact_type: String,
    pub path: String,
    #[serde(default)]
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Metadata,
}

impl Artifact {
    pub fn new(artifact_type: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            artifact_type: artifact_type.into(),
            path: path.into(),
            approved: false,
            created_at: Utc::now(),
            metadata: Metadata::new(),
        }
    }

    pub fn approved(mut self) -> Self {
        self.approved = true;
        self
    }
}

/// A unit of work inside a phase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default = "first_iteration")]
    pub iteration: u32,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Metadata,
}

fn first_iteration() -> u32 {
    1
}

impl Task {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: TaskStatus::Pending,
            iteration: 1,
            metadata: Metadata::new(),
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }
}

/// One lifecycle stage of a project.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    #[serde(default)]
    pub status: PhaseStatus,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub inputs: Vec<Artifact>,
    #[serde(default)]
    pub outputs: Vec<Artifact>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub metadata: Metadata,
}

fn enabled_by_default() -> bool {
    true
}

impl Default for Phase {
    fn default() -> Self {
        Self {
            status: PhaseStatus::Pending,
            enabled: true,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            tasks: Vec::new(),
            metadata: Metadata::new(),
        }
    }
}

impl Phase {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the phase has tasks and every one of them is terminal.
    pub fn all_tasks_terminal(&self) -> bool {
        !self.tasks.is_empty() && self.tasks.iter().all(|t| t.status.is_terminal())
    }

    /// True when an output of `artifact_type` exists and is approved.
    pub fn has_approved_output(&self, artifact_type: &str) -> bool {
        self.outputs
            .iter()
            .any(|a| a.artifact_type == artifact_type && a.approved)
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Read a metadata value by key.
    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Read a string metadata value; non-strings read as `None`.
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    pub fn set_meta(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.metadata.insert(key.into(), value.into());
    }
}

/// Name-keyed phases that remember insertion order.
///
/// Serialized as a JSON object; the key order on disk is the order phases
/// were added and survives a load/save cycle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Phases {
    entries: Vec<(String, Phase)>,
}

impl Phases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a phase, keeping the original position on replace.
    pub fn insert(&mut self, name: impl Into<String>, phase: Phase) -> Option<Phase> {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, phase)),
            None => {
                self.entries.push((name, phase));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Phase> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, p)| p)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Phase> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p)
    }

    pub fn remove(&mut self, name: &str) -> Option<Phase> {
        let index = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Phase)> {
        self.entries.iter().map(|(n, p)| (n.as_str(), p))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Phase)> {
        self.entries.iter_mut().map(|(n, p)| (n.as_str(), p))
    }
}

impl Serialize for Phases {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, phase) in &self.entries {
            map.serialize_entry(name, phase)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Phases {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PhasesVisitor;

        impl<'de> Visitor<'de> for PhasesVisitor {
            type Value = Phases;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of phase name to phase")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Phases, A::Error> {
                let mut phases = Phases::new();
                while let Some((name, phase)) = access.next_entry::<String, Phase>()? {
                    if phases.insert(name.clone(), phase).is_some() {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate phase '{name}'"
                        )));
                    }
                }
                Ok(phases)
            }
        }

        deserializer.deserialize_map(PhasesVisitor)
    }
}

/// Position of the project in its state machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Statechart {
    pub current_state: State,
    pub updated_at: DateTime<Utc>,
}

/// The mutable root entity: one project moving through its lifecycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    /// Registry key of the project type that governs this project.
    #[serde(rename = "type")]
    pub project_type: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub phases: Phases,
    pub statechart: Statechart,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<TransitionRecord>,
}

impl Project {
    /// Create an empty project in `state`. Phases are usually filled in by
    /// [`Config::new_project`](crate::Config::new_project) instead.
    pub fn new(name: impl Into<String>, project_type: impl Into<String>, state: State) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            project_type: project_type.into(),
            description: String::new(),
            created_at: now,
            updated_at: now,
            phases: Phases::new(),
            statechart: Statechart {
                current_state: state,
                updated_at: now,
            },
            history: Vec::new(),
        }
    }

    pub fn current_state(&self) -> &State {
        &self.statechart.current_state
    }

    pub fn phase(&self, name: &str) -> Option<&Phase> {
        self.phases.get(name)
    }

    pub fn phase_mut(&mut self, name: &str) -> Option<&mut Phase> {
        self.phases.get_mut(name)
    }

    /// Mark the project as modified now.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_completed_and_abandoned_are_terminal() {
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Abandoned.is_terminal());
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::InProgress.is_terminal());
        assert!(!TaskStatus::NeedsReview.is_terminal());
    }

    #[test]
    fn phase_without_tasks_is_not_complete() {
        let mut phase = Phase::new();
        assert!(!phase.all_tasks_terminal());

        phase.tasks.push(Task::new("010", "write").with_status(TaskStatus::Completed));
        phase.tasks.push(Task::new("020", "review").with_status(TaskStatus::NeedsReview));
        assert!(!phase.all_tasks_terminal());

        phase.task_mut("020").unwrap().status = TaskStatus::Abandoned;
        assert!(phase.all_tasks_terminal());
    }

    #[test]
    fn approved_output_requires_matching_type() {
        let mut phase = Phase::new();
        phase.outputs.push(Artifact::new("design", "design.md"));
        assert!(!phase.has_approved_output("design"));

        phase.outputs.push(Artifact::new("plan", "plan.md").approved());
        assert!(!phase.has_approved_output("design"));
        assert!(phase.has_approved_output("plan"));
    }

    #[test]
    fn phases_keep_insertion_order_through_json() {
        let mut phases = Phases::new();
        phases.insert("zeta", Phase::new());
        phases.insert("alpha", Phase::new());
        phases.insert("mid", Phase::new());

        let json = serde_json::to_string(&phases).unwrap();
        let back: Phases = serde_json::from_str(&json).unwrap();

        assert_eq!(back.names().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
        assert_eq!(back, phases);
    }

    #[test]
    fn replacing_a_phase_keeps_its_position() {
        let mut phases = Phases::new();
        phases.insert("a", Phase::new());
        phases.insert("b", Phase::new());

        let mut done = Phase::new();
        done.status = PhaseStatus::Completed;
        assert!(phases.insert("a", done).is_some());

        assert_eq!(phases.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(phases.get("a").unwrap().status, PhaseStatus::Completed);
    }

    #[test]
    fn duplicate_phase_keys_are_rejected() {
        let now = serde_json::to_value(Utc::now()).unwrap();
        let json = format!(r#"{{"a": {{"created_at": {now}}}, "a": {{"created_at": {now}}}}}"#);
        let result: Result<Phases, _> = serde_json::from_str(&json);
        assert!(result.is_err());
    }

    #[test]
    fn metadata_accessors_read_strings() {
        let mut phase = Phase::new();
        phase.set_meta("outcome", "approved");
        phase.set_meta("retries", 2);

        assert_eq!(phase.meta_str("outcome"), Some("approved"));
        assert_eq!(phase.meta_str("retries"), None);
        assert_eq!(phase.meta("retries"), Some(&Value::from(2)));
    }
}
