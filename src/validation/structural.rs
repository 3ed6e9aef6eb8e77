//! The built-in shape every persisted project must have.

use super::schema::{Schema, SchemaError};
use serde_json::{json, Value};
use std::sync::OnceLock;

fn document() -> Value {
    let timestamp = json!({"type": "string", "minLength": 1});
    let name = json!({"type": "string", "minLength": 1});

    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "properties": {
            "name": name,
            "type": name,
            "description": {"type": "string"},
            "created_at": timestamp,
            "updated_at": timestamp,
            "phases": {
                "type": "object",
                "additionalProperties": {"$ref": "#/$defs/phase"}
            },
            "statechart": {
                "type": "object",
                "properties": {
                    "current_state": name,
                    "updated_at": timestamp
                },
                "required": ["current_state", "updated_at"],
                "additionalProperties": false
            },
            "history": {"type": "array", "items": {"$ref": "#/$defs/record"}}
        },
        "required": ["name", "type", "created_at", "updated_at", "phases", "statechart"],
        "additionalProperties": false,
        "$defs": {
            "phase": {
                "type": "object",
                "properties": {
                    "status": {"enum": ["pending", "in_progress", "completed", "failed", "skipped"]},
                    "enabled": {"type": "boolean"},
                    "created_at": timestamp,
                    "started_at": timestamp,
                    "completed_at": timestamp,
                    "inputs": {"type": "array", "items": {"$ref": "#/$defs/artifact"}},
                    "outputs": {"type": "array", "items": {"$ref": "#/$defs/artifact"}},
                    "tasks": {"type": "array", "items": {"$ref": "#/$defs/task"}},
                    "metadata": {"type": "object"}
                },
                "required": ["status", "enabled", "created_at", "inputs", "outputs", "tasks", "metadata"],
                "additionalProperties": false
            },
            "artifact": {
                "type": "object",
                "properties": {
                    "type": name,
                    "path": name,
                    "approved": {"type": "boolean"},
                    "created_at": timestamp,
                    "metadata": {"type": "object"}
                },
                "required": ["type", "path", "approved", "created_at"],
                "additionalProperties": false
            },
            "task": {
                "type": "object",
                "properties": {
                    "id": name,
                    "name": {"type": "string"},
                    "status": {"enum": ["pending", "in_progress", "needs_review", "completed", "abandoned"]},
                    "iteration": {"type": "integer", "minimum": 1},
                    "metadata": {"type": "object"}
                },
                "required": ["id", "name", "status", "iteration"],
                "additionalProperties": false
            },
            "record": {
                "type": "object",
                "properties": {
                    "from": name,
                    "to": name,
                    "event": name,
                    "timestamp": timestamp
                },
                "required": ["from", "to", "event", "timestamp"],
                "additionalProperties": false
            }
        }
    })
}

/// Schema for a serialized project, compiled on first use.
pub fn project_schema() -> Result<&'static Schema, &'static SchemaError> {
    static SCHEMA: OnceLock<Result<Schema, SchemaError>> = OnceLock::new();
    SCHEMA.get_or_init(|| Schema::from_value(document())).as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(phases: Value, current_state: &str) -> Value {
        json!({
            "name": "widget",
            "type": "standard",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
            "phases": phases,
            "statechart": {"current_state": current_state, "updated_at": "2024-01-01T00:00:00Z"}
        })
    }

    #[test]
    fn minimal_project_is_accepted() {
        let schema = project_schema().unwrap();
        assert!(schema.violations(&project(json!({}), "Drafting")).is_empty());
    }

    #[test]
    fn empty_state_and_unknown_status_are_reported() {
        let schema = project_schema().unwrap();
        let violations = schema.violations(&project(json!({}), ""));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "$.statechart.current_state");

        let phase = json!({
            "status": "paused",
            "enabled": true,
            "created_at": "t",
            "inputs": [],
            "outputs": [],
            "tasks": [{"id": "010", "name": "a", "status": "pending", "iteration": 0}],
            "metadata": {}
        });
        let violations = schema.violations(&project(json!({"design": phase}), "Drafting"));
        let mut paths: Vec<&str> = violations.iter().map(|v| v.path.as_str()).collect();
        paths.sort_unstable();
        assert_eq!(
            paths,
            vec!["$.phases.design.status", "$.phases.design.tasks[0].iteration"]
        );
    }
}
