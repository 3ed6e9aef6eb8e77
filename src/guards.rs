//! Ready-made guards over project data.
//!
//! Each helper names the phase it reads and produces a specific reason when
//! it blocks, so discovery output tells the user what to fix.

use crate::core::{Guard, Project};
use serde_json::Value;

/// Every task in `phase` is completed or abandoned, and there is at least
/// one.
pub fn all_tasks_complete(phase: &str) -> Guard {
    let phase = phase.to_string();
    Guard::with_reason(format!("all {phase} tasks complete"), move |project: &Project| {
        let Some(p) = project.phase(&phase) else {
            return Err(format!("phase '{phase}' does not exist"));
        };
        if p.tasks.is_empty() {
            return Err(format!("phase '{phase}' has no tasks"));
        }
        let open: Vec<&str> = p
            .tasks
            .iter()
            .filter(|t| !t.status.is_terminal())
            .map(|t| t.id.as_str())
            .collect();
        if open.is_empty() {
            Ok(())
        } else {
            Err(format!("{phase} tasks still open: {}", open.join(", ")))
        }
    })
}

/// `phase` has an approved output of `artifact_type`.
pub fn artifact_approved(phase: &str, artifact_type: &str) -> Guard {
    let phase = phase.to_string();
    let artifact_type = artifact_type.to_string();
    Guard::with_reason(
        format!("{phase} {artifact_type} approved"),
        move |project: &Project| match project.phase(&phase) {
            Some(p) if p.has_approved_output(&artifact_type) => Ok(()),
            Some(p) if p.outputs.iter().any(|a| a.artifact_type == artifact_type) => {
                Err(format!("{phase} {artifact_type} is not approved yet"))
            }
            Some(_) => Err(format!("{phase} has no {artifact_type} output")),
            None => Err(format!("phase '{phase}' does not exist")),
        },
    )
}

/// `phase` has an output of `artifact_type`, approved or not.
pub fn has_artifact(phase: &str, artifact_type: &str) -> Guard {
    let phase = phase.to_string();
    let artifact_type = artifact_type.to_string();
    let description = format!("{phase} has a {artifact_type} output");
    Guard::new(description, move |project: &Project| {
        project
            .phase(&phase)
            .is_some_and(|p| p.outputs.iter().any(|a| a.artifact_type == artifact_type))
    })
}

/// `phase` metadata holds `value` under `key`.
pub fn metadata_equals(phase: &str, key: &str, value: impl Into<Value>) -> Guard {
    let phase = phase.to_string();
    let key = key.to_string();
    let expected = value.into();
    Guard::with_reason(
        format!("{phase}.{key} is {expected}"),
        move |project: &Project| {
            match project.phase(&phase).and_then(|p| p.meta(&key)) {
                Some(actual) if *actual == expected => Ok(()),
                Some(actual) => Err(format!("{phase}.{key} is {actual}, expected {expected}")),
                None => Err(format!("{phase}.{key} is not set")),
            }
        },
    )
}

/// Phase `phase` is enabled.
pub fn phase_enabled(phase: &str) -> Guard {
    let phase = phase.to_string();
    Guard::new(format!("{phase} enabled"), move |project: &Project| {
        project.phase(&phase).is_some_and(|p| p.enabled)
    })
}
