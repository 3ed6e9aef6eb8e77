//! Validating a project against its project type.

use super::error::{ArtifactDirection, ValidationError};
use super::structural::project_schema;
use crate::builder::{Config, PhaseConfig};
use crate::core::{Artifact, Phase, Project};
use serde_json::Value;
use std::collections::HashSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use tracing::debug;

/// Checks projects of one project type.
///
/// # Example
///
/// ```rust
/// use phaseflow::core::State;
/// use phaseflow::validation::Validator;
/// use phaseflow::ConfigBuilder;
///
/// let config = ConfigBuilder::new("standard")
///     .set_initial_state(State::new("Drafting"))
///     .with_phase("draft", |p| p.outputs(["design"]))
///     .build()
///     .unwrap();
///
/// let project = config.new_project("widget", "").unwrap();
/// assert!(Validator::new(&config).validate(&project).is_empty());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Validator<'c> {
    config: &'c Config,
}

impl<'c> Validator<'c> {
    pub fn new(config: &'c Config) -> Self {
        Self { config }
    }

    /// Every problem with `project`, structural ones first, then per phase
    /// in the project's phase order.
    pub fn validate(&self, project: &Project) -> Vec<ValidationError> {
        let mut errors = self.structural(project);
        for (name, phase) in project.phases.iter() {
            errors.extend(self.phase(name, phase));
        }
        debug!(
            project = %project.name,
            project_type = %self.config.name(),
            errors = errors.len(),
            "validated project"
        );
        errors
    }

    /// [`validate`](Self::validate) as an accumulated `Validation`.
    pub fn check(&self, project: &Project) -> Validation<(), NonEmptyVec<ValidationError>> {
        super::accumulate(self.validate(project))
    }

    /// Shape of the serialized project, plus task id uniqueness.
    pub fn structural(&self, project: &Project) -> Vec<ValidationError> {
        let value = match serde_json::to_value(project) {
            Ok(value) => value,
            Err(err) => {
                return vec![ValidationError::Structural {
                    path: "$".to_string(),
                    message: err.to_string(),
                }]
            }
        };

        let mut errors: Vec<ValidationError> = match project_schema() {
            Ok(schema) => schema
                .violations(&value)
                .into_iter()
                .map(ValidationError::from)
                .collect(),
            Err(err) => vec![ValidationError::Structural {
                path: "$".to_string(),
                message: err.to_string(),
            }],
        };

        for (name, phase) in project.phases.iter() {
            let mut seen = HashSet::new();
            for task in &phase.tasks {
                if !seen.insert(task.id.as_str()) {
                    errors.push(ValidationError::DuplicateTaskId {
                        phase: name.to_string(),
                        id: task.id.clone(),
                    });
                }
            }
        }
        errors
    }

    /// Problems with one phase relative to the project type.
    pub fn phase(&self, name: &str, phase: &Phase) -> Vec<ValidationError> {
        let Some(config) = self.config.phase(name) else {
            return vec![ValidationError::UnknownPhase {
                phase: name.to_string(),
                project_type: self.config.name().to_string(),
            }];
        };

        let mut errors = metadata_errors(config, phase);
        errors.extend(artifact_errors(
            config,
            ArtifactDirection::Input,
            &phase.inputs,
            &config.input_types,
        ));
        errors.extend(artifact_errors(
            config,
            ArtifactDirection::Output,
            &phase.outputs,
            &config.output_types,
        ));
        errors
    }
}

fn metadata_errors(config: &PhaseConfig, phase: &Phase) -> Vec<ValidationError> {
    match &config.metadata_schema {
        Some(schema) => schema
            .violations(&Value::Object(phase.metadata.clone()))
            .into_iter()
            .map(|violation| ValidationError::Metadata {
                phase: config.name.clone(),
                violation,
            })
            .collect(),
        None if !phase.metadata.is_empty() => vec![ValidationError::UnexpectedMetadata {
            phase: config.name.clone(),
        }],
        None => Vec::new(),
    }
}

fn artifact_errors(
    config: &PhaseConfig,
    direction: ArtifactDirection,
    artifacts: &[Artifact],
    allowed: &[String],
) -> Vec<ValidationError> {
    if allowed.is_empty() {
        return Vec::new();
    }
    artifacts
        .iter()
        .filter(|a| !allowed.contains(&a.artifact_type))
        .map(|a| ValidationError::DisallowedArtifact {
            phase: config.name.clone(),
            direction,
            path: a.path.clone(),
            artifact_type: a.artifact_type.clone(),
            allowed: allowed.to_vec(),
        })
        .collect()
}
