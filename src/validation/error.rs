use super::schema::SchemaViolation;
use std::fmt;
use thiserror::Error;

/// Which artifact list of a phase an artifact sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactDirection {
    Input,
    Output,
}

impl fmt::Display for ArtifactDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

/// One problem found by [`Validator`](super::Validator).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("project structure invalid at {path}: {message}")]
    Structural { path: String, message: String },

    #[error("phase '{phase}' has duplicate task id '{id}'")]
    DuplicateTaskId { phase: String, id: String },

    #[error("phase '{phase}' metadata invalid: {violation}")]
    Metadata {
        phase: String,
        violation: SchemaViolation,
    },

    #[error("phase '{phase}' has metadata but declares no metadata schema")]
    UnexpectedMetadata { phase: String },

    #[error("phase '{phase}' is not defined by project type '{project_type}'")]
    UnknownPhase { phase: String, project_type: String },

    #[error(
        "phase '{phase}' {direction} '{path}' has type '{artifact_type}' (allowed: {})",
        allowed.join(", ")
    )]
    DisallowedArtifact {
        phase: String,
        direction: ArtifactDirection,
        path: String,
        artifact_type: String,
        allowed: Vec<String>,
    },
}

impl ValidationError {
    /// The phase the problem belongs to, if it is phase-specific.
    pub fn phase(&self) -> Option<&str> {
        match self {
            Self::Structural { .. } => None,
            Self::DuplicateTaskId { phase, .. }
            | Self::Metadata { phase, .. }
            | Self::UnexpectedMetadata { phase }
            | Self::UnknownPhase { phase, .. }
            | Self::DisallowedArtifact { phase, .. } => Some(phase),
        }
    }
}

impl From<SchemaViolation> for ValidationError {
    fn from(violation: SchemaViolation) -> Self {
        Self::Structural {
            path: violation.path,
            message: violation.message,
        }
    }
}
