//! Persistence error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, saving or deleting project state.
#[derive(Debug, Error)]
pub enum PersistError {
    /// No state document exists at the expected path.
    #[error("no project state found at {}", path.display())]
    NotFound { path: PathBuf },

    /// Reading or writing the document failed.
    #[error("I/O failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serializing the project failed.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The document is not a valid state envelope.
    #[error("deserialization of {} failed: {source}", path.display())]
    Deserialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The document was written by an incompatible format version.
    #[error("unsupported state format version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}
