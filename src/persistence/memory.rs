//! In-memory backend for tests and dry runs.

use super::backend::{Backend, Context};
use super::error::PersistError;
use super::file::{decode, encode};
use crate::core::Project;
use std::path::Path;
use std::sync::RwLock;
use tracing::debug;

const LABEL: &str = "<memory>";

/// Keeps one serialized project in memory and ignores the context.
///
/// It goes through the same codec as [`FileBackend`](super::FileBackend),
/// so anything that round-trips here round-trips on disk.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    document: RwLock<Option<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored document, if any.
    pub fn document(&self) -> Option<String> {
        self.document
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Backend for MemoryBackend {
    fn load(&self, _ctx: &Context) -> Result<Project, PersistError> {
        let document = self.document().ok_or_else(|| PersistError::NotFound {
            path: LABEL.into(),
        })?;
        decode(&document, Path::new(LABEL))
    }

    fn save(&self, _ctx: &Context, project: &Project) -> Result<(), PersistError> {
        let text = encode(project, false)?;
        *self
            .document
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(text);
        debug!(project = %project.name, "saved project in memory");
        Ok(())
    }

    fn exists(&self, _ctx: &Context) -> Result<bool, PersistError> {
        Ok(self.document().is_some())
    }

    fn delete(&self, _ctx: &Context) -> Result<(), PersistError> {
        self.document
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
            .map(|_| ())
            .ok_or_else(|| PersistError::NotFound { path: LABEL.into() })
    }
}
