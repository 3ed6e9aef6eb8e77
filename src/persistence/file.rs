//! JSON document backend.

use super::backend::{Backend, Context};
use super::error::PersistError;
use crate::core::Project;
use crate::settings::Settings;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Version of the on-disk state format.
pub const STATE_FORMAT_VERSION: u32 = 1;

/// Default location of the state document, relative to the context root.
pub const DEFAULT_STATE_PATH: &str = ".phaseflow/project/state.json";

#[derive(Serialize)]
struct Envelope<'a> {
    version: u32,
    project: &'a Project,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

#[derive(Deserialize)]
struct StoredEnvelope {
    project: Project,
}

/// Serialize `project` into a versioned state document.
pub fn encode(project: &Project, pretty: bool) -> Result<String, PersistError> {
    let envelope = Envelope {
        version: STATE_FORMAT_VERSION,
        project,
    };
    let text = if pretty {
        serde_json::to_string_pretty(&envelope)
    } else {
        serde_json::to_string(&envelope)
    };
    text.map_err(PersistError::Serialization)
}

/// Parse a state document written by [`encode`]. `path` only labels errors.
pub fn decode(text: &str, path: &Path) -> Result<Project, PersistError> {
    let deserialization = |source| PersistError::Deserialization {
        path: path.to_path_buf(),
        source,
    };
    let probe: VersionProbe = serde_json::from_str(text).map_err(deserialization)?;
    if probe.version != STATE_FORMAT_VERSION {
        return Err(PersistError::UnsupportedVersion {
            found: probe.version,
            supported: STATE_FORMAT_VERSION,
        });
    }
    // Decoded straight from text so phase order is kept.
    let stored: StoredEnvelope = serde_json::from_str(text).map_err(deserialization)?;
    Ok(stored.project)
}

/// Stores the project as a JSON document at a fixed path in the context's
/// file system.
#[derive(Clone, Debug)]
pub struct FileBackend {
    path: PathBuf,
    pretty: bool,
}

impl Default for FileBackend {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STATE_PATH),
            pretty: true,
        }
    }
}

impl FileBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            path: settings.state_path.clone(),
            pretty: settings.pretty,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> PersistError {
        if source.kind() == io::ErrorKind::NotFound {
            PersistError::NotFound {
                path: self.path.clone(),
            }
        } else {
            PersistError::Io {
                path: self.path.clone(),
                source,
            }
        }
    }
}

impl Backend for FileBackend {
    fn load(&self, ctx: &Context) -> Result<Project, PersistError> {
        let text = ctx
            .fs()
            .read_to_string(&self.path)
            .map_err(|e| self.io_error(e))?;
        let project = decode(&text, &self.path)?;
        debug!(path = %self.path.display(), project = %project.name, "loaded project");
        Ok(project)
    }

    fn save(&self, ctx: &Context, project: &Project) -> Result<(), PersistError> {
        let text = encode(project, self.pretty)?;
        ctx.fs()
            .write(&self.path, &text)
            .map_err(|source| PersistError::Io {
                path: self.path.clone(),
                source,
            })?;
        debug!(path = %self.path.display(), project = %project.name, "saved project");
        Ok(())
    }

    fn exists(&self, ctx: &Context) -> Result<bool, PersistError> {
        Ok(ctx.fs().exists(&self.path))
    }

    fn delete(&self, ctx: &Context) -> Result<(), PersistError> {
        ctx.fs().remove(&self.path).map_err(|e| self.io_error(e))?;
        info!(path = %self.path.display(), "deleted project state");
        Ok(())
    }
}
