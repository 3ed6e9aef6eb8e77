//! Ambient settings for persistence.
//!
//! Settings come from an optional TOML file:
//!
//! ```toml
//! state_path = ".phaseflow/project/state.json"
//! pretty = true
//! ```
//!
//! `PHASEFLOW_STATE_PATH` overrides `state_path` when set.

use crate::persistence::DEFAULT_STATE_PATH;
use serde::Deserialize;
use std::env;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Environment variable overriding [`Settings::state_path`].
pub const STATE_PATH_ENV: &str = "PHASEFLOW_STATE_PATH";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Location of the state document relative to the project root.
    pub state_path: PathBuf,
    /// Pretty-print the state document.
    pub pretty: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            pretty: true,
        }
    }
}

impl Settings {
    pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(source)?)
    }

    /// Read settings from `path`, falling back to defaults when the file
    /// does not exist, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let settings = match std::fs::read_to_string(path) {
            Ok(source) => Self::from_toml_str(&source)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file, using defaults");
                Self::default()
            }
            Err(source) => {
                return Err(SettingsError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Ok(settings.with_env_overrides(|key| env::var(key).ok()))
    }

    /// Apply overrides looked up through `lookup`.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(STATE_PATH_ENV) {
            Some(value) if !value.trim().is_empty() => {
                debug!(state_path = %value, "state path overridden from environment");
                self.state_path = PathBuf::from(value);
            }
            Some(_) => warn!("{STATE_PATH_ENV} is set but empty; ignoring"),
            None => {}
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        assert_eq!(Settings::from_toml_str("").unwrap(), Settings::default());
    }

    #[test]
    fn fields_are_read() {
        let settings = Settings::from_toml_str(
            r#"
            state_path = "state/project.json"
            pretty = false
            "#,
        )
        .unwrap();
        assert_eq!(settings.state_path, PathBuf::from("state/project.json"));
        assert!(!settings.pretty);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            Settings::from_toml_str("colour = \"blue\""),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(dir.path().join("phaseflow.toml")).unwrap();
        assert!(settings.pretty);
    }

    #[test]
    fn env_override_replaces_state_path() {
        let settings = Settings::default().with_env_overrides(|key| {
            (key == STATE_PATH_ENV).then(|| "/tmp/elsewhere.json".to_string())
        });
        assert_eq!(settings.state_path, PathBuf::from("/tmp/elsewhere.json"));

        let untouched = Settings::default().with_env_overrides(|_| Some("  ".to_string()));
        assert_eq!(untouched, Settings::default());
    }
}
