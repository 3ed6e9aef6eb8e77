//! Name → configuration lookup for project types.
//!
//! The registry is an ordinary value: build one at startup, register every
//! project type, then share it by reference (or `Arc`). Lookups hand out
//! `Arc<Config>` so callers never hold the lock while running a machine.

use crate::builder::Config;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::info;

/// Errors raised by [`Registry`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("project type '{0}' is already registered")]
    Duplicate(String),

    #[error("project type '{0}' is not registered")]
    Unknown(String),
}

/// Project types available to this process.
#[derive(Debug, Default)]
pub struct Registry {
    configs: RwLock<BTreeMap<String, Arc<Config>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `config` under `name`.
    ///
    /// Registering a name twice is a configuration error; startup code
    /// should stop on it.
    pub fn register(&self, name: impl Into<String>, config: Config) -> Result<(), RegistryError> {
        let name = name.into();
        let mut configs = self
            .configs
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if configs.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        info!(project_type = %name, "registered project type");
        configs.insert(name, Arc::new(config));
        Ok(())
    }

    /// Chaining form of [`register`](Self::register) for startup code.
    pub fn with(self, name: impl Into<String>, config: Config) -> Result<Self, RegistryError> {
        self.register(name, config)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Config>> {
        self.configs
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(name)
            .cloned()
    }

    /// Like [`get`](Self::get), with an error naming the missing type.
    pub fn require(&self, name: &str) -> Result<Arc<Config>, RegistryError> {
        self.get(name)
            .ok_or_else(|| RegistryError::Unknown(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.configs
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn list(&self) -> Vec<String> {
        self.configs
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .keys()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ConfigBuilder;
    use crate::core::State;

    fn config(name: &str) -> Config {
        ConfigBuilder::new(name)
            .set_initial_state(State::new("Start"))
            .build()
            .unwrap()
    }

    #[test]
    fn registered_config_is_found() {
        let registry = Registry::new();
        registry.register("standard", config("standard")).unwrap();

        let found = registry.get("standard").unwrap();
        assert_eq!(found.name(), "standard");
        assert!(registry.contains("standard"));
        assert!(registry.get("exploration").is_none());
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let registry = Registry::new();
        registry.register("standard", config("standard")).unwrap();

        let err = registry.register("standard", config("other")).unwrap_err();
        assert_eq!(err, RegistryError::Duplicate("standard".into()));
        assert_eq!(registry.get("standard").unwrap().name(), "standard");
    }

    #[test]
    fn list_is_sorted() {
        let registry = Registry::new()
            .with("standard", config("standard"))
            .and_then(|r| r.with("breakdown", config("breakdown")))
            .and_then(|r| r.with("design", config("design")))
            .unwrap();

        assert_eq!(registry.list(), vec!["breakdown", "design", "standard"]);
    }

    #[test]
    fn require_names_missing_type() {
        let registry = Registry::new();
        assert_eq!(
            registry.require("ghost").unwrap_err().to_string(),
            "project type 'ghost' is not registered"
        );
    }

    #[test]
    fn registry_is_shareable_across_threads() {
        let registry = Arc::new(Registry::new());
        let handles: Vec<_> = ["a", "b", "c"]
            .into_iter()
            .map(|name| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.register(name, config(name)))
            })
            .collect();

        for handle in handles {
            handle.join().unwrap().unwrap();
        }
        assert_eq!(registry.list().len(), 3);
    }
}
