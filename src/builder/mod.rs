//! Builder API for describing project types.
//!
//! A project type is described once with [`ConfigBuilder`] and frozen into
//! an immutable [`Config`]. Branches declared with
//! [`ConfigBuilder::add_branch`] are expanded at build time into ordinary
//! transitions plus a lookup-table determiner, so nothing about them needs
//! special handling at runtime.

mod branch;
mod config;
mod config_builder;
pub mod error;
pub mod macros;
pub mod options;

pub use config::{BranchConfig, Config, PhaseConfig, TransitionConfig};
pub use config_builder::ConfigBuilder;
pub use error::BuildError;
pub use options::{BranchOptions, BranchPath, PhaseOptions, TransitionOptions};
