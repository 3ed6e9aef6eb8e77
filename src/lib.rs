//! Phaseflow: declarative state machines for multi-phase project lifecycles
//!
//! A *project type* is described once with [`ConfigBuilder`]: its phases,
//! states, transitions (optionally guarded, with entry and exit actions),
//! branches that pick the next event from project data, and guidance
//! prompts. The frozen [`Config`] is registered in a [`Registry`] under the
//! type's name and then bound to concrete projects as a [`Machine`].
//!
//! # Core Concepts
//!
//! - **Project**: the mutable document moving through the lifecycle
//! - **Guards**: pure predicates over the project that gate transitions
//! - **Branches**: a discriminator value selecting among transitions
//! - **Advance**: discovery, dry-run, explicit and automatic transitions,
//!   each committed transition saved through a [`Store`]
//! - **Validation**: structural and per-phase checks, aggregated
//!
//! # Example
//!
//! ```rust
//! use phaseflow::persistence::{Context, MemoryBackend, MemoryFs, Store};
//! use phaseflow::{advance, events, states, AdvanceOutcome, AdvanceRequest, ConfigBuilder};
//! use std::sync::Arc;
//!
//! states! {
//!     DRAFTING = "Drafting";
//!     APPROVED = "Approved";
//! }
//! events! {
//!     APPROVE = "Approve";
//!     REVISE = "Revise";
//! }
//!
//! let config = ConfigBuilder::new("review")
//!     .set_initial_state(DRAFTING)
//!     .with_phase("draft", |p| p.start_state(DRAFTING))
//!     .add_branch(DRAFTING, |b| {
//!         b.discriminator(|project| {
//!             project
//!                 .phase("draft")
//!                 .and_then(|p| p.meta_str("outcome"))
//!                 .unwrap_or_default()
//!                 .to_string()
//!         })
//!         .when("approved", APPROVE, APPROVED)
//!         .when("rejected", REVISE, DRAFTING)
//!     })
//!     .build()
//!     .unwrap();
//!
//! let store = Store::new(MemoryBackend::new(), Context::new(Arc::new(MemoryFs::new())));
//! let mut project = config.new_project("widget", "").unwrap();
//! project.phase_mut("draft").unwrap().set_meta("outcome", "approved");
//!
//! let outcome = advance(&config, &mut project, &store, AdvanceRequest::Auto).unwrap();
//! assert!(matches!(outcome, AdvanceOutcome::Advanced { .. }));
//! assert_eq!(project.current_state(), &APPROVED);
//! ```

pub mod builder;
pub mod core;
pub mod guards;
pub mod machine;
pub mod persistence;
pub mod registry;
pub mod settings;
pub mod validation;

// Re-export commonly used types
pub use builder::{BuildError, Config, ConfigBuilder};
pub use crate::core::{Event, Guard, Project, State};
pub use machine::{advance, AdvanceError, AdvanceOutcome, AdvanceRequest, ErrorKind, Machine};
pub use persistence::{Backend, FileBackend, Store};
pub use registry::{Registry, RegistryError};
pub use settings::Settings;
pub use validation::{ValidationError, Validator};
