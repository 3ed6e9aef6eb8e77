//! Project validation.
//!
//! Two tiers run on every call and their findings are aggregated:
//!
//! - the structural tier checks the serialized project against a built-in
//!   JSON Schema shared by every project type;
//! - the metadata tier checks each phase against its project type: declared
//!   metadata schema, allowed artifact types, and whether the phase exists.
//!
//! Nothing here stops at the first problem.

mod error;
mod schema;
mod structural;
mod validator;

pub use error::{ArtifactDirection, ValidationError};
pub use schema::{Schema, SchemaError, SchemaViolation};
pub use structural::project_schema;
pub use validator::Validator;

use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Fold a list of problems into a `Validation` that keeps all of them.
pub(crate) fn accumulate<E>(errors: Vec<E>) -> Validation<(), NonEmptyVec<E>> {
    let checks: Vec<Validation<(), NonEmptyVec<E>>> =
        errors.into_iter().map(Validation::fail).collect();
    Validation::all_vec(checks).map(|_| ())
}
