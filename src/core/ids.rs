//! Opaque identifiers for machine states and events.
//!
//! States and events are plain names. They are cheap to clone and can be
//! declared as `const`s with [`states!`](crate::states) and
//! [`events!`](crate::events), so a project type reads as a list of names
//! rather than an enum that every consumer must match on.

use serde::{Deserialize, Serialize};
use std::borrow::{Borrow, Cow};
use std::fmt;

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Cow<'static, str>);

        impl $name {
            /// Create an identifier from any string.
            pub fn new(name: impl Into<String>) -> Self {
                Self(Cow::Owned(name.into()))
            }

            /// Create an identifier from a static string, usable in `const` items.
            pub const fn from_static(name: &'static str) -> Self {
                Self(Cow::Borrowed(name))
            }

            /// The identifier's name.
            pub fn name(&self) -> &str {
                &self.0
            }

            /// True for the empty identifier, used for "not yet set".
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), &*self.0)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self::new(name)
            }
        }

        impl From<String> for $name {
            fn from(name: String) -> Self {
                Self::new(name)
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                &*self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                &*self.0 == *other
            }
        }
    };
}

identifier!(
    /// A position in a project lifecycle, e.g. `ImplementationPlanning`.
    State
);

identifier!(
    /// A named trigger that moves a machine out of a state, e.g. `SubmitForReview`.
    Event
);

impl Default for State {
    fn default() -> Self {
        Self::from_static("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DRAFTING: State = State::from_static("Drafting");

    #[test]
    fn const_and_owned_states_compare_equal() {
        assert_eq!(DRAFTING, State::new("Drafting"));
        assert_eq!(DRAFTING, "Drafting");
        assert_ne!(DRAFTING, State::from("Approved"));
    }

    #[test]
    fn state_serializes_as_plain_string() {
        let json = serde_json::to_string(&DRAFTING).unwrap();
        assert_eq!(json, "\"Drafting\"");

        let back: State = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DRAFTING);
    }

    #[test]
    fn default_state_is_empty() {
        assert!(State::default().is_empty());
        assert!(!DRAFTING.is_empty());
    }

    #[test]
    fn debug_names_the_kind() {
        assert_eq!(format!("{:?}", Event::new("Approve")), "Event(\"Approve\")");
        assert_eq!(DRAFTING.to_string(), "Drafting");
    }
}
