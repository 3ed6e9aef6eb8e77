//! Macros for declaring state and event names.

/// Declare [`State`](crate::core::State) constants.
///
/// # Example
///
/// ```
/// use phaseflow::states;
///
/// states! {
///     pub PLANNING = "Planning";
///     pub REVIEWING = "Reviewing";
///     DONE = "Done";
/// }
///
/// assert_eq!(PLANNING.name(), "Planning");
/// assert_ne!(REVIEWING, DONE);
/// ```
#[macro_export]
macro_rules! states {
    (
        $(
            $(#[$meta:meta])*
            $vis:vis $name:ident = $value:literal;
        )*
    ) => {
        $(
            $(#[$meta])*
            $vis const $name: $crate::core::State = $crate::core::State::from_static($value);
        )*
    };
}

/// Declare [`Event`](crate::core::Event) constants.
///
/// # Example
///
/// ```
/// use phaseflow::events;
///
/// events! {
///     pub SUBMIT = "Submit";
///     APPROVE = "Approve";
/// }
///
/// assert_eq!(SUBMIT.to_string(), "Submit");
/// ```
#[macro_export]
macro_rules! events {
    (
        $(
            $(#[$meta:meta])*
            $vis:vis $name:ident = $value:literal;
        )*
    ) => {
        $(
            $(#[$meta])*
            $vis const $name: $crate::core::Event = $crate::core::Event::from_static($value);
        )*
    };
}
