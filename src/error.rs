//! Error types.
//!
//! Two families live here:
//!
//! - [`Error`] - contract violations reported straight back to the caller
//!   (bad grid sizes, out-of-range overrides, storage type mismatches).
//! - [`VetoError`] - a vetoable list refused a proposed mutation.
//!
//! Failures inside user callbacks never surface as either of these; they are
//! logged and swallowed at the call site (see [`crate::callback`]).

use thiserror::Error;

/// Errors returned by fallible operations on the scene graph and displays.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A chest display was asked for a row count outside `1..=6`.
    #[error("chest rows must be between 1 and 6, got {rows}")]
    InvalidRows { rows: usize },

    /// Row changes are only supported on chest displays.
    #[error("display kind {kind} has a fixed row count")]
    FixedRows { kind: &'static str },

    /// A cell coordinate fell outside the display grid.
    #[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
    CellOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// A composite-only operation was invoked on an item node.
    #[error("operation requires a composite node")]
    NotComposite,

    /// A child list refused the mutation.
    #[error(transparent)]
    Vetoed(#[from] VetoError),

    /// A storage slot was accessed with a type other than the registered one.
    #[error("storage slot '{id}' holds {expected}, not {requested}")]
    StorageType {
        id: String,
        expected: &'static str,
        requested: &'static str,
    },

    /// A storage slot was accessed before being registered.
    #[error("storage slot '{id}' is not registered")]
    StorageMissing { id: String },
}

/// Rejection raised by a [`VetoableList`](crate::collections::VetoableList) hook.
///
/// The list is left untouched when this is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VetoError {
    /// The same node would appear twice in one child list.
    #[error("duplicate child added")]
    DuplicateChild,

    /// The node would become its own ancestor.
    #[error("cycle detected: a node cannot contain itself or one of its ancestors")]
    Cycle,

    /// Free-form rejection from a user-supplied hook.
    #[error("change rejected: {0}")]
    Rejected(String),
}

/// Convenience alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
