//! Failures reported by [`OrderedTree`][crate::OrderedTree] queries and by
//! [`Cursor`][crate::Cursor].

use thiserror::Error;

/// The ways a tree query or cursor step can fail. None of these indicate
/// corruption; each one is a well-defined empty/exhausted condition or a
/// misuse of the cursor protocol.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    /// `first`/`last` was asked of an empty tree.
    #[error("no such element: the tree is empty")]
    NoSuchElement,

    /// `Cursor::next` was called after every element had been yielded.
    #[error("cursor exhausted: every element has already been yielded")]
    Exhausted,

    /// `Cursor::remove` was called without a preceding `Cursor::next`, or
    /// twice for the same element.
    #[error("invalid cursor state: `remove` must follow a call to `next`")]
    InvalidState,
}

/// Shorthand for results carrying a [`TreeError`].
pub type TreeResult<T> = Result<T, TreeError>;
