//! This crate exposes an ordered set built on a plain, unbalanced Binary Search Tree (BST),
//! together with a cursor that can delete elements while walking them in order.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert, find, and delete stored records. BSTs are typically defined
//! recursively using the notion of a `Node`. A `Node` will typically store
//! some sort of value (the value that was inserted, for example) and will
//! sometimes have child `Node`s. The most important invariants of a BST are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have a
//!    value less than its own value.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree have a
//!    value greater than its own value.
//!
//! > Note that some `Node`s have no children. These `Node`s are called "leaf nodes".
//!
//! Searching for values in the tree takes `O(height)` (where `height` is the number of `Node`s on
//! the longest path from the root `Node` to a leaf `Node`). This tree never rebalances, so the
//! height depends on insertion order: inserting in sorted order gives a height of `N`. Deleting,
//! however, never makes the tree taller. A `Node` with two children is replaced by its
//! predecessor (the largest `Node` of its left subtree), which is moved up rather than copied.
//!
//! ## Cursors
//!
//! [`OrderedTree::iter`] visits values in ascending order by visiting the left subtree, then the
//! subtree root, then the right subtree. [`OrderedTree::cursor`] does the same walk but can also
//! remove the value it yielded last (see [`Cursor`]).

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod cursor;
pub mod error;
pub mod tree;

pub use cursor::Cursor;
pub use error::{TreeError, TreeResult};
pub use tree::{Iter, OrderedTree};
