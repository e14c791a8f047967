//! A traversal over an [`OrderedTree`] that can delete as it goes.
//!
//! A [`Cursor`] walks the tree in ascending order with an explicit stack of nodes still to visit.
//! Each stacked node remembers where it hangs in the tree (its parent and side), so
//! [`Cursor::remove`] can unlink the element it yielded last without searching from the root
//! again.
//!
//! # Examples
//!
//! ```
//! use ordered_bst::{OrderedTree, TreeError};
//!
//! let mut tree: OrderedTree<_> = [5, 2, 8, 1, 3, 7, 9].into_iter().collect();
//!
//! let mut cursor = tree.cursor();
//! assert_eq!(cursor.next(), Ok(&1));
//! assert_eq!(cursor.next(), Ok(&2));
//! assert_eq!(cursor.next(), Ok(&3));
//!
//! // Removes 3, the element yielded last.
//! assert_eq!(cursor.remove(), Ok(3));
//! // Nothing left to remove until `next` is called again.
//! assert_eq!(cursor.remove(), Err(TreeError::InvalidState));
//!
//! assert_eq!(cursor.next(), Ok(&5));
//!
//! assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 2, 5, 7, 8, 9]);
//! ```

use std::ptr::NonNull;

use tracing::trace;

use crate::error::{TreeError, TreeResult};
use crate::tree::{Link, Node, OrderedTree, Position, Side};

/// An in-order cursor over an [`OrderedTree`], created by [`OrderedTree::cursor`].
///
/// The cursor mutably borrows its tree, so the tree can only change through
/// [`Cursor::remove`] while the cursor is alive. It can't be rewound. Open a new one to walk the
/// tree again.
pub struct Cursor<'a, T> {
    tree: &'a mut OrderedTree<T>,
    /// The top is the next node to yield. Below it are the ancestors still waiting to be visited.
    pending: Vec<Frame<T>>,
    /// The frame yielded by the latest `next`, until it is removed.
    last: Option<Frame<T>>,
}

/// A node and where it hangs in the tree.
struct Frame<T> {
    node: NonNull<Node<T>>,
    position: Position<T>,
}

impl<T> Clone for Frame<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Frame<T> {}

impl<'a, T> Cursor<'a, T>
where
    T: Ord,
{
    pub(crate) fn new(tree: &'a mut OrderedTree<T>) -> Self {
        let root = tree.root_link();
        let mut cursor = Self {
            tree,
            pending: Vec::new(),
            last: None,
        };
        cursor.push_left_spine(root, Position::root());
        cursor
    }

    /// Pushes `link` and all of its left descendants. `position` is where `link` itself hangs.
    fn push_left_spine(&mut self, mut link: Link<T>, mut position: Position<T>) {
        while let Some(node) = link.0 {
            self.pending.push(Frame { node, position });
            position = Position::child_of(node, Side::Left);
            // SAFETY: Links in the tree point at live nodes and the cursor holds the tree's only
            // borrow.
            link = unsafe { node.as_ref() }.left;
        }
    }

    /// Whether [`Cursor::next`] would yield another element.
    pub fn has_next(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Yields the next element in ascending order.
    ///
    /// # Errors
    ///
    /// [`TreeError::Exhausted`] once every element has been yielded.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> TreeResult<&T> {
        let frame = self.pending.pop().ok_or(TreeError::Exhausted)?;

        // SAFETY: Stacked nodes are live: the only removals since they were pushed went through
        // `remove`, which never frees a pending node.
        let right = unsafe { frame.node.as_ref() }.right;
        self.push_left_spine(right, Position::child_of(frame.node, Side::Right));
        self.last = Some(frame);

        // SAFETY: The node stays alive until `remove`, which takes `&mut self` and so can't run
        // while the returned reference is held.
        Ok(unsafe { &(*frame.node.as_ptr()).value })
    }

    /// Removes the element yielded by the latest [`Cursor::next`] from the tree and returns it.
    /// Traversal carries on with the next larger element.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidState`] if `next` hasn't been called yet, or if its element was
    /// already removed.
    pub fn remove(&mut self) -> TreeResult<T> {
        let removed = self.last.take().ok_or(TreeError::InvalidState)?;

        // SAFETY: `removed` was captured by `next` and its position is still accurate: the only
        // mutations since then are earlier removals, which patch every affected frame below.
        let unlinked = unsafe { self.tree.unlink(removed.node, removed.position) };

        // The only pending node that can hang under the removed one is its right child. It now
        // hangs either where the removed node was (when it was spliced up) or under the relinked
        // predecessor.
        let mut rebuilt = 0;
        for frame in self
            .pending
            .iter_mut()
            .filter(|frame| frame.position.parent.is(removed.node))
        {
            frame.position = match unlinked.replacement.0 {
                Some(replacement) if replacement == frame.node => removed.position,
                Some(replacement) => Position::child_of(replacement, frame.position.side),
                None => unreachable!("A node with a pending child always leaves a replacement"),
            };
            rebuilt += 1;
        }

        trace!(
            rebuilt,
            pending = self.pending.len(),
            len = self.tree.len(),
            "removed through cursor"
        );
        Ok(unlinked.value)
    }
}
