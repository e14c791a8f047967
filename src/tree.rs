//! An unbalanced BST used as an ordered set. Nodes are heap allocated and linked with raw
//! pointers, similar to the standard library's `BTreeMap`. Each node is reachable from exactly one
//! link and nodes keep no pointer to their parent. Operations that need a parent (deletion, cursor
//! removal) get it from the descent that found the node.
//!
//! Nothing rebalances the tree. Inserting in sorted order gives a tree shaped like a linked list,
//! so everything that walks the whole tree (`height`, `check_invariant`, `clear`, `Clone`) uses an
//! explicit stack instead of recursion.
//!
//! # Examples
//!
//! ```
//! use ordered_bst::{OrderedTree, TreeError};
//!
//! let mut tree = OrderedTree::new();
//!
//! // Nothing in here yet.
//! assert!(!tree.contains(&1));
//! assert_eq!(tree.first(), Err(TreeError::NoSuchElement));
//!
//! assert!(tree.insert(1));
//! assert!(tree.contains(&1));
//!
//! // It's a set - the second insert doesn't change anything.
//! assert!(!tree.insert(1));
//! assert_eq!(tree.len(), 1);
//!
//! assert!(tree.delete(&1));
//! assert!(!tree.contains(&1));
//! assert!(tree.is_empty());
//! ```

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ptr::{self, NonNull};

use tracing::trace;

use crate::cursor::Cursor;
use crate::error::{TreeError, TreeResult};

/// An ordered set stored in an unbalanced Binary Search Tree. Lookups, insertions, and deletions
/// take `O(height)`.
pub struct OrderedTree<T> {
    root: Link<T>,
    len: usize,
    // The links own their nodes even though they're raw pointers.
    _owns: PhantomData<Box<Node<T>>>,
}

// SAFETY: The tree owns every node uniquely, just like a `Box`, so sending or sharing the tree is
// exactly as safe as sending or sharing the `T`s inside it.
unsafe impl<T: Send> Send for OrderedTree<T> {}
// SAFETY: See above. `&OrderedTree` only hands out `&T`.
unsafe impl<T: Sync> Sync for OrderedTree<T> {}

impl<T> Default for OrderedTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for OrderedTree<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T> Clone for OrderedTree<T>
where
    T: Clone,
{
    /// Copies the tree node for node so the clone has the same shape as the original.
    fn clone(&self) -> Self {
        let mut tree = Self::new();
        let mut pending: Vec<(&Node<T>, *mut Link<T>)> = Vec::new();
        if let Some(root) = self.root() {
            pending.push((root, ptr::addr_of_mut!(tree.root)));
        }

        while let Some((source, slot)) = pending.pop() {
            let copy = Node::new_leaked(source.value.clone());
            // SAFETY: `slot` is either `tree.root` or a child link of a node allocated earlier in
            // this loop. Each slot is pushed once so it's written once, and nothing else holds a
            // reference into `tree` while we write.
            unsafe {
                (*slot).0 = Some(copy);
                if let Some(left) = source.left() {
                    pending.push((left, ptr::addr_of_mut!((*copy.as_ptr()).left)));
                }
                if let Some(right) = source.right() {
                    pending.push((right, ptr::addr_of_mut!((*copy.as_ptr()).right)));
                }
            }
        }

        tree.len = self.len;
        tree
    }
}

impl<T> fmt::Debug for OrderedTree<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T> PartialEq for OrderedTree<T>
where
    T: PartialEq,
{
    /// Two trees are equal when they hold the same elements, whatever their shapes.
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T> Eq for OrderedTree<T> where T: Eq {}

impl<T> FromIterator<T> for OrderedTree<T>
where
    T: Ord,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<T> Extend<T> for OrderedTree<T>
where
    T: Ord,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T> IntoIterator for &'a OrderedTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> OrderedTree<T> {
    /// Generate a new, empty `OrderedTree`.
    pub fn new() -> Self {
        Self {
            root: Link(None),
            len: 0,
            _owns: PhantomData,
        }
    }

    /// The number of elements in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree has no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if the tree contains an element equal to `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_bst::OrderedTree;
    ///
    /// let tree: OrderedTree<String> = ["b", "a"].iter().map(|s| s.to_string()).collect();
    ///
    /// assert!(tree.contains("a"));
    /// assert!(!tree.contains("c"));
    /// ```
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.search(value)
            .map_or(false, |found| found.ordering == Ordering::Equal)
    }

    /// Adds `value` to the tree as a new leaf. Returns `false`, leaving the tree untouched, if an
    /// equal element was already present.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_bst::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    ///
    /// assert!(tree.insert(2));
    /// assert!(!tree.insert(2));
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn insert(&mut self, value: T) -> bool
    where
        T: Ord,
    {
        let position = match self.search(&value) {
            None => Position::root(),
            Some(found) => match found.ordering {
                Ordering::Equal => return false,
                Ordering::Less => Position::child_of(found.node, Side::Left),
                Ordering::Greater => Position::child_of(found.node, Side::Right),
            },
        };

        let new_node = Node::new_leaked(value);
        // SAFETY: `search` just produced this position from live nodes and nothing else
        // references the tree while we hold `&mut self`.
        let slot = unsafe { self.slot_mut(position) };
        assert!(slot.0.is_none(), "Search stopped at an occupied slot");
        slot.0 = Some(new_node);
        self.len += 1;
        trace!(
            len = self.len,
            side = ?position.side,
            at_root = position.parent.0.is_none(),
            "inserted value"
        );

        if cfg!(debug_assertions) {
            if let Some(parent) = position.parent.get() {
                // SAFETY: We just allocated this node and only read from it.
                let new_value = unsafe { &new_node.as_ref().value };
                match position.side {
                    Side::Left => assert!(*new_value < parent.value),
                    Side::Right => assert!(*new_value > parent.value),
                }
            }
        }

        true
    }

    /// Removes the element equal to `value`. Returns `false` if there was no such element.
    ///
    /// Deleting never makes the tree taller.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_bst::OrderedTree;
    ///
    /// let mut tree: OrderedTree<_> = [5, 2, 8].into_iter().collect();
    ///
    /// assert!(tree.delete(&5));
    /// assert!(!tree.delete(&5));
    /// assert_eq!(tree.iter().collect::<Vec<_>>(), [&2, &8]);
    /// ```
    pub fn delete<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        self.take(value).is_some()
    }

    /// Removes the element equal to `value` and hands it back.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_bst::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.insert(String::from("kept"));
    ///
    /// assert_eq!(tree.take("kept"), Some(String::from("kept")));
    /// assert_eq!(tree.take("kept"), None);
    /// ```
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        let found = self.search(value)?;
        if found.ordering != Ordering::Equal {
            return None;
        }

        // SAFETY: `found` came from `search` on this tree and nothing has changed since.
        Some(unsafe { self.unlink(found.node, found.position) }.value)
    }

    /// The number of nodes on the longest path from the root to a leaf. An empty tree has a
    /// height of 0. This visits every node.
    pub fn height(&self) -> usize {
        let mut tallest = 0;
        let mut pending: Vec<(&Node<T>, usize)> =
            self.root().map(|root| (root, 1)).into_iter().collect();

        while let Some((node, depth)) = pending.pop() {
            tallest = tallest.max(depth);
            pending.extend(node.left().map(|left| (left, depth + 1)));
            pending.extend(node.right().map(|right| (right, depth + 1)));
        }

        tallest
    }

    /// Verifies the BST invariant: every value in a node's left subtree is strictly smaller than
    /// the node's value, and every value in its right subtree is strictly larger.
    pub fn check_invariant(&self) -> bool
    where
        T: Ord,
    {
        // Each node is checked against the tightest bounds its ancestors impose, not just its
        // parent.
        let mut pending: Vec<(&Node<T>, Option<&T>, Option<&T>)> =
            self.root().map(|root| (root, None, None)).into_iter().collect();

        while let Some((node, lower, upper)) = pending.pop() {
            let above_lower = lower.map_or(true, |lower| node.value > *lower);
            let below_upper = upper.map_or(true, |upper| node.value < *upper);
            if !above_lower || !below_upper {
                return false;
            }

            pending.extend(node.left().map(|left| (left, lower, Some(&node.value))));
            pending.extend(node.right().map(|right| (right, Some(&node.value), upper)));
        }

        true
    }

    /// The smallest element.
    ///
    /// # Errors
    ///
    /// [`TreeError::NoSuchElement`] if the tree is empty.
    pub fn first(&self) -> TreeResult<&T> {
        let mut node = self.root().ok_or(TreeError::NoSuchElement)?;
        while let Some(left) = node.left() {
            node = left;
        }
        Ok(&node.value)
    }

    /// The largest element.
    ///
    /// # Errors
    ///
    /// [`TreeError::NoSuchElement`] if the tree is empty.
    pub fn last(&self) -> TreeResult<&T> {
        let mut node = self.root().ok_or(TreeError::NoSuchElement)?;
        while let Some(right) = node.right() {
            node = right;
        }
        Ok(&node.value)
    }

    /// Opens a [`Cursor`] positioned before the smallest element. The cursor walks the tree in
    /// ascending order and can remove the element it yielded last.
    pub fn cursor(&mut self) -> Cursor<'_, T>
    where
        T: Ord,
    {
        Cursor::new(self)
    }

    /// An iterator over the elements in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Keeps only the elements for which `keep` returns `true`, visiting them in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_bst::OrderedTree;
    ///
    /// let mut tree: OrderedTree<_> = (1..=6).collect();
    /// tree.retain(|x| x % 2 == 0);
    ///
    /// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [2, 4, 6]);
    /// ```
    pub fn retain<F>(&mut self, mut keep: F)
    where
        T: Ord,
        F: FnMut(&T) -> bool,
    {
        let mut cursor = self.cursor();
        while let Ok(value) = cursor.next() {
            if !keep(value) {
                let removed = cursor.remove();
                debug_assert!(removed.is_ok(), "`next` succeeded so `remove` must");
            }
        }
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        let mut pending: Vec<NonNull<Node<T>>> = self.root.take().0.into_iter().collect();
        while let Some(node) = pending.pop() {
            // SAFETY: Every node was allocated by `Node::new_leaked` and is reachable from exactly
            // one link. We detached the root above so each node is reclaimed exactly once.
            let node = unsafe { Box::from_raw(node.as_ptr()) };
            pending.extend(node.left.0);
            pending.extend(node.right.0);
        }

        if self.len > 0 {
            trace!(len = self.len, "cleared tree");
        }
        self.len = 0;
    }

    pub(crate) fn root_link(&self) -> Link<T> {
        self.root
    }

    fn root(&self) -> Option<&Node<T>> {
        self.root.get()
    }

    /// Descends from the root toward `value`. Returns `None` for an empty tree. Otherwise returns
    /// the closest node: either the node equal to `value`, or the node whose missing child is
    /// where `value` would be inserted. `ordering` says which.
    fn search<Q>(&self, value: &Q) -> Option<Found<T>>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut node = self.root.0?;
        let mut position = Position::root();

        loop {
            // SAFETY: Links in the tree point at live nodes and `&self` rules out mutation.
            let current = unsafe { node.as_ref() };
            let ordering = value.cmp(current.value.borrow());
            let side = match ordering {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => break Some(Found { node, position, ordering }),
            };

            match current.child(side).0 {
                Some(child) => {
                    position = Position::child_of(node, side);
                    node = child;
                }
                None => break Some(Found { node, position, ordering }),
            }
        }
    }

    /// Returns the link that `position` names: the root link or one of a node's child links.
    ///
    /// # Safety
    ///
    /// `position.parent`, if set, must point at a live node of this tree and no other reference
    /// into that node may be alive while the returned one is.
    unsafe fn slot_mut(&mut self, position: Position<T>) -> &mut Link<T> {
        match position.parent.0 {
            None => &mut self.root,
            Some(parent) => {
                let parent = &mut *parent.as_ptr();
                match position.side {
                    Side::Left => &mut parent.left,
                    Side::Right => &mut parent.right,
                }
            }
        }
    }

    /// Removes `node` from the tree, frees it, and returns its value together with the node that
    /// now occupies its slot.
    ///
    /// With two children, the largest node of the left subtree is detached (its parent adopts its
    /// left child) and moved into `node`'s slot, adopting both of `node`'s children. Only the left
    /// subtree loses a node, so the tree can't get taller.
    ///
    /// # Safety
    ///
    /// `node` must be a live node of this tree that currently hangs at `position`, and no
    /// references into the tree may be alive.
    pub(crate) unsafe fn unlink(
        &mut self,
        node: NonNull<Node<T>>,
        position: Position<T>,
    ) -> Unlinked<T>
    where
        T: Ord,
    {
        let height_before = if cfg!(test) { self.height() } else { 0 };

        let target = node.as_ptr();
        let replacement = match ((*target).left.0, (*target).right.0) {
            (None, None) => {
                trace!(case = "leaf", "unlinking node");
                Link(None)
            }
            (Some(child), None) | (None, Some(child)) => {
                trace!(case = "splice", "unlinking node");
                Link(Some(child))
            }
            (Some(left), Some(_)) => {
                let mut max = left;
                let mut max_position = Position::child_of(node, Side::Left);
                while let Some(right) = (*max.as_ptr()).right.0 {
                    max_position = Position::child_of(max, Side::Right);
                    max = right;
                }

                // `max` has no right child so its left child takes its place.
                let max_left = (*max.as_ptr()).left.take();
                *self.slot_mut(max_position) = max_left;

                (*max.as_ptr()).left = (*target).left.take();
                (*max.as_ptr()).right = (*target).right.take();
                trace!(
                    case = "predecessor",
                    from_left_child = max_position.parent.is(node),
                    "unlinking node"
                );
                Link(Some(max))
            }
        };

        *self.slot_mut(position) = replacement;
        self.len -= 1;

        let Node { value, .. } = *Box::from_raw(target);

        // In tests, make sure every deletion leaves a valid tree that isn't any taller.
        if cfg!(test) {
            assert!(self.check_invariant());
            assert_eq!(self.iter().count(), self.len);
            assert!(self.height() <= height_before);
        }

        Unlinked { value, replacement }
    }
}

/// What [`OrderedTree::unlink`] leaves behind.
pub(crate) struct Unlinked<T> {
    /// The removed element.
    pub(crate) value: T,
    /// The node now sitting where the removed node was, if any.
    pub(crate) replacement: Link<T>,
}

/// Where [`OrderedTree::search`] stopped.
struct Found<T> {
    node: NonNull<Node<T>>,
    position: Position<T>,
    /// How the searched value compares to `node`'s value.
    ordering: Ordering,
}

/// Which child link of a parent a node hangs from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

/// Where a node hangs in the tree: under `parent` on `side`, or in the root slot when `parent` is
/// empty (the side is ignored then).
pub(crate) struct Position<T> {
    pub(crate) parent: Link<T>,
    pub(crate) side: Side,
}

impl<T> Clone for Position<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Position<T> {}

impl<T> Position<T> {
    pub(crate) fn root() -> Self {
        Self {
            parent: Link(None),
            side: Side::Left,
        }
    }

    pub(crate) fn child_of(parent: NonNull<Node<T>>, side: Side) -> Self {
        Self {
            parent: Link(Some(parent)),
            side,
        }
    }
}

pub(crate) struct Link<T>(pub(crate) Option<NonNull<Node<T>>>);

impl<T> Clone for Link<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Link<T> {}

impl<T> Link<T> {
    pub(crate) fn get(&self) -> Option<&Node<T>> {
        // SAFETY: A non-empty link always points at a live node owned by the tree. Mutation goes
        // through `&mut OrderedTree` (or a cursor holding it) so no `&mut Node` can coexist with
        // the returned reference.
        unsafe { self.0.as_ref().map(|ptr| ptr.as_ref()) }
    }

    fn take(&mut self) -> Self {
        Link(self.0.take())
    }

    /// Whether this link points at `node`.
    pub(crate) fn is(&self, node: NonNull<Node<T>>) -> bool {
        self.0 == Some(node)
    }
}

pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) left: Link<T>,
    pub(crate) right: Link<T>,
}

impl<T> Node<T> {
    /// Allocates a childless node. The tree is responsible for freeing it.
    fn new_leaked(value: T) -> NonNull<Self> {
        NonNull::from(Box::leak(Box::new(Node {
            value,
            left: Link(None),
            right: Link(None),
        })))
    }

    fn left(&self) -> Option<&Self> {
        self.left.get()
    }

    fn right(&self) -> Option<&Self> {
        self.right.get()
    }

    fn child(&self, side: Side) -> Link<T> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }
}

/// An iterator over the elements of an [`OrderedTree`] in ascending order, created by
/// [`OrderedTree::iter`].
pub struct Iter<'a, T> {
    /// The top is the next node to yield. Below it are the ancestors still waiting to be visited.
    pending: Vec<&'a Node<T>>,
    remaining: usize,
}

impl<'a, T> Clone for Iter<'a, T> {
    fn clone(&self) -> Self {
        Self {
            pending: self.pending.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, T> Iter<'a, T> {
    fn new(tree: &'a OrderedTree<T>) -> Self {
        let mut iter = Self {
            pending: Vec::new(),
            remaining: tree.len,
        };
        iter.push_left_spine(tree.root());
        iter
    }

    fn push_left_spine(&mut self, mut node: Option<&'a Node<T>>) {
        while let Some(current) = node {
            self.pending.push(current);
            node = current.left();
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.pending.pop()?;
        self.push_left_spine(node.right());
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

impl<'a, T> FusedIterator for Iter<'a, T> {}
