//! Cursors and iterators over the level-0 chain of a [`SkipList`].
//!
//! All of these only ever follow `forward[0]`: the higher levels are an
//! acceleration structure for searches and play no part in traversal.
//!
//! [`SkipList`]: crate::SkipList

use std::{fmt, iter::FusedIterator, ptr};

use crate::skipnode::{Arena, Link};

// ////////////////////////////////////////////////////////////////////////////
// Cursor
// ////////////////////////////////////////////////////////////////////////////

/// A forward-only position within a [`SkipList`][crate::SkipList].
///
/// A cursor either points at an element or is the *end* cursor, which lies
/// past the last element. [`SkipList::find`][crate::SkipList::find] returns the
/// end cursor when the value is absent, mirroring
/// [`SkipList::end`][crate::SkipList::end].
///
/// Two cursors compare equal if they point at the same node of the same list,
/// or if both are at the end of the same list; the values are never compared.
///
/// The cursor borrows the list, so the list cannot be modified while a cursor
/// into it is alive.
///
/// # Examples
///
/// ```
/// use skipset::SkipList;
///
/// let list: SkipList<i32> = [3, 1, 2].into();
/// let mut cursor = list.begin();
/// let mut seen = Vec::new();
/// while cursor != list.end() {
///     seen.push(*cursor.value());
///     cursor.move_next();
/// }
/// assert_eq!(seen, [1, 2, 3]);
/// ```
pub struct Cursor<'a, T> {
    arena: &'a Arena<T>,
    node: Link,
}

impl<'a, T> Cursor<'a, T> {
    pub(crate) fn new(arena: &'a Arena<T>, node: Link) -> Self {
        Cursor { arena, node }
    }

    /// Returns `true` if this is the end cursor.
    #[must_use]
    #[inline]
    pub fn is_end(&self) -> bool {
        self.node.is_none()
    }

    /// The element under the cursor, or `None` at the end.
    #[must_use]
    #[inline]
    pub fn get(&self) -> Option<&'a T> {
        let arena = self.arena;
        self.node.map(|id| &arena[id].value)
    }

    /// The element under the cursor.
    ///
    /// # Panics
    ///
    /// Panics if called on the end cursor.
    #[must_use]
    #[inline]
    pub fn value(&self) -> &'a T {
        self.get()
            .unwrap_or_else(|| panic!("Cannot dereference the end cursor"))
    }

    /// Advance to the next element in sorted order. Advancing past the last
    /// element reaches the end cursor; advancing the end cursor is a no-op.
    #[inline]
    pub fn move_next(&mut self) {
        if let Some(id) = self.node {
            self.node = self.arena[id].forward[0];
        }
    }

    /// An iterator over the elements from the cursor's position (inclusive) to
    /// the end of the list.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipList;
    ///
    /// let list: SkipList<i32> = (0..10).collect();
    /// let tail: Vec<_> = list.find(&7).iter().copied().collect();
    /// assert_eq!(tail, [7, 8, 9]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> Iter<'a, T> {
        let arena = self.arena;
        let remaining = iter_len(arena, self.node);
        Iter {
            arena,
            next: self.node,
            remaining,
        }
    }
}

fn iter_len<T>(arena: &Arena<T>, mut node: Link) -> usize {
    let mut n = 0;
    while let Some(id) = node {
        n += 1;
        node = arena[id].forward[0];
    }
    n
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> {}

impl<T> PartialEq for Cursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.arena, other.arena) && self.node == other.node
    }
}

impl<T> Eq for Cursor<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.get() {
            Some(value) => f.debug_tuple("Cursor").field(value).finish(),
            None => f.write_str("Cursor(end)"),
        }
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Iterators
// ////////////////////////////////////////////////////////////////////////////

/// Iterator by reference, in ascending order.
pub struct Iter<'a, T> {
    pub(crate) arena: &'a Arena<T>,
    pub(crate) next: Link,
    pub(crate) remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let node = &self.arena[id];
        self.next = node.forward[0];
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            arena: self.arena,
            next: self.next,
            remaining: self.remaining,
        }
    }
}

/// Consuming iterator, in ascending order.
///
/// Each node is released from the arena as it is yielded.
pub struct IntoIter<T> {
    pub(crate) arena: Arena<T>,
    pub(crate) next: Link,
    pub(crate) remaining: usize,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let id = self.next?;
        let node = self.arena.free(id);
        self.next = node.forward[0];
        self.remaining -= 1;
        Some(node.into_inner())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}
