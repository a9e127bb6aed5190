//! An always-sorted skiplist with set semantics.

use std::{borrow::Borrow, cmp, cmp::Ordering, fmt, hash, hash::Hash, iter, mem};

use crate::{
    iter::{Cursor, IntoIter, Iter},
    level_generator::{CoinFlip, DEFAULT_MAX_LEVEL, LevelError, LevelGenerator, MAX_LEVEL_LIMIT},
    skipnode::{Arena, Link, NodeId, SkipNode},
};

/// Predecessor frontier: for each level, the last node visited before the
/// search dropped to the level below. `None` stands for the head.
type Frontier = [Link; MAX_LEVEL_LIMIT];

// ////////////////////////////////////////////////////////////////////////////
// SkipList
// ////////////////////////////////////////////////////////////////////////////

/// The skiplist provides a way of storing elements such that they are always
/// sorted and at the same time provides efficient way to access, insert and
/// remove nodes.
///
/// Elements are kept unique: inserting a value equal to one already present
/// leaves the list untouched (see [`insert`][SkipList::insert] and
/// [`replace`][SkipList::replace]).
///
/// The ordering is `T`'s [`Ord`] implementation, which **must** be
/// well-behaved: consistent across calls, anti-symmetric and transitive.
/// Failure to satisfy these properties results in elements that cannot be
/// found or removed, though never in memory unsafety.
///
/// Node heights are drawn from a [`LevelGenerator`] owned by the list; the
/// default is a fair [`CoinFlip`] over [`DEFAULT_MAX_LEVEL`] levels.
///
/// # Examples
///
/// ```
/// use skipset::SkipList;
///
/// let mut list = SkipList::new();
/// for x in [3, 1, 4, 1, 5, 9, 2, 6] {
///     list.insert(x);
/// }
/// assert_eq!(list.len(), 7);
/// assert_eq!(list.iter().copied().collect::<Vec<_>>(), [1, 2, 3, 4, 5, 6, 9]);
/// assert!(list.find(&7).is_end());
/// ```
pub struct SkipList<T, G = CoinFlip> {
    // First node at each level; the length is the maximum level.
    heads: Box<[Link]>,
    nodes: Arena<T>,
    len: usize,
    // Number of levels currently holding at least one node. Searches start
    // here rather than at the top of `heads`.
    height: usize,
    level_generator: G,
}

// ///////////////////////////////////////////////
// Inherent methods
// ///////////////////////////////////////////////

impl<T> SkipList<T> {
    /// Create a new skiplist with the default number of 20 levels.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipList;
    ///
    /// let mut skiplist: SkipList<i64> = SkipList::new();
    /// assert_eq!(skiplist.max_level(), 20);
    /// ```
    #[must_use]
    #[inline]
    #[expect(
        clippy::expect_used,
        reason = "The default level count is always a valid level count"
    )]
    pub fn new() -> Self {
        let lg = CoinFlip::new(DEFAULT_MAX_LEVEL).expect("Default level count is valid");
        SkipList::with_level_generator(lg)
    }

    /// Create a new skiplist whose nodes never exceed `max_level` levels.
    ///
    /// # Errors
    ///
    /// Fails if `max_level` is zero or greater than
    /// [`MAX_LEVEL_LIMIT`][crate::level_generator::MAX_LEVEL_LIMIT].
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipList;
    ///
    /// let skiplist = SkipList::<u8>::with_max_level(8).unwrap();
    /// assert_eq!(skiplist.max_level(), 8);
    /// assert!(SkipList::<u8>::with_max_level(0).is_err());
    /// ```
    #[inline]
    pub fn with_max_level(max_level: usize) -> Result<Self, LevelError> {
        Ok(SkipList::with_level_generator(CoinFlip::new(max_level)?))
    }
}

impl<T, G> SkipList<T, G>
where
    G: LevelGenerator,
{
    /// Create a new skiplist using the given level generator. The maximum
    /// level is the generator's [`total`][LevelGenerator::total], clamped to
    /// `[1, MAX_LEVEL_LIMIT]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::{Geometric, SkipList};
    ///
    /// let lg = Geometric::with_seed(12, 0.25, 42).unwrap();
    /// let mut skiplist = SkipList::with_level_generator(lg);
    /// skiplist.extend(0..100);
    /// assert_eq!(skiplist.max_level(), 12);
    /// ```
    #[inline]
    pub fn with_level_generator(level_generator: G) -> Self {
        SkipList {
            // Level 0 must exist even if the generator claims no levels, and
            // no search frontier holds more than MAX_LEVEL_LIMIT entries.
            heads: vec![None; level_generator.total().clamp(1, MAX_LEVEL_LIMIT)]
                .into_boxed_slice(),
            nodes: Arena::new(),
            len: 0,
            height: 0,
            level_generator,
        }
    }

    /// Move every element out into a new skiplist, leaving `self` empty.
    ///
    /// The returned list takes over the nodes and the level generator. `self`
    /// keeps its maximum level and receives a freshly seeded generator, so it
    /// can be used again straight away.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipList;
    ///
    /// let mut a: SkipList<i32> = (0..10).collect();
    /// let b = a.take_all();
    /// assert_eq!(b.len(), 10);
    /// assert!(a.is_empty());
    ///
    /// a.insert(3);
    /// assert_eq!(a.len(), 1);
    /// ```
    #[must_use = "The taken elements are dropped if unused; use `clear` instead"]
    pub fn take_all(&mut self) -> Self {
        let fresh = SkipList::with_level_generator(self.level_generator.fork());
        mem::replace(self, fresh)
    }
}

impl<T, G> SkipList<T, G> {
    /// Clears the skiplist, removing all values.
    ///
    /// Nodes are released one at a time along the bottom level. Calling this
    /// on an empty list does nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipList;
    ///
    /// let mut skiplist = SkipList::new();
    /// skiplist.extend(0..10);
    /// skiplist.clear();
    /// assert!(skiplist.is_empty());
    /// skiplist.clear();
    /// ```
    pub fn clear(&mut self) {
        let mut next = self.heads[0];
        while let Some(id) = next {
            next = self.nodes.free(id).forward[0];
        }
        self.nodes.reset();
        self.heads.fill(None);
        self.len = 0;
        self.height = 0;
    }

    /// Returns the number of elements in the skiplist.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipList;
    ///
    /// let mut skiplist = SkipList::new();
    /// skiplist.extend(0..10);
    /// assert_eq!(skiplist.len(), 10);
    /// ```
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the skiplist contains no elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipList;
    ///
    /// let mut skiplist = SkipList::new();
    /// assert!(skiplist.is_empty());
    ///
    /// skiplist.insert(1);
    /// assert!(!skiplist.is_empty());
    /// ```
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The maximum number of levels a node of this list may participate in.
    /// This is fixed at construction.
    #[must_use]
    #[inline]
    pub fn max_level(&self) -> usize {
        self.heads.len()
    }

    /// The number of levels currently in use, that is the height of the
    /// tallest node. Zero for an empty list.
    #[must_use]
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// The number of nodes threaded through `level`. Level 0 holds every
    /// element; levels at or above [`max_level`][SkipList::max_level] hold
    /// none.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipList;
    ///
    /// let skiplist: SkipList<_> = (0..100).collect();
    /// assert_eq!(skiplist.level_len(0), 100);
    /// assert!(skiplist.level_len(1) <= 100);
    /// assert_eq!(skiplist.level_len(1000), 0);
    /// ```
    #[must_use]
    pub fn level_len(&self, level: usize) -> usize {
        let mut count = 0;
        let mut node = self.heads.get(level).copied().flatten();
        while let Some(id) = node {
            count += 1;
            node = self.nodes[id].forward[level];
        }
        count
    }

    /// A cursor at the smallest element, or the end cursor if the list is
    /// empty.
    #[must_use]
    #[inline]
    pub fn begin(&self) -> Cursor<'_, T> {
        Cursor::new(&self.nodes, self.heads[0])
    }

    /// The end cursor, positioned past the largest element.
    #[must_use]
    #[inline]
    pub fn end(&self) -> Cursor<'_, T> {
        Cursor::new(&self.nodes, None)
    }

    /// Creates an iterator over the entries of the skiplist in ascending
    /// order.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipList;
    ///
    /// let mut skiplist = SkipList::new();
    /// skiplist.extend([5, 3, 9]);
    /// let v: Vec<_> = skiplist.iter().collect();
    /// assert_eq!(v, [&3, &5, &9]);
    /// ```
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            arena: &self.nodes,
            next: self.heads[0],
            remaining: self.len,
        }
    }

    /// Provides a reference to the smallest element, or `None` if the
    /// skiplist is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipList;
    ///
    /// let mut skiplist = SkipList::new();
    /// assert!(skiplist.first().is_none());
    ///
    /// skiplist.insert(2);
    /// skiplist.insert(1);
    /// assert_eq!(skiplist.first(), Some(&1));
    /// ```
    #[must_use]
    #[inline]
    pub fn first(&self) -> Option<&T> {
        self.heads[0].map(|id| &self.nodes[id].value)
    }

    /// Provides a reference to the largest element, or `None` if the skiplist
    /// is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipList;
    ///
    /// let mut skiplist = SkipList::new();
    /// assert!(skiplist.last().is_none());
    ///
    /// skiplist.insert(2);
    /// skiplist.insert(1);
    /// assert_eq!(skiplist.last(), Some(&2));
    /// ```
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        let mut current = None;
        for level in (0..self.height).rev() {
            while let Some(next) = self.link(current, level) {
                current = Some(next);
            }
        }
        current.map(|id| &self.nodes[id].value)
    }

    /// Removes the smallest element and returns it, or `None` if the list is
    /// empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipList;
    ///
    /// let mut skiplist: SkipList<_> = [2, 1].into();
    /// assert_eq!(skiplist.pop_first(), Some(1));
    /// assert_eq!(skiplist.pop_first(), Some(2));
    /// assert!(skiplist.pop_first().is_none());
    /// ```
    pub fn pop_first(&mut self) -> Option<T> {
        let first = self.heads[0]?;
        // Every predecessor of the first node is the head.
        let update: Frontier = [None; MAX_LEVEL_LIMIT];
        Some(self.unlink(first, &update))
    }

    /// Retains only the elements specified by the predicate.
    ///
    /// In other words, remove all elements `e` such that `f(&e)` returns
    /// false. This is a single pass over the list.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipList;
    ///
    /// let mut skiplist: SkipList<_> = (0..10).collect();
    /// skiplist.retain(|&x| x % 2 == 0);
    /// assert_eq!(skiplist.len(), 5);
    /// ```
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&T) -> bool,
    {
        // Last kept node at each level. Rejected nodes are unlinked one at a
        // time, so the list stays whole if `f` panics.
        let mut frontier: Frontier = [None; MAX_LEVEL_LIMIT];
        let mut next = self.heads[0];
        while let Some(id) = next {
            next = self.nodes[id].forward[0];
            if f(&self.nodes[id].value) {
                let height = self.nodes[id].level();
                frontier[..height].fill(Some(id));
            } else {
                drop(self.unlink(id, &frontier));
            }
        }
    }

    /// Returns a view of the list which displays every level separately.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipList;
    ///
    /// let skiplist: SkipList<_> = (0..5).collect();
    /// println!("{}", skiplist.levels());
    /// ```
    #[must_use]
    #[inline]
    pub fn levels(&self) -> Levels<'_, T, G> {
        Levels { list: self }
    }
}

impl<T, G> SkipList<T, G>
where
    T: Ord,
{
    /// Returns `true` if the value is contained in the skiplist.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipList;
    ///
    /// let mut skiplist = SkipList::new();
    /// skiplist.extend(0..10);
    /// assert!(skiplist.contains(&4));
    /// assert!(!skiplist.contains(&15));
    /// ```
    #[must_use]
    #[inline]
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        !self.find(value).is_end()
    }

    /// Returns a cursor at the element equal to `value`, or the end cursor if
    /// there is none.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipList;
    ///
    /// let skiplist: SkipList<_> = (0..10).collect();
    /// assert_eq!(skiplist.find(&4).get(), Some(&4));
    /// assert_eq!(skiplist.find(&40), skiplist.end());
    /// ```
    #[must_use]
    pub fn find<Q>(&self, value: &Q) -> Cursor<'_, T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self
            .find_item(value, None)
            .filter(|&id| self.compare(value, id) == Ordering::Equal);
        Cursor::new(&self.nodes, node)
    }

    /// Returns a reference to the stored element equal to `value`, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipList;
    ///
    /// let skiplist: SkipList<String> = ["a".to_owned(), "b".to_owned()].into();
    /// assert_eq!(skiplist.get("b").map(String::as_str), Some("b"));
    /// assert!(skiplist.get("c").is_none());
    /// ```
    #[must_use]
    #[inline]
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(value).get()
    }

    /// Removes the element equal to `value`. Returns whether an element was
    /// removed; if not, the list is unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipList;
    ///
    /// let mut skiplist: SkipList<_> = (0..10).collect();
    /// assert!(skiplist.remove(&4));
    /// assert!(!skiplist.remove(&4));
    /// assert_eq!(skiplist.len(), 9);
    /// ```
    #[inline]
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.take(value).is_some()
    }

    /// Removes and returns the element equal to `value`, or `None` if there
    /// is no such element.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipList;
    ///
    /// let mut skiplist: SkipList<_> = (0..10).collect();
    /// assert_eq!(skiplist.take(&4), Some(4));
    /// assert!(skiplist.take(&4).is_none());
    /// ```
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut update: Frontier = [None; MAX_LEVEL_LIMIT];
        let target = self.find_item(value, Some(&mut update[..]))?;
        if self.compare(value, target) != Ordering::Equal {
            return None;
        }
        Some(self.unlink(target, &update))
    }
}

impl<T, G> SkipList<T, G>
where
    T: Ord,
    G: LevelGenerator,
{
    /// Inserts the element into the skiplist, keeping the list sorted.
    ///
    /// Returns `true` if the value was inserted. If an equal element is
    /// already present, the list is left untouched, the existing element is
    /// kept, and `false` is returned; use [`replace`][SkipList::replace] to
    /// overwrite it instead.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipList;
    ///
    /// let mut skiplist = SkipList::new();
    ///
    /// assert!(skiplist.insert(0));
    /// assert!(skiplist.insert(5));
    /// assert!(!skiplist.insert(5));
    /// assert_eq!(skiplist.len(), 2);
    /// ```
    pub fn insert(&mut self, value: T) -> bool {
        let mut update: Frontier = [None; MAX_LEVEL_LIMIT];
        if let Some(found) = self.find_item(&value, Some(&mut update[..])) {
            if self.compare(&value, found) == Ordering::Equal {
                return false;
            }
        }
        self.splice(value, &update);
        true
    }

    /// Inserts the element, replacing and returning an equal element if one
    /// is present.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipset::SkipList;
    ///
    /// let mut skiplist = SkipList::new();
    /// assert_eq!(skiplist.replace(3), None);
    /// assert_eq!(skiplist.replace(3), Some(3));
    /// assert_eq!(skiplist.len(), 1);
    /// ```
    pub fn replace(&mut self, value: T) -> Option<T> {
        let mut update: Frontier = [None; MAX_LEVEL_LIMIT];
        match self.find_item(&value, Some(&mut update[..])) {
            Some(found) if self.compare(&value, found) == Ordering::Equal => {
                Some(mem::replace(&mut self.nodes[found].value, value))
            }
            _ => {
                self.splice(value, &update);
                None
            }
        }
    }

    /// Link a new node holding `value` after the predecessors in `update`.
    fn splice(&mut self, value: T, update: &[Link]) {
        // Clamped so that a misbehaving generator cannot index past the heads.
        let height = self.level_generator.level().clamp(1, self.max_level());
        let id = self.nodes.alloc(SkipNode::with_level(value, height));
        for (level, &pred) in update.iter().enumerate().take(height) {
            let next = mem::replace(self.link_mut(pred, level), Some(id));
            self.nodes[id].forward[level] = next;
        }
        self.height = cmp::max(self.height, height);
        self.len += 1;
    }
}

// ///////////////////////////////////////////////
// Internal methods
// ///////////////////////////////////////////////

impl<T, G> SkipList<T, G> {
    /// The successor of `pred` at `level`, where a `pred` of `None` is the
    /// head.
    #[inline]
    fn link(&self, pred: Link, level: usize) -> Link {
        match pred {
            Some(id) => self.nodes[id].forward[level],
            None => self.heads[level],
        }
    }

    #[inline]
    fn link_mut(&mut self, pred: Link, level: usize) -> &mut Link {
        match pred {
            Some(id) => &mut self.nodes[id].forward[level],
            None => &mut self.heads[level],
        }
    }

    /// How `target` compares to the value held by `id`.
    #[inline]
    fn compare<Q>(&self, target: &Q, id: NodeId) -> Ordering
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        target.cmp(self.nodes[id].value.borrow())
    }

    /// Descend from the top in-use level to level 0, returning the first node
    /// whose value is not less than `target`.
    ///
    /// If `update` is given, `update[level]` is set to the last node visited
    /// on each in-use level; entries above the in-use levels are left alone.
    fn find_item<Q>(&self, target: &Q, mut update: Option<&mut [Link]>) -> Link
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = None;
        for level in (0..self.height).rev() {
            while let Some(next) = self.link(current, level) {
                if self.compare(target, next) == Ordering::Greater {
                    current = Some(next);
                } else {
                    break;
                }
            }
            if let Some(update) = update.as_deref_mut() {
                update[level] = current;
            }
        }
        self.link(current, 0)
    }

    /// Detach `target` from every level it belongs to and release it.
    fn unlink(&mut self, target: NodeId, update: &[Link]) -> T {
        let node = self.nodes.free(target);
        for (level, &next) in node.forward.iter().enumerate() {
            let link = self.link_mut(update[level], level);
            if *link == Some(target) {
                *link = next;
            }
        }
        self.len -= 1;
        self.shrink_height();
        node.into_inner()
    }

    fn shrink_height(&mut self) {
        while self.height > 0 && self.heads[self.height - 1].is_none() {
            self.height -= 1;
        }
    }
}

impl<T, G> Drop for SkipList<T, G> {
    fn drop(&mut self) {
        self.clear();
    }
}

// ///////////////////////////////////////////////
// Diagnostics
// ///////////////////////////////////////////////

/// A per-level rendering of a [`SkipList`], returned by
/// [`SkipList::levels`].
///
/// Levels are printed from the tallest in use down to level 0. Columns line up
/// across levels, so a node appears directly above itself:
///
/// ```text
/// 2 ------> 2 ----------------> nil
/// 1 ------> 2 ------> 4 ------> nil
/// 0 -> 1 -> 2 -> 3 -> 4 -> 5 -> nil
/// ```
pub struct Levels<'a, T, G> {
    list: &'a SkipList<T, G>,
}

impl<T, G> fmt::Display for Levels<'_, T, G>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let list = self.list;
        let cells: Vec<(String, usize)> = list
            .iter_nodes()
            .map(|node| (format!("-> {node} "), node.level()))
            .collect();
        let width = list.height.saturating_sub(1).to_string().len();

        for level in (0..list.height).rev() {
            write!(f, "{level:>width$} ")?;
            for (cell, height) in &cells {
                if *height > level {
                    f.write_str(cell)?;
                } else {
                    f.write_str(&"-".repeat(cell.len()))?;
                }
            }
            f.write_str("-> nil")?;
            if level > 0 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl<T, G> SkipList<T, G> {
    fn iter_nodes(&self) -> impl Iterator<Item = &SkipNode<T>> {
        iter::successors(self.heads[0], |&id| self.nodes[id].forward[0]).map(|id| &self.nodes[id])
    }

    /// Check the integrity of the skiplist.
    #[cfg(test)]
    pub(crate) fn check(&self)
    where
        T: Ord,
    {
        assert!(self.height <= self.max_level());
        assert!(self.heads[self.height..].iter().all(Option::is_none));
        if self.height > 0 {
            assert!(self.heads[self.height - 1].is_some());
        }

        // Level 0 is sorted, holds every node, and nothing else is live.
        let mut count = 0;
        let mut prev: Option<&T> = None;
        for node in self.iter_nodes() {
            assert!((1..=self.height).contains(&node.level()));
            if let Some(prev) = prev {
                assert!(prev < &node.value, "Level 0 is not strictly increasing");
            }
            prev = Some(&node.value);
            count += 1;
        }
        assert_eq!(count, self.len);
        assert_eq!(self.nodes.live(), self.len);

        // Each higher level is a sub-sequence of the level below, made of
        // exactly the nodes tall enough to reach it.
        for level in 1..self.height {
            let mut lower = self.heads[level - 1];
            let mut node = self.heads[level];
            while let Some(id) = node {
                assert!(self.nodes[id].level() > level);
                loop {
                    let Some(l) = lower else {
                        panic!("Node missing from level {}", level - 1);
                    };
                    lower = self.nodes[l].forward[level - 1];
                    if l == id {
                        break;
                    }
                }
                node = self.nodes[id].forward[level];
            }
            let tall = self.iter_nodes().filter(|n| n.level() > level).count();
            assert_eq!(self.level_len(level), tall);
        }
    }
}

// ///////////////////////////////////////////////
// Trait implementation
// ///////////////////////////////////////////////

impl<T> Default for SkipList<T> {
    #[inline]
    fn default() -> SkipList<T> {
        SkipList::new()
    }
}

/// Cloning re-inserts every element into a fresh list with an independently
/// seeded level generator. The copy shares no nodes with the original, and its
/// node heights are drawn anew.
impl<T, G> Clone for SkipList<T, G>
where
    T: Clone + Ord,
    G: LevelGenerator,
{
    fn clone(&self) -> Self {
        let mut copy = SkipList::with_level_generator(self.level_generator.fork());
        copy.extend(self.iter().cloned());
        copy
    }

    fn clone_from(&mut self, source: &Self) {
        if self.max_level() == source.max_level() {
            // Keeps the arena's allocation and our own generator.
            self.clear();
            self.extend(source.iter().cloned());
        } else {
            *self = source.clone();
        }
    }
}

/// This implementation of PartialEq only checks that the *values* are equal;
/// it does not check for equivalence of other features (such as the level
/// generator and the node levels).
impl<A, B, G, H> PartialEq<SkipList<B, H>> for SkipList<A, G>
where
    A: PartialEq<B>,
{
    #[inline]
    fn eq(&self, other: &SkipList<B, H>) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T, G> Eq for SkipList<T, G> where T: Eq {}

impl<A, B, G, H> PartialOrd<SkipList<B, H>> for SkipList<A, G>
where
    A: PartialOrd<B>,
{
    #[inline]
    fn partial_cmp(&self, other: &SkipList<B, H>) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T, G> Ord for SkipList<T, G>
where
    T: Ord,
{
    #[inline]
    fn cmp(&self, other: &SkipList<T, G>) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T, G> Extend<T> for SkipList<T, G>
where
    T: Ord,
    G: LevelGenerator,
{
    #[inline]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iterable: I) {
        for element in iterable {
            self.insert(element);
        }
    }
}

impl<T, G> fmt::Debug for SkipList<T, G>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Renders the bottom level from head to tail, e.g. `1 -> 2 -> 3`.
impl<T, G> fmt::Display for SkipList<T, G>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, entry) in self.iter().enumerate() {
            if i != 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}

impl<T, G> IntoIterator for SkipList<T, G> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(mut self) -> IntoIter<T> {
        let next = self.heads[0];
        let remaining = self.len;
        let arena = mem::replace(&mut self.nodes, Arena::new());
        // `self` now owns no nodes and drops as an empty list.
        self.heads.fill(None);
        self.len = 0;
        self.height = 0;
        IntoIter {
            arena,
            next,
            remaining,
        }
    }
}

impl<'a, T, G> IntoIterator for &'a SkipList<T, G> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T> FromIterator<T> for SkipList<T>
where
    T: Ord,
{
    #[inline]
    fn from_iter<I>(iter: I) -> SkipList<T>
    where
        I: IntoIterator<Item = T>,
    {
        let mut skiplist = SkipList::new();
        skiplist.extend(iter);
        skiplist
    }
}

impl<T, const N: usize> From<[T; N]> for SkipList<T>
where
    T: Ord,
{
    #[inline]
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T: Hash, G> Hash for SkipList<T, G> {
    #[inline]
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.len.hash(state);
        for elt in self {
            elt.hash(state);
        }
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Tests
// ////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use anyhow::Result;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    use super::SkipList;
    use crate::level_generator::{
        CoinFlip, Geometric, LevelError, LevelGenerator, MAX_LEVEL_LIMIT,
    };

    /// Hands out a fixed sequence of heights, then height 1.
    struct Scripted {
        total: usize,
        levels: std::vec::IntoIter<usize>,
    }

    impl Scripted {
        fn list<T>(total: usize, levels: &[usize]) -> SkipList<T, Scripted> {
            SkipList::with_level_generator(Scripted {
                total,
                levels: levels.to_vec().into_iter(),
            })
        }
    }

    impl LevelGenerator for Scripted {
        fn total(&self) -> usize {
            self.total
        }

        fn level(&mut self) -> usize {
            self.levels.next().unwrap_or(1)
        }

        fn fork(&self) -> Self {
            Scripted {
                total: self.total,
                levels: Vec::new().into_iter(),
            }
        }
    }

    fn seeded<T>(seed: u64) -> SkipList<T> {
        SkipList::with_level_generator(CoinFlip::with_seed(20, seed).unwrap())
    }

    fn contents<T: Clone, G>(list: &SkipList<T, G>) -> Vec<T> {
        list.iter().cloned().collect()
    }

    #[test]
    fn basic_small() {
        let mut sl: SkipList<i64> = SkipList::new();
        sl.check();
        assert!(sl.insert(1));
        sl.check();
        assert!(sl.remove(&1));
        sl.check();
        assert!(sl.insert(1));
        sl.check();
        assert!(sl.insert(2));
        sl.check();
        assert!(sl.remove(&1));
        sl.check();
        assert!(sl.remove(&2));
        sl.check();
        assert!(!sl.remove(&1));
        sl.check();
        assert_eq!(sl.height(), 0);
    }

    #[test]
    fn basic_large() {
        let size = 10_000;
        let mut sl = seeded(1);
        assert!(sl.is_empty());

        for i in 0..size {
            sl.insert(i);
            assert_eq!(sl.len(), i + 1);
        }
        sl.check();

        for i in 0..size {
            assert_eq!(sl.take(&i), Some(i));
            assert_eq!(sl.len(), size - i - 1);
        }
        sl.check();
        assert!(sl.is_empty());
    }

    #[test]
    fn round_trip() {
        let mut sl = SkipList::new();
        for x in [3, 1, 4, 1, 5, 9, 2, 6] {
            sl.insert(x);
            sl.check();
        }
        assert_eq!(contents(&sl), [1, 2, 3, 4, 5, 6, 9]);
        assert_eq!(sl.len(), 7);
        for x in [3, 1, 4, 5, 9, 2, 6] {
            assert_eq!(sl.find(&x).get(), Some(&x));
        }
        assert!(sl.find(&7).is_end());
        assert_eq!(sl.find(&7), sl.end());
        assert!(!sl.contains(&0));
        assert!(!sl.contains(&10));
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut sl = SkipList::new();
        assert!(sl.insert(5));
        assert!(!sl.insert(5));
        assert!(!sl.insert(5));
        sl.check();
        assert_eq!(sl.len(), 1);
        assert_eq!(sl.level_len(0), 1);

        // A single remove leaves nothing behind: there was only ever one copy.
        assert!(sl.remove(&5));
        assert!(!sl.contains(&5));
        assert!(sl.is_empty());
    }

    #[test]
    fn duplicate_keeps_original() {
        // Ordered by the first field only, so the second tells copies apart.
        #[derive(Debug, Clone)]
        struct Keyed(u32, &'static str);
        impl PartialEq for Keyed {
            fn eq(&self, other: &Self) -> bool {
                self.0 == other.0
            }
        }
        impl Eq for Keyed {}
        impl PartialOrd for Keyed {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }
        impl Ord for Keyed {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                self.0.cmp(&other.0)
            }
        }

        let mut sl = SkipList::new();
        assert!(sl.insert(Keyed(1, "first")));
        assert!(!sl.insert(Keyed(1, "second")));
        assert_eq!(sl.get(&Keyed(1, "")).map(|k| k.1), Some("first"));

        let old = sl.replace(Keyed(1, "third"));
        assert_eq!(old.map(|k| k.1), Some("first"));
        assert_eq!(sl.get(&Keyed(1, "")).map(|k| k.1), Some("third"));
        assert_eq!(sl.len(), 1);

        assert!(sl.replace(Keyed(2, "new")).is_none());
        assert_eq!(sl.len(), 2);
        sl.check();
    }

    #[test]
    fn duplicates_follow_ordering() {
        // Equality also compares the tag, ordering does not.
        #[derive(Debug, PartialEq, Eq)]
        struct Tagged(u32, char);
        impl PartialOrd for Tagged {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }
        impl Ord for Tagged {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                self.0.cmp(&other.0)
            }
        }

        let mut sl = SkipList::new();
        assert!(sl.insert(Tagged(1, 'a')));
        assert!(!sl.insert(Tagged(1, 'b')));
        assert_eq!(sl.len(), 1);
        assert_eq!(sl.first(), Some(&Tagged(1, 'a')));

        assert_eq!(sl.replace(Tagged(1, 'c')), Some(Tagged(1, 'a')));
        assert_eq!(sl.len(), 1);
        assert_eq!(sl.first(), Some(&Tagged(1, 'c')));
        sl.check();
    }

    #[test]
    fn oversized_generator_total_is_clamped() {
        let mut sl = Scripted::list(150, &[150, 150, 3, 120]);
        assert_eq!(sl.max_level(), MAX_LEVEL_LIMIT);
        for v in [1, 2, 3, 4, 5] {
            assert!(sl.insert(v));
            sl.check();
        }
        assert_eq!(sl.height(), MAX_LEVEL_LIMIT);
        assert_eq!(sl.level_len(MAX_LEVEL_LIMIT - 1), 3);
        assert!(sl.contains(&4));
        assert!(sl.remove(&1));
        assert!(sl.remove(&2));
        sl.check();
        assert_eq!(contents(&sl), [3, 4, 5]);
    }

    #[test]
    fn insert_rand() {
        use rand::seq::SliceRandom;

        let mut rng = rand::rng();
        let mut values: Vec<u32> = (0..1000).collect();
        values.shuffle(&mut rng);

        let mut sl = SkipList::new();
        for &v in &values {
            assert!(sl.insert(v));
        }
        sl.check();
        assert!(sl.iter().copied().eq(0..1000));
    }

    #[test]
    fn remove_rand() {
        use rand::seq::SliceRandom;

        let mut rng = rand::rng();
        let mut sl: SkipList<u32> = (0..1000).collect();
        let mut order: Vec<u32> = (0..1000).collect();
        order.shuffle(&mut rng);

        for (i, v) in order.iter().enumerate() {
            assert!(sl.remove(v));
            assert!(!sl.contains(v));
            assert_eq!(sl.len(), 999 - i);
            if i % 100 == 0 {
                sl.check();
            }
        }
        sl.check();
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut sl: SkipList<_> = (0..100).step_by(2).collect();
        let before = contents(&sl);
        for v in [1, 51, 99, 1000] {
            assert!(!sl.remove(&v));
            assert_eq!(sl.take(&v), None);
        }
        assert_eq!(contents(&sl), before);
        assert_eq!(sl.len(), 50);
        sl.check();
    }

    #[test]
    fn remove_from_every_level() {
        let mut sl = Scripted::list(4, &[1, 4, 2, 3, 1]);
        sl.extend([10, 20, 30, 40, 50]);
        sl.check();
        assert_eq!(sl.height(), 4);
        assert_eq!(sl.level_len(3), 1);

        assert!(sl.remove(&20));
        sl.check();
        assert!(!sl.contains(&20));
        assert!(!sl.levels().to_string().contains(" 20 "));
        assert_eq!(sl.level_len(1), 2);
        // The only height-4 node is gone; searches now start lower.
        assert_eq!(sl.height(), 3);
        assert_eq!(sl.max_level(), 4);

        assert!(sl.remove(&40));
        assert_eq!(sl.height(), 2);
        sl.check();
        assert_eq!(contents(&sl), [10, 30, 50]);
    }

    #[test]
    fn with_max_level() -> Result<()> {
        let mut sl = SkipList::with_max_level(1)?;
        sl.extend(0..100);
        sl.check();
        assert_eq!(sl.height(), 1);
        assert_eq!(sl.max_level(), 1);

        assert_eq!(
            SkipList::<u8>::with_max_level(0).err(),
            Some(LevelError::ZeroMax)
        );
        assert_eq!(
            SkipList::<u8>::with_max_level(101).err(),
            Some(LevelError::MaxTooLarge)
        );
        Ok(())
    }

    #[test]
    fn oversized_levels_are_clamped() {
        let mut sl = Scripted::list(3, &[50, 0]);
        sl.insert(1);
        sl.insert(2);
        sl.check();
        assert_eq!(sl.height(), 3);
        assert_eq!(sl.level_len(0), 2);
        assert_eq!(sl.level_len(2), 1);
    }

    #[rstest]
    #[case(0.5)]
    #[case(0.25)]
    #[case(0.9)]
    fn geometric_levels(#[case] p: f64) -> Result<()> {
        let mut sl = SkipList::with_level_generator(Geometric::new(16, p)?);
        sl.extend((0..2000).rev());
        sl.check();
        assert!(sl.iter().copied().eq(0..2000));
        Ok(())
    }

    #[test]
    fn level_distribution() {
        let size = 20_000;
        let mut sl = seeded(0x1234_abcd);
        sl.extend(0..size);
        sl.check();

        let mut expected = size as f64;
        for level in 0..6 {
            let observed = sl.level_len(level) as f64;
            assert!(
                (observed - expected).abs() < 0.05 * size as f64,
                "level {level}: observed {observed}, expected {expected}"
            );
            expected /= 2.0;
        }
        assert!(sl.height() <= sl.max_level());
    }

    #[test]
    fn clear() {
        let mut sl: SkipList<i64> = (0..100).collect();
        assert_eq!(sl.len(), 100);
        sl.clear();
        sl.check();
        assert!(sl.is_empty());
        assert_eq!(sl.begin(), sl.end());

        // Repeated clears are harmless, and the list stays usable.
        sl.clear();
        sl.extend([3, 2, 1]);
        sl.check();
        assert_eq!(contents(&sl), [1, 2, 3]);
    }

    #[test]
    fn first_last_pop() {
        let mut sl = SkipList::new();
        assert_eq!(sl.first(), None);
        assert_eq!(sl.last(), None);
        assert_eq!(sl.pop_first(), None);

        sl.extend([5, 1, 9, 3]);
        assert_eq!(sl.first(), Some(&1));
        assert_eq!(sl.last(), Some(&9));

        assert_eq!(sl.pop_first(), Some(1));
        sl.check();
        assert_eq!(sl.first(), Some(&3));
        assert_eq!(sl.len(), 3);

        let mut drained = Vec::new();
        while let Some(x) = sl.pop_first() {
            sl.check();
            drained.push(x);
        }
        assert_eq!(drained, [3, 5, 9]);
        assert_eq!(sl.height(), 0);
    }

    #[test]
    fn retain() {
        let mut sl: SkipList<u32> = (0..1000).collect();
        sl.retain(|&x| x % 3 == 0);
        sl.check();
        assert!(sl.iter().copied().eq((0..1000).step_by(3)));

        sl.retain(|_| false);
        sl.check();
        assert!(sl.is_empty());
        assert_eq!(sl.height(), 0);

        sl.insert(7);
        assert_eq!(contents(&sl), [7]);
    }

    #[test]
    fn retain_survives_panicking_predicate() {
        use std::panic::{self, AssertUnwindSafe};

        let mut sl: SkipList<u32> = (0..10).collect();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            sl.retain(|&x| {
                assert!(x != 6, "predicate failed on 6");
                x % 2 == 0
            });
        }));
        assert!(result.is_err());

        // Values before 6 were filtered, the rest are untouched.
        sl.check();
        assert_eq!(contents(&sl), [0, 2, 4, 6, 7, 8, 9]);

        sl.insert(5);
        assert!(sl.remove(&8));
        sl.check();
        assert_eq!(contents(&sl), [0, 2, 4, 5, 6, 7, 9]);
    }

    #[test]
    fn deep_copy_independence() {
        let mut a: SkipList<i32> = (0..100).collect();
        let mut b = a.clone();
        a.check();
        b.check();
        assert_eq!(a, b);

        assert!(b.insert(1000));
        assert!(b.remove(&0));
        assert_eq!(a.len(), 100);
        assert!(a.iter().copied().eq(0..100));

        assert!(a.remove(&50));
        assert!(b.contains(&50));
        assert_eq!(b.len(), 100);

        drop(a);
        b.check();
        assert!(b.iter().copied().eq((1..100).chain([1000])));
    }

    #[test]
    fn clone_from() {
        let source: SkipList<i32> = (0..50).collect();

        let mut same = seeded(3);
        same.extend([100, 200]);
        same.clone_from(&source);
        same.check();
        assert_eq!(same, source);

        let mut other = SkipList::with_max_level(4).unwrap();
        other.extend([-1, -2]);
        other.clone_from(&source);
        other.check();
        assert_eq!(other, source);
        assert_eq!(other.max_level(), source.max_level());
    }

    #[test]
    fn move_validity() {
        let mut a: SkipList<i32> = [8, 6, 7, 5, 3, 0, 9].into();
        let before = contents(&a);

        let b = a.take_all();
        b.check();
        a.check();
        assert_eq!(contents(&b), before);
        assert_eq!(a.len(), 0);
        assert_eq!(a.max_level(), b.max_level());

        // The source is reusable.
        a.extend([2, 1]);
        a.check();
        assert_eq!(contents(&a), [1, 2]);
        assert_eq!(contents(&b), before);

        // A plain move keeps everything.
        let c = b;
        assert_eq!(contents(&c), before);
    }

    #[test]
    fn demo_sequence() {
        // Copy, copy-assign, move and move-assign in sequence.
        let s: SkipList<i32> = (1..=100).collect();
        let mut p = s.clone();
        let mut q = SkipList::new();
        q.clone_from(&p);
        let t = q.take_all();
        let mut o = SkipList::new();
        o.clone_from(&p.take_all());

        for list in [&s, &t, &o] {
            list.check();
            assert!(list.iter().copied().eq(1..=100));
        }
        assert!(p.is_empty());
        assert!(q.is_empty());
        p.check();
        q.check();
    }

    #[test]
    fn into_iter() {
        let sl: SkipList<String> = ["b", "c", "a"].map(String::from).into();
        let v: Vec<String> = sl.into_iter().collect();
        assert_eq!(v, ["a", "b", "c"]);

        let sl: SkipList<i32> = (0..10).collect();
        let mut sum = 0;
        for x in &sl {
            sum += x;
        }
        assert_eq!(sum, 45);
    }

    #[test]
    fn long_chain_drop() {
        // Teardown walks the bottom level; a long chain must not overflow.
        let sl: SkipList<u32> = (0..200_000).collect();
        assert_eq!(sl.len(), 200_000);
        drop(sl);
    }

    #[test]
    fn borrowed_lookup() {
        let mut sl: SkipList<String> = ["apple", "pear", "fig"].map(String::from).into();
        assert!(sl.contains("fig"));
        assert_eq!(sl.find("pear").get().map(String::as_str), Some("pear"));
        assert!(sl.remove("apple"));
        assert!(!sl.contains("apple"));
    }

    #[test]
    fn equality() {
        let a: SkipList<i64> = (0..100).collect();
        let b: SkipList<i64> = (0..100).rev().collect();
        let c: SkipList<i64> = (0..10).collect();
        let d: SkipList<i64> = (100..200).collect();
        let e: SkipList<i64> = (0..100).chain(0..1).collect();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        // Duplicates collapse, so `e` holds the same set as `a`.
        assert_eq!(a, e);
        assert!(c < a);
        assert!(a < d);
    }

    #[test]
    fn debug_display() {
        let sl: SkipList<_> = [3, 1, 2].into();
        assert_eq!(format!("{sl:?}"), "[1, 2, 3]");
        assert_eq!(sl.to_string(), "1 -> 2 -> 3");

        let empty: SkipList<i32> = SkipList::new();
        assert_eq!(format!("{empty:?}"), "[]");
        assert_eq!(empty.to_string(), "");
        assert_eq!(empty.levels().to_string(), "");
    }

    #[test]
    fn levels_snapshot() {
        let mut sl = Scripted::list(4, &[1, 3, 1, 2, 1]);
        sl.extend([1, 2, 3, 4, 5]);
        sl.check();
        assert_snapshot!(sl.levels(), @r"
        2 ------> 2 ----------------> nil
        1 ------> 2 ------> 4 ------> nil
        0 -> 1 -> 2 -> 3 -> 4 -> 5 -> nil
        ");
    }

    #[test]
    fn levels_snapshot_wide_values() {
        let mut sl = Scripted::list(2, &[2, 1, 2]);
        sl.extend([7, 100, 42]);
        sl.check();
        assert_snapshot!(sl.levels(), @r"
        1 -> 7 -> 42 --------> nil
        0 -> 7 -> 42 -> 100 -> nil
        ");
    }

    proptest! {
        #[test]
        fn matches_btreeset(ops in prop::collection::vec((any::<bool>(), 0_u8..64), 0..400)) {
            let mut sl = SkipList::new();
            let mut model = BTreeSet::new();
            for (insert, v) in ops {
                if insert {
                    prop_assert_eq!(sl.insert(v), model.insert(v));
                } else {
                    prop_assert_eq!(sl.remove(&v), model.remove(&v));
                }
                prop_assert_eq!(sl.len(), model.len());
            }
            sl.check();
            prop_assert!(sl.iter().eq(model.iter()));
            prop_assert_eq!(sl.iter().count(), sl.len());
            for v in 0_u8..64 {
                prop_assert_eq!(sl.contains(&v), model.contains(&v));
            }
        }

        #[test]
        fn clone_is_disjoint(values in prop::collection::vec(any::<i32>(), 0..200), extra in any::<i32>()) {
            let a: SkipList<i32> = values.iter().copied().collect();
            let mut b = a.clone();
            let before: Vec<i32> = a.iter().copied().collect();

            b.insert(extra);
            if let Some(&first) = before.first() {
                b.remove(&first);
            }
            prop_assert_eq!(a.iter().copied().collect::<Vec<_>>(), before);
            a.check();
            b.check();
        }
    }
}
