use std::fmt;

/// Index of a node within its list's [`Arena`].
pub(crate) type NodeId = usize;

/// A forward link: the next node at some level, or `None` at the end of the
/// level.
pub(crate) type Link = Option<NodeId>;

// ////////////////////////////////////////////////////////////////////////////
// SkipNode
// ////////////////////////////////////////////////////////////////////////////

/// SkipNodes make up the SkipList. Each node stores a value and one forward
/// link for every level it participates in.
///
/// A node of height `n` has exactly `n` links; `forward[0]` threads the node
/// into the level-0 chain which every node belongs to. The links are indices
/// into the owning list's arena, never references to other nodes, so a node
/// owns nothing but its value and its link array.
#[derive(Debug)]
pub(crate) struct SkipNode<V> {
    pub value: V,
    // Sized once at construction; its length is the node's height.
    pub forward: Box<[Link]>,
}

// ///////////////////////////////////////////////
// Inherent methods
// ///////////////////////////////////////////////

impl<V> SkipNode<V> {
    /// Create a node of height 1 with its link set to `None`.
    #[cfg(test)]
    pub fn new(value: V) -> Self {
        Self::with_level(value, 1)
    }

    /// Create a node participating in `level` levels, all links `None`.
    pub fn with_level(value: V, level: usize) -> Self {
        debug_assert!(level >= 1, "A node must participate in level 0");
        SkipNode {
            value,
            forward: vec![None; level].into_boxed_slice(),
        }
    }

    /// The number of levels this node participates in.
    pub fn level(&self) -> usize {
        self.forward.len()
    }

    /// Consumes the node returning the value it contains.
    pub fn into_inner(self) -> V {
        self.value
    }
}

/// Cloning a node copies its value and height only. The links of the clone
/// are all `None`: wiring nodes together is the list's job.
impl<V: Clone> Clone for SkipNode<V> {
    fn clone(&self) -> Self {
        SkipNode::with_level(self.value.clone(), self.level())
    }
}

impl<V> fmt::Display for SkipNode<V>
where
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Arena
// ////////////////////////////////////////////////////////////////////////////

/// Owner of every node of a list.
///
/// Vacated slots are kept on a free list and reused by later insertions, so
/// the identifiers of live nodes are stable for as long as they are live.
#[derive(Debug)]
pub(crate) struct Arena<V> {
    slots: Vec<Option<SkipNode<V>>>,
    free: Vec<NodeId>,
}

impl<V> Arena<V> {
    pub fn new() -> Self {
        Arena {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Store a node and return its identifier.
    pub fn alloc(&mut self, node: SkipNode<V>) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.slots[id] = Some(node);
            id
        } else {
            self.slots.push(Some(node));
            self.slots.len() - 1
        }
    }

    /// Remove a node from the arena, releasing its slot for reuse.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not refer to a live node.
    pub fn free(&mut self, id: NodeId) -> SkipNode<V> {
        let node = self.slots[id]
            .take()
            .unwrap_or_else(|| panic!("Node {id} freed twice"));
        self.free.push(id);
        node
    }

    /// Drop every slot. Used once every live node has been released.
    pub fn reset(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    /// Number of live nodes.
    #[cfg(test)]
    pub fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}

impl<V> std::ops::Index<NodeId> for Arena<V> {
    type Output = SkipNode<V>;

    fn index(&self, id: NodeId) -> &SkipNode<V> {
        self.slots[id]
            .as_ref()
            .unwrap_or_else(|| panic!("Link to vacant node {id}"))
    }
}

impl<V> std::ops::IndexMut<NodeId> for Arena<V> {
    fn index_mut(&mut self, id: NodeId) -> &mut SkipNode<V> {
        self.slots[id]
            .as_mut()
            .unwrap_or_else(|| panic!("Link to vacant node {id}"))
    }
}
