//! Index-addressed node storage shared by the record store and the waiting queue.
//!
//! Nodes live in a `Vec` of slots and link to each other through [`NodeId`]s instead of
//! pointers. Removing a node vacates its slot (dropping the node) without reusing it, so an id
//! never silently points at a different node. Once the last live node is removed the slots are
//! released and allocation starts again from zero.

use std::ops::{Index, IndexMut};

/// Position of a node inside an [`Arena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

#[derive(Debug)]
pub(crate) struct Arena<N> {
    slots: Vec<Option<N>>,
    live: usize,
}

impl<N> Arena<N> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            live: 0,
        }
    }

    pub(crate) fn insert(&mut self, node: N) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Some(node));
        self.live += 1;
        id
    }

    /// Takes the node out of its slot. Returns `None` if the slot is already vacant.
    pub(crate) fn remove(&mut self, id: NodeId) -> Option<N> {
        let node = self.slots.get_mut(id.0)?.take()?;
        self.live -= 1;
        if self.live == 0 {
            self.slots.clear();
        }
        Some(node)
    }

    pub(crate) fn len(&self) -> usize {
        self.live
    }
}

impl<N> Default for Arena<N> {
    fn default() -> Self {
        Self::new()
    }
}

// Vacant slots are only reachable through a broken link, so indexing one panics like an
// out-of-bounds slice index.
impl<N> Index<NodeId> for Arena<N> {
    type Output = N;

    fn index(&self, id: NodeId) -> &N {
        match self.slots.get(id.0) {
            Some(Some(node)) => node,
            _ => panic!("no live node at arena slot {}", id.0),
        }
    }
}

impl<N> IndexMut<NodeId> for Arena<N> {
    fn index_mut(&mut self, id: NodeId) -> &mut N {
        match self.slots.get_mut(id.0) {
            Some(Some(node)) => node,
            _ => panic!("no live node at arena slot {}", id.0),
        }
    }
}
