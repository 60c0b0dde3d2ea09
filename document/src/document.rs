//! The record tree.
//!
//! Nodes live in a generational arena. The root is created with the document
//! and can be edited but never moved or removed. Every other node is either
//! attached (its parent chain reaches the root) or detached (kept in the
//! arena, with its descendants, until it is attached again or removed).
//!
//! Structural invariants, kept by every operation below:
//! - a node appears in its parent's child list exactly once
//! - a node's `parent` is the node whose child list contains it
//! - no node is its own ancestor

use folio_core::Editable;

use crate::error::{DocResult, DocumentError};
use crate::handle::NodeHandle;
use crate::record::Record;

/// Where a node sits: its parent and its position among the parent's
/// children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub parent: NodeHandle,
    pub index: usize,
}

/// An owned copy of a node and everything below it.
///
/// Used to insert whole entries at once and to compare document states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtree {
    pub record: Record,
    pub children: Vec<Subtree>,
}

impl Subtree {
    pub fn leaf(record: Record) -> Self {
        Self {
            record,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: Subtree) -> Self {
        self.children.push(child);
        self
    }

    /// Number of nodes, including this one.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(Subtree::len).sum::<usize>()
    }
}

#[derive(Debug)]
struct Node {
    record: Record,
    parent: Option<NodeHandle>,
    children: Vec<NodeHandle>,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// A tree of [`Record`]s addressed by [`NodeHandle`]s.
#[derive(Debug)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeHandle,
}

impl Editable for Document {}

impl Document {
    /// Creates a document holding only `root`.
    pub fn new(root: Record) -> Self {
        let mut document = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeHandle::new(0, 0),
        };
        document.root = document.alloc(root, None);
        document
    }

    /// Builds a document whose root and descendants mirror `tree`.
    pub fn from_subtree(tree: &Subtree) -> Self {
        let mut document = Self::new(tree.record.clone());
        let root = document.root;
        for child in &tree.children {
            let handle = document.alloc_tree(child);
            document.link(handle, root, document.child_count(root));
        }
        document
    }

    // -----------------------------------------------------------------------
    // Reading
    // -----------------------------------------------------------------------

    /// The root node. It is never detached or removed.
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    /// Whether `handle` refers to a live node, attached or not.
    pub fn is_valid(&self, handle: NodeHandle) -> bool {
        self.node(handle).is_ok()
    }

    /// Whether `handle` is live and its parent chain reaches the root.
    pub fn is_attached(&self, handle: NodeHandle) -> bool {
        let mut current = handle;
        loop {
            if current == self.root {
                return true;
            }
            match self.node(current) {
                Ok(Node {
                    parent: Some(parent),
                    ..
                }) => current = *parent,
                _ => return false,
            }
        }
    }

    /// The record of a live node. Detached nodes can be read.
    pub fn record(&self, handle: NodeHandle) -> DocResult<&Record> {
        Ok(&self.node(handle)?.record)
    }

    /// Like [`record`](Self::record), `None` for stale handles.
    pub fn get(&self, handle: NodeHandle) -> Option<&Record> {
        self.record(handle).ok()
    }

    /// The node's parent; `None` for the root and detached subtree tops.
    pub fn parent(&self, handle: NodeHandle) -> DocResult<Option<NodeHandle>> {
        Ok(self.node(handle)?.parent)
    }

    /// The node's children in order.
    pub fn children(&self, handle: NodeHandle) -> DocResult<&[NodeHandle]> {
        Ok(&self.node(handle)?.children)
    }

    /// Where the node sits, or `None` for the root and detached subtree tops.
    pub fn placement(&self, handle: NodeHandle) -> DocResult<Option<Placement>> {
        let Some(parent) = self.node(handle)?.parent else {
            return Ok(None);
        };
        let index = self
            .node(parent)?
            .children
            .iter()
            .position(|&child| child == handle)
            .ok_or(DocumentError::StaleHandle(handle))?;
        Ok(Some(Placement { parent, index }))
    }

    /// `handle` and every node below it, in pre-order.
    pub fn descendants(&self, handle: NodeHandle) -> DocResult<Vec<NodeHandle>> {
        self.node(handle)?;
        let mut out = Vec::new();
        let mut stack = vec![handle];
        while let Some(current) = stack.pop() {
            out.push(current);
            let node = self.node(current)?;
            stack.extend(node.children.iter().rev().copied());
        }
        Ok(out)
    }

    /// Whether `ancestor` is `handle` or lies on its parent chain.
    pub fn is_ancestor_or_self(&self, ancestor: NodeHandle, handle: NodeHandle) -> bool {
        let mut current = Some(handle);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.node(node).ok().and_then(|n| n.parent);
        }
        false
    }

    /// The first attached node, in pre-order from the root, with this id.
    pub fn find_by_id(&self, id: &str) -> Option<NodeHandle> {
        self.find_by_id_under(self.root, id)
    }

    /// The first node under `scope` (inclusive), in pre-order, with this id.
    pub fn find_by_id_under(&self, scope: NodeHandle, id: &str) -> Option<NodeHandle> {
        self.descendants(scope)
            .ok()?
            .into_iter()
            .find(|&handle| self.get(handle).and_then(|r| r.id.as_deref()) == Some(id))
    }

    /// An owned copy of the subtree at `handle`.
    pub fn snapshot(&self, handle: NodeHandle) -> DocResult<Subtree> {
        let node = self.node(handle)?;
        let children = node
            .children
            .iter()
            .map(|&child| self.snapshot(child))
            .collect::<DocResult<Vec<_>>>()?;
        Ok(Subtree {
            record: node.record.clone(),
            children,
        })
    }

    /// Live nodes, attached or not.
    pub fn node_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.node.is_some()).count()
    }

    // -----------------------------------------------------------------------
    // Editing
    // -----------------------------------------------------------------------

    /// Mutable access to an attached node's record.
    pub fn edit(&mut self, handle: NodeHandle) -> DocResult<&mut Record> {
        self.require_attached(handle)?;
        Ok(&mut self.node_mut(handle)?.record)
    }

    /// Replaces an attached node's record, returning the old value.
    pub fn replace_record(&mut self, handle: NodeHandle, record: Record) -> DocResult<Record> {
        Ok(std::mem::replace(self.edit(handle)?, record))
    }

    /// Creates a node under `parent` at `index` (`index == len` appends).
    pub fn attach(
        &mut self,
        parent: NodeHandle,
        index: usize,
        record: Record,
    ) -> DocResult<NodeHandle> {
        self.check_insert(parent, index)?;
        let handle = self.alloc(record, None);
        self.link(handle, parent, index);
        log::trace!("attached {handle} under {parent} at {index}");
        Ok(handle)
    }

    /// Creates a copy of `tree` under `parent` at `index`, returning its top.
    pub fn insert_subtree(
        &mut self,
        parent: NodeHandle,
        index: usize,
        tree: &Subtree,
    ) -> DocResult<NodeHandle> {
        self.check_insert(parent, index)?;
        let handle = self.alloc_tree(tree);
        self.link(handle, parent, index);
        log::trace!(
            "inserted subtree {handle} ({} nodes) under {parent} at {index}",
            tree.len()
        );
        Ok(handle)
    }

    /// Unlinks an attached node from its parent.
    ///
    /// The node and its descendants stay in the arena and their handles stay
    /// valid. Returns where the node was, for [`reattach`](Self::reattach).
    pub fn detach(&mut self, handle: NodeHandle) -> DocResult<Placement> {
        if handle == self.root {
            return Err(DocumentError::RootImmutable);
        }
        self.require_attached(handle)?;
        let placement = self
            .placement(handle)?
            .ok_or(DocumentError::Detached(handle))?;
        self.unlink(handle, placement);
        log::trace!("detached {handle} from {}", placement.parent);
        Ok(placement)
    }

    /// Links a detached node back into the tree.
    pub fn reattach(&mut self, handle: NodeHandle, placement: Placement) -> DocResult<()> {
        if handle == self.root {
            return Err(DocumentError::RootImmutable);
        }
        if self.node(handle)?.parent.is_some() {
            return Err(DocumentError::AlreadyAttached(handle));
        }
        self.check_insert(placement.parent, placement.index)?;
        if self.is_ancestor_or_self(handle, placement.parent) {
            return Err(DocumentError::WouldCycle(handle));
        }
        self.link(handle, placement.parent, placement.index);
        log::trace!("reattached {handle} under {}", placement.parent);
        Ok(())
    }

    /// Moves an attached node to `parent` at `index`.
    ///
    /// `index` is a position in the parent's child list with the node already
    /// taken out. Returns the old placement; moving back to it restores the
    /// tree exactly.
    pub fn move_node(
        &mut self,
        handle: NodeHandle,
        parent: NodeHandle,
        index: usize,
    ) -> DocResult<Placement> {
        if handle == self.root {
            return Err(DocumentError::RootImmutable);
        }
        self.require_attached(handle)?;
        self.require_attached(parent)?;
        if self.is_ancestor_or_self(handle, parent) {
            return Err(DocumentError::WouldCycle(handle));
        }
        let old = self
            .placement(handle)?
            .ok_or(DocumentError::Detached(handle))?;
        let len = self.child_count(parent) - usize::from(old.parent == parent);
        if index > len {
            return Err(DocumentError::IndexOutOfBounds { index, len });
        }
        self.unlink(handle, old);
        self.link(handle, parent, index);
        log::trace!("moved {handle} to {parent} at {index}");
        Ok(old)
    }

    /// Sets the order of `parent`'s children, returning the previous order.
    ///
    /// `order` must contain exactly the current children.
    pub fn reorder_children(
        &mut self,
        parent: NodeHandle,
        order: &[NodeHandle],
    ) -> DocResult<Vec<NodeHandle>> {
        self.require_attached(parent)?;
        let current = &self.node(parent)?.children;
        let mut expected = current.clone();
        let mut proposed = order.to_vec();
        expected.sort_unstable();
        proposed.sort_unstable();
        if expected != proposed {
            return Err(DocumentError::InvalidOrder);
        }
        let node = self.node_mut(parent)?;
        Ok(std::mem::replace(&mut node.children, order.to_vec()))
    }

    /// Deletes a node and its descendants for good.
    ///
    /// Their slots are freed and every handle into the subtree becomes
    /// stale. Returns what was removed.
    pub fn remove(&mut self, handle: NodeHandle) -> DocResult<Subtree> {
        if handle == self.root {
            return Err(DocumentError::RootImmutable);
        }
        let removed = self.snapshot(handle)?;
        if let Some(placement) = self.placement(handle)? {
            self.unlink(handle, placement);
        }
        for node in self.descendants(handle)? {
            self.release(node);
        }
        log::trace!("removed {handle} ({} nodes)", removed.len());
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn node(&self, handle: NodeHandle) -> DocResult<&Node> {
        self.slots
            .get(handle.index() as usize)
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.node.as_ref())
            .ok_or(DocumentError::StaleHandle(handle))
    }

    fn node_mut(&mut self, handle: NodeHandle) -> DocResult<&mut Node> {
        self.slots
            .get_mut(handle.index() as usize)
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.node.as_mut())
            .ok_or(DocumentError::StaleHandle(handle))
    }

    fn require_attached(&self, handle: NodeHandle) -> DocResult<()> {
        self.node(handle)?;
        if self.is_attached(handle) {
            Ok(())
        } else {
            Err(DocumentError::Detached(handle))
        }
    }

    fn child_count(&self, handle: NodeHandle) -> usize {
        self.node(handle).map_or(0, |node| node.children.len())
    }

    fn check_insert(&self, parent: NodeHandle, index: usize) -> DocResult<()> {
        self.require_attached(parent)?;
        let len = self.child_count(parent);
        if index > len {
            return Err(DocumentError::IndexOutOfBounds { index, len });
        }
        Ok(())
    }

    fn alloc(&mut self, record: Record, parent: Option<NodeHandle>) -> NodeHandle {
        let node = Node {
            record,
            parent,
            children: Vec::new(),
        };
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeHandle::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeHandle::new(index, 0)
        }
    }

    /// Allocates `tree` as a detached subtree and returns its top.
    fn alloc_tree(&mut self, tree: &Subtree) -> NodeHandle {
        let top = self.alloc(tree.record.clone(), None);
        let children: Vec<NodeHandle> = tree
            .children
            .iter()
            .map(|child| {
                let handle = self.alloc_tree(child);
                if let Ok(node) = self.node_mut(handle) {
                    node.parent = Some(top);
                }
                handle
            })
            .collect();
        if let Ok(node) = self.node_mut(top) {
            node.children = children;
        }
        top
    }

    fn release(&mut self, handle: NodeHandle) {
        if let Some(slot) = self.slots.get_mut(handle.index() as usize)
            && slot.generation == handle.generation()
            && slot.node.take().is_some()
        {
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(handle.index());
        }
    }

    /// Callers have checked `parent` is live and `index` is in range.
    fn link(&mut self, handle: NodeHandle, parent: NodeHandle, index: usize) {
        if let Ok(node) = self.node_mut(parent) {
            node.children.insert(index, handle);
        }
        if let Ok(node) = self.node_mut(handle) {
            node.parent = Some(parent);
        }
    }

    fn unlink(&mut self, handle: NodeHandle, placement: Placement) {
        if let Ok(node) = self.node_mut(placement.parent) {
            node.children.remove(placement.index);
        }
        if let Ok(node) = self.node_mut(handle) {
            node.parent = None;
        }
    }
}
