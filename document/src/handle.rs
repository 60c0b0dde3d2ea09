use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::error::{DocResult, DocumentError};

/// A generational reference to a node of a [`Document`](crate::Document).
///
/// Layout: `u32 index` + `u32 generation`.
///
/// - **index**: slot in the document's node arena
/// - **generation**: bumped each time the slot is freed, so a handle to a
///   removed node never resolves to whatever reuses its slot
///
/// Detaching a node does not free its slot: the handle stays valid and the
/// node can be attached again. Only [`Document::remove`](crate::Document::remove)
/// makes handles stale.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle {
    index: u32,
    generation: u32,
}

impl NodeHandle {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Returns the arena slot of this handle.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeHandle({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

/// A handle that does not exist yet.
///
/// Filled exactly once by the command that creates the node, the first time
/// it executes. Clones share the cell, so a later command in the same
/// composite can target a node an earlier command is going to create.
#[derive(Clone, Default)]
pub struct PendingHandle {
    cell: Arc<OnceLock<NodeHandle>>,
}

impl PendingHandle {
    /// An empty cell for a node that does not exist yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The created handle, once the creating command has run.
    pub fn get(&self) -> Option<NodeHandle> {
        self.cell.get().copied()
    }

    /// Whether the creating command has filled the cell.
    pub fn is_resolved(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Records the created node. Later calls keep the first value.
    pub(crate) fn fill(&self, handle: NodeHandle) -> NodeHandle {
        *self.cell.get_or_init(|| handle)
    }
}

impl fmt::Debug for PendingHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(handle) => write!(f, "PendingHandle({handle})"),
            None => f.write_str("PendingHandle(<unresolved>)"),
        }
    }
}

/// The node a command operates on: known now, or created by an earlier
/// command.
#[derive(Debug, Clone)]
pub enum NodeRef {
    Fixed(NodeHandle),
    Pending(PendingHandle),
}

impl NodeRef {
    /// The handle to operate on.
    ///
    /// Fails with [`DocumentError::Unresolved`] if the creating command has
    /// not executed yet.
    pub fn resolve(&self) -> DocResult<NodeHandle> {
        match self {
            Self::Fixed(handle) => Ok(*handle),
            Self::Pending(pending) => pending.get().ok_or(DocumentError::Unresolved),
        }
    }
}

impl From<NodeHandle> for NodeRef {
    fn from(handle: NodeHandle) -> Self {
        Self::Fixed(handle)
    }
}

impl From<PendingHandle> for NodeRef {
    fn from(pending: PendingHandle) -> Self {
        Self::Pending(pending)
    }
}

impl From<&PendingHandle> for NodeRef {
    fn from(pending: &PendingHandle) -> Self {
        Self::Pending(pending.clone())
    }
}
