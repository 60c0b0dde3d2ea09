use folio_core::EditError;
use thiserror::Error;

use crate::handle::NodeHandle;
use crate::record::RecordKind;

/// Errors raised by [`Document`](crate::Document) operations and the
/// command builders in [`factory`](crate::factory).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// The node was removed; its slot may since have been reused.
    #[error("stale handle {0}")]
    StaleHandle(NodeHandle),
    /// The node exists but is not part of the document tree.
    #[error("node {0} is detached")]
    Detached(NodeHandle),
    /// The node already has a parent.
    #[error("node {0} is already attached")]
    AlreadyAttached(NodeHandle),
    #[error("the root node cannot be moved or removed")]
    RootImmutable,
    #[error("index {index} out of bounds for {len} children")]
    IndexOutOfBounds { index: usize, len: usize },
    /// The move would make a node its own ancestor.
    #[error("moving {0} there would create a cycle")]
    WouldCycle(NodeHandle),
    /// A reorder list is not a permutation of the current children.
    #[error("new child order is not a permutation of the current children")]
    InvalidOrder,
    /// The nodes given to a set operation do not share one parent.
    #[error("nodes must be distinct siblings")]
    NotSiblings,
    /// The node is not the kind of record the operation works on.
    #[error("node {handle} is not a {expected:?}")]
    WrongKind {
        handle: NodeHandle,
        expected: RecordKind,
    },
    /// The node has no grandparent to be promoted into.
    #[error("node {0} cannot be promoted")]
    CannotPromote(NodeHandle),
    /// Deleting the node would leave the document without an entry.
    #[error("cannot delete the last sequence of the entry")]
    LastSequence,
    /// A pending handle was used before its creating command ran.
    #[error("pending node has not been created yet")]
    Unresolved,
}

/// Result type for document operations.
pub type DocResult<T> = Result<T, DocumentError>;

impl From<DocumentError> for EditError {
    fn from(error: DocumentError) -> Self {
        match error {
            DocumentError::StaleHandle(_)
            | DocumentError::Detached(_)
            | DocumentError::Unresolved => EditError::TargetNotFound(error.to_string()),
            _ => EditError::InvalidState(error.to_string()),
        }
    }
}
