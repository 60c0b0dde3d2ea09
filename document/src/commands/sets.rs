//! Grouping and ungrouping siblings in sets.

use folio_core::{EditCommand, EditResult};

use super::{already_executed, forget_detached, not_executed};
use crate::document::{Document, Placement};
use crate::error::{DocResult, DocumentError};
use crate::handle::{NodeHandle, PendingHandle};
use crate::record::{Class, Record, RecordKind};

/// Moves a group of siblings into a new set created where the first of them
/// was.
///
/// Undo moves them back and detaches the set; redo re-attaches the same set.
#[derive(Debug)]
pub struct WrapInSet {
    nodes: Vec<NodeHandle>,
    class: Class,
    set: PendingHandle,
    set_placement: Option<Placement>,
    /// Where each node was moved from, in move order.
    moved_from: Vec<Placement>,
    executed: bool,
}

impl WrapInSet {
    /// Wraps `nodes`, in this order, into a new set of `class`.
    pub fn new(nodes: Vec<NodeHandle>, class: Class) -> Self {
        Self {
            nodes,
            class,
            set: PendingHandle::new(),
            set_placement: None,
            moved_from: Vec::new(),
            executed: false,
        }
    }

    /// The wrapping set, resolvable once executed.
    pub fn set(&self) -> PendingHandle {
        self.set.clone()
    }

    /// The nodes must be distinct, attached, non-root siblings.
    fn check_siblings(&self, doc: &Document) -> DocResult<Placement> {
        let Some((&first, rest)) = self.nodes.split_first() else {
            return Err(DocumentError::NotSiblings);
        };
        if !doc.is_attached(first) {
            return Err(DocumentError::Detached(first));
        }
        let first_placement = doc.placement(first)?.ok_or(DocumentError::RootImmutable)?;
        for (i, &node) in rest.iter().enumerate() {
            if doc.parent(node)? != Some(first_placement.parent) || self.nodes[..=i].contains(&node) {
                return Err(DocumentError::NotSiblings);
            }
        }
        Ok(first_placement)
    }
}

/// Moves `nodes` back to where they came from, most recent first.
fn restore_moved(
    doc: &mut Document,
    nodes: &[NodeHandle],
    moved_from: &mut Vec<Placement>,
) -> DocResult<()> {
    for (&node, placement) in nodes.iter().zip(moved_from.iter()).rev() {
        doc.move_node(node, placement.parent, placement.index)?;
    }
    moved_from.clear();
    Ok(())
}

impl EditCommand<Document> for WrapInSet {
    fn execute(&mut self, doc: &mut Document) -> EditResult {
        if self.executed {
            return Err(already_executed(self));
        }
        let first = self.check_siblings(doc)?;
        let set = match (self.set.get(), self.set_placement.take()) {
            (Some(set), Some(placement)) => {
                doc.reattach(set, placement)?;
                set
            }
            _ => {
                let set = doc.attach(first.parent, first.index, Record::set(self.class))?;
                self.set.fill(set)
            }
        };

        self.moved_from.clear();
        for (i, &node) in self.nodes.iter().enumerate() {
            match doc.move_node(node, set, i) {
                Ok(from) => self.moved_from.push(from),
                Err(e) => {
                    restore_moved(doc, &self.nodes, &mut self.moved_from)?;
                    self.set_placement = Some(doc.detach(set)?);
                    return Err(e.into());
                }
            }
        }
        self.executed = true;
        Ok(())
    }

    fn unexecute(&mut self, doc: &mut Document) -> EditResult {
        let set = match self.set.get() {
            Some(set) if self.executed => set,
            _ => return Err(not_executed(self)),
        };
        restore_moved(doc, &self.nodes, &mut self.moved_from)?;
        self.set_placement = Some(doc.detach(set)?);
        self.executed = false;
        Ok(())
    }

    fn label(&self) -> &str {
        "Add Set"
    }

    fn discard(&mut self, doc: &mut Document) {
        if let Some(set) = self.set.get()
            && self.set_placement.take().is_some()
        {
            forget_detached(doc, set);
        }
    }
}

/// Replaces a set by its children, spliced in at the set's position.
///
/// Undo re-attaches the set and moves the children back into it in their
/// original order.
#[derive(Debug)]
pub struct UnwrapSet {
    set: NodeHandle,
    set_placement: Option<Placement>,
    children: Vec<NodeHandle>,
}

impl UnwrapSet {
    /// Dissolves `set`, which must be an attached non-root set.
    pub fn new(set: NodeHandle) -> Self {
        Self {
            set,
            set_placement: None,
            children: Vec::new(),
        }
    }
}

impl EditCommand<Document> for UnwrapSet {
    fn execute(&mut self, doc: &mut Document) -> EditResult {
        if self.set_placement.is_some() {
            return Err(already_executed(self));
        }
        if doc.record(self.set)?.kind != RecordKind::Set {
            return Err(DocumentError::WrongKind {
                handle: self.set,
                expected: RecordKind::Set,
            }
            .into());
        }
        if !doc.is_attached(self.set) {
            return Err(DocumentError::Detached(self.set).into());
        }
        let placement = doc
            .placement(self.set)?
            .ok_or(DocumentError::RootImmutable)?;

        let children = doc.children(self.set)?.to_vec();
        for (i, &child) in children.iter().enumerate() {
            doc.move_node(child, placement.parent, placement.index + 1 + i)?;
        }
        self.set_placement = Some(doc.detach(self.set)?);
        self.children = children;
        Ok(())
    }

    fn unexecute(&mut self, doc: &mut Document) -> EditResult {
        let placement = self.set_placement.take().ok_or_else(|| not_executed(self))?;
        doc.reattach(self.set, placement)?;
        for (i, &child) in self.children.iter().enumerate() {
            doc.move_node(child, self.set, i)?;
        }
        Ok(())
    }

    fn label(&self) -> &str {
        "Remove Set"
    }

    fn discard(&mut self, doc: &mut Document) {
        if self.set_placement.take().is_some() {
            forget_detached(doc, self.set);
        }
    }
}
