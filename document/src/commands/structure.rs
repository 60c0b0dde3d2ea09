//! Commands that change the shape of the tree.

use folio_core::{EditCommand, EditError, EditResult};

use super::{already_executed, forget_detached, not_executed};
use crate::document::{Document, Placement, Subtree};
use crate::error::DocumentError;
use crate::handle::{NodeHandle, NodeRef, PendingHandle};
use crate::record::Record;

/// Resolves an insertion index, `None` meaning "append".
fn insertion_index(doc: &Document, parent: NodeHandle, index: Option<usize>) -> EditResult<usize> {
    let len = doc.children(parent)?.len();
    Ok(index.unwrap_or(len))
}

/// Attaches a new record.
///
/// The node is created on the first execute; undo detaches it and redo
/// attaches the same node again, so its handle stays the same across
/// undo/redo.
#[derive(Debug)]
pub struct CreateRecord {
    parent: NodeRef,
    index: Option<usize>,
    record: Record,
    created: PendingHandle,
    /// Set by undo, consumed by redo.
    detached_from: Option<Placement>,
    executed: bool,
}

impl CreateRecord {
    /// Creates under `parent` at `index`, or as the last child if `None`.
    pub fn new(parent: impl Into<NodeRef>, index: Option<usize>, record: Record) -> Self {
        Self {
            parent: parent.into(),
            index,
            record,
            created: PendingHandle::new(),
            detached_from: None,
            executed: false,
        }
    }

    /// The node this command creates, resolvable once it has executed.
    pub fn created(&self) -> PendingHandle {
        self.created.clone()
    }
}

impl EditCommand<Document> for CreateRecord {
    fn execute(&mut self, doc: &mut Document) -> EditResult {
        if self.executed {
            return Err(already_executed(self));
        }
        match (self.created.get(), self.detached_from.take()) {
            (Some(handle), Some(placement)) => {
                if let Err(e) = doc.reattach(handle, placement) {
                    self.detached_from = Some(placement);
                    return Err(e.into());
                }
            }
            _ => {
                let parent = self.parent.resolve()?;
                let index = insertion_index(doc, parent, self.index)?;
                let handle = doc.attach(parent, index, self.record.clone())?;
                self.created.fill(handle);
            }
        }
        self.executed = true;
        Ok(())
    }

    fn unexecute(&mut self, doc: &mut Document) -> EditResult {
        let handle = match self.created.get() {
            Some(handle) if self.executed => handle,
            _ => return Err(not_executed(self)),
        };
        self.detached_from = Some(doc.detach(handle)?);
        self.executed = false;
        Ok(())
    }

    fn label(&self) -> &str {
        "Create Record"
    }

    fn discard(&mut self, doc: &mut Document) {
        if let Some(handle) = self.created.get()
            && !self.executed
        {
            self.detached_from = None;
            forget_detached(doc, handle);
        }
    }
}

/// Detaches a node and everything below it.
///
/// Undo re-attaches it to the original parent at the original index. The
/// node is kept, not destroyed, so handles into the subtree remain usable.
#[derive(Debug)]
pub struct DeleteRecord {
    target: NodeRef,
    label: String,
    placement: Option<Placement>,
}

impl DeleteRecord {
    /// Deletes `target`, labelled "Delete Record".
    pub fn new(target: impl Into<NodeRef>) -> Self {
        Self {
            target: target.into(),
            label: "Delete Record".to_owned(),
            placement: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// The node this command deletes, if known.
    pub fn target(&self) -> Option<NodeHandle> {
        self.target.resolve().ok()
    }
}

impl EditCommand<Document> for DeleteRecord {
    fn execute(&mut self, doc: &mut Document) -> EditResult {
        let handle = self.target.resolve()?;
        self.placement = Some(doc.detach(handle)?);
        Ok(())
    }

    fn unexecute(&mut self, doc: &mut Document) -> EditResult {
        let handle = self.target.resolve()?;
        let placement = self.placement.take().ok_or_else(|| not_executed(self))?;
        if let Err(e) = doc.reattach(handle, placement) {
            self.placement = Some(placement);
            return Err(e.into());
        }
        Ok(())
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn discard(&mut self, doc: &mut Document) {
        if self.placement.take().is_some()
            && let Ok(handle) = self.target.resolve()
        {
            forget_detached(doc, handle);
        }
    }
}

/// Moves a node to an explicit parent and index.
#[derive(Debug)]
pub struct MoveRecord {
    target: NodeRef,
    parent: NodeRef,
    index: Option<usize>,
    /// Where the node was before the last execute.
    original: Option<Placement>,
}

impl MoveRecord {
    /// Moves under `parent` at `index`, or to the end if `None`.
    pub fn new(target: impl Into<NodeRef>, parent: impl Into<NodeRef>, index: Option<usize>) -> Self {
        Self {
            target: target.into(),
            parent: parent.into(),
            index,
            original: None,
        }
    }
}

impl EditCommand<Document> for MoveRecord {
    fn execute(&mut self, doc: &mut Document) -> EditResult {
        let handle = self.target.resolve()?;
        let parent = self.parent.resolve()?;
        let index = match self.index {
            Some(index) => index,
            None => {
                let len = doc.children(parent)?.len();
                // Appending within the same parent: the node leaves first.
                let same_parent = doc.parent(handle)? == Some(parent);
                len - usize::from(same_parent)
            }
        };
        self.original = Some(doc.move_node(handle, parent, index)?);
        Ok(())
    }

    fn unexecute(&mut self, doc: &mut Document) -> EditResult {
        let handle = self.target.resolve()?;
        let original = self.original.take().ok_or_else(|| not_executed(self))?;
        doc.move_node(handle, original.parent, original.index)?;
        Ok(())
    }

    fn label(&self) -> &str {
        "Move Record"
    }
}

/// Moves a node up one level, to just after its parent.
///
/// The parent and grandparent are captured when the command is built; the
/// command refuses to run if the node has been moved elsewhere since.
#[derive(Debug)]
pub struct PromoteRecord {
    target: NodeHandle,
    parent: NodeHandle,
    grandparent: NodeHandle,
    original: Option<Placement>,
}

impl PromoteRecord {
    /// Captures `target`'s parent and grandparent from `doc`. Fails with
    /// [`DocumentError::CannotPromote`] when there is no grandparent.
    pub fn new(doc: &Document, target: NodeHandle) -> Result<Self, DocumentError> {
        let parent = doc
            .parent(target)?
            .ok_or(DocumentError::CannotPromote(target))?;
        let grandparent = doc
            .parent(parent)?
            .ok_or(DocumentError::CannotPromote(target))?;
        Ok(Self {
            target,
            parent,
            grandparent,
            original: None,
        })
    }

    pub fn target(&self) -> NodeHandle {
        self.target
    }
}

impl EditCommand<Document> for PromoteRecord {
    fn execute(&mut self, doc: &mut Document) -> EditResult {
        if doc.parent(self.target)? != Some(self.parent) {
            return Err(EditError::InvalidState(format!(
                "{} is no longer a child of {}",
                self.target, self.parent
            )));
        }
        let after_parent = doc
            .placement(self.parent)?
            .filter(|placement| placement.parent == self.grandparent)
            .ok_or(DocumentError::CannotPromote(self.target))?
            .index
            + 1;
        self.original = Some(doc.move_node(self.target, self.grandparent, after_parent)?);
        Ok(())
    }

    fn unexecute(&mut self, doc: &mut Document) -> EditResult {
        let original = self.original.take().ok_or_else(|| not_executed(self))?;
        doc.move_node(self.target, original.parent, original.index)?;
        Ok(())
    }

    fn label(&self) -> &str {
        "Promote"
    }
}

/// Inserts a whole subtree, such as a new entry.
///
/// Like [`CreateRecord`], the subtree is built once and re-attached on redo.
#[derive(Debug)]
pub struct InsertSubtree {
    parent: NodeRef,
    index: Option<usize>,
    tree: Subtree,
    created: PendingHandle,
    detached_from: Option<Placement>,
    executed: bool,
}

impl InsertSubtree {
    /// Inserts `tree` under `parent` at `index`, or as the last child if `None`.
    pub fn new(parent: impl Into<NodeRef>, index: Option<usize>, tree: Subtree) -> Self {
        Self {
            parent: parent.into(),
            index,
            tree,
            created: PendingHandle::new(),
            detached_from: None,
            executed: false,
        }
    }

    /// The top of the inserted subtree, resolvable once executed.
    pub fn created(&self) -> PendingHandle {
        self.created.clone()
    }
}

impl EditCommand<Document> for InsertSubtree {
    fn execute(&mut self, doc: &mut Document) -> EditResult {
        if self.executed {
            return Err(already_executed(self));
        }
        match (self.created.get(), self.detached_from.take()) {
            (Some(handle), Some(placement)) => {
                if let Err(e) = doc.reattach(handle, placement) {
                    self.detached_from = Some(placement);
                    return Err(e.into());
                }
            }
            _ => {
                let parent = self.parent.resolve()?;
                let index = insertion_index(doc, parent, self.index)?;
                let handle = doc.insert_subtree(parent, index, &self.tree)?;
                self.created.fill(handle);
            }
        }
        self.executed = true;
        Ok(())
    }

    fn unexecute(&mut self, doc: &mut Document) -> EditResult {
        let handle = match self.created.get() {
            Some(handle) if self.executed => handle,
            _ => return Err(not_executed(self)),
        };
        self.detached_from = Some(doc.detach(handle)?);
        self.executed = false;
        Ok(())
    }

    fn label(&self) -> &str {
        "Insert Entry"
    }

    fn discard(&mut self, doc: &mut Document) {
        if let Some(handle) = self.created.get()
            && !self.executed
        {
            self.detached_from = None;
            forget_detached(doc, handle);
        }
    }
}

/// Swaps a node for a freshly built subtree at the same position.
///
/// The replacement gets a new handle; the old node is detached, not
/// destroyed, and comes back on undo.
#[derive(Debug)]
pub struct ReplaceSubtree {
    target: NodeRef,
    tree: Subtree,
    replacement: PendingHandle,
    executed: bool,
}

impl ReplaceSubtree {
    /// Replaces `target` by a new subtree built from `tree`.
    pub fn new(target: impl Into<NodeRef>, tree: Subtree) -> Self {
        Self {
            target: target.into(),
            tree,
            replacement: PendingHandle::new(),
            executed: false,
        }
    }

    /// The new node, resolvable once executed.
    pub fn replacement(&self) -> PendingHandle {
        self.replacement.clone()
    }

    /// Detaches `out` and attaches `into` where it was.
    fn swap(doc: &mut Document, out: NodeHandle, into: NodeHandle) -> EditResult {
        let placement = doc.detach(out)?;
        if let Err(e) = doc.reattach(into, placement) {
            doc.reattach(out, placement)?;
            return Err(e.into());
        }
        Ok(())
    }
}

impl EditCommand<Document> for ReplaceSubtree {
    fn execute(&mut self, doc: &mut Document) -> EditResult {
        let original = self.target.resolve()?;
        match self.replacement.get() {
            Some(replacement) => Self::swap(doc, original, replacement)?,
            None => {
                let placement = doc.detach(original)?;
                match doc.insert_subtree(placement.parent, placement.index, &self.tree) {
                    Ok(handle) => {
                        self.replacement.fill(handle);
                    }
                    Err(e) => {
                        doc.reattach(original, placement)?;
                        return Err(e.into());
                    }
                }
            }
        }
        self.executed = true;
        Ok(())
    }

    fn unexecute(&mut self, doc: &mut Document) -> EditResult {
        let replacement = match self.replacement.get() {
            Some(handle) if self.executed => handle,
            _ => return Err(not_executed(self)),
        };
        let original = self.target.resolve()?;
        Self::swap(doc, replacement, original)?;
        self.executed = false;
        Ok(())
    }

    fn label(&self) -> &str {
        "Replace Entry"
    }

    /// Releases whichever side is out of the tree: the original once
    /// replaced, the replacement once undone.
    fn discard(&mut self, doc: &mut Document) {
        let Some(replacement) = self.replacement.get() else {
            return;
        };
        let out = if self.executed {
            self.target.resolve().ok()
        } else {
            Some(replacement)
        };
        if let Some(handle) = out {
            forget_detached(doc, handle);
        }
    }
}

/// Puts a parent's children in a new order.
#[derive(Debug)]
pub struct ReorderChildren {
    parent: NodeRef,
    order: Vec<NodeHandle>,
    previous: Option<Vec<NodeHandle>>,
}

impl ReorderChildren {
    /// `order` must list exactly the parent's current children.
    pub fn new(parent: impl Into<NodeRef>, order: Vec<NodeHandle>) -> Self {
        Self {
            parent: parent.into(),
            order,
            previous: None,
        }
    }
}

impl EditCommand<Document> for ReorderChildren {
    fn execute(&mut self, doc: &mut Document) -> EditResult {
        let parent = self.parent.resolve()?;
        self.previous = Some(doc.reorder_children(parent, &self.order)?);
        Ok(())
    }

    fn unexecute(&mut self, doc: &mut Document) -> EditResult {
        let parent = self.parent.resolve()?;
        let previous = self.previous.take().ok_or_else(|| not_executed(self))?;
        doc.reorder_children(parent, &previous)?;
        Ok(())
    }

    fn label(&self) -> &str {
        "Reorder"
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::commands::tests::{assert_round_trip, sample};
    use crate::record::Class;

    #[test]
    fn create_appends_and_keeps_handle_across_redo() {
        let (mut doc, s) = sample();
        let mut cmd = CreateRecord::new(s.nucleotide, None, Record::feature("rRNA"));
        let created = cmd.created();
        assert!(!created.is_resolved());

        assert_round_trip(&mut doc, &mut cmd);
        let handle = created.get().unwrap();

        cmd.execute(&mut doc).unwrap();
        assert_eq!(created.get(), Some(handle));
        assert_eq!(doc.children(s.nucleotide).unwrap().last(), Some(&handle));
        assert_eq!(doc.record(handle).unwrap().feature_type(), Some("rRNA"));
    }

    #[test]
    fn create_at_index() {
        let (mut doc, s) = sample();
        let mut cmd = CreateRecord::new(s.nucleotide, Some(0), Record::descriptor("comment", "x"));
        cmd.execute(&mut doc).unwrap();
        assert_eq!(
            doc.children(s.nucleotide).unwrap()[0],
            cmd.created().get().unwrap()
        );
    }

    #[test]
    fn create_under_pending_parent() {
        let (mut doc, s) = sample();
        let mut set = CreateRecord::new(s.root, None, Record::set(Class::PopSet));
        let mut seq = CreateRecord::new(set.created(), None, Record::sequence("NC_7", Class::Nucleotide));

        assert!(matches!(
            seq.execute(&mut doc).unwrap_err(),
            EditError::TargetNotFound(_)
        ));
        set.execute(&mut doc).unwrap();
        seq.execute(&mut doc).unwrap();
        assert_eq!(
            doc.parent(seq.created().get().unwrap()).unwrap(),
            set.created().get()
        );
    }

    #[rstest]
    #[case::first_child(0)]
    #[case::middle_child(2)]
    #[case::last_child(3)]
    fn delete_restores_original_position(#[case] position: usize) {
        let (mut doc, s) = sample();
        let target = doc.children(s.nucleotide).unwrap()[position];
        let mut cmd = DeleteRecord::new(target);
        assert_round_trip(&mut doc, &mut cmd);
        assert_eq!(doc.children(s.nucleotide).unwrap()[position], target);
    }

    #[test]
    fn delete_keeps_subtree_handles() {
        let (mut doc, s) = sample();
        let mut cmd = DeleteRecord::new(s.protein);
        cmd.execute(&mut doc).unwrap();
        assert!(doc.is_valid(s.prot_feature));
        assert!(!doc.is_attached(s.prot_feature));
        cmd.unexecute(&mut doc).unwrap();
        assert!(doc.is_attached(s.prot_feature));
    }

    #[test]
    fn delete_root_fails() {
        let (mut doc, s) = sample();
        let err = DeleteRecord::new(s.root).execute(&mut doc).unwrap_err();
        assert!(matches!(err, EditError::InvalidState(_)));
    }

    #[rstest]
    #[case::to_other_sequence(Some(0))]
    #[case::append_to_other_sequence(None)]
    fn move_round_trips(#[case] index: Option<usize>) {
        let (mut doc, s) = sample();
        let mut cmd = MoveRecord::new(s.gene, s.lone, index);
        assert_round_trip(&mut doc, &mut cmd);
        cmd.execute(&mut doc).unwrap();
        assert_eq!(doc.parent(s.gene).unwrap(), Some(s.lone));
    }

    #[test]
    fn move_append_within_same_parent() {
        let (mut doc, s) = sample();
        let mut cmd = MoveRecord::new(s.gene, s.nucleotide, None);
        assert_round_trip(&mut doc, &mut cmd);
        cmd.execute(&mut doc).unwrap();
        assert_eq!(doc.children(s.nucleotide).unwrap().last(), Some(&s.gene));
    }

    #[test]
    fn move_into_own_subtree_fails_cleanly() {
        let (mut doc, s) = sample();
        let before = doc.snapshot(s.root).unwrap();
        let err = MoveRecord::new(s.nuc_prot, s.nucleotide, None)
            .execute(&mut doc)
            .unwrap_err();
        assert!(matches!(err, EditError::InvalidState(_)));
        assert_eq!(doc.snapshot(s.root).unwrap(), before);
    }

    #[test]
    fn promote_places_after_parent() {
        let (mut doc, s) = sample();
        let mut cmd = PromoteRecord::new(&doc, s.protein).unwrap();
        assert_round_trip(&mut doc, &mut cmd);

        cmd.execute(&mut doc).unwrap();
        assert_eq!(
            doc.placement(s.protein).unwrap(),
            Some(Placement {
                parent: s.root,
                index: 1
            })
        );
    }

    #[test]
    fn promote_requires_grandparent() {
        let (doc, s) = sample();
        assert_eq!(
            PromoteRecord::new(&doc, s.nuc_prot).unwrap_err(),
            DocumentError::CannotPromote(s.nuc_prot)
        );
        assert_eq!(
            PromoteRecord::new(&doc, s.root).unwrap_err(),
            DocumentError::CannotPromote(s.root)
        );
    }

    #[test]
    fn promote_refuses_after_node_moved() {
        let (mut doc, s) = sample();
        let mut cmd = PromoteRecord::new(&doc, s.gene).unwrap();
        doc.move_node(s.gene, s.lone, 0).unwrap();
        assert!(matches!(
            cmd.execute(&mut doc).unwrap_err(),
            EditError::InvalidState(_)
        ));
    }

    #[test]
    fn insert_subtree_round_trips() {
        let (mut doc, s) = sample();
        let entry = Subtree::leaf(Record::set(Class::NucProt))
            .with_child(Subtree::leaf(Record::sequence("NC_5", Class::Nucleotide)))
            .with_child(Subtree::leaf(Record::sequence("P_5", Class::Protein)));
        let mut cmd = InsertSubtree::new(s.root, Some(1), entry.clone());
        assert_round_trip(&mut doc, &mut cmd);

        cmd.execute(&mut doc).unwrap();
        let top = cmd.created().get().unwrap();
        assert_eq!(doc.snapshot(top).unwrap(), entry);
        assert_eq!(doc.children(s.root).unwrap()[1], top);
    }

    #[test]
    fn replace_swaps_and_restores() {
        let (mut doc, s) = sample();
        let replacement = Subtree::leaf(Record::sequence("NC_2", Class::Nucleotide))
            .with_child(Subtree::leaf(Record::descriptor("title", "replaced")));
        let mut cmd = ReplaceSubtree::new(s.lone, replacement.clone());
        assert_round_trip(&mut doc, &mut cmd);

        cmd.execute(&mut doc).unwrap();
        let new = cmd.replacement().get().unwrap();
        assert_ne!(new, s.lone);
        assert!(!doc.is_attached(s.lone));
        assert_eq!(doc.placement(new).unwrap().unwrap().index, 1);
        assert_eq!(doc.snapshot(new).unwrap(), replacement);
    }

    #[test]
    fn reorder_round_trips() {
        let (mut doc, s) = sample();
        let mut order = doc.children(s.nucleotide).unwrap().to_vec();
        order.reverse();
        let mut cmd = ReorderChildren::new(s.nucleotide, order.clone());
        assert_round_trip(&mut doc, &mut cmd);
        cmd.execute(&mut doc).unwrap();
        assert_eq!(doc.children(s.nucleotide).unwrap(), order.as_slice());
    }

    #[test]
    fn reorder_with_foreign_child_fails() {
        let (mut doc, s) = sample();
        let mut order = doc.children(s.nucleotide).unwrap().to_vec();
        order[0] = s.protein;
        let err = ReorderChildren::new(s.nucleotide, order)
            .execute(&mut doc)
            .unwrap_err();
        assert!(matches!(err, EditError::InvalidState(_)));
    }

    // -----------------------------------------------------------------------
    // Discard
    // -----------------------------------------------------------------------

    #[test]
    fn discarding_undone_create_frees_the_node() {
        let (mut doc, s) = sample();
        let count = doc.node_count();
        let mut cmd = CreateRecord::new(s.lone, None, Record::feature("rRNA"));
        cmd.execute(&mut doc).unwrap();
        let created = cmd.created().get().unwrap();
        cmd.unexecute(&mut doc).unwrap();
        assert_eq!(doc.node_count(), count + 1);

        cmd.discard(&mut doc);
        assert!(!doc.is_valid(created));
        assert_eq!(doc.node_count(), count);
    }

    #[test]
    fn discarding_executed_create_keeps_the_node() {
        let (mut doc, s) = sample();
        let mut cmd = CreateRecord::new(s.lone, None, Record::feature("rRNA"));
        cmd.execute(&mut doc).unwrap();
        cmd.discard(&mut doc);
        assert!(doc.is_attached(cmd.created().get().unwrap()));
    }

    #[rstest]
    #[case::executed(true)]
    #[case::undone(false)]
    fn discarding_delete(#[case] executed: bool) {
        let (mut doc, s) = sample();
        let count = doc.node_count();
        let mut cmd = DeleteRecord::new(s.protein);
        cmd.execute(&mut doc).unwrap();
        if !executed {
            cmd.unexecute(&mut doc).unwrap();
        }

        cmd.discard(&mut doc);
        // The protein and its one feature go only if they were out of the tree.
        assert_eq!(doc.is_valid(s.prot_feature), !executed);
        assert_eq!(doc.node_count(), if executed { count - 2 } else { count });
    }

    #[test]
    fn discarding_undone_insert_frees_the_whole_subtree() {
        let (mut doc, s) = sample();
        let count = doc.node_count();
        let entry = Subtree::leaf(Record::set(Class::NucProt))
            .with_child(Subtree::leaf(Record::sequence("NC_5", Class::Nucleotide)));
        let mut cmd = InsertSubtree::new(s.root, None, entry);
        cmd.execute(&mut doc).unwrap();
        cmd.unexecute(&mut doc).unwrap();

        cmd.discard(&mut doc);
        assert_eq!(doc.node_count(), count);
    }

    #[rstest]
    #[case::executed(true)]
    #[case::undone(false)]
    fn discarding_replace_frees_the_side_out_of_the_tree(#[case] executed: bool) {
        let (mut doc, s) = sample();
        let mut cmd = ReplaceSubtree::new(s.lone, Subtree::leaf(Record::sequence("NC_2", Class::Nucleotide)));
        cmd.execute(&mut doc).unwrap();
        let new = cmd.replacement().get().unwrap();
        if !executed {
            cmd.unexecute(&mut doc).unwrap();
        }

        cmd.discard(&mut doc);
        let (kept, freed) = if executed { (new, s.lone) } else { (s.lone, new) };
        assert!(doc.is_attached(kept));
        assert!(!doc.is_valid(freed));
    }

    #[rstest]
    #[case::create(Box::new(CreateRecord::new(NodeHandle::new(0, 0), None, Record::feature("x"))) as Box<dyn EditCommand<Document>>)]
    #[case::delete(Box::new(DeleteRecord::new(NodeHandle::new(1, 0))))]
    #[case::move_record(Box::new(MoveRecord::new(NodeHandle::new(1, 0), NodeHandle::new(0, 0), None)))]
    #[case::insert(Box::new(InsertSubtree::new(NodeHandle::new(0, 0), None, Subtree::leaf(Record::feature("x")))))]
    #[case::replace(Box::new(ReplaceSubtree::new(NodeHandle::new(1, 0), Subtree::leaf(Record::feature("x")))))]
    #[case::reorder(Box::new(ReorderChildren::new(NodeHandle::new(0, 0), Vec::new())))]
    fn unexecute_before_execute_is_rejected(#[case] mut cmd: Box<dyn EditCommand<Document>>) {
        let (mut doc, _) = sample();
        let before = doc.snapshot(doc.root()).unwrap();
        assert!(matches!(
            cmd.unexecute(&mut doc).unwrap_err(),
            EditError::NotExecuted(_)
        ));
        assert_eq!(doc.snapshot(doc.root()).unwrap(), before);
    }
}
