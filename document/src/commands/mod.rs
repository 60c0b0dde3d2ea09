//! Concrete edit commands over a [`Document`].
//!
//! Every command captures what it needs to reverse itself when it executes,
//! so `execute` followed by `unexecute` leaves the document exactly as it
//! was, and a redo after an undo reproduces the same state, handles
//! included. Commands take their targets as [`NodeRef`](crate::NodeRef)s
//! where a target may be created by an earlier command in the same
//! composite.
//!
//! - values: [`ChangeRecord`], [`SetField`], [`ChangeClass`], [`ChangeId`]
//! - structure: [`CreateRecord`], [`DeleteRecord`], [`MoveRecord`],
//!   [`PromoteRecord`], [`InsertSubtree`], [`ReplaceSubtree`],
//!   [`ReorderChildren`]
//! - sets: [`WrapInSet`], [`UnwrapSet`]

mod sets;
mod structure;
mod values;

use folio_core::{EditCommand, EditError};

use crate::document::Document;
use crate::handle::NodeHandle;

pub use sets::{UnwrapSet, WrapInSet};
pub use structure::{
    CreateRecord, DeleteRecord, InsertSubtree, MoveRecord, PromoteRecord, ReorderChildren,
    ReplaceSubtree,
};
pub use values::{ChangeClass, ChangeId, ChangeRecord, SetField};

fn not_executed(command: &dyn EditCommand<Document>) -> EditError {
    EditError::NotExecuted(command.label().to_owned())
}

fn already_executed(command: &dyn EditCommand<Document>) -> EditError {
    EditError::InvalidState(format!("'{}' is already executed", command.label()))
}

/// Destroys `handle` and its subtree if it is still detached. Nodes that are
/// attached or already gone are left alone.
fn forget_detached(doc: &mut Document, handle: NodeHandle) {
    if !doc.is_valid(handle) || doc.is_attached(handle) {
        return;
    }
    if let Err(e) = doc.remove(handle) {
        log::warn!("could not release detached {handle}: {e}");
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use folio_core::EditCommand;

    use crate::document::Document;
    use crate::handle::NodeHandle;
    use crate::record::{
        CITATION_KEY_FIELD, CITATIONS_FIELD, Class, GENE_XREF_FIELD, LOCUS_FIELD, PRODUCT_FIELD,
        Record,
    };

    pub(crate) struct Sample {
        pub root: NodeHandle,
        pub nuc_prot: NodeHandle,
        pub nucleotide: NodeHandle,
        pub title: NodeHandle,
        pub gene: NodeHandle,
        pub cds: NodeHandle,
        pub publication: NodeHandle,
        pub protein: NodeHandle,
        pub prot_feature: NodeHandle,
        pub lone: NodeHandle,
        pub lone_gene: NodeHandle,
    }

    /// ```text
    /// root (GenProd)
    /// ├── nuc_prot (NucProt)
    /// │   ├── nucleotide NC_1
    /// │   │   ├── title
    /// │   │   ├── gene abcA
    /// │   │   ├── cds -> P_1, xref abcA, cit pub1
    /// │   │   └── publication pub1
    /// │   └── protein P_1
    /// │       └── prot_feature cit pub1
    /// └── lone NC_2
    ///     └── lone_gene xyzB
    /// ```
    pub(crate) fn sample() -> (Document, Sample) {
        let mut doc = Document::new(Record::set(Class::GenProd));
        let root = doc.root();
        let nuc_prot = doc.attach(root, 0, Record::set(Class::NucProt)).unwrap();
        let nucleotide = doc
            .attach(nuc_prot, 0, Record::sequence("NC_1", Class::Nucleotide))
            .unwrap();
        let title = doc
            .attach(nucleotide, 0, Record::descriptor("title", "abc operon"))
            .unwrap();
        let gene = doc
            .attach(
                nucleotide,
                1,
                Record::feature("gene").with_field(LOCUS_FIELD, "abcA"),
            )
            .unwrap();
        let cds = doc
            .attach(
                nucleotide,
                2,
                Record::feature("CDS")
                    .with_field(PRODUCT_FIELD, "P_1")
                    .with_field(GENE_XREF_FIELD, "abcA")
                    .with_field(CITATIONS_FIELD, "pub1"),
            )
            .unwrap();
        let publication = doc
            .attach(
                nucleotide,
                3,
                Record::feature("pub").with_field(CITATION_KEY_FIELD, "pub1"),
            )
            .unwrap();
        let protein = doc
            .attach(nuc_prot, 1, Record::sequence("P_1", Class::Protein))
            .unwrap();
        let prot_feature = doc
            .attach(
                protein,
                0,
                Record::feature("Prot").with_field(CITATIONS_FIELD, "pub1"),
            )
            .unwrap();
        let lone = doc
            .attach(root, 1, Record::sequence("NC_2", Class::Nucleotide))
            .unwrap();
        let lone_gene = doc
            .attach(lone, 0, Record::feature("gene").with_field(LOCUS_FIELD, "xyzB"))
            .unwrap();

        let sample = Sample {
            root,
            nuc_prot,
            nucleotide,
            title,
            gene,
            cds,
            publication,
            protein,
            prot_feature,
            lone,
            lone_gene,
        };
        (doc, sample)
    }

    /// Executes, undoes, redoes and undoes again, checking that undo restores
    /// the original tree and redo reproduces the executed one.
    pub(crate) fn assert_round_trip(doc: &mut Document, cmd: &mut dyn EditCommand<Document>) {
        let root = doc.root();
        let before = doc.snapshot(root).unwrap();

        cmd.execute(doc).unwrap();
        let after = doc.snapshot(root).unwrap();

        cmd.unexecute(doc).unwrap();
        assert_eq!(doc.snapshot(root).unwrap(), before, "undo of '{}'", cmd.label());

        cmd.execute(doc).unwrap();
        assert_eq!(doc.snapshot(root).unwrap(), after, "redo of '{}'", cmd.label());

        cmd.unexecute(doc).unwrap();
        assert_eq!(doc.snapshot(root).unwrap(), before);
    }
}
