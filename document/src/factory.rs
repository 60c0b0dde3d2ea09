//! Builders for compound edits.
//!
//! Each function inspects the document and returns a ready-to-execute
//! command without changing anything. The caller executes it (normally
//! through the processor, holding the execute-guard) so the whole edit is a
//! single undo step.

use std::collections::HashMap;

use folio_core::{CompositeCommand, EditCommand};

use crate::commands::{DeleteRecord, PromoteRecord, SetField};
use crate::document::Document;
use crate::error::{DocResult, DocumentError};
use crate::handle::NodeHandle;
use crate::record::{
    CITATION_KEY_FIELD, CITATIONS_FIELD, Class, GENE_XREF_FIELD, LOCUS_FIELD, PRODUCT_FIELD,
    RecordKind,
};

/// A boxed command over a [`Document`].
pub type DocCommand = Box<dyn EditCommand<Document>>;

/// The outermost ancestor of `handle`: the root for attached nodes, the top
/// of the detached subtree otherwise.
pub fn top_level_entry(doc: &Document, handle: NodeHandle) -> DocResult<NodeHandle> {
    let mut current = handle;
    while let Some(parent) = doc.parent(current)? {
        current = parent;
    }
    Ok(current)
}

/// Strips `value` from the comma-list `field` of every record under `scope`.
///
/// Returns `None` when no record refers to `value`.
pub fn remove_references(
    doc: &Document,
    scope: NodeHandle,
    field: &str,
    value: &str,
    label: &str,
) -> DocResult<Option<CompositeCommand<Document>>> {
    let mut composite = CompositeCommand::new(label);
    for handle in doc.descendants(scope)? {
        let record = doc.record(handle)?;
        if record.contains_value(field, value) {
            let remaining = record.without_value(field, value);
            composite.add_command(Box::new(
                SetField::new(handle, field, remaining).with_label(label),
            ));
        }
    }
    if composite.is_empty() {
        Ok(None)
    } else {
        log::debug!("'{label}': {} records refer to '{value}'", composite.len());
        Ok(Some(composite))
    }
}

/// Removes citation `key` from every record under `scope`.
pub fn remove_citations(
    doc: &Document,
    scope: NodeHandle,
    key: &str,
) -> DocResult<Option<CompositeCommand<Document>>> {
    remove_references(doc, scope, CITATIONS_FIELD, key, "Remove Citations")
}

/// Removes cross-references to gene `locus` from every record under `scope`.
pub fn delete_gene_xrefs(
    doc: &Document,
    scope: NodeHandle,
    locus: &str,
) -> DocResult<Option<CompositeCommand<Document>>> {
    remove_references(doc, scope, GENE_XREF_FIELD, locus, "Delete Gene Xrefs")
}

fn require_kind(doc: &Document, handle: NodeHandle, expected: RecordKind) -> DocResult<()> {
    if doc.record(handle)?.kind == expected {
        Ok(())
    } else {
        Err(DocumentError::WrongKind { handle, expected })
    }
}

/// Features under `entry` naming each product, `skip` excluded.
fn product_references(
    doc: &Document,
    entry: NodeHandle,
    skip: Option<NodeHandle>,
) -> DocResult<HashMap<String, usize>> {
    let mut references = HashMap::new();
    for handle in doc.descendants(entry)? {
        if Some(handle) == skip {
            continue;
        }
        let record = doc.record(handle)?;
        if record.kind == RecordKind::Feature
            && let Some(product) = record.field(PRODUCT_FIELD)
        {
            *references.entry(product.to_owned()).or_insert(0) += 1;
        }
    }
    Ok(references)
}

/// The product sequence named `id`, if it lives under `entry`.
fn local_product(doc: &Document, entry: NodeHandle, id: &str) -> Option<NodeHandle> {
    doc.find_by_id_under(entry, id)
        .filter(|&handle| doc.get(handle).is_some_and(|r| r.kind == RecordKind::Sequence))
}

/// "Delete Feature": the feature plus the edits that keep the entry
/// consistent without it.
///
/// - a publication feature also has its citation removed from every record
///   in the entry
/// - a gene feature also has cross-references to its locus removed
/// - with `remove_products`, the protein the feature produces is deleted,
///   unless another feature also produces it or it is not in this entry
pub fn delete_feature(
    doc: &Document,
    feature: NodeHandle,
    remove_products: bool,
) -> DocResult<CompositeCommand<Document>> {
    require_kind(doc, feature, RecordKind::Feature)?;
    let record = doc.record(feature)?;
    let entry = top_level_entry(doc, feature)?;
    let mut composite = CompositeCommand::new("Delete Feature");

    match record.feature_type() {
        Some("pub") => {
            if let Some(key) = record.field(CITATION_KEY_FIELD)
                && let Some(cleanup) = remove_citations(doc, entry, key)?
            {
                composite.add_command(Box::new(cleanup));
            }
        }
        Some("gene") => {
            if let Some(locus) = record.field(LOCUS_FIELD)
                && let Some(cleanup) = delete_gene_xrefs(doc, entry, locus)?
            {
                composite.add_command(Box::new(cleanup));
            }
        }
        _ => {}
    }

    composite.add_command(Box::new(
        DeleteRecord::new(feature).with_label("Delete Feature"),
    ));

    if remove_products && let Some(product) = record.field(PRODUCT_FIELD) {
        let shared = product_references(doc, entry, Some(feature))?.contains_key(product);
        match local_product(doc, entry, product) {
            Some(sequence) if !shared => {
                composite.add_command(Box::new(
                    DeleteRecord::new(sequence).with_label("Delete Product"),
                ));
            }
            Some(_) => log::debug!("product '{product}' is shared, keeping it"),
            None => log::debug!("product '{product}' is not in this entry"),
        }
    }
    Ok(composite)
}

/// "Delete Sequence".
///
/// A nucleotide inside a nuc-prot set takes the whole set (and its
/// proteins) with it. The top-level entry itself cannot be deleted.
pub fn delete_sequence(doc: &Document, sequence: NodeHandle) -> DocResult<DeleteRecord> {
    require_kind(doc, sequence, RecordKind::Sequence)?;
    let mut target = sequence;
    if doc.record(sequence)?.class == Class::Nucleotide
        && let Some(parent) = doc.parent(sequence)?
        && doc.record(parent)?.class == Class::NucProt
    {
        target = parent;
    }
    if doc.parent(target)?.is_none() {
        return Err(DocumentError::LastSequence);
    }
    Ok(DeleteRecord::new(target).with_label("Delete Sequence"))
}

/// "Remove All Features": every feature on the nucleotide sequences under
/// `scope`.
///
/// With `remove_products`, a product protein goes with the last feature in
/// the entry that produces it. Returns the command and how many features it
/// removes.
pub fn delete_all_features(
    doc: &Document,
    scope: NodeHandle,
    remove_products: bool,
) -> DocResult<(CompositeCommand<Document>, usize)> {
    let entry = top_level_entry(doc, scope)?;
    let mut remaining = product_references(doc, entry, None)?;
    let mut composite = CompositeCommand::new("Remove All Features");
    let mut count = 0;

    for handle in doc.descendants(scope)? {
        let record = doc.record(handle)?;
        if record.kind != RecordKind::Feature {
            continue;
        }
        let on_nucleotide = doc
            .parent(handle)?
            .and_then(|parent| doc.get(parent))
            .is_some_and(|parent| {
                parent.kind == RecordKind::Sequence && parent.class == Class::Nucleotide
            });
        if !on_nucleotide {
            continue;
        }

        composite.add_command(Box::new(
            DeleteRecord::new(handle).with_label("Delete Feature"),
        ));
        count += 1;

        if remove_products
            && let Some(product) = record.field(PRODUCT_FIELD)
            && let Some(left) = remaining.get_mut(product)
        {
            *left -= 1;
            if *left == 0
                && let Some(sequence) = local_product(doc, entry, product)
            {
                composite.add_command(Box::new(
                    DeleteRecord::new(sequence).with_label("Delete Product"),
                ));
            }
        }
    }

    log::debug!("removing {count} features under {scope}");
    Ok((composite, count))
}

/// Promotes every node in `nodes` as one undo step, keeping their order.
pub fn promote_all(doc: &Document, nodes: &[NodeHandle]) -> DocResult<CompositeCommand<Document>> {
    let mut composite = CompositeCommand::new("Promote");
    // Each promotion lands right after the old parent, so go back to front.
    for &node in nodes.iter().rev() {
        composite.add_command(Box::new(PromoteRecord::new(doc, node)?));
    }
    Ok(composite)
}

/// Sets (or clears) `key` on every node as one undo step.
pub fn set_field_on_all(
    nodes: &[NodeHandle],
    key: &str,
    value: Option<&str>,
    label: &str,
) -> CompositeCommand<Document> {
    let mut composite = CompositeCommand::new(label);
    composite.extend(nodes.iter().map(|&node| {
        Box::new(SetField::new(node, key, value.map(str::to_owned)).with_label(label)) as DocCommand
    }));
    composite
}
