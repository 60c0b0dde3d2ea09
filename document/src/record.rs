//! Record values stored in document nodes.
//!
//! A record is plain data: what kind of node it is, an optional identifier,
//! a classification, and string fields. Multi-valued reference fields
//! (citations, gene cross-references) hold comma-separated lists.

use std::collections::BTreeMap;
use std::fmt;

/// Field listing citation keys a record refers to.
pub const CITATIONS_FIELD: &str = "cit";
/// Field listing gene locus tags a record cross-references.
pub const GENE_XREF_FIELD: &str = "gene-xref";
/// Field naming the sequence a feature produces.
pub const PRODUCT_FIELD: &str = "product";
/// Field holding a feature's type (`gene`, `CDS`, `pub`, ...).
pub const FEATURE_TYPE_FIELD: &str = "type";
/// Field holding a publication feature's citation key.
pub const CITATION_KEY_FIELD: &str = "citation";
/// Field holding a gene feature's locus tag.
pub const LOCUS_FIELD: &str = "locus";

/// What a node is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// A container of sequences and other sets.
    Set,
    Sequence,
    /// An annotation on a sequence.
    Feature,
    /// A descriptor (title, source, comment, ...) on a sequence or set.
    Descriptor,
}

/// Enumerated classification of sets and sequences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Class {
    #[default]
    Unclassified,
    /// A nucleotide together with the proteins it encodes.
    NucProt,
    /// A genomic product set.
    GenProd,
    /// A population study.
    PopSet,
    /// A phylogenetic study.
    PhySet,
    Nucleotide,
    Protein,
}

impl Class {
    pub fn is_set_class(&self) -> bool {
        matches!(
            self,
            Self::NucProt | Self::GenProd | Self::PopSet | Self::PhySet
        )
    }
}

/// The value of a document node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub kind: RecordKind,
    pub id: Option<String>,
    pub class: Class,
    pub fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            id: None,
            class: Class::Unclassified,
            fields: BTreeMap::new(),
        }
    }

    pub fn set(class: Class) -> Self {
        Self::new(RecordKind::Set).with_class(class)
    }

    pub fn sequence(id: impl Into<String>, class: Class) -> Self {
        Self::new(RecordKind::Sequence).with_id(id).with_class(class)
    }

    /// A feature of the given type (`gene`, `CDS`, `pub`, ...).
    pub fn feature(feature_type: impl Into<String>) -> Self {
        Self::new(RecordKind::Feature).with_field(FEATURE_TYPE_FIELD, feature_type)
    }

    /// A descriptor with a single `name = value` field.
    pub fn descriptor(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(RecordKind::Descriptor).with_field(name, value)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: Class) -> Self {
        self.class = class;
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Sets (`Some`) or clears (`None`) a field, returning its previous value.
    pub fn set_field(&mut self, key: &str, value: Option<String>) -> Option<String> {
        match value {
            Some(value) => self.fields.insert(key.to_owned(), value),
            None => self.fields.remove(key),
        }
    }

    pub fn feature_type(&self) -> Option<&str> {
        match self.kind {
            RecordKind::Feature => self.field(FEATURE_TYPE_FIELD),
            _ => None,
        }
    }

    /// The entries of a comma-separated list field, trimmed, empties skipped.
    pub fn list_field(&self, key: &str) -> Vec<&str> {
        self.field(key)
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn contains_value(&self, key: &str, value: &str) -> bool {
        self.list_field(key).contains(&value)
    }

    /// The list field with every occurrence of `value` removed.
    ///
    /// `None` when nothing would be left, meaning the field should be cleared.
    pub fn without_value(&self, key: &str, value: &str) -> Option<String> {
        let remaining: Vec<&str> = self
            .list_field(key)
            .into_iter()
            .filter(|item| *item != value)
            .collect();
        if remaining.is_empty() {
            None
        } else {
            Some(remaining.join(","))
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(id) = &self.id {
            write!(f, " {id}")?;
        }
        if self.class != Class::Unclassified {
            write!(f, " ({:?})", self.class)?;
        }
        if let Some(feature_type) = self.feature_type() {
            write!(f, " [{feature_type}]")?;
        }
        Ok(())
    }
}
