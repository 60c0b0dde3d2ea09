//! # Folio Document
//!
//! The record tree edited through `folio-core` commands.
//!
//! - [`Document`]: generational arena of [`Record`]s addressed by
//!   [`NodeHandle`]s
//! - [`commands`]: reversible edits: record values, tree structure, sets
//! - [`factory`]: builders for compound edits ("Delete Feature",
//!   "Remove All Features", ...)
//!
//! # Example
//!
//! ```
//! use folio_core::{CommandProcessor, CompositeCommand, EngineConfig, NeverCanceled};
//! use folio_document::commands::{CreateRecord, SetField};
//! use folio_document::{Class, Document, Record};
//!
//! let doc = Document::new(Record::set(Class::GenProd));
//! let root = doc.root();
//! let processor = CommandProcessor::shared(doc, &EngineConfig::default());
//!
//! // The second command targets the record the first one creates.
//! let create = CreateRecord::new(root, None, Record::sequence("NC_1", Class::Nucleotide));
//! let created = create.created();
//! let mut add = CompositeCommand::new("Add Sequence");
//! add.add_command(Box::new(create));
//! add.add_command(Box::new(SetField::new(&created, "title", Some("new".into()))));
//!
//! let guard = processor.execute_guard();
//! assert!(guard.lock(&NeverCanceled));
//! processor.execute(Box::new(add)).unwrap();
//! drop(guard);
//!
//! let handle = created.get().unwrap();
//! assert_eq!(
//!     processor.read(|doc| doc.record(handle).unwrap().field("title").map(str::to_owned)),
//!     Some("new".to_owned())
//! );
//! processor.undo().unwrap();
//! assert!(!processor.read(|doc| doc.is_attached(handle)));
//! ```

pub mod commands;
mod document;
mod error;
pub mod factory;
mod handle;
mod record;

pub use document::{Document, Placement, Subtree};
pub use error::{DocResult, DocumentError};
pub use factory::DocCommand;
pub use handle::{NodeHandle, NodeRef, PendingHandle};
pub use record::{
    CITATION_KEY_FIELD, CITATIONS_FIELD, Class, FEATURE_TYPE_FIELD, GENE_XREF_FIELD, LOCUS_FIELD,
    PRODUCT_FIELD, Record, RecordKind,
};
