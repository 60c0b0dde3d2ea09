//! Commands that change a node's record without touching the tree shape.

use folio_core::{EditCommand, EditResult};

use super::not_executed;
use crate::document::Document;
use crate::handle::NodeRef;
use crate::record::{Class, Record};

/// Replaces a node's whole record.
#[derive(Debug)]
pub struct ChangeRecord {
    target: NodeRef,
    record: Record,
    previous: Option<Record>,
}

impl ChangeRecord {
    pub fn new(target: impl Into<NodeRef>, record: Record) -> Self {
        Self {
            target: target.into(),
            record,
            previous: None,
        }
    }
}

impl EditCommand<Document> for ChangeRecord {
    fn execute(&mut self, doc: &mut Document) -> EditResult {
        let handle = self.target.resolve()?;
        self.previous = Some(doc.replace_record(handle, self.record.clone())?);
        Ok(())
    }

    fn unexecute(&mut self, doc: &mut Document) -> EditResult {
        let handle = self.target.resolve()?;
        let previous = self.previous.take().ok_or_else(|| not_executed(self))?;
        doc.replace_record(handle, previous)?;
        Ok(())
    }

    fn label(&self) -> &str {
        "Change Record"
    }
}

/// Sets or clears one field.
#[derive(Debug)]
pub struct SetField {
    target: NodeRef,
    key: String,
    value: Option<String>,
    label: String,
    /// `Some(prior value or absence)` once executed.
    previous: Option<Option<String>>,
}

impl SetField {
    /// Sets `key` to `value`, or removes it when `value` is `None`.
    pub fn new(target: impl Into<NodeRef>, key: impl Into<String>, value: Option<String>) -> Self {
        Self {
            target: target.into(),
            key: key.into(),
            value,
            label: "Set Field".to_owned(),
            previous: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl EditCommand<Document> for SetField {
    fn execute(&mut self, doc: &mut Document) -> EditResult {
        let handle = self.target.resolve()?;
        let record = doc.edit(handle)?;
        self.previous = Some(record.set_field(&self.key, self.value.clone()));
        Ok(())
    }

    fn unexecute(&mut self, doc: &mut Document) -> EditResult {
        let handle = self.target.resolve()?;
        let previous = self.previous.take().ok_or_else(|| not_executed(self))?;
        doc.edit(handle)?.set_field(&self.key, previous);
        Ok(())
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Changes a node's classification.
#[derive(Debug)]
pub struct ChangeClass {
    target: NodeRef,
    class: Class,
    previous: Option<Class>,
}

impl ChangeClass {
    pub fn new(target: impl Into<NodeRef>, class: Class) -> Self {
        Self {
            target: target.into(),
            class,
            previous: None,
        }
    }
}

impl EditCommand<Document> for ChangeClass {
    fn execute(&mut self, doc: &mut Document) -> EditResult {
        let handle = self.target.resolve()?;
        let record = doc.edit(handle)?;
        self.previous = Some(std::mem::replace(&mut record.class, self.class));
        Ok(())
    }

    fn unexecute(&mut self, doc: &mut Document) -> EditResult {
        let handle = self.target.resolve()?;
        let previous = self.previous.take().ok_or_else(|| not_executed(self))?;
        doc.edit(handle)?.class = previous;
        Ok(())
    }

    fn label(&self) -> &str {
        "Change Class"
    }
}

/// Changes (or clears) a node's identifier.
#[derive(Debug)]
pub struct ChangeId {
    target: NodeRef,
    id: Option<String>,
    previous: Option<Option<String>>,
}

impl ChangeId {
    /// Sets the identifier, or clears it when `id` is `None`.
    pub fn new(target: impl Into<NodeRef>, id: Option<String>) -> Self {
        Self {
            target: target.into(),
            id,
            previous: None,
        }
    }
}

impl EditCommand<Document> for ChangeId {
    fn execute(&mut self, doc: &mut Document) -> EditResult {
        let handle = self.target.resolve()?;
        let record = doc.edit(handle)?;
        self.previous = Some(std::mem::replace(&mut record.id, self.id.clone()));
        Ok(())
    }

    fn unexecute(&mut self, doc: &mut Document) -> EditResult {
        let handle = self.target.resolve()?;
        let previous = self.previous.take().ok_or_else(|| not_executed(self))?;
        doc.edit(handle)?.id = previous;
        Ok(())
    }

    fn label(&self) -> &str {
        "Change Id"
    }
}
