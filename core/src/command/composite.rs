//! Macro-commands: an ordered group of edit commands treated as one undo step.

use std::fmt;

use super::command::{EditCommand, EditResult, Editable};

/// An ordered aggregate of [`EditCommand`]s with the same contract.
///
/// Children run in insertion order on [`execute`](EditCommand::execute) and
/// in reverse order on [`unexecute`](EditCommand::unexecute), so a child may
/// depend on the side effects of the ones before it. The whole group shows up
/// as a single entry in the undo history under the composite's own label.
///
/// A child failure aborts the remaining children and propagates. Children
/// that already ran are **not** rolled back; the caller decides whether to
/// unwind.
///
/// The composite does not lock anything itself: whoever executes it holds
/// the execute-lock for the whole group.
pub struct CompositeCommand<T: Editable> {
    label: String,
    commands: Vec<Box<dyn EditCommand<T>>>,
}

impl<T: Editable> CompositeCommand<T> {
    /// Creates an empty composite with the given history label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            commands: Vec::new(),
        }
    }

    /// Appends a child command. The composite takes ownership.
    pub fn add_command(&mut self, command: Box<dyn EditCommand<T>>) {
        self.commands.push(command);
    }

    /// Returns `true` if no children were added.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Direct children in insertion order.
    pub fn commands(&self) -> impl Iterator<Item = &dyn EditCommand<T>> {
        self.commands.iter().map(|c| c.as_ref())
    }
}

impl<T: Editable> Extend<Box<dyn EditCommand<T>>> for CompositeCommand<T> {
    fn extend<I: IntoIterator<Item = Box<dyn EditCommand<T>>>>(&mut self, iter: I) {
        self.commands.extend(iter);
    }
}

impl<T: Editable> EditCommand<T> for CompositeCommand<T> {
    fn execute(&mut self, target: &mut T) -> EditResult {
        let total = self.commands.len();
        for (index, command) in self.commands.iter_mut().enumerate() {
            log::trace!("'{}': executing child {index} '{}'", self.label, command.label());
            if let Err(e) = command.execute(target) {
                log::warn!(
                    "'{}' aborted at child {index} of {} ('{}'): {e}",
                    self.label,
                    total,
                    command.label()
                );
                return Err(e);
            }
        }
        Ok(())
    }

    fn unexecute(&mut self, target: &mut T) -> EditResult {
        for (index, command) in self.commands.iter_mut().enumerate().rev() {
            log::trace!("'{}': unexecuting child {index} '{}'", self.label, command.label());
            command.unexecute(target)?;
        }
        Ok(())
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn modifies_content(&self) -> bool {
        self.commands.iter().any(|c| c.modifies_content())
    }

    fn discard(&mut self, target: &mut T) {
        for command in self.commands.iter_mut().rev() {
            command.discard(target);
        }
    }
}

impl<T: Editable> fmt::Debug for CompositeCommand<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeCommand")
            .field("label", &self.label)
            .field("commands", &self.commands)
            .finish()
    }
}
