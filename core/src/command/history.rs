//! Linear undo/redo history.
//!
//! Executing a new command after an undo discards the redo branch; branching
//! histories are not kept.

use std::collections::VecDeque;
use std::fmt;

use super::command::{EditCommand, EditError, EditResult, Editable};

/// Default maximum number of undo steps.
pub const DEFAULT_MAX_UNDO: usize = 100;

/// Identifies a content state of the edited target.
///
/// Every content-modifying command produces a fresh revision, so a revision
/// that falls out of the history can never become current again.
type Revision = u64;

struct Entry<T: Editable> {
    command: Box<dyn EditCommand<T>>,
    /// Revision before the command ran.
    before: Revision,
    /// Revision after it ran; equal to `before` for commands that do not
    /// modify content.
    after: Revision,
}

/// Undo and redo stacks of executed commands, with save-point tracking.
///
/// The undo stack is bounded by `max_undo`; the oldest entry is dropped
/// when it overflows.
///
/// ```ignore
/// let mut history = UndoHistory::new(50);
/// history.execute(Box::new(SetField::new(node, "title", None)), &mut doc)?;
/// assert_eq!(history.undo(&mut doc)?, "Set Field");
/// history.redo(&mut doc)?;
/// ```
pub struct UndoHistory<T: Editable> {
    undo_stack: VecDeque<Entry<T>>,
    redo_stack: Vec<Entry<T>>,
    max_undo: usize,
    current: Revision,
    next_revision: Revision,
    /// `None` once the saved state is known to be unreachable.
    saved: Option<Revision>,
}

impl<T: Editable> UndoHistory<T> {
    /// Creates an empty history keeping at most `max_undo` undo steps. The
    /// empty state counts as saved.
    pub fn new(max_undo: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_undo,
            current: 0,
            next_revision: 1,
            saved: Some(0),
        }
    }

    /// Runs `command` against `target` and records it.
    ///
    /// A failing command is dropped and nothing is recorded; whatever it
    /// changed before failing stays changed.
    pub fn execute(&mut self, mut command: Box<dyn EditCommand<T>>, target: &mut T) -> EditResult {
        command.execute(target)?;
        self.push_executed(command, target);
        Ok(())
    }

    /// Records a command the caller already executed against `target`,
    /// discarding the redo branch.
    pub fn push_executed(&mut self, command: Box<dyn EditCommand<T>>, target: &mut T) {
        let before = self.current;
        if command.modifies_content() {
            self.current = self.next_revision;
            self.next_revision += 1;
        }
        for mut entry in self.redo_stack.drain(..).rev() {
            log::trace!("redo branch dropped, forgetting '{}'", entry.command.label());
            entry.command.discard(target);
        }
        self.undo_stack.push_back(Entry {
            command,
            before,
            after: self.current,
        });
        self.enforce_capacity(target);
    }

    /// Reverses the most recent command and returns its label.
    ///
    /// A command that fails to undo is dropped, and the save point with it
    /// since the target's state is no longer known.
    pub fn undo(&mut self, target: &mut T) -> EditResult<String> {
        let mut entry = self.undo_stack.pop_back().ok_or(EditError::NothingToUndo)?;
        if let Err(e) = entry.command.unexecute(target) {
            log::warn!("undo of '{}' failed, dropping it: {e}", entry.command.label());
            self.lose_track();
            return Err(e);
        }
        self.current = entry.before;
        let label = entry.command.label().to_owned();
        self.redo_stack.push(entry);
        Ok(label)
    }

    /// Re-applies the most recently undone command and returns its label.
    ///
    /// A command that fails to redo is dropped, like a failed undo.
    pub fn redo(&mut self, target: &mut T) -> EditResult<String> {
        let mut entry = self.redo_stack.pop().ok_or(EditError::NothingToRedo)?;
        if let Err(e) = entry.command.execute(target) {
            log::warn!("redo of '{}' failed, dropping it: {e}", entry.command.label());
            self.lose_track();
            return Err(e);
        }
        self.current = entry.after;
        let label = entry.command.label().to_owned();
        self.undo_stack.push_back(entry);
        self.enforce_capacity(target);
        Ok(label)
    }

    fn enforce_capacity(&mut self, target: &mut T) {
        while self.undo_stack.len() > self.max_undo {
            if let Some(mut dropped) = self.undo_stack.pop_front() {
                log::trace!("history full, forgetting '{}'", dropped.command.label());
                dropped.command.discard(target);
            }
        }
    }

    fn lose_track(&mut self) {
        self.saved = None;
        self.current = self.next_revision;
        self.next_revision += 1;
    }

    /// Whether [`undo`](Self::undo) has a command to reverse.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether [`redo`](Self::redo) has a command to re-apply.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Label of the command [`undo`](Self::undo) would reverse.
    pub fn undo_label(&self) -> Option<&str> {
        self.undo_stack.back().map(|entry| entry.command.label())
    }

    /// Label of the command [`redo`](Self::redo) would re-apply.
    pub fn redo_label(&self) -> Option<&str> {
        self.redo_stack.last().map(|entry| entry.command.label())
    }

    /// Undo labels, most recent first.
    pub fn undo_labels(&self) -> impl Iterator<Item = &str> {
        self.undo_stack.iter().rev().map(|entry| entry.command.label())
    }

    /// Redo labels, next to redo first.
    pub fn redo_labels(&self) -> impl Iterator<Item = &str> {
        self.redo_stack.iter().rev().map(|entry| entry.command.label())
    }

    /// Number of commands that can be undone.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of commands that can be redone.
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Capacity of the undo stack.
    pub fn max_undo(&self) -> usize {
        self.max_undo
    }

    /// Marks the current state as saved.
    pub fn mark_saved(&mut self) {
        self.saved = Some(self.current);
    }

    /// Whether the target differs from its last saved state. Also true once
    /// the saved state can no longer be reached through undo/redo.
    pub fn has_unsaved_changes(&self) -> bool {
        self.saved != Some(self.current)
    }

    /// Forgets every recorded command, letting each release what it kept for
    /// `target`. The current state stays saved if it was.
    pub fn clear(&mut self, target: &mut T) {
        for mut entry in self.redo_stack.drain(..).rev() {
            entry.command.discard(target);
        }
        while let Some(mut entry) = self.undo_stack.pop_back() {
            entry.command.discard(target);
        }
    }
}

impl<T: Editable> Default for UndoHistory<T> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNDO)
    }
}

impl<T: Editable> fmt::Debug for UndoHistory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoHistory")
            .field("undo", &self.undo_stack.len())
            .field("redo", &self.redo_stack.len())
            .field("max_undo", &self.max_undo)
            .field("unsaved", &self.has_unsaved_changes())
            .finish()
    }
}
