//! Editable targets and reversible edit commands.
//!
//! This module defines the core abstractions of the command engine:
//!
//! - [`Editable`]: marker trait for types that commands mutate
//! - [`EditCommand`]: a reversible unit of mutation (Command pattern)
//! - [`EditError`] / [`EditResult`]: error handling for commands
//!
//! Commands are self-contained: each implementation stores whatever it needs
//! to reverse itself (target handles, the value it overwrote, the placement
//! of a node it detached, ...).

use std::any::Any;
use std::fmt;

use thiserror::Error;

/// Helper trait for downcasting trait objects to concrete types.
///
/// Automatically implemented for all `'static` types. Lets callers inspect
/// what a builder put inside a [`CompositeCommand`](super::CompositeCommand)
/// by downcasting `&dyn EditCommand<T>` to the concrete command type.
///
/// Call it on the trait object, not on the box: `(*boxed).as_any()`.
pub trait AsAny: 'static {
    /// Returns a reference to `self` as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl<T: 'static> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Marker trait for types that serve as editing targets.
///
/// Implement this on the document (or any other state) that commands
/// operate on.
///
/// ```ignore
/// struct Sheet { /* ... */ }
/// impl Editable for Sheet {}
/// ```
pub trait Editable: 'static {}

/// Error type for command failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// A node the command refers to no longer exists or is not reachable.
    #[error("target not found: {0}")]
    TargetNotFound(String),
    /// The target is in a state the command cannot be applied to.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// `unexecute` was called on a command that was never executed.
    #[error("'{0}' was not executed")]
    NotExecuted(String),
    /// The undo stack is empty.
    #[error("nothing to undo")]
    NothingToUndo,
    /// The redo stack is empty.
    #[error("nothing to redo")]
    NothingToRedo,
    /// A custom error with a description.
    #[error("{0}")]
    Custom(String),
}

/// Result type for command operations.
pub type EditResult<T = ()> = Result<T, EditError>;

/// A reversible edit command.
///
/// `execute` applies the forward mutation and captures whatever is needed to
/// reverse it; `unexecute` applies the exact inverse of the last `execute`.
/// The pair may be repeated any number of times (undo, redo, undo, ...), but
/// calls must alternate starting with `execute`. Calling `unexecute` first is
/// a precondition violation and should be reported as
/// [`EditError::NotExecuted`].
///
/// # Object Safety
///
/// This trait is dyn-compatible so that different command types can share a
/// single [`UndoHistory`](super::UndoHistory) or
/// [`CompositeCommand`](super::CompositeCommand) as
/// `Box<dyn EditCommand<T>>`.
///
/// # Example
///
/// ```
/// use folio_core::command::{EditCommand, EditError, EditResult, Editable};
///
/// struct Sheet {
///     title: String,
/// }
/// impl Editable for Sheet {}
///
/// #[derive(Debug)]
/// struct Retitle {
///     title: String,
///     previous: Option<String>,
/// }
///
/// impl EditCommand<Sheet> for Retitle {
///     fn execute(&mut self, target: &mut Sheet) -> EditResult {
///         self.previous = Some(std::mem::replace(&mut target.title, self.title.clone()));
///         Ok(())
///     }
///
///     fn unexecute(&mut self, target: &mut Sheet) -> EditResult {
///         let previous = self
///             .previous
///             .take()
///             .ok_or_else(|| EditError::NotExecuted(self.label().into()))?;
///         target.title = previous;
///         Ok(())
///     }
///
///     fn label(&self) -> &str {
///         "Retitle"
///     }
/// }
///
/// let mut sheet = Sheet { title: "a".into() };
/// let mut cmd = Retitle { title: "b".into(), previous: None };
/// cmd.execute(&mut sheet).unwrap();
/// assert_eq!(sheet.title, "b");
/// cmd.unexecute(&mut sheet).unwrap();
/// assert_eq!(sheet.title, "a");
/// ```
pub trait EditCommand<T: Editable>: fmt::Debug + AsAny + Send {
    /// Applies the forward mutation.
    ///
    /// On error the target must be left consistent: a command that touches
    /// several places either finishes them all or compensates internally.
    fn execute(&mut self, target: &mut T) -> EditResult;

    /// Reverses the last [`execute`](Self::execute).
    ///
    /// Must restore the target to the state observed before `execute`.
    fn unexecute(&mut self, target: &mut T) -> EditResult;

    /// A short, human-readable description for history display.
    ///
    /// Examples: `"Delete Feature"`, `"Change Class"`, `"Remove All Features"`.
    fn label(&self) -> &str;

    /// Whether this command changes document content.
    ///
    /// Commands that only touch presentation state return `false`; they stay
    /// undoable but do not count towards
    /// [`UndoHistory::has_unsaved_changes`](super::UndoHistory::has_unsaved_changes).
    ///
    /// Default: `true`.
    fn modifies_content(&self) -> bool {
        true
    }

    /// Called once when the history forgets this command for good: it fell
    /// off the bounded undo stack, its redo branch was discarded, or the
    /// history was cleared. It will not be executed or unexecuted again.
    ///
    /// Commands that kept something alive only so they could bring it back
    /// (a detached node, a replaced subtree) release it here. The command may
    /// be in either its executed or its undone state.
    ///
    /// Default: does nothing.
    fn discard(&mut self, _target: &mut T) {}
}
