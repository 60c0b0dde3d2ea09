//! Thread-safe queue for commands built off the owning thread.
//!
//! Background jobs typically scan the document, build a command, and hand it
//! back for execution instead of mutating anything themselves. [`CommandQueue`]
//! uses interior mutability so a job holding only `&self` (or an `Arc` of the
//! processor) can submit; the owner drains the queue and executes the
//! commands through [`CommandProcessor`](crate::processor::CommandProcessor).

use std::fmt;

use parking_lot::Mutex;

use super::command::{EditCommand, Editable};

/// Commands waiting to be executed by the thread that owns the target.
pub struct CommandQueue<T: Editable> {
    pending: Mutex<Vec<Box<dyn EditCommand<T>>>>,
}

impl<T: Editable> CommandQueue<T> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            pending: Mutex::default(),
        }
    }

    /// Appends `command`. Callable through a shared reference from any
    /// thread.
    pub fn push(&self, command: Box<dyn EditCommand<T>>) {
        self.pending.lock().push(command);
    }

    /// Takes every queued command, oldest first, leaving the queue empty.
    pub fn drain(&self) -> Vec<Box<dyn EditCommand<T>>> {
        std::mem::take(&mut *self.pending.lock())
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Number of queued commands.
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }
}

impl<T: Editable> Default for CommandQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Editable> fmt::Debug for CommandQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<String> = self
            .pending
            .lock()
            .iter()
            .map(|command| command.label().to_owned())
            .collect();
        f.debug_tuple("CommandQueue").field(&labels).finish()
    }
}
