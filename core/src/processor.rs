//! The command processor: owner of an edit target, its undo history and its
//! execute-lock.
//!
//! One processor exists per open document. It is shared through an [`Arc`]
//! so that [`ExecuteGuard`]s can point at it weakly; closing the document
//! drops the last strong reference and turns every outstanding guard into a
//! no-op.
//!
//! The processor does not take the execute-lock on its own. Callers that
//! coordinate with other threads hold an [`ExecuteGuard`] across the whole
//! protected phase (build, execute, follow-up reads), not per call.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::command::{CommandQueue, EditCommand, EditResult, Editable, UndoHistory};
use crate::config::EngineConfig;
use crate::lock::{ExecuteGuard, ExecuteLock, ResourceLock};

struct State<T: Editable> {
    target: T,
    history: UndoHistory<T>,
}

/// Executes commands against a target and keeps them for undo/redo.
pub struct CommandProcessor<T: Editable + Send> {
    state: Mutex<State<T>>,
    execute_lock: ResourceLock,
    pending: CommandQueue<T>,
    poll_interval: Duration,
}

impl<T: Editable + Send> CommandProcessor<T> {
    /// Creates a processor owning `target`, with history depth and poll
    /// interval taken from `config`.
    pub fn new(target: T, config: &EngineConfig) -> Self {
        Self {
            state: Mutex::new(State {
                target,
                history: UndoHistory::new(config.max_undo),
            }),
            execute_lock: ResourceLock::with_poll_interval(config.poll_interval()),
            pending: CommandQueue::new(),
            poll_interval: config.poll_interval(),
        }
    }

    /// Creates a processor ready to hand out guards.
    pub fn shared(target: T, config: &EngineConfig) -> Arc<Self> {
        Arc::new(Self::new(target, config))
    }

    /// Executes `command` and records it for undo.
    ///
    /// A failing command is not recorded; its partial effects stay applied.
    pub fn execute(&self, command: Box<dyn EditCommand<T>>) -> EditResult {
        let label = command.label().to_owned();
        let mut state = self.state.lock();
        let State { target, history } = &mut *state;
        match history.execute(command, target) {
            Ok(()) => {
                log::debug!("executed '{label}'");
                Ok(())
            }
            Err(e) => {
                log::warn!("'{label}' failed: {e}");
                Err(e)
            }
        }
    }

    /// Undoes the most recent command, returning its label.
    pub fn undo(&self) -> EditResult<String> {
        let mut state = self.state.lock();
        let State { target, history } = &mut *state;
        let label = history.undo(target)?;
        log::debug!("undid '{label}'");
        Ok(label)
    }

    /// Redoes the most recently undone command, returning its label.
    pub fn redo(&self) -> EditResult<String> {
        let mut state = self.state.lock();
        let State { target, history } = &mut *state;
        let label = history.redo(target)?;
        log::debug!("redid '{label}'");
        Ok(label)
    }

    /// Whether there is a command to undo.
    pub fn can_undo(&self) -> bool {
        self.state.lock().history.can_undo()
    }

    /// Whether there is a command to redo.
    pub fn can_redo(&self) -> bool {
        self.state.lock().history.can_redo()
    }

    /// Label of the command [`undo`](Self::undo) would reverse.
    pub fn undo_label(&self) -> Option<String> {
        self.state.lock().history.undo_label().map(str::to_owned)
    }

    /// Label of the command [`redo`](Self::redo) would re-apply.
    pub fn redo_label(&self) -> Option<String> {
        self.state.lock().history.redo_label().map(str::to_owned)
    }

    /// Undo labels, most recent first.
    pub fn undo_labels(&self) -> Vec<String> {
        self.state.lock().history.undo_labels().map(str::to_owned).collect()
    }

    /// Number of commands that can be undone.
    pub fn undo_count(&self) -> usize {
        self.state.lock().history.undo_count()
    }

    /// Number of commands that can be redone.
    pub fn redo_count(&self) -> usize {
        self.state.lock().history.redo_count()
    }

    /// Marks the target's current state as saved.
    pub fn mark_saved(&self) {
        self.state.lock().history.mark_saved();
    }

    /// Whether the target differs from its last saved state.
    pub fn has_unsaved_changes(&self) -> bool {
        self.state.lock().history.has_unsaved_changes()
    }

    /// Forgets the undo and redo stacks. Commands release whatever they
    /// kept for undo.
    pub fn clear_history(&self) {
        let mut state = self.state.lock();
        let State { target, history } = &mut *state;
        history.clear(target);
    }

    /// Runs `f` with shared access to the target.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.state.lock().target)
    }

    /// Queues a command built elsewhere for [`apply_pending`](Self::apply_pending).
    pub fn submit(&self, command: Box<dyn EditCommand<T>>) {
        log::trace!("queued '{}'", command.label());
        self.pending.push(command);
    }

    /// Number of submitted commands not applied yet.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Executes queued commands in submission order.
    ///
    /// Returns how many succeeded. Failed commands are logged and discarded.
    pub fn apply_pending(&self) -> usize {
        let commands = self.pending.drain();
        let total = commands.len();
        let applied = commands
            .into_iter()
            .map(|command| self.execute(command))
            .filter(Result::is_ok)
            .count();
        if total > 0 {
            log::debug!("applied {applied}/{total} pending commands");
        }
        applied
    }

    /// A guard serializing execution against this processor.
    pub fn execute_guard(self: &Arc<Self>) -> ExecuteGuard {
        ExecuteGuard::new(self).with_poll_interval(self.poll_interval)
    }

    /// Whether some guard currently holds the execute-lock.
    pub fn is_execute_locked(&self) -> bool {
        self.execute_lock.is_held()
    }

    /// Poll interval handed to guards from [`execute_guard`](Self::execute_guard).
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

impl<T: Editable + Send> ExecuteLock for CommandProcessor<T> {
    fn execute_lock(&self) -> bool {
        self.execute_lock.execute_lock()
    }

    fn execute_unlock(&self) {
        self.execute_lock.execute_unlock();
    }

    fn wait_for_unlock(&self, timeout: Duration) -> bool {
        self.execute_lock.wait_for_unlock(timeout)
    }
}

impl<T: Editable + Send> fmt::Debug for CommandProcessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("CommandProcessor")
            .field("history", &state.history)
            .field("execute_locked", &self.is_execute_locked())
            .field("pending", &self.pending.len())
            .finish()
    }
}
