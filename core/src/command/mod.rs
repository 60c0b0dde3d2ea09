//! Reversible edit commands and their undo/redo history.
//!
//! This module provides the foundational traits and types of the command
//! engine. It is decoupled from any particular document model so that
//! higher-level crates can implement concrete commands against their own
//! targets.
//!
//! - [`Editable`]: marker trait for types that can be edited
//! - [`EditCommand`]: a reversible edit (Command pattern)
//! - [`CompositeCommand`]: an ordered group of commands run as one undo step
//! - [`UndoHistory`]: linear undo/redo stack with save-point tracking
//! - [`CommandQueue`]: thread-safe queue for commands built by background jobs
//!
//! # Ordering inside a composite
//!
//! A composite runs its children front to back and reverses them back to
//! front. A child may therefore rely on what an earlier child created (a
//! field edit on a record another child just attached), and its inverse runs
//! while that record still exists.

mod command;
mod composite;
mod history;
mod queue;

pub use command::{AsAny, EditCommand, EditError, EditResult, Editable};
pub use composite::CompositeCommand;
pub use history::{DEFAULT_MAX_UNDO, UndoHistory};
pub use queue::CommandQueue;
