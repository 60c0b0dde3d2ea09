//! # Folio Core
//!
//! Transactional edit engine: reversible commands, composites, undo history,
//! and the cooperative locks that serialize execution across threads.
//!
//! - [`command`]: the [`EditCommand`] contract, [`CompositeCommand`],
//!   [`UndoHistory`] and [`CommandQueue`]
//! - [`processor`]: [`CommandProcessor`], one per open document
//! - [`lock`]: [`ExecuteGuard`], [`LockerGuard`] and [`ResourceLock`]
//! - [`cancel`]: cooperative cancellation sources
//! - [`config`]: [`EngineConfig`] loaded from TOML

pub mod cancel;
pub mod command;
pub mod config;
pub mod lock;
pub mod processor;

pub use cancel::{CancelToken, Canceled, Deadline, NeverCanceled};
pub use command::{
    AsAny, CommandQueue, CompositeCommand, EditCommand, EditError, EditResult, Editable,
    UndoHistory,
};
pub use config::{ConfigError, EngineConfig};
pub use lock::{ExecuteGuard, ExecuteLock, Locker, LockerGuard, ResourceLock};
pub use processor::CommandProcessor;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
