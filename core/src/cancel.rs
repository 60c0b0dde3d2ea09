//! Cooperative cancellation.
//!
//! Long-running work polls a [`Canceled`] source at convenient points and
//! stops on its own; nothing is ever preempted. Lock waits in
//! [`crate::lock`] poll once per wait interval.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// A polled cancellation source.
pub trait Canceled {
    /// Returns `true` once the work should stop.
    fn is_canceled(&self) -> bool;
}

impl<C: Canceled + ?Sized> Canceled for &C {
    fn is_canceled(&self) -> bool {
        (**self).is_canceled()
    }
}

impl<C: Canceled + ?Sized> Canceled for Arc<C> {
    fn is_canceled(&self) -> bool {
        (**self).is_canceled()
    }
}

impl Canceled for AtomicBool {
    fn is_canceled(&self) -> bool {
        self.load(Ordering::Acquire)
    }
}

/// A source that never cancels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NeverCanceled;

impl Canceled for NeverCanceled {
    fn is_canceled(&self) -> bool {
        false
    }
}

/// A shared cancellation flag.
///
/// Clones observe the same flag: hand one to a worker, keep one to cancel it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token that is not canceled yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether [`cancel`](Self::cancel) was called on this token or a clone.
    pub fn is_canceled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

impl Canceled for CancelToken {
    fn is_canceled(&self) -> bool {
        CancelToken::is_canceled(self)
    }
}

/// Cancels once a point in time has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    /// A deadline at the instant `at`.
    pub fn at(at: Instant) -> Self {
        Self { at }
    }

    /// A deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self::at(Instant::now() + timeout)
    }

    /// Time left before the deadline, zero once it has passed.
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }
}

impl Canceled for Deadline {
    fn is_canceled(&self) -> bool {
        Instant::now() >= self.at
    }
}
