use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use super::locker::Locker;
use super::poll_acquire;
use crate::cancel::Canceled;

/// Default interval between execute-lock attempts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Longest stretch a waiting guard keeps its processor alive.
const WAIT_SLICE: Duration = Duration::from_millis(25);

/// The execute-lock a command processor exposes to its guards.
pub trait ExecuteLock: Send + Sync {
    /// Enters the protected phase if nobody else is in it.
    fn execute_lock(&self) -> bool;

    /// Leaves the protected phase.
    fn execute_unlock(&self);

    /// Parks the caller for at most `timeout` while the lock is held.
    ///
    /// Returns `true` if the lock was seen released. The default just sleeps
    /// and returns `false`. Implementations with a wake-up signal return as
    /// soon as the lock is released.
    fn wait_for_unlock(&self, timeout: Duration) -> bool {
        std::thread::sleep(timeout);
        false
    }
}

/// Serializes command execution against one processor.
///
/// The guard only holds a weak reference: it never keeps a closed document's
/// processor alive, and once the processor is gone every operation is a
/// no-op that reports success. The lock is released when the guard drops.
///
/// ```
/// use std::sync::Arc;
/// use folio_core::cancel::NeverCanceled;
/// use folio_core::lock::{ExecuteGuard, ResourceLock};
///
/// let processor = Arc::new(ResourceLock::new());
/// let guard = ExecuteGuard::new(&processor);
/// assert!(guard.lock(&NeverCanceled));
/// assert!(!ExecuteGuard::new(&processor).try_lock());
/// drop(guard);
/// assert!(ExecuteGuard::new(&processor).try_lock());
/// ```
pub struct ExecuteGuard {
    processor: Weak<dyn ExecuteLock>,
    locked: AtomicBool,
    poll_interval: Duration,
}

impl ExecuteGuard {
    /// Creates an unlocked guard for `processor` that does not keep it
    /// alive.
    pub fn new<P: ExecuteLock + 'static>(processor: &Arc<P>) -> Self {
        let processor = Arc::downgrade(processor);
        Self::from_weak(processor)
    }

    /// Creates a guard from an existing weak reference.
    pub fn from_weak(processor: Weak<dyn ExecuteLock>) -> Self {
        Self {
            processor,
            locked: AtomicBool::new(false),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Sets how often a blocking [`lock`](Self::lock) re-checks cancellation.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Attempts the execute-lock once.
    ///
    /// Returns `true` if this guard already holds it, or if the processor no
    /// longer exists (nothing left to contend with).
    pub fn try_lock(&self) -> bool {
        if self.locked.load(Ordering::Acquire) {
            return true;
        }
        let acquired = match self.processor.upgrade() {
            Some(processor) => processor.execute_lock(),
            None => true,
        };
        if acquired {
            self.locked.store(true, Ordering::Release);
        }
        acquired
    }

    /// Blocks until the execute-lock is held or `canceled` fires.
    ///
    /// Cancellation is checked once per poll interval. A `false` return means
    /// the lock was not taken and the mutation must be abandoned.
    pub fn lock(&self, canceled: &dyn Canceled) -> bool {
        let acquired = poll_acquire(
            canceled,
            self.poll_interval,
            || self.try_lock(),
            |interval| self.wait(interval),
        );
        if acquired {
            log::trace!("execute-lock acquired");
        } else {
            log::debug!("execute-lock wait canceled");
        }
        acquired
    }

    /// Waits up to `interval` for the processor's lock to be released.
    ///
    /// The processor is upgraded for one slice at a time, so dropping it
    /// mid-wait frees it within a slice and ends the wait.
    fn wait(&self, interval: Duration) {
        let until = Instant::now() + interval;
        loop {
            let remaining = until.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return;
            }
            let Some(processor) = self.processor.upgrade() else {
                return;
            };
            if processor.wait_for_unlock(remaining.min(WAIT_SLICE)) {
                return;
            }
        }
    }

    /// Releases the execute-lock if this guard holds it.
    ///
    /// The local flag is cleared even when the processor has gone away.
    pub fn unlock(&self) {
        if self.locked.swap(false, Ordering::AcqRel) {
            if let Some(processor) = self.processor.upgrade() {
                processor.execute_unlock();
            }
            log::trace!("execute-lock released");
        }
    }

    /// Whether this guard holds the execute-lock.
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    /// Interval between lock attempts in [`lock`](Self::lock).
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Whether the processor this guard points at still exists.
    pub fn is_processor_alive(&self) -> bool {
        self.processor.strong_count() > 0
    }
}

impl Drop for ExecuteGuard {
    fn drop(&mut self) {
        self.unlock();
    }
}

impl Locker for ExecuteGuard {
    fn lock(&self, canceled: &dyn Canceled) -> bool {
        ExecuteGuard::lock(self, canceled)
    }

    fn unlock(&self) {
        ExecuteGuard::unlock(self);
    }

    fn holds_lock(&self) -> bool {
        self.is_locked()
    }
}

impl fmt::Debug for ExecuteGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecuteGuard")
            .field("locked", &self.is_locked())
            .field("processor_alive", &self.is_processor_alive())
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}
