use std::fmt;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use super::execute_guard::{DEFAULT_POLL_INTERVAL, ExecuteLock};
use super::locker::Locker;
use super::poll_acquire;
use crate::cancel::Canceled;

/// A binary lock with cancel-aware blocking acquisition.
///
/// Ownerless: whoever calls [`release`](Self::release) frees it. Pair it with
/// [`LockerGuard`](super::LockerGuard) so that only the acquirer releases.
pub struct ResourceLock {
    held: Mutex<bool>,
    released: Condvar,
    poll_interval: Duration,
}

impl ResourceLock {
    /// Creates a free lock polling at [`DEFAULT_POLL_INTERVAL`].
    pub fn new() -> Self {
        Self::with_poll_interval(DEFAULT_POLL_INTERVAL)
    }

    /// Creates a lock whose blocking [`Locker::lock`] re-checks cancellation
    /// every `poll_interval`.
    pub fn with_poll_interval(poll_interval: Duration) -> Self {
        Self {
            held: Mutex::new(false),
            released: Condvar::new(),
            poll_interval,
        }
    }

    /// Takes the lock if it is free.
    pub fn try_acquire(&self) -> bool {
        let mut held = self.held.lock();
        if *held {
            false
        } else {
            *held = true;
            true
        }
    }

    /// Frees the lock and wakes every waiter. No-op if free.
    pub fn release(&self) {
        let mut held = self.held.lock();
        if *held {
            *held = false;
            self.released.notify_all();
        }
    }

    /// Whether someone holds the lock right now.
    pub fn is_held(&self) -> bool {
        *self.held.lock()
    }

    /// Blocks until the lock is released or `timeout` elapses.
    ///
    /// Returns immediately if the lock is free. A `true` return does not
    /// mean the next [`try_acquire`](Self::try_acquire) will succeed.
    pub fn wait_released(&self, timeout: Duration) -> bool {
        let mut held = self.held.lock();
        if *held {
            self.released.wait_for(&mut held, timeout);
        }
        !*held
    }

    /// Interval between attempts in a blocking [`Locker::lock`].
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

impl Default for ResourceLock {
    fn default() -> Self {
        Self::new()
    }
}

impl Locker for ResourceLock {
    fn lock(&self, canceled: &dyn Canceled) -> bool {
        poll_acquire(
            canceled,
            self.poll_interval,
            || self.try_acquire(),
            |interval| {
                self.wait_released(interval);
            },
        )
    }

    fn unlock(&self) {
        self.release();
    }
}

impl ExecuteLock for ResourceLock {
    fn execute_lock(&self) -> bool {
        self.try_acquire()
    }

    fn execute_unlock(&self) {
        self.release();
    }

    fn wait_for_unlock(&self, timeout: Duration) -> bool {
        self.wait_released(timeout)
    }
}

impl fmt::Debug for ResourceLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceLock")
            .field("held", &self.is_held())
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}
