//! Cooperative locking for command execution and shared resources.
//!
//! - [`ExecuteGuard`]: serializes command execution against one processor
//!   through a weak reference, so a guard never keeps a closed document alive
//! - [`Locker`] / [`LockerGuard`]: a generic lock capability and the scoped
//!   guard that releases it
//! - [`ResourceLock`]: a cancel-aware binary lock implementing both
//!   [`Locker`] and [`ExecuteLock`]
//!
//! # Waiting
//!
//! Blocking acquisition is a poll loop: try, check the cancellation source,
//! wait up to one poll interval, repeat. Waits park on a condition variable
//! where the lock owner provides one, so a release wakes waiters at once;
//! cancellation is still only noticed at interval boundaries. There is no
//! fairness: any waiter may win the next attempt.
//!
//! # Re-entrancy
//!
//! A single guard may be locked repeatedly (no-op while held). A
//! [`LockerGuard`] over a guard that is already locked leaves its unlock to
//! whoever locked it. Two distinct guards on the same processor from one
//! thread deadlock: never nest them.

mod execute_guard;
mod locker;
mod resource;

use std::time::Duration;

use crate::cancel::Canceled;

pub use execute_guard::{DEFAULT_POLL_INTERVAL, ExecuteGuard, ExecuteLock};
pub use locker::{Locker, LockerGuard};
pub use resource::ResourceLock;

/// Repeats `try_acquire` until it succeeds or `canceled` fires, calling
/// `wait` with `interval` between attempts.
///
/// Returns whether the lock was acquired.
pub(crate) fn poll_acquire(
    canceled: &dyn Canceled,
    interval: Duration,
    mut try_acquire: impl FnMut() -> bool,
    mut wait: impl FnMut(Duration),
) -> bool {
    loop {
        if try_acquire() {
            return true;
        }
        if canceled.is_canceled() {
            return false;
        }
        wait(interval);
    }
}
