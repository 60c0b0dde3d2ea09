use std::fmt;

use crate::cancel::Canceled;

/// A lock/unlock capability over some shared resource.
///
/// Implemented by [`ResourceLock`](super::ResourceLock) and by
/// [`ExecuteGuard`](super::ExecuteGuard), so a background job can be handed
/// "whatever must be held while you touch the data" without knowing which.
pub trait Locker: Send + Sync {
    /// Blocks until the lock is held or `canceled` fires.
    ///
    /// Returns `false` if the wait was canceled; the caller must then skip
    /// the protected work.
    fn lock(&self, canceled: &dyn Canceled) -> bool;

    /// Releases the lock.
    fn unlock(&self);

    /// Whether the lock is already held through this locker, so that
    /// [`lock`](Self::lock) returns at once without acquiring anything.
    ///
    /// Re-entrant lockers override this. A [`LockerGuard`] over a locker
    /// that already holds its lock takes no unlock obligation.
    ///
    /// Default: `false`.
    fn holds_lock(&self) -> bool {
        false
    }
}

/// Scoped ownership of a [`Locker`]'s lock.
///
/// Locks on construction and unlocks on drop. The unlock obligation moves
/// with the value: after `let b = a;` only `b` will unlock, exactly once.
/// A guard whose lock attempt was canceled (or that got no locker at all)
/// holds no obligation and unlocks nothing. Neither does a guard over a
/// re-entrant locker that was already locked: whoever locked it first
/// unlocks it.
///
/// ```
/// use folio_core::cancel::NeverCanceled;
/// use folio_core::lock::{LockerGuard, ResourceLock};
///
/// let lock = ResourceLock::new();
/// {
///     let guard = LockerGuard::new(Some(&lock), &NeverCanceled);
///     assert!(guard.is_locked());
///     assert!(lock.is_held());
/// }
/// assert!(!lock.is_held());
/// ```
#[must_use = "dropping a LockerGuard unlocks immediately"]
pub struct LockerGuard<'a> {
    /// The locker this guard must unlock on drop.
    locker: Option<&'a dyn Locker>,
    held: bool,
}

impl<'a> LockerGuard<'a> {
    /// Locks `locker` (if any), waiting until it is acquired or `canceled`
    /// fires.
    pub fn new(locker: Option<&'a dyn Locker>, canceled: &dyn Canceled) -> Self {
        match locker {
            Some(locker) if locker.holds_lock() => Self {
                locker: None,
                held: true,
            },
            Some(locker) if locker.lock(canceled) => Self {
                locker: Some(locker),
                held: true,
            },
            _ => Self {
                locker: None,
                held: false,
            },
        }
    }

    /// Whether the lock is held for the lifetime of this guard.
    pub fn is_locked(&self) -> bool {
        self.held
    }

    /// Unlocks now instead of at the end of scope.
    pub fn release(self) {}
}

impl Drop for LockerGuard<'_> {
    fn drop(&mut self) {
        if let Some(locker) = self.locker.take() {
            locker.unlock();
        }
    }
}

impl fmt::Debug for LockerGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockerGuard")
            .field("locked", &self.is_locked())
            .finish()
    }
}
