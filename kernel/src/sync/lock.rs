//! Mutual exclusion lock
//!
//! Grounded on `lock_acquire`/`lock_release`/`lock_do_i_hold` in
//! `kern/thread/synch.c`: ownership is tracked by the holder's pid, misuse
//! (double acquire, release by a non-owner) is a programming error and
//! panics rather than returning a `Result`, matching the assert-based
//! contract of the original.

use core::sync::atomic::{AtomicU64, Ordering};

use crate::{process::ProcessId, sched};

const NO_OWNER: u64 = 0;

/// A sleeping mutex. Acquiring a lock already held by the caller, or
/// releasing a lock the caller does not hold, is a kernel bug and panics.
pub struct Lock {
    owner: AtomicU64,
}

impl Lock {
    pub const fn new() -> Self {
        Self {
            owner: AtomicU64::new(NO_OWNER),
        }
    }

    fn channel(&self) -> usize {
        self as *const Self as usize
    }

    /// Acquire the lock, blocking until it is free.
    pub fn acquire(&self) {
        let me = current_pid();
        assert!(
            self.owner.load(Ordering::Relaxed) != me.0,
            "lock acquired recursively by its own holder"
        );

        let spl = sched::splhigh();
        while self
            .owner
            .compare_exchange(NO_OWNER, me.0, Ordering::AcqRel, Ordering::Relaxed)
            .is_err()
        {
            sched::sleep_on(self.channel());
        }
        sched::splx(spl);
    }

    /// Release the lock. Panics if the caller is not the current holder.
    pub fn release(&self) {
        let me = current_pid();
        assert!(self.held_by_me(), "lock released by non-owner");

        let spl = sched::splhigh();
        self.owner.store(NO_OWNER, Ordering::Release);
        sched::wakeup_one(self.channel());
        sched::splx(spl);
        let _ = me;
    }

    /// Whether the calling process currently holds this lock.
    pub fn held_by_me(&self) -> bool {
        self.owner.load(Ordering::Acquire) == current_pid().0
    }
}

impl Default for Lock {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Lock {
    fn drop(&mut self) {
        assert!(
            self.owner.load(Ordering::Relaxed) == NO_OWNER,
            "lock dropped while held"
        );
        assert!(
            !sched::has_sleepers(self as *const Self as usize),
            "lock dropped while threads are waiting on it"
        );
    }
}

fn current_pid() -> ProcessId {
    crate::process::current_process()
        .map(|p| p.pid)
        .unwrap_or(ProcessId(NO_OWNER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_lock_is_unheld() {
        let lock = Lock::new();
        assert!(!lock.held_by_me());
    }
}
