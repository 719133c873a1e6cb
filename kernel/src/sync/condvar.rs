//! Condition variable
//!
//! Grounded on `cv_wait`/`cv_signal`/`cv_broadcast` in
//! `kern/thread/synch.c`. A condvar carries no state of its own; every
//! operation requires the caller to already hold the associated [`Lock`],
//! and `wait` atomically releases it before sleeping and reacquires it
//! before returning. Calling any operation without holding the lock is a
//! programming error and panics.

use crate::sched;
use crate::sync::lock::Lock;

pub struct CondVar {
    _private: (),
}

impl CondVar {
    pub const fn new() -> Self {
        Self { _private: () }
    }

    fn channel(&self) -> usize {
        self as *const Self as usize
    }

    /// Release `lock`, sleep until signaled, then reacquire `lock`.
    pub fn wait(&self, lock: &Lock) {
        assert!(lock.held_by_me(), "cv_wait called without holding the lock");

        let spl = sched::splhigh();
        lock.release();
        sched::sleep_on(self.channel());
        sched::splx(spl);

        lock.acquire();
    }

    /// Wake one waiter. Caller must hold `lock`.
    pub fn signal(&self, lock: &Lock) {
        assert!(lock.held_by_me(), "cv_signal called without holding the lock");
        let spl = sched::splhigh();
        sched::wakeup_one(self.channel());
        sched::splx(spl);
    }

    /// Wake every waiter. Caller must hold `lock`.
    pub fn broadcast(&self, lock: &Lock) {
        assert!(
            lock.held_by_me(),
            "cv_broadcast called without holding the lock"
        );
        let spl = sched::splhigh();
        sched::wakeup_all(self.channel());
        sched::splx(spl);
    }
}

impl Default for CondVar {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CondVar {
    fn drop(&mut self) {
        assert!(
            !sched::has_sleepers(self.channel()),
            "condvar dropped while threads are waiting on it"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_condvar_has_no_sleepers() {
        let cv = CondVar::new();
        assert!(!sched::has_sleepers(cv.channel()));
    }
}
