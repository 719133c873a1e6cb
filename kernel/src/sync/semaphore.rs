//! Counting semaphore
//!
//! Grounded on `sem_create`/`P`/`V` in `kern/thread/synch.c`: a semaphore is
//! a count protected by raising to the highest interrupt priority level
//! while it is touched, with blocked waiters parked on the semaphore's own
//! address as a wait channel.

use core::sync::atomic::{AtomicUsize, Ordering};

use crate::sched;

/// A counting semaphore. P (`wait`) blocks while the count is zero; V
/// (`post`) increments the count and wakes one waiter.
pub struct Semaphore {
    count: AtomicUsize,
}

impl Semaphore {
    /// Create a semaphore with the given initial count.
    pub const fn new(initial_count: usize) -> Self {
        Self {
            count: AtomicUsize::new(initial_count),
        }
    }

    fn channel(&self) -> usize {
        self as *const Self as usize
    }

    /// P: decrement the count, blocking while it is zero.
    pub fn wait(&self) {
        let spl = sched::splhigh();
        while self.count.load(Ordering::Relaxed) == 0 {
            sched::sleep_on(self.channel());
        }
        let prev = self.count.fetch_sub(1, Ordering::AcqRel);
        assert!(prev > 0, "semaphore count underflowed");
        sched::splx(spl);
    }

    /// V: increment the count and wake one waiter.
    pub fn post(&self) {
        let spl = sched::splhigh();
        self.count.fetch_add(1, Ordering::AcqRel);
        sched::wakeup_one(self.channel());
        sched::splx(spl);
    }

    /// Current count, for diagnostics and tests.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }
}

impl Drop for Semaphore {
    fn drop(&mut self) {
        assert!(
            !sched::has_sleepers(self.channel()),
            "semaphore dropped while threads are sleeping on it"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sem_has_given_count() {
        let sem = Semaphore::new(3);
        assert_eq!(sem.count(), 3);
    }

    #[test]
    fn post_increments_count() {
        let sem = Semaphore::new(0);
        sem.post();
        assert_eq!(sem.count(), 1);
    }
}
