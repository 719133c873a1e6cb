//! Cooperative single-CPU process scheduler
//!
//! Every process in this kernel has exactly one thread of control, so the
//! scheduler works in terms of [`ProcessId`] rather than a separate task
//! abstraction. It keeps a ready queue and a table of wait channels: a
//! sleeping process is parked on the address of whatever object it is
//! blocked on (a semaphore, a lock, a condvar, a child's exit state), the
//! same convention the synchronization primitives in [`crate::sync`] are
//! built on.

extern crate alloc;

use alloc::collections::{BTreeMap, VecDeque};
use core::sync::atomic::{AtomicBool, Ordering};

use spin::Mutex;

use crate::process::ProcessId;

/// A wait channel: sleeping processes are keyed by the address of the
/// object they are waiting on.
pub type WaitChannel = usize;

struct Scheduler {
    /// Currently running process, if any.
    current: Option<ProcessId>,
    /// Processes ready to run, in round-robin order.
    ready: VecDeque<ProcessId>,
    /// Processes parked on a wait channel.
    sleeping: BTreeMap<WaitChannel, VecDeque<ProcessId>>,
}

impl Scheduler {
    const fn new() -> Self {
        Self {
            current: None,
            ready: VecDeque::new(),
            sleeping: BTreeMap::new(),
        }
    }
}

static SCHEDULER: Mutex<Scheduler> = Mutex::new(Scheduler::new());

/// Software interrupt-priority-level flag. `splhigh`/`splx` only need to
/// keep the scheduler's own bookkeeping atomic with respect to itself on
/// this single-CPU kernel; real interrupt masking is left to the arch
/// layer's IRQ handlers, which never touch scheduler state directly.
static HIGH_SPL: AtomicBool = AtomicBool::new(false);

/// Raise to the highest interrupt priority level, returning the previous
/// level so it can be restored with [`splx`]. Grounded on the
/// `splhigh`/`splx` pattern used throughout `kern/thread/synch.c`.
pub fn splhigh() -> bool {
    HIGH_SPL.swap(true, Ordering::AcqRel)
}

/// Restore a previously-saved interrupt priority level.
pub fn splx(old: bool) {
    HIGH_SPL.store(old, Ordering::Release);
}

/// Initialize the scheduler. Must run after [`crate::process::init`] has
/// created the init process, since that process becomes `current`.
pub fn init(initial: ProcessId) {
    let mut sched = SCHEDULER.lock();
    sched.current = Some(initial);
    println!("[SCHED] scheduler initialized, current pid {}", initial.0);
}

/// The process currently occupying the CPU.
pub fn current() -> Option<ProcessId> {
    SCHEDULER.lock().current
}

/// Mark a process ready to run.
pub fn enqueue(pid: ProcessId) {
    let mut sched = SCHEDULER.lock();
    if !sched.ready.contains(&pid) {
        sched.ready.push_back(pid);
    }
}

/// Give up the CPU voluntarily. Picks the next ready process and makes it
/// current, pushing the outgoing process back onto the ready queue if it
/// is still runnable.
pub fn yield_cpu() {
    let mut sched = SCHEDULER.lock();
    let outgoing = sched.current.take();
    if let Some(next) = sched.ready.pop_front() {
        sched.current = Some(next);
    }
    if let Some(pid) = outgoing {
        if crate::process::table::get_process(pid)
            .map(|p| p.is_runnable())
            .unwrap_or(false)
        {
            sched.ready.push_back(pid);
        }
    }
}

/// Block the current process on a wait channel. Must be called with
/// `splhigh` already held by the caller (matches `thread_sleep`'s
/// precondition in the original source); this function re-derives the
/// current process, removes it from scheduling, and does not return until
/// another process wakes it with [`wakeup_one`] or [`wakeup_all`].
pub fn sleep_on(chan: WaitChannel) {
    let pid = {
        let mut sched = SCHEDULER.lock();
        let pid = sched.current.take().expect("sleep_on with no current process");
        sched.sleeping.entry(chan).or_default().push_back(pid);
        pid
    };
    if let Some(proc) = crate::process::table::get_process(pid) {
        proc.set_sleeping(chan);
    }
    // Cooperative scheduling: hand the CPU to whatever is ready until this
    // process is woken and rescheduled as current.
    loop {
        {
            let mut sched = SCHEDULER.lock();
            if sched.current == Some(pid) {
                return;
            }
            if sched.current.is_none() {
                if let Some(next) = sched.ready.pop_front() {
                    sched.current = Some(next);
                }
            }
        }
        if current() == Some(pid) {
            return;
        }
        crate::arch::idle();
    }
}

/// Wake the first process sleeping on `chan`, if any.
pub fn wakeup_one(chan: WaitChannel) {
    let woken = {
        let mut sched = SCHEDULER.lock();
        sched.sleeping.get_mut(&chan).and_then(|q| q.pop_front())
    };
    if let Some(pid) = woken {
        if let Some(proc) = crate::process::table::get_process(pid) {
            proc.set_ready();
        }
        enqueue(pid);
    }
}

/// Wake every process sleeping on `chan`.
pub fn wakeup_all(chan: WaitChannel) {
    let woken: alloc::vec::Vec<ProcessId> = {
        let mut sched = SCHEDULER.lock();
        sched
            .sleeping
            .get_mut(&chan)
            .map(|q| q.drain(..).collect())
            .unwrap_or_default()
    };
    for pid in woken {
        if let Some(proc) = crate::process::table::get_process(pid) {
            proc.set_ready();
        }
        enqueue(pid);
    }
}

/// Whether anything is sleeping on `chan`. Used by destructors that assert
/// no one is waiting on an object before it is torn down.
pub fn has_sleepers(chan: WaitChannel) -> bool {
    SCHEDULER
        .lock()
        .sleeping
        .get(&chan)
        .map(|q| !q.is_empty())
        .unwrap_or(false)
}

/// Remove the current process from scheduling permanently (used by
/// `sys_exit`). Never returns: the caller's stack is abandoned once another
/// process is picked.
pub fn exit_task() -> ! {
    {
        let mut sched = SCHEDULER.lock();
        sched.current = None;
    }
    loop {
        {
            let mut sched = SCHEDULER.lock();
            if sched.current.is_none() {
                if let Some(next) = sched.ready.pop_front() {
                    sched.current = Some(next);
                }
            }
        }
        crate::arch::idle();
    }
}

/// Idle loop entered once bootstrap has created the init process and
/// handed control to the scheduler.
pub fn run() -> ! {
    println!("[SCHED] entering scheduler idle loop");
    loop {
        crate::arch::idle();
    }
}
