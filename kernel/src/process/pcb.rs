//! Process Control Block (PCB)
//!
//! Grounded on the teacher's PCB for the overall shape (atomics for state,
//! a `Mutex`-guarded address space, a builder for construction), cut down
//! to spec.md §3's model: one thread per process, no capability/IPC space,
//! an exit condition variable + lock pair instead of a bare exit-code
//! atomic, and a fixed-size file table instead of a growable one.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

extern crate alloc;

use alloc::{string::String, vec::Vec};

use spin::Mutex;

use crate::{
    fs::file::FileTable,
    mm::VirtualAddressSpace,
    sync::{CondVar, Lock},
};

/// Process ID type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessId(pub u64);

impl core::fmt::Display for ProcessId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Process state
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// Process is being created, not yet schedulable.
    Creating = 0,
    /// Ready to run.
    Ready = 1,
    /// Currently occupying the CPU.
    Running = 2,
    /// Blocked on a wait channel (see `sleep_channel`).
    Sleeping = 3,
    /// Exited, record kept until reaped by `wait`.
    Zombie = 4,
}

/// Process Control Block
pub struct Process {
    pub pid: ProcessId,
    /// `None` only for the init process.
    pub parent: Option<ProcessId>,
    pub name: String,

    state: AtomicU32,
    /// Wait channel this process is parked on, valid only while `Sleeping`.
    sleep_channel: AtomicUsize,

    pub memory_space: Mutex<VirtualAddressSpace>,
    pub file_table: FileTable,
    pub children: Mutex<Vec<ProcessId>>,

    exited: AtomicBool,
    exit_code: AtomicU32,
    /// Broadcast by `exit`, waited on by `wait` (spec.md §4.5.3).
    pub exit_lock: Lock,
    pub exit_cv: CondVar,

    created_at: u64,
}

impl Process {
    pub fn new(pid: ProcessId, parent: Option<ProcessId>, name: String) -> Self {
        Self::with_file_table(pid, parent, name, FileTable::new())
    }

    /// Used by `fork` to install the child's already-duplicated file
    /// table instead of starting from an empty one.
    pub fn with_file_table(
        pid: ProcessId,
        parent: Option<ProcessId>,
        name: String,
        file_table: FileTable,
    ) -> Self {
        Self {
            pid,
            parent,
            name,
            state: AtomicU32::new(ProcessState::Creating as u32),
            sleep_channel: AtomicUsize::new(0),
            memory_space: Mutex::new(VirtualAddressSpace::new()),
            file_table,
            children: Mutex::new(Vec::new()),
            exited: AtomicBool::new(false),
            exit_code: AtomicU32::new(0),
            exit_lock: Lock::new(),
            exit_cv: CondVar::new(),
            created_at: crate::read_timestamp(),
        }
    }

    pub fn get_state(&self) -> ProcessState {
        match self.state.load(Ordering::Acquire) {
            0 => ProcessState::Creating,
            1 => ProcessState::Ready,
            2 => ProcessState::Running,
            3 => ProcessState::Sleeping,
            _ => ProcessState::Zombie,
        }
    }

    pub fn set_state(&self, state: ProcessState) {
        self.state.store(state as u32, Ordering::Release);
    }

    /// Whether the scheduler may place this process back on the ready
    /// queue. Called by `sched::yield_cpu` on the outgoing process.
    pub fn is_runnable(&self) -> bool {
        matches!(self.get_state(), ProcessState::Ready | ProcessState::Running)
    }

    /// Record that this process has been parked on `chan` by
    /// `sched::sleep_on`.
    pub fn set_sleeping(&self, chan: usize) {
        self.sleep_channel.store(chan, Ordering::Relaxed);
        self.set_state(ProcessState::Sleeping);
    }

    /// Mark this process ready after `sched::wakeup_one`/`wakeup_all` has
    /// pulled it off a wait queue.
    pub fn set_ready(&self) {
        self.set_state(ProcessState::Ready);
    }

    pub fn is_alive(&self) -> bool {
        !matches!(self.get_state(), ProcessState::Zombie)
    }

    pub fn is_exited(&self) -> bool {
        self.exited.load(Ordering::Acquire)
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code.load(Ordering::Acquire) as i32
    }

    /// Record the exit code and wake any parent blocked in `wait`. Caller
    /// must already hold `exit_lock` (see `process::exit::sys_exit`).
    pub fn mark_exited(&self, code: i32) {
        self.exit_code.store(code as u32, Ordering::Release);
        self.exited.store(true, Ordering::Release);
        self.set_state(ProcessState::Zombie);
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }
}

impl Drop for Process {
    fn drop(&mut self) {
        println!("[PROCESS] dropping process {}", self.pid.0);
    }
}

/// Convenience builder, mirroring the teacher's `ProcessBuilder` shape.
pub struct ProcessBuilder {
    name: String,
    parent: Option<ProcessId>,
    file_table: Option<FileTable>,
}

impl ProcessBuilder {
    pub fn new(name: String) -> Self {
        Self {
            name,
            parent: None,
            file_table: None,
        }
    }

    pub fn parent(mut self, pid: ProcessId) -> Self {
        self.parent = Some(pid);
        self
    }

    /// Install a pre-duplicated file table (fork) instead of a fresh one.
    pub fn file_table(mut self, table: FileTable) -> Self {
        self.file_table = Some(table);
        self
    }

    pub fn build(self) -> Process {
        let pid = super::alloc_pid();
        match self.file_table {
            Some(table) => Process::with_file_table(pid, self.parent, self.name, table),
            None => Process::new(pid, self.parent, self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_process_is_creating_and_unexited() {
        let p = Process::new(ProcessId(1), None, String::from("test"));
        assert_eq!(p.get_state(), ProcessState::Creating);
        assert!(!p.is_exited());
        assert!(p.is_alive());
    }

    #[test]
    fn set_ready_makes_process_runnable() {
        let p = Process::new(ProcessId(2), None, String::from("test"));
        p.set_ready();
        assert!(p.is_runnable());
    }

    #[test]
    fn set_sleeping_makes_process_unrunnable() {
        let p = Process::new(ProcessId(3), None, String::from("test"));
        p.set_ready();
        p.set_sleeping(0x1234);
        assert!(!p.is_runnable());
    }
}
