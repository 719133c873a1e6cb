//! Global process table
//!
//! spec.md §4.5: "a fixed-size array of MAX_PROCESSES entries protected by
//! a global process lock." Grounded on the teacher's `not(feature =
//! "alloc")` `ProcessArray` branch, now used unconditionally instead of as
//! a fallback beside a growable `BTreeMap` -- the fixed array is the whole
//! contract here, not a degraded mode.

extern crate alloc;

use alloc::vec::Vec;

use spin::Mutex;

use super::{pcb::ProcessState, Process, ProcessId, MAX_PROCESSES};
use crate::error::KernelError;

struct ProcessArray {
    processes: [Option<Process>; MAX_PROCESSES],
    count: usize,
}

impl ProcessArray {
    const fn new() -> Self {
        Self {
            processes: [const { None }; MAX_PROCESSES],
            count: 0,
        }
    }
}

pub struct ProcessTable {
    entries: Mutex<ProcessArray>,
}

impl ProcessTable {
    pub const fn new() -> Self {
        Self {
            entries: Mutex::new(ProcessArray::new()),
        }
    }

    /// Insert a process into the first free slot. Pid allocation happens
    /// before this call (`ProcessBuilder::build`); a full table fails
    /// `TRY_AGAIN`.
    pub fn add_process(&self, process: Process) -> Result<ProcessId, KernelError> {
        let pid = process.pid;
        let mut entries = self.entries.lock();
        if entries.count >= MAX_PROCESSES {
            return Err(KernelError::TooManyProcesses);
        }
        for slot in entries.processes.iter_mut() {
            if slot.is_none() {
                *slot = Some(process);
                entries.count += 1;
                return Ok(pid);
            }
        }
        Err(KernelError::TooManyProcesses)
    }

    pub fn remove_process(&self, pid: ProcessId) -> Option<Process> {
        let mut entries = self.entries.lock();
        for slot in entries.processes.iter_mut() {
            if slot.as_ref().map(|p| p.pid) == Some(pid) {
                let process = slot.take();
                entries.count -= 1;
                return process;
            }
        }
        None
    }

    /// # Safety
    /// The returned reference outlives the lock guard. Sound because
    /// `Process` entries are never moved or deallocated while a live
    /// reference to them could exist: removal only happens from `wait`
    /// after the caller has finished with the reference.
    pub fn get_process(&self, pid: ProcessId) -> Option<&'static Process> {
        let entries = self.entries.lock();
        for slot in entries.processes.iter() {
            if let Some(process) = slot {
                if process.pid == pid {
                    return Some(unsafe { &*(process as *const Process) });
                }
            }
        }
        None
    }

    pub fn exists(&self, pid: ProcessId) -> bool {
        self.get_process(pid).is_some()
    }

    pub fn count(&self) -> usize {
        self.entries.lock().count
    }

    pub fn find_children(&self, parent_pid: ProcessId) -> Vec<ProcessId> {
        let entries = self.entries.lock();
        entries
            .processes
            .iter()
            .filter_map(|slot| slot.as_ref())
            .filter(|p| p.parent == Some(parent_pid))
            .map(|p| p.pid)
            .collect()
    }

    pub fn find_by_state(&self, state: ProcessState) -> Vec<ProcessId> {
        let entries = self.entries.lock();
        entries
            .processes
            .iter()
            .filter_map(|slot| slot.as_ref())
            .filter(|p| p.get_state() == state)
            .map(|p| p.pid)
            .collect()
    }
}

/// Global process table instance.
pub static PROCESS_TABLE: ProcessTable = ProcessTable::new();

pub fn init() {
    println!("[PROCESS] process table initialized ({} slots)", MAX_PROCESSES);
}

pub fn get_process(pid: ProcessId) -> Option<&'static Process> {
    PROCESS_TABLE.get_process(pid)
}

pub fn add_process(process: Process) -> Result<ProcessId, KernelError> {
    PROCESS_TABLE.add_process(process)
}

pub fn remove_process(pid: ProcessId) -> Option<Process> {
    PROCESS_TABLE.remove_process(pid)
}

pub fn process_exists(pid: ProcessId) -> bool {
    PROCESS_TABLE.exists(pid)
}

pub fn process_count() -> usize {
    PROCESS_TABLE.count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;

    #[test]
    fn add_then_get_round_trip() {
        let table = ProcessTable::new();
        let p = Process::new(ProcessId(100), None, String::from("t"));
        table.add_process(p).unwrap();
        assert!(table.get_process(ProcessId(100)).is_some());
        assert_eq!(table.count(), 1);
    }

    #[test]
    fn remove_frees_the_slot() {
        let table = ProcessTable::new();
        table
            .add_process(Process::new(ProcessId(101), None, String::from("t")))
            .unwrap();
        table.remove_process(ProcessId(101));
        assert!(!table.exists(ProcessId(101)));
        assert_eq!(table.count(), 0);
    }
}
