//! Process management: PCB, process table, fork/exec/wait/exit
//!
//! Trimmed from the teacher's microkernel process layer (capability
//! spaces, IPC endpoints, a thread entity distinct from its owning
//! process, CPU-affinity and priority scheduling) down to spec.md §3/§4.5:
//! one thread per process, a fixed-size process table, and the four
//! lifecycle operations plus the file-descriptor syscalls built on top of
//! [`crate::mm`] and [`crate::fs`].

#![allow(dead_code)]

use core::sync::atomic::{AtomicU64, Ordering};

extern crate alloc;

pub mod exec;
pub mod exit;
pub mod fork;
pub mod pcb;
pub mod table;
pub mod wait;

pub use exec::{sys_execv, ExecEntry};
pub use exit::sys_exit;
pub use fork::sys_fork;
pub use pcb::{Process, ProcessId, ProcessState};
pub use wait::sys_waitpid;

/// Fixed process-table capacity (spec.md §9's `MAX_PROCESSES = 256`).
pub const MAX_PROCESSES: usize = 256;

static NEXT_PID: AtomicU64 = AtomicU64::new(1);

/// Allocate a new process ID. Pids are never reused while a process
/// record is live but the counter itself is not reclaimed on exit,
/// unlike the process table's first-free-slot scan the teacher modeled
/// pid allocation on.
pub fn alloc_pid() -> ProcessId {
    ProcessId(NEXT_PID.fetch_add(1, Ordering::Relaxed))
}

/// Initialize process management: the process table, then the init
/// process (pid 1, parentless), with its stdio bound to the console.
pub fn init() {
    println!("[PROCESS] initializing process management...");
    table::init();

    use alloc::string::String;
    let init_process = pcb::ProcessBuilder::new(String::from("init")).build();
    let init_pid = init_process.pid;
    init_process
        .file_table
        .open_console_stdio(crate::fs::devfs::console())
        .expect("console stdio bind cannot fail on a fresh file table");
    init_process.set_state(ProcessState::Running);
    table::add_process(init_process).expect("process table has room for the init process");

    crate::sched::init(init_pid);
    println!("[PROCESS] process management initialized, init pid {}", init_pid.0);
}

/// The process currently occupying the CPU, if any.
pub fn current_process() -> Option<&'static Process> {
    crate::sched::current().and_then(table::get_process)
}
