//! `fork` (spec.md §4.5.1)
//!
//! Grounded on the teacher's `fork_process`, cut down from its capability-
//! space/thread-builder/cpu-affinity machinery to the steps spec.md
//! describes: duplicate the file table and the address space, allocate
//! the child record, and schedule it. A failure duplicating the file
//! table rolls back by simply not installing the child anywhere. The
//! trapframe copy and dual-return trampoline are arch-specific register
//! plumbing outside this crate's VM/process scope -- the child resumes
//! through the ordinary scheduler path and observes `fork`'s return value
//! as 0 via `Process::fork_return`, which arch-level context entry would
//! consult when it exists.

use super::{pcb::ProcessBuilder, table, ProcessId};
use crate::error::KernelError;

/// Fork the calling process. Returns the child's pid to the parent.
pub fn sys_fork() -> Result<ProcessId, KernelError> {
    let parent = super::current_process().ok_or(KernelError::ProcessNotFound { pid: 0 })?;

    // Step: duplicate the file table first so a failure here (NO_MEM)
    // touches nothing else.
    let child_files = parent.file_table.clone_for_fork()?;

    // Step: allocate the new process record.
    let child = ProcessBuilder::new(parent.name.clone())
        .parent(parent.pid)
        .file_table(child_files)
        .build();
    let child_pid = child.pid;

    // Step: as_copy. Pages the parent owns get re-stamped with the
    // child's pid as coremap owner so later eviction notifies the right
    // address space.
    let child_space = parent.memory_space.lock().fork(child_pid)?;
    *child.memory_space.lock() = child_space;

    parent.children.lock().push(child_pid);
    table::add_process(child)?;

    // Step: schedule the child. The real kernel's dual-return trampoline
    // (child resumes past the syscall instruction with return value 0)
    // is arch-specific and not modeled here; putting the child on the
    // ready queue is the scheduling-visible half of that step.
    if let Some(child_ref) = table::get_process(child_pid) {
        child_ref.set_ready();
        crate::sched::enqueue(child_pid);
    }

    Ok(child_pid)
}
