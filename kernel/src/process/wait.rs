//! `wait` (spec.md §4.5.3)
//!
//! Trimmed from the teacher's POSIX-flavored `waitpid` (WNOHANG/WUNTRACED/
//! WCONTINUED, SIGCHLD delivery, a separate wait-queue structure) down to
//! the exact contract spec.md describes: a caller blocks on the target
//! process's own exit condition variable until its exit flag is set, then
//! reaps it.

use super::{table, ProcessId, MAX_PROCESSES};
use crate::error::KernelError;

/// Block until the child `pid` exits, then remove it from the process
/// table and return its exit code.
///
/// Valid only when `pid` is in `[1, MAX_PROCESSES)`, the process exists,
/// and its parent is the caller -- otherwise `BAD_ADDR`/`INVALID_ARG`
/// (`InvalidAddress`/`InvalidArgument` here).
pub fn sys_waitpid(pid: i64) -> Result<(ProcessId, i32), KernelError> {
    if pid < 1 || pid as usize >= MAX_PROCESSES {
        return Err(KernelError::InvalidArgument {
            name: "pid",
            value: "out of range",
        });
    }
    let target = ProcessId(pid as u64);

    let caller = super::current_process().ok_or(KernelError::InvalidAddress { addr: 0 })?;
    let child = table::get_process(target).ok_or(KernelError::InvalidArgument {
        name: "pid",
        value: "no such process",
    })?;
    if child.parent != Some(caller.pid) {
        return Err(KernelError::InvalidArgument {
            name: "pid",
            value: "not a child of the caller",
        });
    }

    child.exit_lock.acquire();
    while !child.is_exited() {
        child.exit_cv.wait(&child.exit_lock);
    }
    let code = child.exit_code();
    child.exit_lock.release();

    table::remove_process(target);
    Ok((target, code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pid_zero_is_rejected() {
        assert!(sys_waitpid(0).is_err());
    }

    #[test]
    fn pid_past_max_processes_is_rejected() {
        assert!(sys_waitpid(MAX_PROCESSES as i64).is_err());
    }
}
