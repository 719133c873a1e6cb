//! Process lifecycle system calls: fork, getpid, waitpid, exit, execv

extern crate alloc;

use alloc::{string::String, vec::Vec};

use super::{to_syscall_error, SyscallError, SyscallResult};
use crate::process;

const MAX_STR: usize = 4096;
const MAX_ARGV: usize = 64;

/// Read a NUL-terminated string out of user memory.
///
/// # Safety
/// `ptr` must point at a NUL-terminated byte sequence the caller is
/// allowed to read, no longer than [`MAX_STR`] bytes. The boundary
/// between kernel and user address spaces is not policed here; a real
/// port would walk the caller's page tables before dereferencing.
unsafe fn read_user_string(ptr: usize) -> Result<String, SyscallError> {
    if ptr == 0 {
        return Err(SyscallError::InvalidPointer { addr: ptr });
    }
    let mut bytes = Vec::new();
    let mut p = ptr as *const u8;
    for _ in 0..MAX_STR {
        let byte = *p;
        if byte == 0 {
            break;
        }
        bytes.push(byte);
        p = p.add(1);
    }
    String::from_utf8(bytes).map_err(|_| SyscallError::InvalidArgument { arg: ptr })
}

/// Read a NUL-terminated array of string pointers (argv-style) out of
/// user memory.
///
/// # Safety
/// Same contract as [`read_user_string`], applied to each entry of the
/// pointer array `ptr` points at.
unsafe fn read_user_argv(ptr: usize) -> Result<Vec<String>, SyscallError> {
    if ptr == 0 {
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    let mut p = ptr as *const usize;
    for _ in 0..MAX_ARGV {
        let entry = *p;
        if entry == 0 {
            break;
        }
        out.push(read_user_string(entry)?);
        p = p.add(1);
    }
    Ok(out)
}

/// Fork the current process (spec.md §4.5.1). Returns the child's pid to
/// the parent; the child's own view of "fork returned 0" depends on
/// arch-specific trapframe plumbing this crate does not implement.
pub fn sys_fork() -> SyscallResult {
    process::sys_fork()
        .map(|pid| pid.0 as usize)
        .map_err(to_syscall_error)
}

/// Get the current process ID.
pub fn sys_getpid() -> SyscallResult {
    let pid = process::current_process()
        .ok_or(SyscallError::NoSuchProcess)?
        .pid;
    Ok(pid.0 as usize)
}

/// Wait for a specific child to exit (spec.md §4.5.3). `pid` must name a
/// real child of the caller; spec.md has no `WNOHANG`/"any child" mode.
pub fn sys_waitpid(pid: isize, status_ptr: usize, _options: usize) -> SyscallResult {
    let (child, code) = process::sys_waitpid(pid as i64).map_err(to_syscall_error)?;
    if status_ptr != 0 {
        // SAFETY: caller-provided out-pointer for the exit status; see
        // read_user_string's safety note on the kernel/user boundary.
        unsafe {
            *(status_ptr as *mut i32) = code;
        }
    }
    Ok(child.0 as usize)
}

/// Terminate the current process (spec.md §4.5.3). Never returns.
pub fn sys_exit(code: usize) -> SyscallResult {
    process::sys_exit(code as i32)
}

/// Replace the current program image (spec.md §4.5.2).
pub fn sys_execv(path_ptr: usize, argv_ptr: usize) -> SyscallResult {
    // SAFETY: both pointers are validated non-null by their readers.
    let path = unsafe { read_user_string(path_ptr)? };
    let argv = unsafe { read_user_argv(argv_ptr)? };
    let argv_refs: Vec<&str> = argv.iter().map(String::as_str).collect();

    let entry = process::sys_execv(&path, &argv_refs).map_err(to_syscall_error)?;
    // A real dispatcher loads entry.{entry_point,argc,argv,stack_pointer}
    // into the entry registers and switches to user mode here; this
    // crate has no such arch-level transfer, so the descriptor's entry
    // point is surfaced as the syscall's return value instead.
    Ok(entry.entry_point as usize)
}
