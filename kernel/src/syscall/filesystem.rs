//! File descriptor system calls: open, close, read, write (spec.md §4.5.4)
//!
//! Trimmed from the teacher's much larger VFS surface (stat, truncate,
//! mkdir, and friends have no counterpart in spec.md's syscall table).

extern crate alloc;

use alloc::{sync::Arc, vec::Vec};

use super::{to_syscall_error, SyscallError, SyscallResult};
use crate::{
    fs::{self, file::File, OpenFlags},
    process,
};

const MAX_PATH: usize = 4096;

/// # Safety
/// `ptr` must point at a NUL-terminated path the caller is allowed to
/// read, no longer than [`MAX_PATH`] bytes.
unsafe fn read_user_path(ptr: usize) -> Result<alloc::string::String, SyscallError> {
    if ptr == 0 {
        return Err(SyscallError::InvalidPointer { addr: ptr });
    }
    let mut bytes = Vec::new();
    let mut p = ptr as *const u8;
    for _ in 0..MAX_PATH {
        let byte = *p;
        if byte == 0 {
            break;
        }
        bytes.push(byte);
        p = p.add(1);
    }
    alloc::string::String::from_utf8(bytes).map_err(|_| SyscallError::InvalidArgument { arg: ptr })
}

/// Open a file, returning a file descriptor allocated at the first free
/// slot `>= 3` in the caller's per-process file table.
pub fn sys_open(path_ptr: usize, flags: usize, _mode: usize) -> SyscallResult {
    // SAFETY: read_user_path validates the pointer is non-null before use.
    let path = unsafe { read_user_path(path_ptr)? };
    let open_flags =
        OpenFlags::from_bits(flags as u32).ok_or(SyscallError::InvalidArgument { arg: flags })?;

    let process = process::current_process().ok_or(SyscallError::NoSuchProcess)?;
    let node = fs::get_vfs()
        .read()
        .open(&path, open_flags)
        .map_err(|_| SyscallError::InvalidArgument { arg: path_ptr })?;
    let file = Arc::new(File::new(node, open_flags));
    process
        .file_table
        .open(file)
        .map_err(to_syscall_error)
}

/// Close a file descriptor. Rejects stdin/stdout/stderr and any
/// out-of-range or already-empty slot with `BAD_FD`.
pub fn sys_close(fd: usize) -> SyscallResult {
    let process = process::current_process().ok_or(SyscallError::NoSuchProcess)?;
    process.file_table.close(fd).map_err(to_syscall_error)?;
    Ok(0)
}

/// Bind the console to `fd` on first use if the slot is still empty,
/// matching spec.md §4.5.4's "console auto-opens on first use" rule for
/// fd 0/1/2.
fn ensure_stdio_bound(process: &process::Process, fd: usize) {
    if fd <= 2 && process.file_table.get(fd).is_none() {
        let _ = process
            .file_table
            .open_console_stdio(crate::fs::devfs::console());
    }
}

/// Read from a file descriptor into a user buffer.
pub fn sys_read(fd: usize, buffer: usize, count: usize) -> SyscallResult {
    if buffer == 0 {
        return Err(SyscallError::InvalidPointer { addr: buffer });
    }
    let process = process::current_process().ok_or(SyscallError::NoSuchProcess)?;
    ensure_stdio_bound(process, fd);
    let file = process
        .file_table
        .get(fd)
        .ok_or(SyscallError::BadFileDescriptor)?;

    // SAFETY: buffer is non-null; the caller must provide a writable
    // user-space buffer of at least `count` bytes.
    let slice = unsafe { core::slice::from_raw_parts_mut(buffer as *mut u8, count) };
    file.read(slice).map_err(to_syscall_error)
}

/// Write a user buffer to a file descriptor.
pub fn sys_write(fd: usize, buffer: usize, count: usize) -> SyscallResult {
    if buffer == 0 {
        return Err(SyscallError::InvalidPointer { addr: buffer });
    }
    let process = process::current_process().ok_or(SyscallError::NoSuchProcess)?;
    ensure_stdio_bound(process, fd);
    let file = process
        .file_table
        .get(fd)
        .ok_or(SyscallError::BadFileDescriptor)?;

    // SAFETY: buffer is non-null; the caller must provide a readable
    // user-space buffer of at least `count` bytes.
    let slice = unsafe { core::slice::from_raw_parts(buffer as *const u8, count) };
    file.write(slice).map_err(to_syscall_error)
}
