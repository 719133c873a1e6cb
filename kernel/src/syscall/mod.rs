//! System call interface
//!
//! The ten calls spec.md §6 lists: file descriptor I/O (`open`/`close`/
//! `read`/`write`), process lifecycle (`fork`/`getpid`/`waitpid`/`exit`/
//! `execv`), and `reboot`. Trimmed from the teacher's IPC/thread/
//! capability/memory-mapping syscall surface, which has no counterpart
//! here.

#![allow(dead_code)]

mod filesystem;
mod process;

pub use crate::error::SyscallError;
use crate::error::KernelError;

/// System call result type
pub type SyscallResult = Result<usize, SyscallError>;

/// System call numbers, matching spec.md §6's table.
#[repr(usize)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syscall {
    Open = 0,
    Close = 1,
    Read = 2,
    Write = 3,
    Fork = 4,
    GetPid = 5,
    WaitPid = 6,
    Exit = 7,
    Execv = 8,
    Reboot = 9,
}

impl TryFrom<usize> for Syscall {
    type Error = ();

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Syscall::Open),
            1 => Ok(Syscall::Close),
            2 => Ok(Syscall::Read),
            3 => Ok(Syscall::Write),
            4 => Ok(Syscall::Fork),
            5 => Ok(Syscall::GetPid),
            6 => Ok(Syscall::WaitPid),
            7 => Ok(Syscall::Exit),
            8 => Ok(Syscall::Execv),
            9 => Ok(Syscall::Reboot),
            _ => Err(()),
        }
    }
}

/// Translate a [`KernelError`] into the errno-style [`SyscallError`] the
/// ABI returns, per spec.md §7's mapping.
fn to_syscall_error(err: KernelError) -> SyscallError {
    match err {
        KernelError::InvalidAddress { addr } => SyscallError::InvalidPointer { addr },
        KernelError::InvalidArgument { .. } => SyscallError::InvalidArgument { arg: 0 },
        KernelError::OutOfMemory { .. } => SyscallError::NotImplemented,
        KernelError::TooManyProcesses => SyscallError::TryAgain,
        KernelError::ProcessNotFound { .. } => SyscallError::NoSuchProcess,
        KernelError::FsError(crate::error::FsError::TooManyOpenFiles) => {
            SyscallError::TooManyOpenFiles
        }
        KernelError::FsError(crate::error::FsError::BadFileDescriptor) => {
            SyscallError::BadFileDescriptor
        }
        KernelError::PermissionDenied { .. } => SyscallError::BadFileDescriptor,
        _ => SyscallError::NotImplemented,
    }
}

/// System call handler entry point
#[no_mangle]
pub extern "C" fn syscall_handler(
    syscall_num: usize,
    arg1: usize,
    arg2: usize,
    arg3: usize,
    arg4: usize,
    arg5: usize,
) -> isize {
    let result = match Syscall::try_from(syscall_num) {
        Ok(syscall) => handle_syscall(syscall, arg1, arg2, arg3, arg4, arg5),
        Err(_) => Err(SyscallError::InvalidSyscall { nr: syscall_num }),
    };

    match result {
        Ok(value) => value as isize,
        Err(_) => -1,
    }
}

fn handle_syscall(
    syscall: Syscall,
    arg1: usize,
    arg2: usize,
    arg3: usize,
    arg4: usize,
    _arg5: usize,
) -> SyscallResult {
    match syscall {
        Syscall::Open => filesystem::sys_open(arg1, arg2, arg3),
        Syscall::Close => filesystem::sys_close(arg1),
        Syscall::Read => filesystem::sys_read(arg1, arg2, arg3),
        Syscall::Write => filesystem::sys_write(arg1, arg2, arg3),
        Syscall::Fork => process::sys_fork(),
        Syscall::GetPid => process::sys_getpid(),
        Syscall::WaitPid => process::sys_waitpid(arg1 as isize, arg2, arg3),
        Syscall::Exit => process::sys_exit(arg1),
        Syscall::Execv => process::sys_execv(arg1, arg2),
        Syscall::Reboot => Ok(0),
    }
}
