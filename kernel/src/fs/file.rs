//! File descriptors and file operations

use alloc::{string::String, sync::Arc};

#[cfg(not(target_arch = "aarch64"))]
use spin::RwLock;

#[cfg(target_arch = "aarch64")]
use super::bare_lock::RwLock;
use super::VfsNode;
use crate::error::{FsError, KernelError};

/// File descriptor number
pub type FileDescriptor = usize;

/// Standard file descriptors
pub const STDIN: FileDescriptor = 0;
pub const STDOUT: FileDescriptor = 1;
pub const STDERR: FileDescriptor = 2;

/// File open flags
#[derive(Debug, Clone, Copy)]
pub struct OpenFlags {
    pub read: bool,
    pub write: bool,
    pub append: bool,
    pub create: bool,
    pub truncate: bool,
    pub exclusive: bool,
}

impl OpenFlags {
    /// Read-only mode
    pub fn read_only() -> Self {
        Self {
            read: true,
            write: false,
            append: false,
            create: false,
            truncate: false,
            exclusive: false,
        }
    }

    /// Write-only mode
    pub fn write_only() -> Self {
        Self {
            read: false,
            write: true,
            append: false,
            create: true,
            truncate: true,
            exclusive: false,
        }
    }

    /// Read-write mode
    pub fn read_write() -> Self {
        Self {
            read: true,
            write: true,
            append: false,
            create: true,
            truncate: false,
            exclusive: false,
        }
    }

    /// Append mode
    pub fn append() -> Self {
        Self {
            read: false,
            write: true,
            append: true,
            create: true,
            truncate: false,
            exclusive: false,
        }
    }

    /// Create from bits (for syscall interface)
    ///
    /// Flag values MUST match `<veridian/fcntl.h>` in the sysroot -- that is
    /// the ABI contract user-space programs (including GCC) are compiled
    /// against.
    pub fn from_bits(bits: u32) -> Option<Self> {
        // VeridianOS ABI flags (from veridian/fcntl.h in sysroot)
        const O_RDONLY: u32 = 0x0001;
        const O_WRONLY: u32 = 0x0002;
        const O_RDWR: u32 = 0x0003;
        const O_ACCMODE: u32 = 0x0003;
        const O_CREAT: u32 = 0x0100;
        const O_TRUNC: u32 = 0x0200;
        const O_APPEND: u32 = 0x0400;
        const O_EXCL: u32 = 0x0800;

        let access_mode = bits & O_ACCMODE;

        Some(Self {
            read: access_mode == O_RDONLY || access_mode == O_RDWR,
            write: access_mode == O_WRONLY || access_mode == O_RDWR,
            append: (bits & O_APPEND) != 0,
            create: (bits & O_CREAT) != 0,
            truncate: (bits & O_TRUNC) != 0,
            exclusive: (bits & O_EXCL) != 0,
        })
    }
}

/// Seek position
#[derive(Debug, Clone, Copy)]
pub enum SeekFrom {
    Start(usize),
    Current(isize),
    End(isize),
}

/// Open file structure
pub struct File {
    /// VFS node this file refers to
    pub node: Arc<dyn VfsNode>,

    /// Open flags
    pub flags: OpenFlags,

    /// Current position in file
    pub position: RwLock<usize>,

    /// Reference count
    pub refcount: RwLock<usize>,

    /// Absolute path this file was opened with (for dirfd resolution in *at
    /// syscalls)
    pub path: Option<String>,
}

impl File {
    /// Create a new file structure
    pub fn new(node: Arc<dyn VfsNode>, flags: OpenFlags) -> Self {
        Self {
            node,
            flags,
            position: RwLock::new(0),
            refcount: RwLock::new(1),
            path: None,
        }
    }

    /// Create a new file structure with a known path
    pub fn new_with_path(node: Arc<dyn VfsNode>, flags: OpenFlags, path: String) -> Self {
        Self {
            node,
            flags,
            position: RwLock::new(0),
            refcount: RwLock::new(1),
            path: Some(path),
        }
    }

    /// Read from the file
    pub fn read(&self, buffer: &mut [u8]) -> Result<usize, KernelError> {
        if !self.flags.read {
            return Err(KernelError::PermissionDenied {
                operation: "read file not opened for reading",
            });
        }

        let mut pos = self.position.write();
        let bytes_read = self.node.read(*pos, buffer)?;
        *pos += bytes_read;
        Ok(bytes_read)
    }

    /// Write to the file
    pub fn write(&self, data: &[u8]) -> Result<usize, KernelError> {
        if !self.flags.write {
            return Err(KernelError::PermissionDenied {
                operation: "write file not opened for writing",
            });
        }

        let mut pos = self.position.write();

        if self.flags.append {
            // For append mode, always write at end
            let metadata = self.node.metadata()?;
            *pos = metadata.size;
        }

        let bytes_written = self.node.write(*pos, data)?;
        *pos += bytes_written;
        Ok(bytes_written)
    }

    /// Seek to a position in the file
    pub fn seek(&self, from: SeekFrom) -> Result<usize, KernelError> {
        let mut pos = self.position.write();

        let new_pos = match from {
            SeekFrom::Start(offset) => offset,
            SeekFrom::Current(offset) => {
                if offset < 0 {
                    pos.checked_sub((-offset) as usize)
                        .ok_or(KernelError::InvalidArgument {
                            name: "offset",
                            value: "seek before start of file",
                        })?
                } else {
                    pos.checked_add(offset as usize)
                        .ok_or(KernelError::InvalidArgument {
                            name: "offset",
                            value: "seek overflow",
                        })?
                }
            }
            SeekFrom::End(offset) => {
                let metadata = self.node.metadata()?;
                if offset < 0 {
                    metadata.size.checked_sub((-offset) as usize).ok_or(
                        KernelError::InvalidArgument {
                            name: "offset",
                            value: "seek before start of file",
                        },
                    )?
                } else {
                    metadata.size.checked_add(offset as usize).ok_or(
                        KernelError::InvalidArgument {
                            name: "offset",
                            value: "seek overflow",
                        },
                    )?
                }
            }
        };

        *pos = new_pos;
        Ok(new_pos)
    }

    /// Get current position
    pub fn tell(&self) -> usize {
        *self.position.read()
    }

    /// Increment reference count
    pub fn inc_ref(&self) {
        *self.refcount.write() += 1;
    }

    /// Decrement reference count
    pub fn dec_ref(&self) -> usize {
        let mut count = self.refcount.write();
        *count = count.saturating_sub(1);
        *count
    }
}

/// File descriptor entry with flags
pub struct FileEntry {
    /// The file itself
    pub file: Arc<File>,
    /// Close-on-exec flag
    pub cloexec: bool,
}

/// Upper bound on simultaneously open files per process (spec.md §1/§3).
pub const MAX_FILE_HANDLES: usize = 32;

/// A process's file descriptor table: a fixed array of `MAX_FILE_HANDLES`
/// slots, with 0/1/2 reserved for stdin/stdout/stderr. Grounded on the
/// teacher's `FileTable`, cut from a growable `Vec` (up to 1024 entries)
/// down to the fixed array spec.md's data model calls for.
pub struct FileTable {
    files: RwLock<[Option<FileEntry>; MAX_FILE_HANDLES]>,
}

impl FileTable {
    /// Create an empty file table. Standard descriptors are not bound to
    /// the console here; call [`FileTable::open_console_stdio`] once a
    /// console vnode is available.
    pub fn new() -> Self {
        Self {
            files: RwLock::new([const { None }; MAX_FILE_HANDLES]),
        }
    }

    /// Bind fds 0/1/2 to `con:` if they are not already open. Called once
    /// per process at creation, standing in for the "opened on first use"
    /// behavior described in spec.md §3 with a simpler, deterministic
    /// eager bind.
    pub fn open_console_stdio(&self, console: Arc<dyn VfsNode>) -> Result<(), KernelError> {
        let mut files = self.files.write();
        for fd in [STDIN, STDOUT, STDERR] {
            if files[fd].is_none() {
                let flags = if fd == STDIN {
                    OpenFlags::read_only()
                } else {
                    OpenFlags::write_only()
                };
                let file = Arc::new(File::new(console.clone(), flags));
                files[fd] = Some(FileEntry {
                    file,
                    cloexec: false,
                });
            }
        }
        Ok(())
    }

    /// Open a file and return the lowest available file descriptor.
    pub fn open(&self, file: Arc<File>) -> Result<FileDescriptor, KernelError> {
        let mut files = self.files.write();
        for (fd, slot) in files.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(FileEntry {
                    file,
                    cloexec: false,
                });
                return Ok(fd);
            }
        }
        Err(KernelError::FsError(FsError::TooManyOpenFiles))
    }

    /// Get a file by descriptor.
    pub fn get(&self, fd: FileDescriptor) -> Option<Arc<File>> {
        let files = self.files.read();
        files.get(fd)?.as_ref().map(|entry| entry.file.clone())
    }

    /// Close a file descriptor. Rejects fd 0/1/2: stdin/stdout/stderr are
    /// reserved slots, not closeable like ordinary descriptors.
    pub fn close(&self, fd: FileDescriptor) -> Result<(), KernelError> {
        if matches!(fd, STDIN | STDOUT | STDERR) {
            return Err(KernelError::FsError(FsError::BadFileDescriptor));
        }
        let mut files = self.files.write();
        let slot = files
            .get_mut(fd)
            .ok_or(KernelError::FsError(FsError::BadFileDescriptor))?;
        let entry = slot
            .take()
            .ok_or(KernelError::FsError(FsError::BadFileDescriptor))?;
        entry.file.dec_ref();
        Ok(())
    }

    /// Duplicate a file descriptor onto the lowest available slot.
    pub fn dup(&self, fd: FileDescriptor) -> Result<FileDescriptor, KernelError> {
        let file = self
            .get(fd)
            .ok_or(KernelError::FsError(FsError::BadFileDescriptor))?;
        file.inc_ref();
        self.open(file)
    }

    /// Replace `new_fd` with a duplicate of `old_fd`.
    pub fn dup2(&self, old_fd: FileDescriptor, new_fd: FileDescriptor) -> Result<(), KernelError> {
        if old_fd == new_fd {
            return if self.get(old_fd).is_some() {
                Ok(())
            } else {
                Err(KernelError::FsError(FsError::BadFileDescriptor))
            };
        }

        let file = self
            .get(old_fd)
            .ok_or(KernelError::FsError(FsError::BadFileDescriptor))?;
        file.inc_ref();

        let mut files = self.files.write();
        let slot = files
            .get_mut(new_fd)
            .ok_or(KernelError::FsError(FsError::BadFileDescriptor))?;
        if let Some(existing) = slot.take() {
            existing.file.dec_ref();
        }
        *slot = Some(FileEntry {
            file,
            cloexec: false,
        });
        Ok(())
    }

    /// Number of currently open descriptors.
    pub fn count_open(&self) -> usize {
        self.files.read().iter().filter(|s| s.is_some()).count()
    }

    /// Duplicate every open descriptor for `fork`, failing (and leaving
    /// `self` untouched) if any file's refcount bookkeeping cannot keep
    /// up -- in practice this never fails since the array is a fixed copy,
    /// but the `Result` return matches the rollback-on-failure step in
    /// spec.md §4.5.1.
    pub fn clone_for_fork(&self) -> Result<Self, KernelError> {
        let files = self.files.read();
        let mut new_files: [Option<FileEntry>; MAX_FILE_HANDLES] = [const { None }; MAX_FILE_HANDLES];
        for (fd, slot) in files.iter().enumerate() {
            if let Some(entry) = slot {
                entry.file.inc_ref();
                new_files[fd] = Some(FileEntry {
                    file: entry.file.clone(),
                    cloexec: entry.cloexec,
                });
            }
        }
        Ok(Self {
            files: RwLock::new(new_files),
        })
    }

    /// Close every open descriptor, e.g. on process exit.
    pub fn close_all(&self) {
        let mut files = self.files.write();
        for slot in files.iter_mut() {
            if let Some(entry) = slot.take() {
                entry.file.dec_ref();
            }
        }
    }
}

impl Default for FileTable {
    fn default() -> Self {
        Self::new()
    }
}
