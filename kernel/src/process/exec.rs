//! `execv` (spec.md §4.5.2)
//!
//! No teacher counterpart (the old `loader.rs` assumed eager, fully-
//! mapped ELF loading); grounded instead directly on the algorithm text:
//! pack argv into kernel memory, open the executable, tear down and
//! rebuild the address space, then write the packed argv to the top of
//! the new user stack with its offsets rewritten to absolute addresses.

extern crate alloc;

use alloc::{vec, vec::Vec};

use crate::{
    elf::ElfLoader,
    error::KernelError,
    fs,
    mm::{
        page_table::Perms,
        vas::{self, VirtualAddressSpace, USERSTACK},
        PAGE_SIZE,
    },
};

const MAX_ARGS: usize = 64;

/// Pack argv into `(argc+1)` 4-byte offsets followed by the argument
/// strings, each NUL-terminated and padded to a multiple of 4 bytes. The
/// final offset points one past the last string, matching the original
/// algorithm's sentinel.
fn pack_argv(argv: &[&str]) -> Result<Vec<u8>, KernelError> {
    if argv.len() > MAX_ARGS {
        return Err(KernelError::InvalidArgument {
            name: "argv",
            value: "too many arguments",
        });
    }

    let offsets_len = (argv.len() + 1) * 4;
    let mut strings_len = 0usize;
    for a in argv {
        strings_len += (a.len() + 1 + 3) & !3;
    }

    let mut buf = vec![0u8; offsets_len + strings_len];
    let mut cursor = offsets_len;
    for (i, a) in argv.iter().enumerate() {
        buf[i * 4..i * 4 + 4].copy_from_slice(&(cursor as u32).to_le_bytes());
        buf[cursor..cursor + a.len()].copy_from_slice(a.as_bytes());
        cursor += (a.len() + 1 + 3) & !3;
    }
    buf[argv.len() * 4..argv.len() * 4 + 4].copy_from_slice(&(cursor as u32).to_le_bytes());
    Ok(buf)
}

/// The three values `exec` hands to the entry trampoline: where to jump,
/// and what to load into the argc/argv/sp entry registers (spec.md
/// §4.5.2 step 7).
#[derive(Debug, Clone, Copy)]
pub struct ExecEntry {
    pub entry_point: u64,
    pub argc: u32,
    pub argv: u32,
    pub stack_pointer: u32,
}

/// Replace the calling process's program image. On success the process
/// never returns to its old instruction stream; on failure after the
/// address space has been torn down, spec.md §7 calls for terminating the
/// process rather than returning an error to a program that no longer
/// exists. This function stops short of that last step (no arch-level
/// "enter user mode" exists to terminate into) and instead always
/// returns the `Result` to its syscall caller, leaving that policy
/// decision to the syscall dispatcher.
pub fn sys_execv(path: &str, argv: &[&str]) -> Result<ExecEntry, KernelError> {
    let process = super::current_process().ok_or(KernelError::ProcessNotFound { pid: 0 })?;

    // Steps 1-2: pointer validation belongs to the syscall boundary that
    // copies `path`/`argv` in from user space; by the time they reach
    // this function they are already validated kernel-side strings.

    // Step 3: pack the argument vector.
    let mut packed = pack_argv(argv)?;

    // Step 4: open the executable.
    let image = fs::read_file(path).map_err(KernelError::from)?;

    // Step 5: destroy the current address space, build a fresh one, and
    // run the ELF loader against it.
    let mut new_vas = VirtualAddressSpace::new();
    let entry = ElfLoader::load(&image, &mut new_vas).map_err(KernelError::from)?;
    let vnode = fs::get_vfs()
        .read()
        .open(path, fs::OpenFlags::read_only())
        .map_err(KernelError::from)?;
    new_vas.set_executable(vnode);

    {
        let mut space = process.memory_space.lock();
        space.destroy();
        *space = new_vas;
    }

    // Step 6: define the user stack region, then fault in and write the
    // packed argv at its very top.
    let stack_top = USERSTACK;
    let stack_base = stack_top - (vas::STACKPAGES * PAGE_SIZE) as u32;
    {
        let mut space = process.memory_space.lock();
        space.define_region(
            0,
            (vas::STACKPAGES * PAGE_SIZE) as u32,
            0,
            stack_base,
            Perms::READ | Perms::WRITE,
        );
    }

    let argv_len = packed.len() as u32;
    let argv_user_addr = (stack_top - argv_len) & !0x3;

    // Rewrite the packed offsets into absolute user addresses now that
    // the destination is known.
    let argc = argv.len();
    for i in 0..=argc {
        let rel = u32::from_le_bytes(packed[i * 4..i * 4 + 4].try_into().unwrap());
        let abs = argv_user_addr + rel;
        packed[i * 4..i * 4 + 4].copy_from_slice(&abs.to_le_bytes());
    }

    write_to_user_stack(process, argv_user_addr, &packed)?;

    let new_sp = argv_user_addr & !0xf;

    // Step 7: argc, argv's user address, and the adjusted stack pointer
    // are returned for the syscall dispatcher to load into the entry
    // registers when it transfers control to `entry` in user mode.
    Ok(ExecEntry {
        entry_point: entry,
        argc: argc as u32,
        argv: argv_user_addr,
        stack_pointer: new_sp,
    })
}

fn write_to_user_stack(
    process: &crate::process::Process,
    user_addr: u32,
    data: &[u8],
) -> Result<(), KernelError> {
    let mut written = 0usize;
    while written < data.len() {
        let addr = user_addr + written as u32;
        let page = addr & !((PAGE_SIZE as u32) - 1);
        let page_off = (addr - page) as usize;
        let paddr = {
            let mut space = process.memory_space.lock();
            space.fault(addr, vas::FaultType::Write)?
        };
        let chunk = (PAGE_SIZE - page_off).min(data.len() - written);
        unsafe {
            core::ptr::copy_nonoverlapping(
                data[written..written + chunk].as_ptr(),
                (paddr.0 as usize + page_off) as *mut u8,
                chunk,
            );
        }
        written += chunk;
    }
    Ok(())
}
