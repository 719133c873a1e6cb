//! Bootstrap module for kernel initialization
//!
//! Brings up the architecture layer, memory management, and process
//! management in order, then hands control to the scheduler. Each stage
//! must complete before the next can run: the page allocator needs no
//! prior state, process management needs frames to back address spaces,
//! and the scheduler needs the init process to exist before it can pick
//! something to run.

use crate::{arch, error::KernelResult, mm, process, sched};

#[cfg(feature = "alloc")]
extern crate alloc;

/// Macro to generate the bootstrap stage tracking functions.
///
/// Each architecture provides its own `$print_fn` macro that accepts a single
/// string literal and outputs it (with a trailing newline) to the
/// architecture's early console. This eliminates the otherwise-identical
/// stage function bodies duplicated across x86_64, AArch64, and RISC-V.
///
/// # Usage
///
/// ```ignore
/// // In arch/<arch>/bootstrap.rs:
/// macro_rules! arch_boot_print {
///     ($s:expr) => { /* arch-specific print */ };
/// }
/// crate::bootstrap::define_bootstrap_stages!(arch_boot_print);
/// ```
#[macro_export]
macro_rules! define_bootstrap_stages {
    ($print_fn:ident) => {
        pub fn stage1_start() {
            $print_fn!("[BOOTSTRAP] Starting kernel initialization...");
            $print_fn!("[BOOTSTRAP] Stage 1: Hardware initialization");
        }

        pub fn stage1_complete() {
            $print_fn!("[BOOTSTRAP] Architecture initialized");
        }

        pub fn stage2_start() {
            $print_fn!("[BOOTSTRAP] Stage 2: Memory management");
        }

        pub fn stage2_complete() {
            $print_fn!("[BOOTSTRAP] Memory management initialized");
        }

        pub fn stage3_start() {
            $print_fn!("[BOOTSTRAP] Stage 3: Process management");
        }

        pub fn stage3_complete() {
            $print_fn!("[BOOTSTRAP] Process management initialized - entering scheduler");
            $print_fn!("BOOTOK");
        }
    };
}

/// Multi-stage kernel initialization: architecture, memory, then process
/// management (which creates the init process and primes the scheduler).
pub fn kernel_init() -> KernelResult<()> {
    #[cfg(target_arch = "x86_64")]
    arch::x86_64::bootstrap::stage1_start();
    #[cfg(target_arch = "aarch64")]
    arch::aarch64::bootstrap::stage1_start();
    #[cfg(target_arch = "riscv64")]
    arch::riscv64::bootstrap::stage1_start();

    arch::init();

    #[cfg(target_arch = "x86_64")]
    arch::x86_64::bootstrap::stage1_complete();
    #[cfg(target_arch = "aarch64")]
    arch::aarch64::bootstrap::stage1_complete();
    #[cfg(target_arch = "riscv64")]
    arch::riscv64::bootstrap::stage1_complete();

    #[cfg(target_arch = "x86_64")]
    arch::x86_64::bootstrap::stage2_start();
    #[cfg(target_arch = "aarch64")]
    arch::aarch64::bootstrap::stage2_start();
    #[cfg(target_arch = "riscv64")]
    arch::riscv64::bootstrap::stage2_start();

    mm::init();

    #[cfg(target_arch = "x86_64")]
    arch::x86_64::bootstrap::stage2_complete();
    #[cfg(target_arch = "aarch64")]
    arch::aarch64::bootstrap::stage2_complete();
    #[cfg(target_arch = "riscv64")]
    arch::riscv64::bootstrap::stage2_complete();

    #[cfg(target_arch = "x86_64")]
    arch::x86_64::bootstrap::stage3_start();
    #[cfg(target_arch = "aarch64")]
    arch::aarch64::bootstrap::stage3_start();
    #[cfg(target_arch = "riscv64")]
    arch::riscv64::bootstrap::stage3_start();

    process::init();

    #[cfg(target_arch = "x86_64")]
    arch::x86_64::bootstrap::stage3_complete();
    #[cfg(target_arch = "aarch64")]
    arch::aarch64::bootstrap::stage3_complete();
    #[cfg(target_arch = "riscv64")]
    arch::riscv64::bootstrap::stage3_complete();

    Ok(())
}

/// Run the bootstrap sequence, then transfer control to the scheduler.
/// Never returns: `sched::run` drives the cooperative run loop until
/// shutdown.
pub fn run() -> ! {
    if let Err(e) = kernel_init() {
        // Panic is intentional: kernel_init failure during boot is
        // unrecoverable. No subsystems are available for graceful error
        // handling at this point.
        panic!("Bootstrap failed: {:?}", e);
    }

    sched::run();
}
