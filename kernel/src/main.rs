#![no_std]
#![no_main]
#![feature(custom_test_frameworks)]
#![feature(abi_x86_interrupt)]
#![test_runner(veridian_kernel::test_runner)]
#![reexport_test_harness_main = "test_main"]

use core::panic::PanicInfo;

use veridian_kernel::{bootstrap, println};

#[cfg(not(test))]
#[panic_handler]
fn panic(_info: &PanicInfo) -> ! {
    #[cfg(target_arch = "x86_64")]
    println!("[KERNEL PANIC] {}", _info);

    veridian_kernel::arch::halt();
}

#[cfg(test)]
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    veridian_kernel::test_panic_handler(info)
}

#[no_mangle]
pub extern "C" fn _start() -> ! {
    println!("VeridianOS v{}", env!("CARGO_PKG_VERSION"));
    println!("Initializing kernel...");

    #[cfg(test)]
    test_main();

    // Never returns: brings up arch/mm/process, then enters the scheduler.
    bootstrap::run();
}
