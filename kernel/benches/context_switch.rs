//! Scheduler primitive benchmarks

#![no_std]
#![no_main]
#![feature(custom_test_frameworks)]
#![test_runner(veridian_kernel::test_runner)]
#![reexport_test_harness_main = "test_main"]

use veridian_kernel::{kernel_bench, sched, serial_println};

kernel_bench!(bench_splhigh_splx, {
    let spl = sched::splhigh();
    sched::splx(spl);
});

kernel_bench!(bench_lock_acquire_release, {
    use veridian_kernel::sync::Lock;
    static LOCK: Lock = Lock::new();

    LOCK.acquire();
    LOCK.release();
});

#[no_mangle]
pub extern "C" fn _start() -> ! {
    veridian_kernel::arch::init();
    serial_println!("\n=== Scheduler Primitive Benchmarks ===\n");

    test_main();

    loop {
        veridian_kernel::arch::halt();
    }
}

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    veridian_kernel::test_panic_handler(info)
}
