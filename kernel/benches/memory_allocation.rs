//! Coremap frame allocation benchmarks

#![no_std]
#![no_main]
#![feature(custom_test_frameworks)]
#![test_runner(veridian_kernel::test_runner)]
#![reexport_test_harness_main = "test_main"]

use veridian_kernel::{kernel_bench, mm::coremap, serial_println};

kernel_bench!(bench_single_page_alloc_free, {
    let paddr = coremap::get_pages(1).expect("coremap has room for one page");
    coremap::free_pages(paddr);
});

kernel_bench!(bench_four_page_run_alloc_free, {
    let paddr = coremap::get_pages(4).expect("coremap has room for a 4-page run");
    coremap::free_pages(paddr);
});

#[no_mangle]
pub extern "C" fn _start() -> ! {
    veridian_kernel::arch::init();
    coremap::init();
    serial_println!("\n=== Memory Allocation Benchmarks ===\n");

    test_main();

    loop {
        veridian_kernel::arch::halt();
    }
}

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    veridian_kernel::test_panic_handler(info)
}
