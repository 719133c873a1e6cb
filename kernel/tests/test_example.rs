//! Example tests using the custom test framework
//!
//! This demonstrates how to write tests that bypass lang_items conflicts.

#![no_std]
#![no_main]
#![feature(custom_test_frameworks)]
#![test_runner(crate::test_framework::test_runner)]
#![reexport_test_harness_main = "test_main"]

use veridian_kernel::{kernel_assert, kernel_assert_eq, kernel_test, test_module};

// Example unit tests
test_module!(basic_tests,
    test_addition => {
        let result = 2 + 2;
        kernel_assert_eq!(result, 4);
        Ok(())
    },

    test_memory_allocation => {
        // Test basic memory operations
        let value = 42u32;
        let ptr = &value as *const u32;
        kernel_assert!(!ptr.is_null());
        kernel_assert_eq!(unsafe { *ptr }, 42);
        Ok(())
    },

    test_pid_allocation_is_monotonic => {
        use veridian_kernel::process::alloc_pid;

        let a = alloc_pid();
        let b = alloc_pid();
        kernel_assert!(b.0 > a.0);
        Ok(())
    }
);

// Example integration tests
test_module!(integration_tests,
    test_semaphore_post_increments_count => {
        use veridian_kernel::sync::Semaphore;

        let sem = Semaphore::new(0);
        kernel_assert_eq!(sem.count(), 0);
        sem.post();
        kernel_assert_eq!(sem.count(), 1);
        Ok(())
    },

    test_lock_starts_unheld => {
        use veridian_kernel::sync::Lock;

        let lock = Lock::new();
        kernel_assert!(!lock.held_by_me());
        lock.acquire();
        kernel_assert!(lock.held_by_me());
        lock.release();
        kernel_assert!(!lock.held_by_me());
        Ok(())
    }
);

// Example benchmark
#[cfg(feature = "benchmarks")]
mod benchmarks {
    use veridian_kernel::{kernel_bench, test_framework::BenchmarkRunner};

    kernel_bench!(bench_atomic_increment, {
        use core::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        COUNTER.fetch_add(1, Ordering::Relaxed);
    });

    kernel_bench!(bench_lock_acquire_release, {
        use veridian_kernel::sync::Lock;
        static LOCK: Lock = Lock::new();

        LOCK.acquire();
        LOCK.release();
    });
}

// Entry point for test binary
#[no_mangle]
pub extern "C" fn _start() -> ! {
    veridian_kernel::arch::init();
    veridian_kernel::serial_println!("\n=== Running Example Tests ===\n");

    test_main();

    loop {
        veridian_kernel::arch::halt();
    }
}

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    veridian_kernel::test_framework::test_panic_handler(info)
}
