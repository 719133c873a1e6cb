//! `exit` (spec.md §4.5.3)
//!
//! Trimmed from the teacher's exit/signal/zombie-reaping bundle to the
//! exact steps spec.md describes: close every open file, record the exit
//! code under the exit lock, broadcast the exit cv, and hand the CPU to
//! another process. The record itself is left in the table for `wait` to
//! reap.

/// Terminate the calling process. Never returns.
pub fn sys_exit(code: i32) -> ! {
    if let Some(process) = super::current_process() {
        process.file_table.close_all();

        process.exit_lock.acquire();
        process.mark_exited(code);
        process.exit_cv.broadcast(&process.exit_lock);
        process.exit_lock.release();

        println!("[PROCESS] process {} exited with code {}", process.pid.0, code);
    }

    crate::sched::exit_task()
}
