//! Fault/TLB/IO counters
//!
//! Grounded on `sched/metrics.rs`'s atomic-counter-bundle idiom: a struct of
//! `AtomicUsize` fields with `Relaxed` increments, read back for
//! diagnostics. Counts the external interface spec.md §6 exposes.

use core::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub struct Stats {
    pub tlb_invalidate: AtomicUsize,
    pub tlb_fault: AtomicUsize,
    pub tlb_fault_free: AtomicUsize,
    pub tlb_fault_replace: AtomicUsize,
    pub tlb_reload: AtomicUsize,
    pub fault_zero: AtomicUsize,
    pub fault_disk: AtomicUsize,
    pub elf_file_reads: AtomicUsize,
    pub swap_file_writes: AtomicUsize,
}

impl Stats {
    const fn new() -> Self {
        Self {
            tlb_invalidate: AtomicUsize::new(0),
            tlb_fault: AtomicUsize::new(0),
            tlb_fault_free: AtomicUsize::new(0),
            tlb_fault_replace: AtomicUsize::new(0),
            tlb_reload: AtomicUsize::new(0),
            fault_zero: AtomicUsize::new(0),
            fault_disk: AtomicUsize::new(0),
            elf_file_reads: AtomicUsize::new(0),
            swap_file_writes: AtomicUsize::new(0),
        }
    }

    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

pub static STATS: Stats = Stats::new();

pub fn inc_tlb_invalidate() {
    Stats::bump(&STATS.tlb_invalidate);
}
pub fn inc_tlb_fault() {
    Stats::bump(&STATS.tlb_fault);
}
pub fn inc_tlb_fault_free() {
    Stats::bump(&STATS.tlb_fault_free);
}
pub fn inc_tlb_fault_replace() {
    Stats::bump(&STATS.tlb_fault_replace);
}
pub fn inc_tlb_reload() {
    Stats::bump(&STATS.tlb_reload);
}
pub fn inc_fault_zero() {
    Stats::bump(&STATS.fault_zero);
}
pub fn inc_fault_disk() {
    Stats::bump(&STATS.fault_disk);
}
pub fn inc_elf_file_reads() {
    Stats::bump(&STATS.elf_file_reads);
}
pub fn inc_swap_file_writes() {
    Stats::bump(&STATS.swap_file_writes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::Ordering;

    #[test]
    fn counters_start_at_zero_on_a_fresh_instance() {
        let s = Stats::new();
        assert_eq!(s.tlb_fault.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn bump_increments_by_one() {
        let before = STATS.fault_zero.load(Ordering::Relaxed);
        inc_fault_zero();
        assert_eq!(STATS.fault_zero.load(Ordering::Relaxed), before + 1);
    }
}
