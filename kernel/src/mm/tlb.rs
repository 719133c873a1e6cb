//! Software-managed TLB model
//!
//! os161's MIPS target has a software-loaded TLB with no ASID tagging, so
//! every context switch invalidates it wholesale and every miss is handled
//! by the fault path rather than hardware page-table walks. This crate
//! targets real hardware MMUs with their own walkers, but the fault
//! handler in [`crate::mm::vas`] is specified against that software model,
//! so this module keeps an explicit, inspectable TLB of that shape: a
//! fixed table of `(virtual page, frame)` pairs with round-robin
//! replacement, separate from whatever the arch's real MMU caches.

use spin::Mutex;

use crate::mm::stats;

pub const TLB_SIZE: usize = 64;

struct Tlb {
    entries: [Option<(u32, u32)>; TLB_SIZE],
    next_victim: usize,
}

impl Tlb {
    const fn new() -> Self {
        Self {
            entries: [None; TLB_SIZE],
            next_victim: 0,
        }
    }

    fn probe(&self, vpage: u32) -> Option<u32> {
        self.entries
            .iter()
            .find_map(|e| e.and_then(|(v, f)| (v == vpage).then_some(f)))
    }

    fn insert(&mut self, vpage: u32, frame: u32) {
        if let Some(slot) = self.entries.iter().position(|e| e.is_none()) {
            self.entries[slot] = Some((vpage, frame));
            stats::inc_tlb_fault_free();
            return;
        }
        let victim = self.next_victim;
        self.next_victim = (self.next_victim + 1) % TLB_SIZE;
        self.entries[victim] = Some((vpage, frame));
        stats::inc_tlb_fault_replace();
    }

    fn invalidate_all(&mut self) {
        self.entries = [None; TLB_SIZE];
        self.next_victim = 0;
    }
}

static TLB: Mutex<Tlb> = Mutex::new(Tlb::new());

/// Look up a translation, counting the attempt as a TLB fault regardless
/// of hit or miss (matching the source's terminology: every lookup that
/// reaches this path is a "TLB fault").
pub fn probe(vpage: u32) -> Option<u32> {
    stats::inc_tlb_fault();
    TLB.lock().probe(vpage)
}

/// Install a translation, evicting round-robin if the table is full.
pub fn insert(vpage: u32, frame: u32) {
    TLB.lock().insert(vpage, frame);
}

/// Flush every entry, e.g. on a context switch between address spaces.
pub fn invalidate_all() {
    stats::inc_tlb_invalidate();
    TLB.lock().invalidate_all();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_probe_hits() {
        invalidate_all();
        insert(5, 9);
        assert_eq!(probe(5), Some(9));
    }

    #[test]
    fn invalidate_clears_all_entries() {
        insert(1, 2);
        invalidate_all();
        assert_eq!(probe(1), None);
    }
}
