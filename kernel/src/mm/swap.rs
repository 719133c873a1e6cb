//! Swap store
//!
//! No teacher counterpart; grounded on `kern/vm/swapfile.h`'s fixed-size
//! slot model. `MAX_PAGES` slots are tracked by a small state machine
//! (Free -> Reserved -> Written -> Free once read back out); there is no
//! teacher abstraction for a disk-backed page store to generalize, so this
//! module is new code written in the teacher's style (a `Mutex`-guarded
//! fixed array plus free functions, matching [`crate::mm::coremap`]).

extern crate alloc;

use alloc::boxed::Box;
use spin::Mutex;

use crate::mm::PAGE_SIZE;

/// `SWAPFILE_MAX_SIZE / PAGE_SIZE`.
pub const MAX_PAGES: usize = 2304;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Free,
    Reserved,
    Written,
}

pub type SlotId = usize;

struct SwapStore {
    states: [SlotState; MAX_PAGES],
    /// Backing storage. Boxed so the struct itself stays small; in a real
    /// kernel this would be a disk device, here it stands in for one.
    data: Box<[[u8; PAGE_SIZE]; MAX_PAGES]>,
    next_free: usize,
}

impl SwapStore {
    fn find_free(&self) -> Option<usize> {
        for i in 0..MAX_PAGES {
            let idx = (self.next_free + i) % MAX_PAGES;
            if self.states[idx] == SlotState::Free {
                return Some(idx);
            }
        }
        None
    }
}

static SWAP: Mutex<Option<SwapStore>> = Mutex::new(None);

/// Initialize the swap store's backing storage. Must be called once before
/// any `reserve`/`write`/`fetch` call.
pub fn init() {
    let mut guard = SWAP.lock();
    if guard.is_some() {
        return;
    }
    *guard = Some(SwapStore {
        states: [SlotState::Free; MAX_PAGES],
        data: Box::new([[0u8; PAGE_SIZE]; MAX_PAGES]),
        next_free: 0,
    });
    println!("[MM] swap store initialized, {} slots", MAX_PAGES);
}

/// Reserve a free slot, transitioning it Free -> Reserved. Exhaustion of
/// the swap store is a fatal condition: a teaching kernel with no swap
/// left and a coremap that still needs to evict cannot make forward
/// progress, so this panics rather than handing the caller a recoverable
/// error to propagate.
pub fn reserve() -> SlotId {
    let mut guard = SWAP.lock();
    let store = guard.as_mut().expect("swap store not initialized");
    let idx = store.find_free().expect("swap store exhausted");
    store.states[idx] = SlotState::Reserved;
    store.next_free = (idx + 1) % MAX_PAGES;
    idx
}

/// Write a page into a reserved slot, transitioning it Reserved -> Written.
pub fn write(slot: SlotId, page: &[u8]) {
    assert_eq!(page.len(), PAGE_SIZE);
    let mut guard = SWAP.lock();
    let store = guard.as_mut().expect("swap store not initialized");
    assert_eq!(
        store.states[slot],
        SlotState::Reserved,
        "write to slot not in the Reserved state"
    );
    store.data[slot].copy_from_slice(page);
    store.states[slot] = SlotState::Written;
}

/// Reserve a slot and write a page into it in one step.
pub fn store(page: &[u8]) -> SlotId {
    let slot = reserve();
    write(slot, page);
    slot
}

/// Read a page out of a Written slot and free it.
pub fn fetch(slot: SlotId, out: &mut [u8]) {
    assert_eq!(out.len(), PAGE_SIZE);
    let mut guard = SWAP.lock();
    let store = guard.as_mut().expect("swap store not initialized");
    assert_eq!(
        store.states[slot],
        SlotState::Written,
        "fetch from slot not in the Written state"
    );
    out.copy_from_slice(&store.data[slot]);
    store.states[slot] = SlotState::Free;
}

/// Free a reserved-but-never-written slot, e.g. when an eviction is
/// abandoned after the slot was reserved.
pub fn release(slot: SlotId) {
    let mut guard = SWAP.lock();
    let store = guard.as_mut().expect("swap store not initialized");
    store.states[slot] = SlotState::Free;
}

/// Number of slots not currently Free. Exposed for tests and stats.
pub fn slots_in_use() -> usize {
    let guard = SWAP.lock();
    let store = guard.as_ref().expect("swap store not initialized");
    store
        .states
        .iter()
        .filter(|s| **s != SlotState::Free)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ensure_init() {
        init();
    }

    #[test]
    fn reserve_write_fetch_round_trip() {
        ensure_init();
        let before = slots_in_use();
        let page = [0x42u8; PAGE_SIZE];
        let slot = store(&page);
        assert_eq!(slots_in_use(), before + 1);

        let mut out = [0u8; PAGE_SIZE];
        fetch(slot, &mut out);
        assert_eq!(&out[..], &page[..]);
        assert_eq!(slots_in_use(), before);
    }

    #[test]
    fn release_frees_a_reserved_slot() {
        ensure_init();
        let before = slots_in_use();
        let slot = reserve();
        assert_eq!(slots_in_use(), before + 1);
        release(slot);
        assert_eq!(slots_in_use(), before);
    }
}
