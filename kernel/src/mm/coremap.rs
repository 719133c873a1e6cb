//! Coremap: the physical frame manager
//!
//! Grounded on `frame_allocator.rs`'s `BitmapAllocator` scanning idiom and
//! `FrameNumber`/`PhysicalAddress` newtypes, cut down from a buddy/NUMA
//! hybrid to the simpler contiguous-run allocator spec.md §4.1 describes:
//! every frame carries a state, a run length (nonzero only on the head of
//! an allocation), and an owner used to drive eviction.

use spin::Mutex;

use crate::{
    error::KernelError,
    mm::{swap, PhysAddr, VirtAddr, PAGE_SIZE},
};

/// Number of physical frames this kernel manages. A teaching-kernel-sized
/// pool; real memory size would be discovered from the bootloader's memory
/// map, but that discovery is outside this crate's scope.
pub const NUM_FRAMES: usize = 4096;

/// State of one physical frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    Free,
    Allocated,
    /// Unevictable: kernel-internal use (directory/leaf tables) or
    /// temporarily pinned during a cross-address-space copy.
    Fixed,
}

/// A handle identifying the address space that owns a resident frame, used
/// only to route eviction notifications back to that address space's page
/// table. This is a process id, not a pointer: it is looked up through the
/// process table rather than dereferenced directly.
pub type AsHandle = u64;

#[derive(Clone, Copy)]
struct FrameEntry {
    state: FrameState,
    /// Contiguous run length; nonzero only on the first frame of a run.
    run: u32,
    owner_as: Option<AsHandle>,
    owner_vpage: Option<u32>,
}

impl FrameEntry {
    const fn new() -> Self {
        Self {
            state: FrameState::Free,
            run: 0,
            owner_as: None,
            owner_vpage: None,
        }
    }
}

struct Coremap {
    frames: [FrameEntry; NUM_FRAMES],
    /// Rotating cursor for victim selection (§4.1.1).
    last_used: usize,
    pages_in_use: usize,
}

impl Coremap {
    const fn new() -> Self {
        Self {
            frames: [FrameEntry::new(); NUM_FRAMES],
            last_used: 0,
            pages_in_use: 0,
        }
    }

    fn find_free_run(&self, n: usize) -> Option<usize> {
        let mut start = 0;
        while start + n <= NUM_FRAMES {
            let mut ok = true;
            for i in 0..n {
                if self.frames[start + i].state != FrameState::Free {
                    start += i + 1;
                    ok = false;
                    break;
                }
            }
            if ok {
                return Some(start);
            }
        }
        None
    }

    fn pick_victim(&mut self) -> Option<usize> {
        for _ in 0..NUM_FRAMES {
            let idx = self.last_used;
            self.last_used = (self.last_used + 1) % NUM_FRAMES;
            let f = &self.frames[idx];
            if f.state == FrameState::Allocated && f.run == 1 && f.owner_as.is_some() {
                return Some(idx);
            }
        }
        None
    }
}

static COREMAP: Mutex<Coremap> = Mutex::new(Coremap::new());

fn frame_to_addr(idx: usize) -> PhysAddr {
    PhysAddr((idx as u32) * PAGE_SIZE as u32)
}

fn addr_to_frame(addr: PhysAddr) -> usize {
    (addr.0 / PAGE_SIZE as u32) as usize
}

/// Initialize the coremap. All frames start FREE.
pub fn init() {
    println!("[MM] coremap initialized with {} frames", NUM_FRAMES);
}

/// Allocate `n` contiguous non-FIXED frames, marking them ALLOCATED.
///
/// When `n == 1` and no free frame exists, a victim is selected and evicted
/// before retrying once. Multi-page allocation never triggers eviction,
/// matching the source's documented limitation.
pub fn get_pages(n: usize) -> Result<PhysAddr, KernelError> {
    assert!(n > 0);

    if n == 1 {
        loop {
            {
                let mut map = COREMAP.lock();
                if let Some(start) = map.find_free_run(1) {
                    map.frames[start].state = FrameState::Allocated;
                    map.frames[start].run = 1;
                    map.pages_in_use += 1;
                    return Ok(frame_to_addr(start));
                }
            }
            evict_one()?;
        }
    }

    let mut map = COREMAP.lock();
    let start = map.find_free_run(n).ok_or(KernelError::OutOfMemory {
        requested: n,
        available: 0,
    })?;
    for i in 0..n {
        map.frames[start + i].state = FrameState::Allocated;
        map.frames[start + i].run = if i == 0 { n as u32 } else { 0 };
    }
    map.pages_in_use += n;
    Ok(frame_to_addr(start))
}

/// Select a victim frame, evict it to swap, and return it to the free pool.
/// The victim is pinned FIXED before the lock is released for the swap
/// write, so a racing allocator cannot hand it out mid-eviction.
fn evict_one() -> Result<(), KernelError> {
    let (idx, owner_as, owner_vpage) = {
        let mut map = COREMAP.lock();
        let idx = map.pick_victim().ok_or(KernelError::OutOfMemory {
            requested: 1,
            available: 0,
        })?;
        map.frames[idx].state = FrameState::Fixed;
        let owner_as = map.frames[idx].owner_as.expect("victim has no owner");
        let owner_vpage = map.frames[idx].owner_vpage.expect("victim has no vpage");
        (idx, owner_as, owner_vpage)
    };

    let slot = swap::reserve();
    crate::mm::vas::notify_swapped(crate::process::ProcessId(owner_as), owner_vpage, slot, false);

    let src = unsafe {
        core::slice::from_raw_parts(frame_to_addr(idx).0 as usize as *const u8, PAGE_SIZE)
    };
    swap::write(slot, src);

    let mut map = COREMAP.lock();
    map.frames[idx] = FrameEntry::new();
    map.pages_in_use -= 1;
    Ok(())
}

/// Free the allocation run headed by `paddr`. Freeing a non-head address is
/// logged and otherwise ignored, not fatal.
pub fn free_pages(paddr: PhysAddr) {
    let start = addr_to_frame(paddr);
    let mut map = COREMAP.lock();
    let run = map.frames[start].run;
    if run == 0 {
        println!("[MM] warning: free_pages on non-head frame 0x{:x}", paddr.0);
        return;
    }
    for i in 0..run as usize {
        map.frames[start + i] = FrameEntry::new();
    }
    map.pages_in_use -= run as usize;
}

/// Toggle a resident frame (and every other frame in its allocation run)
/// between ALLOCATED and FIXED.
pub fn set_fixed(paddr: PhysAddr, fixed: bool) {
    let idx = addr_to_frame(paddr);
    let mut map = COREMAP.lock();
    let run = map.frames[idx].run.max(1) as usize;
    let state = if fixed {
        FrameState::Fixed
    } else {
        FrameState::Allocated
    };
    for frame in &mut map.frames[idx..idx + run] {
        frame.state = state;
    }
}

/// Record the owning address space and virtual page of a resident frame.
pub fn set_owner(paddr: PhysAddr, as_handle: AsHandle, vaddr: VirtAddr) {
    let idx = addr_to_frame(paddr);
    let mut map = COREMAP.lock();
    map.frames[idx].owner_as = Some(as_handle);
    map.frames[idx].owner_vpage = Some(vaddr.0 >> 12);
}

/// Read back the owning address space and virtual page of a frame.
pub fn get_owner(paddr: PhysAddr) -> Option<(AsHandle, u32)> {
    let idx = addr_to_frame(paddr);
    let map = COREMAP.lock();
    match (map.frames[idx].owner_as, map.frames[idx].owner_vpage) {
        (Some(a), Some(v)) => Some((a, v)),
        _ => None,
    }
}

/// Number of frames currently ALLOCATED or FIXED. Used by tests to verify
/// the allocate/free round trip.
pub fn pages_in_use() -> usize {
    COREMAP.lock().pages_in_use
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_and_free_round_trip() {
        let before = pages_in_use();
        let p = get_pages(1).unwrap();
        assert_eq!(pages_in_use(), before + 1);
        free_pages(p);
        assert_eq!(pages_in_use(), before);
    }

    #[test]
    fn contiguous_run_is_marked_on_head_only() {
        let before = pages_in_use();
        let p = get_pages(4).unwrap();
        assert_eq!(pages_in_use(), before + 4);
        free_pages(p);
        assert_eq!(pages_in_use(), before);
    }

    #[test]
    fn freeing_non_head_is_a_no_op() {
        let p = get_pages(2).unwrap();
        let second = PhysAddr(p.0 + PAGE_SIZE as u32);
        free_pages(second);
        assert!(pages_in_use() >= 2);
        free_pages(p);
    }
}
