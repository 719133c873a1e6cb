//! Memory management: physical frames, swap, page tables, address spaces
//!
//! Trimmed from a buddy/NUMA/4-level-paging stack down to the teaching
//! model spec.md §4 describes: a contiguous-run coremap, a fixed-slot
//! swap store, a 2-level software-walked page table, and per-process
//! address spaces that own a fault handler.

#![allow(dead_code)]

extern crate alloc;

pub mod coremap;
pub mod page_table;
pub mod stats;
pub mod swap;
pub mod tlb;
pub mod vas;

pub use vas::VirtualAddressSpace;

/// `SWAPFILE_MAX_SIZE / PAGE_SIZE`, and the unit every address-space
/// operation in this module works in.
pub const PAGE_SIZE: usize = 4096;

/// A physical memory address, page-granular in the coremap's bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PhysAddr(pub u32);

/// A 32-bit user virtual address: top 10 bits directory index, next 10
/// bits leaf index, low 12 bits page offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct VirtAddr(pub u32);

/// Initialize the coremap and swap store. Must run once at boot before any
/// address space is created.
pub fn init() {
    println!("[MM] initializing memory management...");
    coremap::init();
    swap::init();
    println!("[MM] memory management initialized");
}
