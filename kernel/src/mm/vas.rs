//! Virtual Address Space: regions, page table, fault handling
//!
//! Grounded on the teacher's address-space module for the overall shape
//! (one page table plus a Mutex-guarded owning struct) and on
//! `kern/vm/addrspace.c`/`kern/vm/fault.c` for the region model and the
//! fault-handling algorithm itself (spec.md §4.4).

extern crate alloc;

use alloc::sync::Arc;

use crate::{
    error::KernelError,
    fs::VfsNode,
    mm::{
        coremap, page_table::Perms, page_table::Translation, stats, swap, tlb, PhysAddr, VirtAddr,
        PAGE_SIZE,
    },
    process::ProcessId,
};

use super::page_table::PageTable;

pub const MAX_REGIONS: usize = 3;
/// `kern/arch/mips/mips/vm.c`'s `DUMBVM_STACKPAGES`.
pub const STACKPAGES: usize = 12;
pub const USERSTACK: u32 = 0x8000_0000;

/// The kind of access that faulted, mirroring the MIPS trap cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultType {
    Readonly,
    Read,
    Write,
}

#[derive(Clone, Copy)]
pub struct Region {
    pub file_offset: u32,
    pub mem_size: u32,
    pub file_size: u32,
    pub vbase: u32,
    pub perms: Perms,
}

impl Region {
    fn contains(&self, vaddr: u32) -> bool {
        vaddr >= self.vbase && vaddr < self.vbase.saturating_add(self.mem_size)
    }
}

/// One process's address space: a page table, up to [`MAX_REGIONS`] region
/// descriptors, and the vnode backing on-demand ELF faulting.
pub struct VirtualAddressSpace {
    pt: PageTable,
    regions: [Option<Region>; MAX_REGIONS],
    region_count: usize,
    executable: Option<Arc<dyn VfsNode>>,
}

fn stack_base() -> u32 {
    USERSTACK - (STACKPAGES * PAGE_SIZE) as u32
}

impl VirtualAddressSpace {
    pub fn new() -> Self {
        Self {
            pt: PageTable::new(),
            regions: [None, None, None],
            region_count: 0,
            executable: None,
        }
    }

    pub fn set_executable(&mut self, vnode: Arc<dyn VfsNode>) {
        self.executable = Some(vnode);
    }

    /// Append a region descriptor. Fatal on overflow: a teaching kernel
    /// that cannot represent the executable it was asked to load cannot
    /// make forward progress.
    pub fn define_region(
        &mut self,
        file_offset: u32,
        mem_size: u32,
        file_size: u32,
        vbase: u32,
        perms: Perms,
    ) {
        assert!(file_size <= mem_size, "region file_size exceeds mem_size");
        assert!(
            self.region_count < MAX_REGIONS,
            "region table overflow (MAX_REGIONS = {MAX_REGIONS})"
        );
        self.regions[self.region_count] = Some(Region {
            file_offset,
            mem_size,
            file_size,
            vbase,
            perms,
        });
        self.region_count += 1;
    }

    fn find_region(&self, vaddr: u32) -> Option<&Region> {
        self.regions[..self.region_count]
            .iter()
            .filter_map(|r| r.as_ref())
            .find(|r| r.contains(vaddr))
    }

    fn in_stack_range(vaddr: u32) -> bool {
        vaddr >= stack_base() && vaddr < USERSTACK
    }

    /// Whether `vaddr` is backed by a defined region, the implicit stack
    /// range, or an existing page table entry. Used to validate every
    /// syscall argument pointer before copy-in.
    pub fn valid_user_ptr(&self, vaddr: u32) -> bool {
        let page = vaddr & !((PAGE_SIZE as u32) - 1);
        if self.find_region(page).is_some() || Self::in_stack_range(page) {
            return true;
        }
        !matches!(self.pt.lookup(VirtAddr(page)), Translation::Unmapped)
    }

    /// The fault-handling algorithm (spec.md §4.4.2): page-align, bound
    /// against the address space, resolve the region or stack range a page
    /// belongs to, load it from the ELF image or swap, and check
    /// permissions against the fault type.
    pub fn fault(&mut self, fault_vaddr: u32, fault_type: FaultType) -> Result<PhysAddr, KernelError> {
        let page = fault_vaddr & !((PAGE_SIZE as u32) - 1);

        let region = self.find_region(page).copied();
        let in_stack = Self::in_stack_range(page);
        if region.is_none() && !in_stack {
            if let Translation::Unmapped = self.pt.lookup(VirtAddr(page)) {
                return Err(KernelError::InvalidAddress { addr: page as usize });
            }
        }

        let perms = region.map(|r| r.perms).unwrap_or(Perms::READ | Perms::WRITE);

        let paddr = match self.pt.lookup(VirtAddr(page)) {
            Translation::Resident { paddr, .. } => paddr,
            Translation::Swapped { slot, .. } => {
                let frame = coremap::get_pages(1)?;
                let mut buf = [0u8; PAGE_SIZE];
                swap::fetch(slot, &mut buf);
                unsafe {
                    core::ptr::copy_nonoverlapping(
                        buf.as_ptr(),
                        frame.0 as usize as *mut u8,
                        PAGE_SIZE,
                    );
                }
                stats::inc_fault_disk();
                self.pt.map(VirtAddr(page), frame, Perms::READ | Perms::WRITE);
                self.pt.set_perms(VirtAddr(page), perms);
                frame
            }
            Translation::Unmapped => {
                let frame = coremap::get_pages(1)?;
                self.pt.map(VirtAddr(page), frame, Perms::READ | Perms::WRITE);
                if let Some(region) = region {
                    self.load_region_page(&region, page, frame)?;
                } else {
                    unsafe {
                        core::ptr::write_bytes(frame.0 as usize as *mut u8, 0, PAGE_SIZE);
                    }
                    stats::inc_fault_zero();
                }
                self.pt.set_perms(VirtAddr(page), perms);
                frame
            }
        };

        let writable = perms.contains(Perms::WRITE);
        match fault_type {
            FaultType::Write if !writable => {
                return Err(KernelError::InvalidAddress { addr: page as usize });
            }
            FaultType::Readonly if !writable => {
                return Err(KernelError::InvalidAddress { addr: page as usize });
            }
            FaultType::Read if !perms.contains(Perms::READ) => {
                return Err(KernelError::InvalidAddress { addr: page as usize });
            }
            _ => {}
        }

        tlb::insert(page >> 12, paddr.0 >> 12);
        Ok(paddr)
    }

    fn load_region_page(&self, region: &Region, page: u32, frame: PhysAddr) -> Result<(), KernelError> {
        let file_end = region.vbase.saturating_add(region.file_size);
        let overlap_start = page.max(region.vbase);
        let overlap_end = (page + PAGE_SIZE as u32).min(file_end);

        if overlap_start >= overlap_end {
            unsafe {
                core::ptr::write_bytes(frame.0 as usize as *mut u8, 0, PAGE_SIZE);
            }
            stats::inc_fault_zero();
            return Ok(());
        }

        let vnode = self
            .executable
            .as_ref()
            .ok_or(KernelError::InvalidState {
                expected: "address space has an executable bound",
                actual: "no executable vnode",
            })?;

        let in_page_off = (overlap_start - page) as usize;
        let file_off = region.file_offset as usize + (overlap_start - region.vbase) as usize;
        let len = (overlap_end - overlap_start) as usize;

        let dst = unsafe {
            core::slice::from_raw_parts_mut((frame.0 as usize + in_page_off) as *mut u8, len)
        };
        vnode.read(file_off, dst).map_err(KernelError::from)?;
        stats::inc_elf_file_reads();

        if in_page_off > 0 {
            unsafe {
                core::ptr::write_bytes(frame.0 as usize as *mut u8, 0, in_page_off);
            }
        }
        let tail_start = in_page_off + len;
        if tail_start < PAGE_SIZE {
            unsafe {
                core::ptr::write_bytes(
                    (frame.0 as usize + tail_start) as *mut u8,
                    0,
                    PAGE_SIZE - tail_start,
                );
            }
        }
        Ok(())
    }

    /// Translate without faulting. Used by syscall argument copy-in once
    /// `valid_user_ptr` has already established the pointer is legitimate.
    pub fn translate(&self, vaddr: u32) -> Option<PhysAddr> {
        let page = vaddr & !((PAGE_SIZE as u32) - 1);
        match self.pt.lookup(VirtAddr(page)) {
            Translation::Resident { paddr, .. } => Some(PhysAddr(paddr.0 + (vaddr - page))),
            _ => None,
        }
    }

    /// Duplicate this address space for `fork`. Read-only or executable
    /// ELF-backed pages are not copied: they are simply re-declared in the
    /// child via the same regions and will be re-faulted from the shared
    /// vnode (spec.md §3's fork optimization). Every other resident page
    /// is pinned FIXED in the coremap while its contents are copied so a
    /// concurrent eviction cannot race the copy.
    pub fn fork(&self, child_pid: ProcessId) -> Result<Self, KernelError> {
        let mut child = Self::new();
        child.regions = self.regions;
        child.region_count = self.region_count;
        child.executable = self.executable.clone();

        let mut copy_err = None;
        self.pt.for_each_resident(|vaddr, paddr, perms| {
            if copy_err.is_some() {
                return;
            }
            let read_only_elf = self
                .find_region(vaddr.0)
                .map(|r| !r.perms.contains(Perms::WRITE))
                .unwrap_or(false);
            if read_only_elf {
                return;
            }

            match coremap::get_pages(1) {
                Ok(new_frame) => {
                    coremap::set_fixed(paddr, true);
                    coremap::set_fixed(new_frame, true);
                    unsafe {
                        core::ptr::copy_nonoverlapping(
                            paddr.0 as usize as *const u8,
                            new_frame.0 as usize as *mut u8,
                            PAGE_SIZE,
                        );
                    }
                    coremap::set_fixed(paddr, false);
                    coremap::set_fixed(new_frame, false);
                    coremap::set_owner(new_frame, child_pid.0, vaddr);
                    child.pt.map(vaddr, new_frame, perms);
                }
                Err(e) => copy_err = Some(e),
            }
        });

        if let Some(e) = copy_err {
            return Err(e);
        }
        Ok(child)
    }

    /// Tear down the address space: return every resident frame to the
    /// coremap and every swap slot to the free pool.
    pub fn destroy(&mut self) {
        self.pt.for_each_resident(|_, paddr, _| {
            coremap::free_pages(paddr);
        });
        self.pt = PageTable::new();
        self.region_count = 0;
        self.regions = [None, None, None];
        self.executable = None;
    }
}

impl Default for VirtualAddressSpace {
    fn default() -> Self {
        Self::new()
    }
}

/// Called by the coremap when it evicts a frame owned by `owner`'s address
/// space, so the owning page table's entry can be retagged `IN_SWP`.
/// `is_leaf` would mark the eviction of a page-table leaf frame itself
/// rather than an ordinary data page, but directory and leaf frames are
/// allocated FIXED in [`crate::mm::page_table`] and never transition back
/// to ALLOCATED, so `evict_one`'s victim selection can never choose one —
/// this is never called with `is_leaf` true.
pub fn notify_swapped(owner: ProcessId, vpage: u32, slot: swap::SlotId, is_leaf: bool) {
    assert!(
        !is_leaf,
        "page-table frames are FIXED and never eligible for eviction"
    );
    if let Some(process) = crate::process::table::get_process(owner) {
        let vaddr = VirtAddr(vpage << 12);
        process.memory_space.lock().pt.mark_swapped(vaddr, slot);
    }
    stats::inc_swap_file_writes();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_address_space_has_no_regions() {
        let vas = VirtualAddressSpace::new();
        assert_eq!(vas.region_count, 0);
    }

    #[test]
    fn stack_range_is_valid_without_any_region() {
        let vas = VirtualAddressSpace::new();
        assert!(vas.valid_user_ptr(USERSTACK - 4));
        assert!(!vas.valid_user_ptr(0x1000));
    }

    #[test]
    fn defined_region_makes_its_addresses_valid() {
        let mut vas = VirtualAddressSpace::new();
        vas.define_region(0, 0x2000, 0x1000, 0x4000_0000, Perms::READ | Perms::EXECUTE);
        assert!(vas.valid_user_ptr(0x4000_0500));
        assert!(!vas.valid_user_ptr(0x5000_0000));
    }
}
