//! Physical frame allocation for the simulated page table.
//!
//! Simulated physical memory is unbounded: frames are numbered in allocation
//! order and never returned.

use sim_addresses::PhysicalFrameNumber;

/// Source of physical frames for page table leaves.
pub trait FrameAlloc {
    /// Allocate the next physical frame.
    fn alloc_frame(&mut self) -> PhysicalFrameNumber;

    /// Number of frames handed out so far.
    fn frames_allocated(&self) -> u32;
}

/// A **bump** allocator: hands out frame `0`, `1`, `2`, … and never frees.
#[derive(Debug, Default, Clone)]
pub struct BumpFrameAlloc {
    next: PhysicalFrameNumber,
    allocated: u32,
}

impl BumpFrameAlloc {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: PhysicalFrameNumber::new(0),
            allocated: 0,
        }
    }

    /// The frame the next call to [`alloc_frame`](FrameAlloc::alloc_frame) returns.
    #[inline]
    #[must_use]
    pub const fn peek(&self) -> PhysicalFrameNumber {
        self.next
    }
}

impl FrameAlloc for BumpFrameAlloc {
    fn alloc_frame(&mut self) -> PhysicalFrameNumber {
        let pfn = self.next;
        self.next = pfn.next();
        self.allocated += 1;
        pfn
    }

    fn frames_allocated(&self) -> u32 {
        self.allocated
    }
}
