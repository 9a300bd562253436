//! # Translation Engine
//!
//! Composes the decoder, the page table and an optional TLB into the one
//! operation callers need: translate a virtual address.
//!
//! ```text
//!  VA ──► decode ──► VPN ──► TLB? ──hit──────────────────────► PFN
//!                             │                                 ▲
//!                             └─miss──► page table walk ──► PFN ┤
//!                                                               └─► TLB fill
//!  PA = (PFN << offset_bits) | (VA & offset_mask)
//! ```
//!
//! The engine is strictly sequential: each call runs to completion before
//! the next one starts, and replaying the same addresses against a fresh
//! engine yields the same results.

use crate::Lookup;
use crate::config::AddressSpaceConfig;
use crate::decoder::AddressDecoder;
use crate::frame_alloc::{BumpFrameAlloc, FrameAlloc};
use crate::page_table::PageTableTrie;
use crate::tlb::TranslationCache;
use log::{debug, trace};
use sim_addresses::{
    PageOffset, PhysicalAddress, PhysicalFrameNumber, VirtualAddress, VirtualPageNumber,
};

/// Result of translating one address.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Translation {
    pub virtual_address: VirtualAddress,
    pub physical_address: PhysicalAddress,
    pub vpn: VirtualPageNumber,
    pub pfn: PhysicalFrameNumber,
    pub offset: PageOffset,
    /// TLB outcome; `None` when the engine has no TLB.
    pub tlb: Option<Lookup>,
    /// Page table outcome; `None` when the TLB answered and no walk happened.
    pub page_table: Option<Lookup>,
}

impl Translation {
    #[inline]
    #[must_use]
    pub fn tlb_hit(&self) -> bool {
        self.tlb.is_some_and(Lookup::is_hit)
    }

    #[inline]
    #[must_use]
    pub fn page_table_hit(&self) -> bool {
        self.page_table.is_some_and(Lookup::is_hit)
    }
}

/// Aggregate counters over all translations of an engine.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct TranslationStats {
    /// Addresses translated.
    pub accesses: u64,
    /// Translations answered by the TLB.
    pub tlb_hits: u64,
    /// Translations answered by an existing page table leaf.
    pub page_table_hits: u64,
    /// Frames handed out by the page table.
    pub frames_allocated: u32,
    /// Slots across all allocated page tables, vacant or present.
    pub page_table_entries: u64,
}

impl TranslationStats {
    /// Translations that had to allocate a new frame.
    #[inline]
    #[must_use]
    pub const fn misses(&self) -> u64 {
        self.accesses - self.tlb_hits - self.page_table_hits
    }
}

/// Address translation for one simulated address space.
#[derive(Debug)]
pub struct TranslationEngine<A: FrameAlloc = BumpFrameAlloc> {
    table: PageTableTrie<A>,
    tlb: Option<TranslationCache>,
    accesses: u64,
    tlb_hits: u64,
    page_table_hits: u64,
}

impl TranslationEngine<BumpFrameAlloc> {
    /// An engine for `config` with a TLB of `tlb_capacity` entries.
    ///
    /// A capacity of `0` disables the TLB.
    ///
    /// ```rust
    /// # use sim_vmem::{AddressSpaceConfig, TranslationEngine};
    /// # use sim_addresses::VirtualAddress;
    /// let cfg = AddressSpaceConfig::new([4, 8]).unwrap();
    /// let mut engine = TranslationEngine::new(&cfg, 4);
    ///
    /// let t = engine.translate(VirtualAddress::new(0x1230_0042));
    /// assert_eq!(t.physical_address.as_u32(), 0x0000_0042);
    /// assert!(!t.tlb_hit());
    ///
    /// let t = engine.translate(VirtualAddress::new(0x1230_0043));
    /// assert!(t.tlb_hit());
    /// ```
    #[must_use]
    pub fn new(config: &AddressSpaceConfig, tlb_capacity: usize) -> Self {
        Self::with_allocator(config, tlb_capacity, BumpFrameAlloc::new())
    }
}

impl<A: FrameAlloc> TranslationEngine<A> {
    /// Like [`new`](TranslationEngine::new) but drawing frames from `frames`.
    #[must_use]
    pub fn with_allocator(config: &AddressSpaceConfig, tlb_capacity: usize, frames: A) -> Self {
        debug!(
            "engine: levels {:?}, offset bits {}, tlb capacity {tlb_capacity}",
            config.levels(),
            config.offset_bits()
        );

        Self {
            table: PageTableTrie::with_allocator(config, frames),
            tlb: (tlb_capacity > 0).then(|| TranslationCache::new(tlb_capacity)),
            accesses: 0,
            tlb_hits: 0,
            page_table_hits: 0,
        }
    }

    /// The shift/mask tables in use.
    #[inline]
    #[must_use]
    pub const fn decoder(&self) -> &AddressDecoder {
        self.table.decoder()
    }

    #[inline]
    #[must_use]
    pub const fn page_table(&self) -> &PageTableTrie<A> {
        &self.table
    }

    /// The TLB, if one is configured.
    #[inline]
    #[must_use]
    pub const fn tlb(&self) -> Option<&TranslationCache> {
        self.tlb.as_ref()
    }

    /// Translate `va`, consulting the TLB first and walking the page table
    /// on a TLB miss.
    pub fn translate(&mut self, va: VirtualAddress) -> Translation {
        let decoder = self.table.decoder();
        let vpn = decoder.vpn(va);
        let offset = decoder.offset(va);
        let offset_bits = decoder.offset_bits();

        let cached = self.tlb.as_mut().and_then(|tlb| tlb.lookup(vpn));

        let (pfn, tlb, page_table) = if let Some(pfn) = cached {
            self.tlb_hits += 1;
            (pfn, Some(Lookup::Hit), None)
        } else {
            let (pfn, outcome) = self.table.translate(va);
            if outcome.is_hit() {
                self.page_table_hits += 1;
            }
            let tlb = self.tlb.as_mut().map(|tlb| {
                tlb.insert(vpn, pfn);
                Lookup::Miss
            });
            (pfn, tlb, Some(outcome))
        };

        self.accesses += 1;

        let translation = Translation {
            virtual_address: va,
            physical_address: PhysicalAddress::from_frame(pfn, offset, offset_bits),
            vpn,
            pfn,
            offset,
            tlb,
            page_table,
        };

        trace!(
            "{va:?} -> {:?} ({vpn:?}, {pfn:?}, tlb {tlb:?}, page table {page_table:?})",
            translation.physical_address
        );
        translation
    }

    /// Snapshot of the aggregate counters.
    ///
    /// Counting page table entries walks the whole table.
    #[must_use]
    pub fn stats(&self) -> TranslationStats {
        TranslationStats {
            accesses: self.accesses,
            tlb_hits: self.tlb_hits,
            page_table_hits: self.page_table_hits,
            frames_allocated: self.table.frames_allocated(),
            page_table_entries: self.table.total_entry_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(widths: &[u32], tlb: usize) -> TranslationEngine {
        let cfg = AddressSpaceConfig::new(widths.to_vec()).expect("valid config");
        TranslationEngine::new(&cfg, tlb)
    }

    #[test]
    fn without_tlb_every_access_walks() {
        let mut e = engine(&[2, 2], 0);
        assert!(e.tlb().is_none());

        let a = e.translate(VirtualAddress::new(0x0000_0000));
        let b = e.translate(VirtualAddress::new(0x1000_0000));
        let c = e.translate(VirtualAddress::new(0x0000_0000));

        assert_eq!(
            [a, b, c].map(|t| (t.pfn.as_u32(), t.page_table)),
            [
                (0, Some(Lookup::Miss)),
                (1, Some(Lookup::Miss)),
                (0, Some(Lookup::Hit))
            ]
        );
        assert!([a, b, c].iter().all(|t| t.tlb.is_none()));
        assert_eq!(e.stats().frames_allocated, 2);
    }

    #[test]
    fn tlb_hit_skips_the_walk() {
        let mut e = engine(&[2, 2], 1);
        let _ = e.translate(VirtualAddress::new(0x0000_0000));
        let _ = e.translate(VirtualAddress::new(0x1000_0000));
        let t = e.translate(VirtualAddress::new(0x1000_0004));

        assert!(t.tlb_hit());
        assert_eq!(t.page_table, None);
        assert_eq!(t.pfn.as_u32(), 1);

        let stats = e.stats();
        assert_eq!(stats.accesses, 3);
        assert_eq!(stats.tlb_hits, 1);
        assert_eq!(stats.page_table_hits, 0);
        assert_eq!(stats.misses(), 2);
    }

    #[test]
    fn physical_address_keeps_the_offset() {
        let mut e = engine(&[4, 4, 4], 0);
        let _ = e.translate(VirtualAddress::new(0x0000_0000));
        let t = e.translate(VirtualAddress::new(0xABC1_2345));
        assert_eq!(t.offset.as_u32(), 0x0001_2345);
        assert_eq!(t.physical_address.as_u32(), 0x0011_2345);
        assert_eq!(t.vpn.as_u32(), 0xABC);
    }

    #[test]
    fn stats_count_page_table_slots() {
        let mut e = engine(&[4, 4, 4], 2);
        let _ = e.translate(VirtualAddress::new(0x1110_0000));
        let _ = e.translate(VirtualAddress::new(0x1120_0000));
        let _ = e.translate(VirtualAddress::new(0x2110_0000));
        // root, plus a depth-1 and a depth-2 table under each of
        // root[1] and root[2]; 16 slots apiece
        assert_eq!(e.stats().page_table_entries, 5 * 16);
    }
}
