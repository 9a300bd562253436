//! # Translation Lookaside Buffer
//!
//! A small, fully associative cache of `VPN → PFN` translations with strict
//! least-recently-used replacement.
//!
//! ## Recency
//!
//! Recency is a logical clock owned by the cache, not wall time. It ticks on
//! **every** lookup, hit or miss, and on every insert. Each slot remembers the
//! tick at which it was last filled or hit; the victim is the slot with the
//! smallest stamp. Because every tick is unique, ties cannot occur; should
//! they ever, the lowest slot index wins.
//!
//! ## Capacity
//!
//! Slots are scanned linearly. Realistic TLBs hold tens of entries, where a
//! scan is cheaper than maintaining a heap or a linked list. A capacity of
//! zero yields a cache that never hits and never stores anything.

use alloc::vec::Vec;
use log::debug;
use sim_addresses::{PhysicalFrameNumber, VirtualPageNumber};

/// One occupied cache slot.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TlbEntry {
    pub vpn: VirtualPageNumber,
    pub pfn: PhysicalFrameNumber,
    /// Clock value of the last fill or hit.
    pub last_used: u64,
}

/// Fixed-capacity LRU translation cache.
#[derive(Debug, Clone)]
pub struct TranslationCache {
    slots: Vec<Option<TlbEntry>>,
    clock: u64,
}

impl TranslationCache {
    /// A cache with `capacity` empty slots.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: alloc::vec![None; capacity],
            clock: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Current value of the recency clock.
    #[inline]
    #[must_use]
    pub const fn clock(&self) -> u64 {
        self.clock
    }

    /// Occupied slots in slot order.
    pub fn entries(&self) -> impl Iterator<Item = &TlbEntry> {
        self.slots.iter().flatten()
    }

    /// Whether `vpn` is cached. Does not touch the clock.
    #[must_use]
    pub fn contains(&self, vpn: VirtualPageNumber) -> bool {
        self.entries().any(|e| e.vpn == vpn)
    }

    /// Look up `vpn`, refreshing its recency on a hit.
    ///
    /// The clock ticks even when nothing is found.
    pub fn lookup(&mut self, vpn: VirtualPageNumber) -> Option<PhysicalFrameNumber> {
        self.clock += 1;
        let now = self.clock;
        self.slots
            .iter_mut()
            .flatten()
            .find(|e| e.vpn == vpn)
            .map(|e| {
                e.last_used = now;
                e.pfn
            })
    }

    /// Cache `vpn → pfn`.
    ///
    /// An existing entry for `vpn` is overwritten in place. Otherwise the
    /// first free slot is used, and if there is none the least recently used
    /// entry is evicted.
    pub fn insert(&mut self, vpn: VirtualPageNumber, pfn: PhysicalFrameNumber) {
        if self.slots.is_empty() {
            return;
        }

        self.clock += 1;
        let entry = TlbEntry {
            vpn,
            pfn,
            last_used: self.clock,
        };

        let index = self
            .position_of(vpn)
            .or_else(|| self.slots.iter().position(Option::is_none))
            .unwrap_or_else(|| self.victim());

        if let Some(old) = self.slots[index].replace(entry)
            && old.vpn != vpn
        {
            debug!("tlb: evicting {:?} → {:?} for {vpn:?}", old.vpn, old.pfn);
        }
    }

    fn position_of(&self, vpn: VirtualPageNumber) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.is_some_and(|e| e.vpn == vpn))
    }

    /// Index of the occupied slot with the oldest stamp; first one on ties.
    fn victim(&self) -> usize {
        let mut victim = 0;
        let mut oldest = u64::MAX;
        for (i, entry) in self.slots.iter().enumerate() {
            if let Some(e) = entry
                && e.last_used < oldest
            {
                oldest = e.last_used;
                victim = i;
            }
        }
        victim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vpn(v: u32) -> VirtualPageNumber {
        VirtualPageNumber::new(v)
    }

    fn pfn(v: u32) -> PhysicalFrameNumber {
        PhysicalFrameNumber::new(v)
    }

    #[test]
    fn lookup_ticks_even_on_miss() {
        let mut tlb = TranslationCache::new(2);
        assert_eq!(tlb.lookup(vpn(1)), None);
        assert_eq!(tlb.lookup(vpn(1)), None);
        assert_eq!(tlb.clock(), 2);
    }

    #[test]
    fn hit_returns_cached_frame() {
        let mut tlb = TranslationCache::new(4);
        tlb.insert(vpn(0x10), pfn(3));
        assert_eq!(tlb.lookup(vpn(0x10)), Some(pfn(3)));
        assert_eq!(tlb.lookup(vpn(0x11)), None);
        assert_eq!(tlb.len(), 1);
    }

    #[test]
    fn fills_free_slots_low_to_high() {
        let mut tlb = TranslationCache::new(3);
        tlb.insert(vpn(7), pfn(0));
        tlb.insert(vpn(8), pfn(1));
        let vpns: Vec<_> = tlb.entries().map(|e| e.vpn.as_u32()).collect();
        assert_eq!(vpns, [7, 8]);
    }

    #[test]
    fn evicts_first_inserted_when_full() {
        let mut tlb = TranslationCache::new(3);
        for v in 0..3 {
            tlb.insert(vpn(v), pfn(v));
        }
        tlb.insert(vpn(3), pfn(3));

        assert!(!tlb.contains(vpn(0)));
        for v in 1..=3 {
            assert!(tlb.contains(vpn(v)));
        }
        assert_eq!(tlb.len(), 3);
    }

    #[test]
    fn lookup_protects_entry_from_eviction() {
        let mut tlb = TranslationCache::new(3);
        for v in 0..3 {
            tlb.insert(vpn(v), pfn(v));
        }
        assert_eq!(tlb.lookup(vpn(0)), Some(pfn(0)));
        tlb.insert(vpn(3), pfn(3));

        assert!(tlb.contains(vpn(0)));
        assert!(!tlb.contains(vpn(1)));
    }

    #[test]
    fn missed_lookups_still_age_entries() {
        let mut tlb = TranslationCache::new(2);
        tlb.insert(vpn(0), pfn(0));
        let _ = tlb.lookup(vpn(9));
        tlb.insert(vpn(1), pfn(1));
        let _ = tlb.lookup(vpn(9));
        let _ = tlb.lookup(vpn(0));
        tlb.insert(vpn(2), pfn(2));

        // vpn 0 was refreshed after vpn 1 was filled
        assert!(tlb.contains(vpn(0)));
        assert!(!tlb.contains(vpn(1)));
    }

    #[test]
    fn reinsert_updates_in_place() {
        let mut tlb = TranslationCache::new(2);
        tlb.insert(vpn(5), pfn(1));
        tlb.insert(vpn(5), pfn(2));
        assert_eq!(tlb.len(), 1);
        assert_eq!(tlb.lookup(vpn(5)), Some(pfn(2)));
    }

    #[test]
    fn zero_capacity_never_caches() {
        let mut tlb = TranslationCache::new(0);
        tlb.insert(vpn(1), pfn(1));
        assert!(tlb.is_empty());
        assert_eq!(tlb.lookup(vpn(1)), None);
    }

    #[test]
    fn single_slot_always_replaces() {
        let mut tlb = TranslationCache::new(1);
        tlb.insert(vpn(1), pfn(10));
        tlb.insert(vpn(2), pfn(20));
        assert_eq!(tlb.lookup(vpn(1)), None);
        assert_eq!(tlb.lookup(vpn(2)), Some(pfn(20)));
    }
}
