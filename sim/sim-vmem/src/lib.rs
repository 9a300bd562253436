//! # Simulated Virtual Memory
//!
//! An N-level, lazily populated page table with an optional LRU translation
//! lookaside buffer (TLB), driven one virtual address at a time.
//!
//! ## What you get
//! - An [`AddressSpaceConfig`] describing how many index bits each level
//!   consumes, validated once.
//! - An [`AddressDecoder`] holding the derived shift/mask tables.
//! - A [`PageTableTrie`] that maps virtual page numbers to frames, allocating
//!   tables and frames on first touch.
//! - A [`TranslationCache`] (the TLB) with deterministic LRU eviction.
//! - A [`TranslationEngine`] tying it all together.
//!
//! ## 32-bit Virtual Address → Physical Address
//!
//! With a `[2, 3, 3]` layout, a virtual address splits into:
//!
//! ```text
//! | 31‒30 | 29‒27 | 26‒24 | 23‒0   |
//! |  L0   |  L1   |  L2   | Offset |
//! ```
//!
//! Each level field indexes one table. The first walk through an address
//! allocates the missing tables and a leaf holding the next free frame; any
//! later walk finds the leaf and reuses its frame.
//!
//! ```text
//!  root  →  L1 table  →  L2 table  →  leaf (pfn)
//! ```
//!
//! The physical address is the frame number shifted into the page-number
//! bits, or-ed with the untouched offset:
//!
//! ```text
//! PA = (pfn << offset_bits) | (VA & offset_mask)
//! ```
//!
//! ## Physical memory
//!
//! Physical memory is unbounded. Frames are numbered `0, 1, 2, …` in the
//! order their pages are first touched and are never reclaimed.
//!
//! ## Example
//!
//! ```rust
//! use sim_addresses::VirtualAddress;
//! use sim_vmem::{AddressSpaceConfig, Lookup, TranslationEngine};
//!
//! let cfg = AddressSpaceConfig::new([2, 2]).unwrap();
//! let mut engine = TranslationEngine::new(&cfg, 0);
//!
//! let first = engine.translate(VirtualAddress::new(0x1000_0010));
//! assert_eq!(first.pfn.as_u32(), 0);
//! assert_eq!(first.page_table, Some(Lookup::Miss));
//!
//! let again = engine.translate(VirtualAddress::new(0x1000_0020));
//! assert_eq!(again.page_table, Some(Lookup::Hit));
//! assert_eq!(again.physical_address.as_u32(), 0x0000_0020);
//! ```

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod decoder;
pub mod engine;
pub mod frame_alloc;
pub mod page_table;
pub mod tlb;

extern crate alloc;

pub use crate::config::{AddressSpaceConfig, ConfigError, MAX_INDEX_BITS};
pub use crate::decoder::{AddressDecoder, LevelLayout};
pub use crate::engine::{Translation, TranslationEngine, TranslationStats};
pub use crate::frame_alloc::{BumpFrameAlloc, FrameAlloc};
pub use crate::page_table::{PageTableNode, PageTableTrie};
pub use crate::tlb::{TlbEntry, TranslationCache};

/// Outcome of a lookup in the TLB or the page table.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Lookup {
    /// The translation already existed.
    Hit,
    /// The translation had to be produced (TLB) or allocated (page table).
    Miss,
}

impl Lookup {
    #[inline]
    #[must_use]
    pub const fn is_hit(self) -> bool {
        matches!(self, Self::Hit)
    }

    /// `"hit"` or `"miss"`.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
        }
    }
}

impl core::fmt::Display for Lookup {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
