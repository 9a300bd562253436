//! # Multi-Level Page Table
//!
//! A lazily populated trie keyed by the per-level indices of a virtual
//! address. Walking an address allocates every missing table on the way
//! down and, at the bottom, a leaf with a fresh frame.
//!
//! ```text
//!   root (depth 0)
//!    ├─ [i0] ──► table (depth 1)
//!    │            ├─ [i1] ──► …  ──► leaf (depth N): pfn
//!    │            └─ vacant
//!    └─ vacant
//! ```
//!
//! ## Hit/miss
//!
//! A walk is a **hit** when the leaf already existed and a **miss** when it
//! had to be created. Tables allocated along the way do not affect the
//! outcome; they only show up in [`PageTableTrie::total_entry_count`].
//!
//! ## Entry count
//!
//! Every slot of every allocated table is one entry, vacant or present.
//! With a `[2, 2]` layout the empty trie has 4 entries (the root's slots);
//! the first walk adds a depth-1 table and with it 4 more.

pub mod node;

use crate::Lookup;
use crate::config::AddressSpaceConfig;
use crate::decoder::AddressDecoder;
use crate::frame_alloc::{BumpFrameAlloc, FrameAlloc};
use log::trace;
use sim_addresses::{PhysicalFrameNumber, VirtualAddress};

pub use self::node::{NodeKind, PageTableEntry, PageTableNode};

/// The page table of a single simulated address space.
///
/// Owns the root table, the shift/mask tables and the frame allocator that
/// numbers its leaves. Independent tries never share frame numbers.
#[derive(Debug)]
pub struct PageTableTrie<A: FrameAlloc = BumpFrameAlloc> {
    decoder: AddressDecoder,
    root: PageTableNode,
    frames: A,
}

impl PageTableTrie<BumpFrameAlloc> {
    /// An empty page table for `config` numbering frames from zero.
    ///
    /// ```rust
    /// # use sim_vmem::{AddressSpaceConfig, Lookup, PageTableTrie};
    /// # use sim_addresses::VirtualAddress;
    /// let mut pt = PageTableTrie::new(&AddressSpaceConfig::new([2, 2]).unwrap());
    /// let (pfn, outcome) = pt.translate(VirtualAddress::new(0x0040_0000));
    /// assert_eq!((pfn.as_u32(), outcome), (0, Lookup::Miss));
    /// assert_eq!(pt.translate(VirtualAddress::new(0x0040_0ABC)).1, Lookup::Hit);
    /// ```
    #[must_use]
    pub fn new(config: &AddressSpaceConfig) -> Self {
        Self::with_allocator(config, BumpFrameAlloc::new())
    }
}

impl<A: FrameAlloc> PageTableTrie<A> {
    /// An empty page table drawing leaf frames from `frames`.
    #[must_use]
    pub fn with_allocator(config: &AddressSpaceConfig, frames: A) -> Self {
        let decoder = AddressDecoder::new(config);
        let root = PageTableNode::table(0, decoder.level(0).entry_count());
        Self {
            decoder,
            root,
            frames,
        }
    }

    /// The shift/mask tables this trie walks with.
    #[inline]
    #[must_use]
    pub const fn decoder(&self) -> &AddressDecoder {
        &self.decoder
    }

    /// The root table (depth 0).
    #[inline]
    #[must_use]
    pub const fn root(&self) -> &PageTableNode {
        &self.root
    }

    /// Walk the table for `va`, allocating whatever is missing.
    ///
    /// Returns the frame of the page containing `va` and whether its leaf
    /// already existed. Only the configured index bits of `va` are
    /// consulted.
    pub fn translate(&mut self, va: VirtualAddress) -> (PhysicalFrameNumber, Lookup) {
        let levels = self.decoder.level_count();
        let mut node = &mut self.root;
        let mut created = false;

        for level in 0..levels {
            let index = self.decoder.extract_index(va, level);
            let depth = level + 1;
            let (child, fresh) = node.entry_mut(index).get_or_insert_with(|| {
                if depth < levels {
                    PageTableNode::table(depth, self.decoder.level(depth).entry_count())
                } else {
                    let pfn = self.frames.alloc_frame();
                    trace!("{va:?}: new leaf, assigned {pfn:?}");
                    PageTableNode::leaf(depth, pfn)
                }
            });
            node = child;
            created = fresh;
        }

        let NodeKind::Leaf(pfn) = *node.kind() else {
            unreachable!("walk ended on a table at depth {}", node.depth());
        };

        let outcome = if created { Lookup::Miss } else { Lookup::Hit };
        (pfn, outcome)
    }

    /// Look up `va` without allocating anything.
    #[must_use]
    pub fn query(&self, va: VirtualAddress) -> Option<PhysicalFrameNumber> {
        let mut node = &self.root;
        for level in 0..self.decoder.level_count() {
            node = node.entry(self.decoder.extract_index(va, level)).node()?;
        }
        node.frame()
    }

    /// Number of leaf frames assigned so far.
    #[inline]
    #[must_use]
    pub fn frames_allocated(&self) -> u32 {
        self.frames.frames_allocated()
    }

    /// Number of slots across all allocated tables, the root's included,
    /// whether they point somewhere or not.
    ///
    /// Performs a full traversal.
    #[must_use]
    pub fn total_entry_count(&self) -> u64 {
        self.root.slot_count()
    }
}
