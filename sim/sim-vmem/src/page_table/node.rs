//! # Page Table Nodes
//!
//! A node is either a **table** with one slot per index value at its depth,
//! or a **leaf** holding the frame assigned to one virtual page.
//!
//! Children are owned exclusively by their parent slot; there is no sharing
//! and no way back up the tree. Slots start out [`PageTableEntry::Vacant`]
//! and are filled lazily on the first walk through them. Nodes are never
//! removed.

use alloc::boxed::Box;
use alloc::vec::Vec;
use sim_addresses::PhysicalFrameNumber;

/// One node of the page table trie.
#[derive(Debug)]
pub struct PageTableNode {
    depth: usize,
    kind: NodeKind,
}

/// Payload of a [`PageTableNode`].
#[derive(Debug)]
pub enum NodeKind {
    /// Interior node: `2^bits` child slots for its level.
    Table(Box<[PageTableEntry]>),
    /// Final node of a walk. The frame never changes once assigned.
    Leaf(PhysicalFrameNumber),
}

/// A child slot of a table node.
#[derive(Debug, Default)]
pub enum PageTableEntry {
    /// Not yet allocated.
    #[default]
    Vacant,
    /// Owns the child node.
    Present(Box<PageTableNode>),
}

impl PageTableNode {
    /// A table node at `depth` with `entry_count` vacant slots.
    #[must_use]
    pub fn table(depth: usize, entry_count: usize) -> Self {
        let mut entries = Vec::with_capacity(entry_count);
        entries.resize_with(entry_count, PageTableEntry::default);
        Self {
            depth,
            kind: NodeKind::Table(entries.into_boxed_slice()),
        }
    }

    /// A leaf node at `depth` mapping to `pfn`.
    #[must_use]
    pub const fn leaf(depth: usize, pfn: PhysicalFrameNumber) -> Self {
        Self {
            depth,
            kind: NodeKind::Leaf(pfn),
        }
    }

    /// Distance from the root; the root is at depth 0, leaves at depth `N`.
    #[inline]
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> &NodeKind {
        &self.kind
    }

    #[inline]
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    /// The frame of a leaf node, `None` for tables.
    #[inline]
    #[must_use]
    pub const fn frame(&self) -> Option<PhysicalFrameNumber> {
        match self.kind {
            NodeKind::Leaf(pfn) => Some(pfn),
            NodeKind::Table(_) => None,
        }
    }

    /// Child slots of a table node; empty for leaves.
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[PageTableEntry] {
        match &self.kind {
            NodeKind::Table(entries) => entries,
            NodeKind::Leaf(_) => &[],
        }
    }

    /// Read the slot at `index`.
    ///
    /// # Panics
    /// If this is a leaf, or `index` is outside the table.
    #[inline]
    #[must_use]
    pub fn entry(&self, index: usize) -> &PageTableEntry {
        match &self.kind {
            NodeKind::Table(entries) => &entries[index],
            NodeKind::Leaf(_) => panic!("leaf node at depth {} has no entries", self.depth),
        }
    }

    /// Mutable access to the slot at `index`.
    ///
    /// # Panics
    /// If this is a leaf, or `index` is outside the table.
    #[inline]
    pub fn entry_mut(&mut self, index: usize) -> &mut PageTableEntry {
        match &mut self.kind {
            NodeKind::Table(entries) => &mut entries[index],
            NodeKind::Leaf(_) => panic!("leaf node at depth {} has no entries", self.depth),
        }
    }

    /// Number of slots, vacant or present, in this node and every table
    /// below it. Leaves have no slots.
    #[must_use]
    pub fn slot_count(&self) -> u64 {
        let mut count = 0;
        let mut pending: Vec<&Self> = alloc::vec![self];
        while let Some(node) = pending.pop() {
            let entries = node.entries();
            count += entries.len() as u64;
            pending.extend(entries.iter().filter_map(PageTableEntry::node));
        }
        count
    }
}

impl PageTableEntry {
    #[inline]
    #[must_use]
    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// The child node, if allocated.
    #[inline]
    #[must_use]
    pub fn node(&self) -> Option<&PageTableNode> {
        match self {
            Self::Present(node) => Some(node.as_ref()),
            Self::Vacant => None,
        }
    }

    /// Return the child, allocating it with `make` if the slot is vacant.
    ///
    /// The flag is `true` if the child was created by this call.
    pub fn get_or_insert_with(
        &mut self,
        make: impl FnOnce() -> PageTableNode,
    ) -> (&mut PageTableNode, bool) {
        let created = if let Self::Vacant = self {
            *self = Self::Present(Box::new(make()));
            true
        } else {
            false
        };

        match self {
            Self::Present(node) => (node.as_mut(), created),
            Self::Vacant => unreachable!("slot was just filled"),
        }
    }
}
