//! # Address Decoder
//!
//! Derives the per-level shift and mask tables from an
//! [`AddressSpaceConfig`] and uses them to cut a virtual address into level
//! indices.
//!
//! Levels are laid out from the most significant bit downwards:
//!
//! ```text
//! bits_remaining = 32
//! for each level i:
//!     shift[i] = bits_remaining - width[i]
//!     mask[i]  = ((1 << width[i]) - 1) << shift[i]
//!     bits_remaining -= width[i]
//! ```
//!
//! The index fields are disjoint and contiguous; everything below the last
//! field is the page offset and is never consulted by the decoder.

use crate::config::AddressSpaceConfig;
use alloc::vec::Vec;
use sim_addresses::{ADDRESS_BITS, PageOffset, VirtualAddress, VirtualPageNumber, low_mask};

/// Shift and mask for one page table level.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LevelLayout {
    /// Number of index bits at this level.
    pub bits: u32,
    /// Right shift that moves the index field down to bit 0.
    pub shift: u32,
    /// Mask selecting the index field in place.
    pub mask: u32,
}

/// Splits virtual addresses into per-level indices and packs them back into
/// a [`VirtualPageNumber`].
#[derive(Debug, Clone)]
pub struct AddressDecoder {
    levels: Vec<LevelLayout>,
    offset_bits: u32,
}

impl LevelLayout {
    /// Number of slots a table at this level holds.
    #[inline]
    #[must_use]
    pub const fn entry_count(self) -> usize {
        1 << self.bits
    }
}

impl AddressDecoder {
    /// Build the shift/mask tables for `config`.
    ///
    /// ```rust
    /// # use sim_vmem::{AddressDecoder, AddressSpaceConfig};
    /// let cfg = AddressSpaceConfig::new([2, 3, 3]).unwrap();
    /// let dec = AddressDecoder::new(&cfg);
    /// assert_eq!(dec.shifts().collect::<Vec<_>>(), [30, 27, 24]);
    /// assert_eq!(dec.masks().collect::<Vec<_>>(), [0xC000_0000, 0x3800_0000, 0x0700_0000]);
    /// ```
    #[must_use]
    pub fn new(config: &AddressSpaceConfig) -> Self {
        let mut bits_remaining = ADDRESS_BITS;
        let levels = config
            .levels()
            .iter()
            .map(|&bits| {
                let shift = bits_remaining - bits;
                bits_remaining -= bits;
                LevelLayout {
                    bits,
                    shift,
                    mask: low_mask(bits) << shift,
                }
            })
            .collect();

        Self {
            levels,
            offset_bits: bits_remaining,
        }
    }

    /// Layout of every level, root first.
    #[inline]
    #[must_use]
    pub fn levels(&self) -> &[LevelLayout] {
        &self.levels
    }

    /// Number of levels.
    #[inline]
    #[must_use]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Layout of a single level.
    ///
    /// # Panics
    /// If `level` is out of range. That is a caller defect, not a runtime
    /// condition.
    #[inline]
    #[must_use]
    pub fn level(&self, level: usize) -> LevelLayout {
        self.levels[level]
    }

    /// The shift table, root first.
    pub fn shifts(&self) -> impl ExactSizeIterator<Item = u32> + '_ {
        self.levels.iter().map(|l| l.shift)
    }

    /// The mask table, root first.
    pub fn masks(&self) -> impl ExactSizeIterator<Item = u32> + '_ {
        self.levels.iter().map(|l| l.mask)
    }

    /// Number of low bits left for the page offset.
    #[inline]
    #[must_use]
    pub const fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    /// Mask selecting the page offset.
    #[inline]
    #[must_use]
    pub const fn offset_mask(&self) -> u32 {
        low_mask(self.offset_bits)
    }

    /// The page offset of `va`.
    #[inline]
    #[must_use]
    pub const fn offset(&self, va: VirtualAddress) -> PageOffset {
        va.offset(self.offset_bits)
    }

    /// Index into the table at `level` for `va`: `(va & mask) >> shift`.
    ///
    /// # Panics
    /// If `level` is out of range.
    #[inline]
    #[must_use]
    pub fn extract_index(&self, va: VirtualAddress, level: usize) -> usize {
        let l = self.levels[level];
        ((va.as_u32() & l.mask) >> l.shift) as usize
    }

    /// All level indices of `va`, root first.
    #[must_use]
    pub fn split_indices(&self, va: VirtualAddress) -> Vec<usize> {
        (0..self.levels.len())
            .map(|level| self.extract_index(va, level))
            .collect()
    }

    /// Pack per-level indices into one virtual page number.
    ///
    /// Walks the levels in the same order as the page table: the
    /// accumulator is shifted left by each level's width before its index is
    /// or-ed in.
    ///
    /// # Panics
    /// If `indices` does not hold exactly one index per level.
    #[must_use]
    pub fn assemble_vpn(&self, indices: &[usize]) -> VirtualPageNumber {
        assert_eq!(
            indices.len(),
            self.levels.len(),
            "one index per page table level expected"
        );

        let mut vpn = 0u32;
        let mut consumed = 0u32;
        for (layout, &index) in self.levels.iter().zip(indices) {
            let used = ADDRESS_BITS - layout.shift;
            vpn <<= used - consumed;
            // Indices originate from `extract_index` and fit in `bits`.
            #[allow(clippy::cast_possible_truncation)]
            let index = index as u32;
            vpn |= index & low_mask(layout.bits);
            consumed = used;
        }

        VirtualPageNumber::new(vpn)
    }

    /// The virtual page number of `va`.
    ///
    /// Equivalent to `assemble_vpn(&split_indices(va))`, which in turn is the
    /// index field shifted down to bit 0.
    #[must_use]
    pub fn vpn(&self, va: VirtualAddress) -> VirtualPageNumber {
        self.assemble_vpn(&self.split_indices(va))
    }
}
