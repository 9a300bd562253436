//! # Address Space Configuration
//!
//! The ordered list of per-level index widths that shapes the page table.
//! Level 0 is the root and consumes the most significant address bits.
//!
//! ```text
//! widths = [2, 3, 3]
//!
//! 31 30 29    27 26    24 23                              0
//! +-----+--------+--------+--------------------------------+
//! | L0  |   L1   |   L2   |        offset (24 bits)        |
//! +-----+--------+--------+--------------------------------+
//! ```
//!
//! A configuration is validated once, at construction; everything built from
//! it relies on the invariants below without re-checking.
//!
//! ## Invariants
//! - At least one level.
//! - Every level is at least one bit wide.
//! - At most [`MAX_INDEX_BITS`] bits are spent on indices, which leaves at
//!   least four offset bits in a 32-bit address.

use alloc::vec::Vec;
use sim_addresses::{ADDRESS_BITS, low_mask};

/// Maximum number of address bits that may be spent on level indices.
pub const MAX_INDEX_BITS: u32 = 28;

/// Validated level layout of a simulated address space.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AddressSpaceConfig {
    widths: Vec<u32>,
    index_bits: u32,
}

/// Reasons an [`AddressSpaceConfig`] is rejected.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("at least one page table level is required")]
    NoLevels,
    #[error("level {level} page table must be at least 1 bit")]
    EmptyLevel { level: usize },
    #[error("too many bits used in page tables: {total} > {max}")]
    TooManyBits { total: u32, max: u32 },
}

impl AddressSpaceConfig {
    /// Validate `widths` (bits per level, root first).
    ///
    /// # Errors
    /// - [`ConfigError::NoLevels`] if `widths` is empty.
    /// - [`ConfigError::EmptyLevel`] for the first zero-width level.
    /// - [`ConfigError::TooManyBits`] if the widths sum past [`MAX_INDEX_BITS`].
    ///
    /// ```rust
    /// # use sim_vmem::{AddressSpaceConfig, ConfigError};
    /// let cfg = AddressSpaceConfig::new([4, 4, 12]).unwrap();
    /// assert_eq!(cfg.offset_bits(), 12);
    ///
    /// assert_eq!(
    ///     AddressSpaceConfig::new([16, 16]),
    ///     Err(ConfigError::TooManyBits { total: 32, max: 28 })
    /// );
    /// ```
    pub fn new(widths: impl Into<Vec<u32>>) -> Result<Self, ConfigError> {
        let widths = widths.into();
        if widths.is_empty() {
            return Err(ConfigError::NoLevels);
        }

        if let Some(level) = widths.iter().position(|&w| w == 0) {
            return Err(ConfigError::EmptyLevel { level });
        }

        // Saturate so absurd widths can't wrap around into a "valid" total.
        let total = widths.iter().fold(0u32, |acc, &w| acc.saturating_add(w));
        if total > MAX_INDEX_BITS {
            return Err(ConfigError::TooManyBits {
                total,
                max: MAX_INDEX_BITS,
            });
        }

        Ok(Self {
            widths,
            index_bits: total,
        })
    }

    /// Index width of every level, root first.
    #[inline]
    #[must_use]
    pub fn levels(&self) -> &[u32] {
        &self.widths
    }

    /// Number of page table levels (`N`).
    #[inline]
    #[must_use]
    pub fn level_count(&self) -> usize {
        self.widths.len()
    }

    /// Total number of address bits consumed by level indices.
    #[inline]
    #[must_use]
    pub const fn index_bits(&self) -> u32 {
        self.index_bits
    }

    /// Number of low address bits left for the in-page offset.
    #[inline]
    #[must_use]
    pub const fn offset_bits(&self) -> u32 {
        ADDRESS_BITS - self.index_bits
    }

    /// Page size in bytes (`2^offset_bits`).
    #[inline]
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        low_mask(self.offset_bits()) + 1
    }

    /// Number of slots in a table at `level` (`2^widths[level]`).
    ///
    /// # Panics
    /// If `level` is not a configured level.
    #[inline]
    #[must_use]
    pub fn entry_count(&self, level: usize) -> usize {
        1 << self.widths[level]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_the_full_index_budget() {
        let cfg = AddressSpaceConfig::new([8, 8, 12]).expect("valid");
        assert_eq!(cfg.level_count(), 3);
        assert_eq!(cfg.index_bits(), 28);
        assert_eq!(cfg.offset_bits(), 4);
        assert_eq!(cfg.page_size(), 16);
        assert_eq!(cfg.entry_count(2), 4096);
    }

    #[test]
    fn rejects_empty_layout() {
        assert_eq!(
            AddressSpaceConfig::new(Vec::new()),
            Err(ConfigError::NoLevels)
        );
    }

    #[test]
    fn rejects_zero_width_level() {
        assert_eq!(
            AddressSpaceConfig::new([4, 0, 4]),
            Err(ConfigError::EmptyLevel { level: 1 })
        );
    }

    #[test]
    fn rejects_oversized_layout() {
        assert_eq!(
            AddressSpaceConfig::new([10, 10, 9]),
            Err(ConfigError::TooManyBits { total: 29, max: 28 })
        );
        assert!(matches!(
            AddressSpaceConfig::new([u32::MAX, 1]),
            Err(ConfigError::TooManyBits { .. })
        ));
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            ConfigError::EmptyLevel { level: 2 }.to_string(),
            "level 2 page table must be at least 1 bit"
        );
    }
}
