//! # Simulated 32-bit Address Types
//!
//! Strongly typed wrappers for the raw values that flow through the
//! translation simulator.
//!
//! ## Overview
//!
//! Every quantity in the simulator is a plain `u32`, which makes it very easy
//! to hand a frame number to something that expects a virtual address. The
//! types in this crate are zero-cost wrappers that keep the kinds apart at
//! compile time:
//!
//! | Type | Meaning |
//! |------|---------|
//! | [`VirtualAddress`] | An address as issued by the simulated program. |
//! | [`PhysicalAddress`] | The translated address: frame base plus offset. |
//! | [`VirtualPageNumber`] | The index bits of a virtual address, packed into one key. |
//! | [`PhysicalFrameNumber`] | A frame handed out by the frame allocator. |
//! | [`PageOffset`] | The low bits of an address that translation never touches. |
//!
//! ## Layout
//!
//! ```text
//! 31                                  offset_bits            0
//! +-------+-------+-- ... --+-------+------------------------+
//! |  L0   |  L1   |         | LN-1  |        offset          |
//! +-------+-------+-- ... --+-------+------------------------+
//! \______________ VPN ______________/
//! ```
//!
//! How many bits each level consumes is not fixed here; the level layout is
//! runtime configuration owned by the translation engine.
//!
//! ## Typical Usage
//!
//! ```rust
//! # use sim_addresses::*;
//! let va = VirtualAddress::new(0x0040_1234);
//! let offset = va.offset(12);
//! assert_eq!(offset.as_u32(), 0x234);
//!
//! let pa = PhysicalAddress::from_frame(PhysicalFrameNumber::new(7), offset, 12);
//! assert_eq!(pa.as_u32(), 0x7234);
//! ```

#![cfg_attr(not(test), no_std)]

mod page_number;
mod physical_address;
mod virtual_address;

pub use crate::page_number::{PhysicalFrameNumber, VirtualPageNumber};
pub use crate::physical_address::PhysicalAddress;
pub use crate::virtual_address::VirtualAddress;

use core::fmt;

/// Width of every simulated address, in bits.
pub const ADDRESS_BITS: u32 = u32::BITS;

/// In-page offset: the low `offset_bits` of an address.
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PageOffset(u32);

impl PageOffset {
    #[inline]
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for PageOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PageOffset(0x{:X})", self.0)
    }
}

impl fmt::Display for PageOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

/// Mask selecting the low `bits` bits of a `u32`.
///
/// Saturates at [`ADDRESS_BITS`]: `low_mask(32)` is `u32::MAX`.
///
/// ```rust
/// # use sim_addresses::low_mask;
/// assert_eq!(low_mask(0), 0);
/// assert_eq!(low_mask(12), 0xFFF);
/// assert_eq!(low_mask(32), u32::MAX);
/// ```
#[inline]
#[must_use]
pub const fn low_mask(bits: u32) -> u32 {
    if bits >= ADDRESS_BITS {
        u32::MAX
    } else {
        (1 << bits) - 1
    }
}
