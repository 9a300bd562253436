use crate::{PageOffset, PhysicalFrameNumber};
use core::fmt;

/// Physical memory address.
///
/// Produced by translation: the frame number shifted into the page-number
/// bits, combined with the untouched in-page offset.
///
/// ### Examples
/// ```rust
/// # use sim_addresses::*;
/// let pa = PhysicalAddress::from_frame(
///     PhysicalFrameNumber::new(3),
///     PageOffset::new(0x10),
///     12,
/// );
/// assert_eq!(pa.as_u32(), 0x3010);
/// ```
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysicalAddress(u32);

impl PhysicalAddress {
    #[inline]
    #[must_use]
    pub const fn new(v: u32) -> Self {
        Self(v)
    }

    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Join a frame and an in-page offset: `(pfn << offset_bits) | offset`.
    ///
    /// Frame bits shifted past bit 31 are discarded; the simulated physical
    /// memory is unbounded but addresses are not.
    #[inline]
    #[must_use]
    pub const fn from_frame(
        pfn: PhysicalFrameNumber,
        offset: PageOffset,
        offset_bits: u32,
    ) -> Self {
        Self(pfn.as_u32().wrapping_shl(offset_bits) | offset.as_u32())
    }
}

impl fmt::Debug for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PA(0x{:08X})", self.0)
    }
}

impl fmt::Display for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

impl From<u32> for PhysicalAddress {
    #[inline]
    fn from(v: u32) -> Self {
        Self::new(v)
    }
}

impl From<PhysicalAddress> for u32 {
    #[inline]
    fn from(pa: PhysicalAddress) -> Self {
        pa.as_u32()
    }
}
