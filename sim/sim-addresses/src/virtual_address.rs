use crate::{PageOffset, low_mask};
use core::fmt;

/// Virtual memory address.
///
/// A thin wrapper around a `u32` that denotes **virtual** addresses as read
/// from a trace. It does not validate anything; it only carries the *kind* of
/// address at the type level so you don't accidentally mix virtual and
/// physical values.
///
/// ### Semantics
/// - [`VirtualAddress::offset`] extracts the in-page offset for a given
///   number of offset bits.
/// - Splitting the remaining bits into per-level indices depends on the level
///   layout and is done by the decoder in `sim-vmem`.
///
/// ### Examples
/// ```rust
/// # use sim_addresses::*;
/// let va = VirtualAddress::new(0xFE12_3456);
/// assert_eq!(va.offset(16).as_u32(), 0x3456);
/// assert_eq!(va.as_u32() >> 16, 0xFE12);
/// ```
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VirtualAddress(u32);

impl VirtualAddress {
    #[inline]
    #[must_use]
    pub const fn new(v: u32) -> Self {
        Self(v)
    }

    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0)
    }

    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// The low `offset_bits` of this address.
    #[inline]
    #[must_use]
    pub const fn offset(self, offset_bits: u32) -> PageOffset {
        PageOffset::new(self.0 & low_mask(offset_bits))
    }
}

impl fmt::Debug for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VA(0x{:08X})", self.0)
    }
}

impl fmt::Display for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

impl From<u32> for VirtualAddress {
    #[inline]
    fn from(v: u32) -> Self {
        Self::new(v)
    }
}

impl From<VirtualAddress> for u32 {
    #[inline]
    fn from(va: VirtualAddress) -> Self {
        va.as_u32()
    }
}
