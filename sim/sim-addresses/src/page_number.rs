use core::fmt;

/// Virtual page number: the per-level indices of a virtual address packed
/// into a single integer, most significant level first.
///
/// Used as the key of the translation cache. Two addresses share a
/// `VirtualPageNumber` exactly when a page-table walk would end in the same
/// leaf for both.
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VirtualPageNumber(u32);

/// Physical frame number as handed out by a frame allocator.
///
/// Frames are numbered from zero in allocation order.
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysicalFrameNumber(u32);

impl VirtualPageNumber {
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
}

impl PhysicalFrameNumber {
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

    /// The frame following this one.
    ///
    /// # Panics
    /// Overflows (and panics in debug builds) after `u32::MAX` frames.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Debug for VirtualPageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VPN(0x{:X})", self.0)
    }
}

impl fmt::Display for VirtualPageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}", self.0)
    }
}

impl fmt::Debug for PhysicalFrameNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PFN({})", self.0)
    }
}

impl fmt::Display for PhysicalFrameNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}", self.0)
    }
}

impl From<u32> for VirtualPageNumber {
    #[inline]
    fn from(v: u32) -> Self {
        Self::new(v)
    }
}

impl From<u32> for PhysicalFrameNumber {
    #[inline]
    fn from(v: u32) -> Self {
        Self::new(v)
    }
}
