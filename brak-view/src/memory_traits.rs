//! Memory access hints carried in a view's type.
//!
//! A view's `MT` const parameter is a bitmask of the flags below. The flags
//! describe how the buffer is expected to be accessed; they are preserved by
//! slicing and by the managed to unmanaged conversion, but never change how
//! an element is read or written. Reference counting is not a memory trait
//! here: it is the view's ownership [`Mode`](crate::Mode).

/// No hints.
pub const NONE: u8 = 0;
/// Accesses are scattered; prefer a read-only, cache-friendly path.
pub const RANDOM_ACCESS: u8 = 1 << 0;
/// Element updates are expected to be atomic.
pub const ATOMIC: u8 = 1 << 1;
/// The buffer is not aliased by any other view in the same kernel.
pub const RESTRICT: u8 = 1 << 2;
/// The buffer start is aligned for vector loads.
pub const ALIGNED: u8 = 1 << 3;

/// Decoded view of an `MT` bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryTraits(u8);

impl MemoryTraits {
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_random_access(self) -> bool {
        self.0 & RANDOM_ACCESS != 0
    }

    pub const fn is_atomic(self) -> bool {
        self.0 & ATOMIC != 0
    }

    pub const fn is_restrict(self) -> bool {
        self.0 & RESTRICT != 0
    }

    pub const fn is_aligned(self) -> bool {
        self.0 & ALIGNED != 0
    }
}
