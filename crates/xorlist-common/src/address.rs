//! Combined-link address codec.
//!
//! A node stores `prev ^ next` in a single field. Knowing either neighbor
//! recovers the other, because XOR is its own inverse.

use std::ops::BitXor;

/// Address of a node inside a pinned arena block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Address(pub usize);

impl Address {
    /// Sentinel for "no neighbor".
    pub const NULL: Address = Address(0);

    /// Returns true if this is the null sentinel.
    #[inline(always)]
    pub fn is_null(self) -> bool {
        self == Self::NULL
    }

    /// Combines two addresses into one link value.
    #[inline(always)]
    pub const fn combine(self, other: Address) -> Address {
        Address(self.0 ^ other.0)
    }

    /// Returns the raw address value.
    #[inline(always)]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl BitXor for Address {
    type Output = Address;

    #[inline(always)]
    fn bitxor(self, rhs: Address) -> Address {
        self.combine(rhs)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "addr:{:#x}", self.0)
    }
}

/// Combines two addresses into one link value.
#[inline(always)]
pub const fn combine(a: Address, b: Address) -> Address {
    a.combine(b)
}
