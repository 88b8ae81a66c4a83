//! Opaque addresses of Swift-owned memory.

use std::fmt;

/// Raw address of a value or object allocated by the Swift runtime.
///
/// This crate never dereferences an address; it only carries it from the
/// wrapper that received it to the destroy routine of the owning type.
/// The address is immutable for the lifetime of the instance and becomes
/// meaningless once the instance has been disposed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ForeignAddress(pub usize);

impl ForeignAddress {
    /// The null sentinel.
    pub const NULL: Self = Self(0);

    /// Capture the address of a raw pointer handed over by a downcall.
    pub fn from_ptr<T>(ptr: *const T) -> Self {
        Self(ptr as usize)
    }

    /// Whether this is the null sentinel.
    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    /// The raw integer value.
    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for ForeignAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<usize> for ForeignAddress {
    fn from(v: usize) -> Self {
        Self(v)
    }
}
