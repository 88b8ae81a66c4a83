//! Per-instance "destroyed" marker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::InstanceError;

/// Atomic flag shared between a wrapper and its disposal action.
///
/// The disposal action is the single writer and flips the flag exactly once,
/// before the foreign destroy call. Any thread may read it. `Relaxed` is
/// enough: the only requirement is that once set it is always observed set,
/// and the memory it guards is about to become invalid regardless.
///
/// Cloning shares the flag. Handing out a clone lets observers watch for
/// destruction without holding the wrapper itself.
#[derive(Clone, Debug, Default)]
pub struct LivenessFlag(Arc<AtomicBool>);

// Compile-time assertion: LivenessFlag must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<LivenessFlag>();
};

impl LivenessFlag {
    /// A fresh flag in the alive state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the instance has been destroyed.
    pub fn is_destroyed(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Whether the instance is still alive.
    pub fn is_alive(&self) -> bool {
        !self.is_destroyed()
    }

    /// Mark the instance destroyed.
    ///
    /// Returns `true` if this call performed the false→true transition.
    pub fn mark_destroyed(&self) -> bool {
        !self.0.swap(true, Ordering::Relaxed)
    }

    /// Fail with [`InstanceError::UseAfterFree`] if the instance is destroyed.
    pub fn ensure_alive(&self, type_name: &str) -> Result<(), InstanceError> {
        if self.is_destroyed() {
            return Err(InstanceError::UseAfterFree {
                type_name: type_name.to_owned(),
            });
        }
        Ok(())
    }

    /// Whether two handles refer to the same flag.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
