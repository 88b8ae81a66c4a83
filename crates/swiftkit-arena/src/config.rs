//! Confined arena configuration.

use crate::error::ConfigError;

/// Configuration for a [`ConfinedArena`](crate::ConfinedArena).
#[derive(Clone, Debug)]
pub struct ArenaConfig {
    /// Bind the arena to the creating thread.
    ///
    /// Default: `true`. When `false` any thread may register and close; the
    /// ACTIVE → CLOSED transition is still performed exactly once.
    pub thread_confinement: bool,

    /// Pending-list capacity reserved up front.
    ///
    /// Default: 16. Must not exceed [`Self::MAX_INITIAL_CAPACITY`].
    pub initial_capacity: usize,
}

impl ArenaConfig {
    /// Default pending-list capacity.
    pub const DEFAULT_INITIAL_CAPACITY: usize = 16;

    /// Largest accepted `initial_capacity`.
    pub const MAX_INITIAL_CAPACITY: usize = 1 << 20;

    /// Configuration for an arena any thread may use.
    pub fn unconfined() -> Self {
        Self {
            thread_confinement: false,
            ..Self::default()
        }
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_capacity > Self::MAX_INITIAL_CAPACITY {
            return Err(ConfigError::CapacityTooLarge {
                requested: self.initial_capacity,
                max: Self::MAX_INITIAL_CAPACITY,
            });
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            thread_confinement: true,
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
        }
    }
}
