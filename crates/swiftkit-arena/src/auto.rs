//! Reachability-triggered arena.
//!
//! Instances are destroyed on the reclamation thread some time after their
//! wrapper is dropped. There is no close; each instance goes on its own.

use swiftkit_cleaner::{Cleaner, CleanerConfig, CleanerMonitor, CleanerStats};
use swiftkit_core::InstanceCleanup;

use crate::arena::{Registration, SwiftArena};
use crate::error::ArenaError;

/// Arena whose instances are destroyed after their wrappers are dropped.
///
/// Any thread may register. Dropping the arena handle destroys nothing:
/// instances registered earlier keep the reclamation thread alive until
/// they are dropped themselves.
#[derive(Debug)]
pub struct AutoArena {
    cleaner: Cleaner,
}

impl AutoArena {
    /// An auto arena with the default reclamation thread settings.
    pub fn new() -> Result<Self, ArenaError> {
        Self::with_config(CleanerConfig::default())
    }

    /// An auto arena whose reclamation thread uses `config`.
    pub fn with_config(config: CleanerConfig) -> Result<Self, ArenaError> {
        let cleaner = Cleaner::with_config(config)?;
        tracing::debug!("auto arena opened");
        Ok(Self { cleaner })
    }

    /// Reclamation counters.
    pub fn stats(&self) -> CleanerStats {
        self.cleaner.stats()
    }

    /// A handle for observing reclamation without keeping the arena alive.
    pub fn monitor(&self) -> CleanerMonitor {
        self.cleaner.monitor()
    }
}

impl SwiftArena for AutoArena {
    fn register(&self, cleanup: InstanceCleanup) -> Result<Registration, ArenaError> {
        let token = self.cleaner.register(move || {
            if let Err(e) = cleanup.run() {
                tracing::warn!(error = %e, "auto arena failed to dispose instance");
            }
        });
        Ok(Registration::tracked(token))
    }
}
