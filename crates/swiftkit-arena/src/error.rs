//! Arena error types.

use std::error::Error;
use std::fmt;
use std::thread::ThreadId;

use smallvec::SmallVec;
use swiftkit_cleaner::CleanerError;
use swiftkit_core::{DisposalError, ForeignAddress, InstanceError};

/// Invalid [`ArenaConfig`](crate::ArenaConfig).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `initial_capacity` is above [`ArenaConfig::MAX_INITIAL_CAPACITY`](crate::ArenaConfig::MAX_INITIAL_CAPACITY).
    CapacityTooLarge {
        /// The requested capacity.
        requested: usize,
        /// The largest accepted capacity.
        max: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityTooLarge { requested, max } => {
                write!(f, "initial_capacity {requested} exceeds maximum {max}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Disposal failures collected while closing a confined arena.
///
/// Every pending action was attempted; the ones listed here leaked their
/// resource. Their liveness flags are set regardless.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CloseError {
    attempted: usize,
    failures: SmallVec<[DisposalError; 4]>,
}

impl CloseError {
    pub(crate) fn new(attempted: usize, failures: SmallVec<[DisposalError; 4]>) -> Self {
        Self {
            attempted,
            failures,
        }
    }

    /// Number of disposal actions that were run.
    pub fn attempted(&self) -> usize {
        self.attempted
    }

    /// Number of actions that completed without error.
    pub fn disposed(&self) -> usize {
        self.attempted - self.failures.len()
    }

    /// The individual failures, in registration order.
    pub fn failures(&self) -> &[DisposalError] {
        &self.failures
    }

    /// Addresses of the resources that were leaked.
    pub fn leaked(&self) -> impl Iterator<Item = ForeignAddress> + '_ {
        self.failures.iter().map(DisposalError::address)
    }
}

impl fmt::Display for CloseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} resources failed to dispose",
            self.failures.len(),
            self.attempted
        )?;
        for (i, failure) in self.failures.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{failure}")?;
        }
        Ok(())
    }
}

impl Error for CloseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.failures.first().map(|e| e as &(dyn Error + 'static))
    }
}

/// Errors from arena construction, registration and closing.
#[derive(Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The arena is closed and accepts no further registrations.
    Closed,
    /// A confined arena was used from a thread other than its owner.
    WrongThread {
        /// The thread that created the arena.
        owner: ThreadId,
        /// The thread that attempted the operation.
        caller: ThreadId,
    },
    /// The instance could not be constructed.
    Instance(InstanceError),
    /// Closing ran every pending action but some of them failed.
    Disposal(CloseError),
    /// Configuration validation failed.
    Config(ConfigError),
    /// The reclamation thread of an auto arena could not be started.
    Cleaner(CleanerError),
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "arena is closed"),
            Self::WrongThread { owner, caller } => write!(
                f,
                "confined arena owned by {owner:?} used from {caller:?}"
            ),
            Self::Instance(e) => write!(f, "instance: {e}"),
            Self::Disposal(e) => write!(f, "close: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Cleaner(e) => write!(f, "cleaner: {e}"),
        }
    }
}

impl Error for ArenaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Instance(e) => Some(e),
            Self::Disposal(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Cleaner(e) => Some(e),
            Self::Closed | Self::WrongThread { .. } => None,
        }
    }
}

impl From<InstanceError> for ArenaError {
    fn from(e: InstanceError) -> Self {
        Self::Instance(e)
    }
}

impl From<CloseError> for ArenaError {
    fn from(e: CloseError) -> Self {
        Self::Disposal(e)
    }
}

impl From<ConfigError> for ArenaError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<CleanerError> for ArenaError {
    fn from(e: CleanerError) -> Self {
        Self::Cleaner(e)
    }
}
