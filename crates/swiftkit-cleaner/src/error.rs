//! Cleaner error types.

use std::error::Error;
use std::fmt;

/// Invalid [`CleanerConfig`](crate::CleanerConfig).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The thread name contains a NUL byte.
    InvalidThreadName {
        /// The rejected name.
        name: String,
    },
    /// The poll interval is zero.
    ZeroPollInterval,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidThreadName { name } => {
                write!(f, "thread name {name:?} contains a NUL byte")
            }
            Self::ZeroPollInterval => write!(f, "poll_interval must be non-zero"),
        }
    }
}

impl Error for ConfigError {}

/// Errors starting a [`Cleaner`](crate::Cleaner).
#[derive(Debug, PartialEq, Eq)]
pub enum CleanerError {
    /// Configuration validation failed.
    Config(ConfigError),
    /// The reclamation thread could not be spawned.
    ThreadSpawnFailed {
        /// The OS error description.
        reason: String,
    },
}

impl fmt::Display for CleanerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::ThreadSpawnFailed { reason } => {
                write!(f, "reclamation thread spawn failed: {reason}")
            }
        }
    }
}

impl Error for CleanerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::ThreadSpawnFailed { .. } => None,
        }
    }
}

impl From<ConfigError> for CleanerError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
