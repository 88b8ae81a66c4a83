//! Reclamation thread configuration.

use std::time::Duration;

use crate::error::ConfigError;

/// Configuration for a [`Cleaner`](crate::Cleaner)'s background thread.
#[derive(Clone, Debug)]
pub struct CleanerConfig {
    /// Name given to the reclamation thread.
    ///
    /// Default: `"swiftkit-auto-arena-cleaner"`. Must not contain NUL bytes.
    pub thread_name: String,

    /// How long the thread blocks on its queue before waking up to
    /// re-check for work. Default: 60 seconds. Must be non-zero.
    pub poll_interval: Duration,
}

impl CleanerConfig {
    /// Default reclamation thread name.
    pub const DEFAULT_THREAD_NAME: &'static str = "swiftkit-auto-arena-cleaner";

    /// Default queue poll interval.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thread_name.contains('\0') {
            return Err(ConfigError::InvalidThreadName {
                name: self.thread_name.clone(),
            });
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(())
    }
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            thread_name: Self::DEFAULT_THREAD_NAME.to_owned(),
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = CleanerConfig::default();
        assert_eq!(config.thread_name, "swiftkit-auto-arena-cleaner");
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn nul_in_thread_name_rejected() {
        let config = CleanerConfig {
            thread_name: "bad\0name".into(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidThreadName { .. })
        ));
    }

    #[test]
    fn zero_poll_interval_rejected() {
        let config = CleanerConfig {
            poll_interval: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroPollInterval));
    }
}
