//! Error types for instance access and disposal.

use std::error::Error;
use std::fmt;

use crate::address::ForeignAddress;

/// Errors raised by a wrapper before it touches foreign memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InstanceError {
    /// The instance was already destroyed by its arena.
    ///
    /// Recoverable by the caller (stop using the object), never by the core.
    UseAfterFree {
        /// Name of the Swift type the wrapper exposes.
        type_name: String,
    },
    /// A null address was supplied for a type that does not permit it.
    InvalidAddress {
        /// Name of the Swift type being constructed.
        type_name: String,
    },
}

impl fmt::Display for InstanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UseAfterFree { type_name } => write!(
                f,
                "attempted to call method on already destroyed instance of {type_name}"
            ),
            Self::InvalidAddress { type_name } => {
                write!(f, "null address is not a valid instance of {type_name}")
            }
        }
    }
}

impl Error for InstanceError {}

/// Errors raised while running a single disposal action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisposalError {
    /// A reference-counted object was still retained elsewhere when its
    /// arena tried to release it. The destroy routine was not called and
    /// the object is leaked; the liveness flag is already set.
    UnexpectedRetainCount {
        /// Name of the Swift type.
        type_name: String,
        /// Address of the over-retained object.
        address: ForeignAddress,
        /// The retain count observed just before release.
        retain_count: u64,
    },
    /// The type's destroy routine panicked.
    DestroyPanicked {
        /// Name of the Swift type.
        type_name: String,
        /// Address of the instance being destroyed.
        address: ForeignAddress,
        /// The panic payload, when it was a string.
        message: String,
    },
}

impl DisposalError {
    /// Address of the resource that failed to dispose.
    pub fn address(&self) -> ForeignAddress {
        match self {
            Self::UnexpectedRetainCount { address, .. } | Self::DestroyPanicked { address, .. } => {
                *address
            }
        }
    }

    /// Type name of the resource that failed to dispose.
    pub fn type_name(&self) -> &str {
        match self {
            Self::UnexpectedRetainCount { type_name, .. }
            | Self::DestroyPanicked { type_name, .. } => type_name,
        }
    }
}

impl fmt::Display for DisposalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedRetainCount {
                type_name,
                address,
                retain_count,
            } => write!(
                f,
                "{type_name} at {address} has retain count {retain_count}, expected 1; \
                 it is retained outside its arena and was leaked"
            ),
            Self::DestroyPanicked {
                type_name,
                address,
                message,
            } => write!(f, "destroying {type_name} at {address} panicked: {message}"),
        }
    }
}

impl Error for DisposalError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn use_after_free_names_type() {
        let e = InstanceError::UseAfterFree {
            type_name: "MySwiftStruct".into(),
        };
        assert!(e.to_string().contains("MySwiftStruct"));
    }

    #[test]
    fn retain_count_error_names_resource() {
        let e = DisposalError::UnexpectedRetainCount {
            type_name: "MySwiftClass".into(),
            address: ForeignAddress(0x40),
            retain_count: 2,
        };
        let msg = e.to_string();
        assert!(msg.contains("MySwiftClass"));
        assert!(msg.contains("0x40"));
        assert!(msg.contains("retain count 2"));
        assert_eq!(e.address(), ForeignAddress(0x40));
        assert_eq!(e.type_name(), "MySwiftClass");
    }
}
