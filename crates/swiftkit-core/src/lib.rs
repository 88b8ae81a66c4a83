//! Core types for the SwiftKit foreign-object lifetime layer.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! pieces every arena flavor is built from:
//!
//! - [`ForeignAddress`]: the opaque address of a Swift-owned value or object.
//! - [`LivenessFlag`]: the shared "destroyed" marker consulted before each use.
//! - [`SwiftType`]: the per-type destruction capability supplied by bindings.
//! - [`InstanceCleanup`]: the one-shot disposal action an arena runs.
//! - [`TypeRegistry`]: a process-wide, read-mostly cache of type descriptors.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod address;
pub mod cleanup;
pub mod error;
pub mod liveness;
pub mod metadata;
pub mod registry;

pub use address::ForeignAddress;
pub use cleanup::InstanceCleanup;
pub use error::{DisposalError, InstanceError};
pub use liveness::LivenessFlag;
pub use metadata::{SwiftType, SwiftTypeRef, TypeDescriptor, TypeKind};
pub use registry::TypeRegistry;
