//! SwiftKit: arena-scoped lifetime management for Swift objects used from Rust.
//!
//! This is the top-level facade crate that re-exports the public API from the
//! SwiftKit sub-crates. Generated bindings and applications normally depend on
//! `swiftkit` alone.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! use swiftkit::prelude::*;
//!
//! // What a generated wrapper looks like.
//! struct Point {
//!     state: InstanceState,
//! }
//!
//! impl SwiftInstance for Point {
//!     fn instance_state(&self) -> &InstanceState {
//!         &self.state
//!     }
//! }
//!
//! let destroyed = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&destroyed);
//! let point_type = TypeDescriptor::value("Point", move |_address| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! })
//! .into_ref();
//!
//! let arena = Arena::confined();
//! let p = Point {
//!     state: InstanceState::new(ForeignAddress(0x1000), point_type, &arena)?,
//! };
//! assert_eq!(p.memory_address()?, ForeignAddress(0x1000));
//!
//! arena.close()?;
//! assert_eq!(destroyed.load(Ordering::SeqCst), 1);
//! assert!(p.ensure_alive().is_err());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `swiftkit-core` | Addresses, liveness flags, type descriptors, disposal actions |
//! | [`cleaner`] | `swiftkit-cleaner` | Reachability-triggered cleanup thread |
//! | [`arena`] | `swiftkit-arena` | Confined and auto arenas, wrapper contract |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Addresses, liveness flags, type descriptors and disposal actions
/// (`swiftkit-core`).
pub use swiftkit_core as types;

/// Reachability-triggered cleanup on a background thread (`swiftkit-cleaner`).
///
/// Used by [`arena::AutoArena`]; rarely needed directly.
pub use swiftkit_cleaner as cleaner;

/// Confined and auto arenas and the wrapper contract (`swiftkit-arena`).
pub use swiftkit_arena as arena;

/// Common imports for writing and using Swift wrappers.
///
/// ```rust
/// use swiftkit::prelude::*;
/// ```
pub mod prelude {
    // Arenas and the wrapper contract
    pub use swiftkit_arena::{
        Arena, AutoArena, CloseReport, ConfinedArena, InstanceState, SwiftArena, SwiftInstance,
    };

    // Type descriptors
    pub use swiftkit_core::{ForeignAddress, SwiftType, SwiftTypeRef, TypeDescriptor, TypeKind};

    // Errors
    pub use swiftkit_arena::{ArenaError, CloseError};
    pub use swiftkit_core::{DisposalError, InstanceError};
}
