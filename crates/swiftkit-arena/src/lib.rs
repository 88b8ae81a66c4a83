//! Arenas that decide when Swift-owned instances are destroyed.
//!
//! Every wrapper around a Swift value or object registers with exactly one
//! arena when it is constructed. The arena owns the instance's disposal
//! action and runs it once, at a time that depends on the flavor:
//!
//! - [`ConfinedArena`]: bound to the thread that created it. Disposal happens
//!   synchronously in [`close`](ConfinedArena::close), in registration order.
//! - [`AutoArena`]: disposal happens on a background reclamation thread after
//!   the wrapper is dropped.
//!
//! ```text
//! wrapper::new(addr, ty, &arena)
//!   └── InstanceState::new
//!       ├── LivenessFlag (shared with the cleanup)
//!       ├── InstanceCleanup { addr, ty, flag }
//!       └── arena.register(cleanup) -> Registration
//!             ├── Confined: pushed onto the pending list
//!             └── Auto: Cleanable token kept inside the state
//!
//! wrapper.method()
//!   └── state.ensure_alive()?  (UseAfterFree once disposed)
//! ```
//!
//! Arenas never hold the wrapper, only its cleanup, so an auto arena can
//! observe the wrapper going away.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
pub mod auto;
pub mod config;
pub mod confined;
pub mod confinement;
pub mod error;
pub mod instance;

pub use arena::{Arena, Registration, SwiftArena};
pub use auto::AutoArena;
pub use config::ArenaConfig;
pub use confined::{CloseReport, ConfinedArena};
pub use confinement::ThreadConfinement;
pub use error::{ArenaError, CloseError, ConfigError};
pub use instance::{InstanceState, SwiftInstance};
