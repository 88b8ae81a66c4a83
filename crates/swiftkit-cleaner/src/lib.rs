//! Reachability-triggered cleanup for SwiftKit auto arenas.
//!
//! A [`Cleaner`] associates a cleanup action with the lifetime of a
//! [`Cleanable`] token. Whoever owns the token owns the resource: when the
//! token is dropped (its owner became unreachable) the action is queued for
//! a dedicated background thread, which runs it and moves on. Nothing here
//! knows about Swift; the auto arena supplies the actions.
//!
//! ```text
//! Owner threads                         Reclamation thread
//!     |                                       |
//!     |--register(action) -> Cleanable        |
//!     |   [live set: id -> action]            |
//!     |                                       |
//!     |--drop(Cleanable)--> queue.send(id)    |
//!     |                     [unbounded]  queue.recv_timeout()
//!     |                                  live.remove(id)
//!     |                                  catch_unwind(action)
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cleaner;
pub mod config;
pub mod error;

pub use cleaner::{Cleanable, Cleaner, CleanerMonitor, CleanerStats};
pub use config::CleanerConfig;
pub use error::{CleanerError, ConfigError};
