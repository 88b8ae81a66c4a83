//! Benchmark fixtures for the SwiftKit lifetime core.
//!
//! - [`NoopType`]: a descriptor whose destroy does nothing, so benchmarks
//!   measure arena bookkeeping rather than foreign calls
//! - [`fill_confined`]: register `n` instances with a fresh confined arena

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::Arc;

use swiftkit_arena::{ArenaConfig, ArenaError, ConfinedArena, InstanceState, SwiftArena};
use swiftkit_core::{ForeignAddress, SwiftType, SwiftTypeRef, TypeKind};

/// A reference type with retain count 1 and a no-op destroy.
#[derive(Debug)]
pub struct NoopType;

impl NoopType {
    /// Shared descriptor handle.
    pub fn shared() -> SwiftTypeRef {
        Arc::new(NoopType)
    }
}

impl SwiftType for NoopType {
    fn name(&self) -> &str {
        "Noop"
    }

    fn kind(&self) -> TypeKind {
        TypeKind::Reference
    }

    fn retain_count(&self, _address: ForeignAddress) -> Option<u64> {
        Some(1)
    }

    fn destroy(&self, _address: ForeignAddress) {}
}

/// Register `n` instances with `arena`, returning their states.
pub fn register_many<A: SwiftArena + ?Sized>(
    arena: &A,
    ty: &SwiftTypeRef,
    n: usize,
) -> Result<Vec<InstanceState>, ArenaError> {
    (1..=n)
        .map(|i| InstanceState::new(ForeignAddress(i), Arc::clone(ty), arena))
        .collect()
}

/// A confined arena pre-sized for and holding `n` instances.
pub fn fill_confined(n: usize) -> Result<(ConfinedArena, Vec<InstanceState>), ArenaError> {
    let arena = ConfinedArena::with_config(ArenaConfig {
        initial_capacity: n,
        ..Default::default()
    })?;
    let states = register_many(&arena, &NoopType::shared(), n)?;
    Ok((arena, states))
}
