/// Injected allocate/free backend for the recyclers.
///
/// The recyclers never mint indices themselves; they call an injected
/// allocate function and hand reclaimed indices back through an injected
/// free function. The segmented heap allocator is one such backend;
/// tests use a plain free list. Both callbacks must be callable from any
/// thread. The pending guard guarantees the free callback runs exactly
/// once per release cycle.

use std::sync::Arc;

use crate::error::Result;
use crate::handle::SlotIndex;
use crate::heap::{DescriptorDomain, DescriptorHeapAllocator};

/// Allocate callback: must return an index not currently owned by any
/// live allocation in the domain; may draw from an internal free list
/// before minting new indices.
pub type AllocateFn = dyn Fn(DescriptorDomain) -> Result<SlotIndex> + Send + Sync;

/// Free callback: invoked exactly once per reclamation
pub type FreeFn = dyn Fn(DescriptorDomain, SlotIndex) + Send + Sync;

/// The allocate/free pair a recycler delegates to
pub struct SlotBackend {
    pub(crate) allocate: Box<AllocateFn>,
    pub(crate) free: Box<FreeFn>,
}

impl SlotBackend {
    /// Build a backend from a pair of closures
    pub fn new<A, F>(allocate: A, free: F) -> Self
    where
        A: Fn(DescriptorDomain) -> Result<SlotIndex> + Send + Sync + 'static,
        F: Fn(DescriptorDomain, SlotIndex) + Send + Sync + 'static,
    {
        Self {
            allocate: Box::new(allocate),
            free: Box::new(free),
        }
    }

    /// Backend that delegates to a shared segmented heap allocator
    pub fn for_heap(heap: Arc<DescriptorHeapAllocator>) -> Self {
        let release_heap = heap.clone();
        Self::new(
            move |domain| heap.allocate(domain.view_kind, domain.visibility),
            move |domain, index| {
                // A failed release is a caller bug; the allocator has
                // already logged it.
                let _ = release_heap.release(domain, index);
            },
        )
    }
}

/// A released slot waiting for its gating condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingFree {
    pub domain: DescriptorDomain,
    pub index: SlotIndex,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;
