/// Frame-driven deferred slot reclamation.
///
/// The simple reuse strategy: a released slot becomes available again
/// only after the next "begin frame" boundary, which models the GPU
/// pipeline latency without an explicit fence. State machine per handle:
/// live → pending this frame → reclaimable at the next frame begin.

use std::sync::{Mutex, PoisonError};

use crate::handle::{SlotIndex, VersionedHandle};
use crate::heap::DescriptorDomain;
use crate::error::Result;
use crate::recycle::{GenerationTable, PendingFlags, PendingFree, SlotBackend};

/// Defers slot reuse until one frame boundary has passed.
///
/// An external frame-lifecycle manager calls [`on_begin_frame`] once per
/// frame; everything released before that call is then reclaimed:
/// generation bumped, pending flag cleared, backend free invoked. All
/// other operations may be called from arbitrary worker threads and
/// never block on GPU work.
///
/// [`on_begin_frame`]: FrameRecycler::on_begin_frame
pub struct FrameRecycler {
    backend: SlotBackend,
    generations: GenerationTable,
    pending: PendingFlags,
    deferred: Mutex<Vec<PendingFree>>,
}

impl FrameRecycler {
    /// Create a recycler over an injected allocate/free backend
    pub fn new(backend: SlotBackend) -> Self {
        Self {
            backend,
            generations: GenerationTable::new(),
            pending: PendingFlags::new(),
            deferred: Mutex::new(Vec::new()),
        }
    }

    /// Allocate a slot in `domain` and stamp it with its current
    /// generation. Never blocks.
    ///
    /// # Errors
    ///
    /// Propagates the backend's allocation failure (`OutOfSpace` for the
    /// heap-backed configuration).
    pub fn allocate(&self, domain: DescriptorDomain) -> Result<VersionedHandle> {
        let index = (self.backend.allocate)(domain)?;
        self.generations.resize(index as usize + 1);
        self.pending.ensure_capacity(index);
        Ok(VersionedHandle::new(index, self.generations.load(index)))
    }

    /// Queue a slot for reclamation at the next frame boundary.
    ///
    /// Invalid handles, stale handles, and handles already pending
    /// release (including from another thread racing on the same handle)
    /// are silent no-ops; at most one caller per release cycle wins the
    /// pending transition and enqueues the deferred free.
    pub fn release(&self, domain: DescriptorDomain, handle: VersionedHandle) {
        if !self.is_handle_current(handle) {
            return;
        }
        self.pending.ensure_capacity(handle.index);
        if !self.pending.try_mark_pending(handle.index) {
            return;
        }
        self.lock_deferred().push(PendingFree {
            domain,
            index: handle.index,
        });
    }

    /// Frame boundary hook, invoked once per frame by the owner.
    ///
    /// Promotes every entry recorded before this call: bumps its
    /// generation, clears its pending flag, then invokes the backend
    /// free function, in that order, so any handle comparison racing
    /// with the free sees the bumped generation. Entries recorded
    /// concurrently with the drain wait for the next boundary.
    pub fn on_begin_frame(&self, frame_slot: usize) {
        let due = std::mem::take(&mut *self.lock_deferred());
        if due.is_empty() {
            return;
        }
        crate::nova_trace!(
            "nova::FrameRecycler",
            "frame {}: reclaiming {} slot(s)",
            frame_slot,
            due.len()
        );
        for entry in due {
            self.reclaim(entry.domain, entry.index);
        }
    }

    /// Whether `handle` still refers to the slot's current contents
    pub fn is_handle_current(&self, handle: VersionedHandle) -> bool {
        handle.is_valid()
            && (handle.index as usize) < self.generations.len()
            && self.generations.load(handle.index) == handle.generation
    }

    /// Number of slots currently waiting for the next frame boundary
    pub fn pending_count(&self) -> usize {
        self.lock_deferred().len()
    }

    fn reclaim(&self, domain: DescriptorDomain, index: SlotIndex) {
        self.generations.bump(index);
        self.pending.clear_pending(index);
        (self.backend.free)(domain, index);
    }

    fn lock_deferred(&self) -> std::sync::MutexGuard<'_, Vec<PendingFree>> {
        self.deferred.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "frame_recycler_tests.rs"]
mod tests;
