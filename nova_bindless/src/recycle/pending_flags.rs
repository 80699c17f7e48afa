/// Growable array of atomic pending-release flags, one per slot index.
///
/// Makes "is this index already queued for release" a single atomic
/// decision: when two threads race to release the same handle, exactly
/// one wins the 0 → 1 transition and owns the deferred free. The 1 → 0
/// transition happens only when the deferred free actually executes.
///
/// Growth takes the exclusive resize lock and preserves existing flag
/// values; flag operations on already covered indices take the shared
/// lock and proceed via atomics. Flag operations on not-yet covered
/// indices must be preceded by `ensure_capacity`.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::handle::SlotIndex;

const NOT_PENDING: u8 = 0;
const PENDING: u8 = 1;

pub struct PendingFlags {
    flags: RwLock<Vec<AtomicU8>>,
}

impl PendingFlags {
    /// Create an empty flag array
    pub fn new() -> Self {
        Self {
            flags: RwLock::new(Vec::new()),
        }
    }

    /// Atomically transition the flag at `index` from 0 to 1.
    ///
    /// Returns true iff this call performed the transition, i.e. the
    /// caller owns this release cycle.
    pub fn try_mark_pending(&self, index: SlotIndex) -> bool {
        let flags = self.read_flags();
        debug_assert!(
            (index as usize) < flags.len(),
            "pending mark before ensure_capacity: {}",
            index
        );
        flags[index as usize]
            .compare_exchange(NOT_PENDING, PENDING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Set the flag at `index` back to 0.
    ///
    /// Called only by the code path that performs the deferred free.
    pub fn clear_pending(&self, index: SlotIndex) {
        let flags = self.read_flags();
        debug_assert!(
            (index as usize) < flags.len(),
            "pending clear before ensure_capacity: {}",
            index
        );
        flags[index as usize].store(NOT_PENDING, Ordering::Release);
    }

    /// Whether the flag at `index` is currently set
    pub fn is_pending(&self, index: SlotIndex) -> bool {
        let flags = self.read_flags();
        debug_assert!(
            (index as usize) < flags.len(),
            "pending query before ensure_capacity: {}",
            index
        );
        flags[index as usize].load(Ordering::Acquire) == PENDING
    }

    /// Grow the flag array to cover `index`, preserving existing values
    pub fn ensure_capacity(&self, index: SlotIndex) {
        let needed = index as usize + 1;
        {
            let flags = self.read_flags();
            if flags.len() >= needed {
                return;
            }
        }
        let mut flags = self.flags.write().unwrap_or_else(PoisonError::into_inner);
        if flags.len() < needed {
            flags.resize_with(needed, Default::default);
        }
    }

    /// Number of indices currently covered
    pub fn len(&self) -> usize {
        self.read_flags().len()
    }

    /// Whether no indices are covered yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_flags(&self) -> std::sync::RwLockReadGuard<'_, Vec<AtomicU8>> {
        self.flags.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for PendingFlags {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "pending_flags_tests.rs"]
mod tests;
