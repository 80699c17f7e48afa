/// Growable slot index → generation table.
///
/// Detects "this handle refers to a slot that has since been recycled"
/// with one atomic load. The table only grows, never shrinks: growth takes
/// the exclusive lock, while loads and bumps on already-sized indices take
/// the shared lock and operate on atomics, so they stay correct throughout
/// a concurrent growth for higher indices.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::handle::{Generation, SlotIndex};

pub struct GenerationTable {
    entries: RwLock<Vec<AtomicU32>>,
}

impl GenerationTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Current generation at `index`.
    ///
    /// The index must have been covered by a prior `resize`; every
    /// allocation path resizes before loading. Out-of-range loads are a
    /// caller bug.
    pub fn load(&self, index: SlotIndex) -> Generation {
        let entries = self.read_entries();
        debug_assert!(
            (index as usize) < entries.len(),
            "generation load before resize: {}",
            index
        );
        entries[index as usize].load(Ordering::Acquire)
    }

    /// Increment the generation at `index` by exactly 1.
    ///
    /// Called exactly once per reclamation of that index, never on
    /// allocation. Wrap is unguarded.
    pub fn bump(&self, index: SlotIndex) {
        let entries = self.read_entries();
        debug_assert!(
            (index as usize) < entries.len(),
            "generation bump before resize: {}",
            index
        );
        entries[index as usize].fetch_add(1, Ordering::AcqRel);
    }

    /// Grow the table to at least `capacity` entries, new entries at
    /// generation 0. Never shrinks.
    pub fn resize(&self, capacity: usize) {
        {
            let entries = self.read_entries();
            if entries.len() >= capacity {
                return;
            }
        }
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if entries.len() < capacity {
            entries.resize_with(capacity, Default::default);
        }
    }

    /// Number of entries currently covered
    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    /// Whether the table covers no entries yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_entries(&self) -> std::sync::RwLockReadGuard<'_, Vec<AtomicU32>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for GenerationTable {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "generation_table_tests.rs"]
mod tests;
