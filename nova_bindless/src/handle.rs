/// Shared slot identity types: index, generation, versioned handle.
///
/// A slot is identified by a `SlotIndex` into a logical descriptor table.
/// Because indices are recycled, consumers hold a `VersionedHandle` that
/// pairs the index with the generation it was allocated at; a recycled
/// index carries a higher generation, so stale handles are detectable by
/// a plain comparison against the authoritative generation table.

/// Index of a slot in a logical descriptor table
pub type SlotIndex = u32;

/// Per-slot reuse counter, incremented by 1 on every reclamation
pub type Generation = u32;

/// Sentinel index denoting "no slot"
pub const INVALID_SLOT_INDEX: SlotIndex = SlotIndex::MAX;

/// A slot index stamped with the generation it was allocated at.
///
/// Two versioned handles refer to the same live allocation iff both the
/// index and the generation match the tracker's current state for that
/// index. A default-constructed handle is invalid and is never current.
///
/// Consumers should treat this as an opaque pair of integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionedHandle {
    /// Slot index, or `INVALID_SLOT_INDEX`
    pub index: SlotIndex,
    /// Generation the slot had when this handle was issued
    pub generation: Generation,
}

impl VersionedHandle {
    /// The invalid handle (sentinel index, generation 0)
    pub const INVALID: Self = Self {
        index: INVALID_SLOT_INDEX,
        generation: 0,
    };

    /// Create a handle from an index and a generation
    pub fn new(index: SlotIndex, generation: Generation) -> Self {
        Self { index, generation }
    }

    /// Whether this handle refers to a slot at all.
    ///
    /// A valid handle may still be stale; staleness is decided by the
    /// recycler that issued it, not by the handle itself.
    pub fn is_valid(&self) -> bool {
        self.index != INVALID_SLOT_INDEX
    }
}

impl Default for VersionedHandle {
    fn default() -> Self {
        Self::INVALID
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "handle_tests.rs"]
mod tests;
