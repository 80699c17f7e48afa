/// Segmented per-domain descriptor index allocator.
///
/// For each configured domain this hands out a unique index in O(1)
/// amortized, growing the index space by appending fixed-capacity
/// segments when a domain is exhausted and its description permits
/// growth. Every operation is serialized by a single mutex scoped to the
/// whole allocator; allocation and release are rare compared to
/// descriptor *use*, so correctness wins over throughput here.

use std::sync::{Mutex, PoisonError};

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::handle::{SlotIndex, INVALID_SLOT_INDEX};
use crate::heap::{DescriptorDomain, HeapDescription, HeapSegment, ViewKind, Visibility};

/// Thread-safe segmented index allocator, one index space per domain.
///
/// Each domain's segments have non-overlapping, monotonically increasing
/// `[base, base + capacity)` ranges starting at 0; appended segments are
/// based at the previous segment's end. Index spaces of different domains
/// are independent, so a release must name its domain.
///
/// # Example
///
/// ```ignore
/// let mut descriptions = FxHashMap::default();
/// descriptions.insert(ViewKind::SampledTexture, HeapDescription::default());
/// let heap = DescriptorHeapAllocator::new(descriptions)?;
///
/// let index = heap.allocate(ViewKind::SampledTexture, Visibility::ShaderVisible)?;
/// heap.release(
///     DescriptorDomain::new(ViewKind::SampledTexture, Visibility::ShaderVisible),
///     index,
/// )?;
/// ```
pub struct DescriptorHeapAllocator {
    state: Mutex<HeapState>,
}

struct HeapState {
    /// Static per-view-kind policy, validated at construction
    descriptions: FxHashMap<ViewKind, HeapDescription>,
    /// Per-domain segment lists, created on first allocation
    domains: FxHashMap<DescriptorDomain, Vec<HeapSegment>>,
}

impl DescriptorHeapAllocator {
    /// Create an allocator from per-view-kind heap descriptions.
    ///
    /// Every description is validated up front; a bad growth factor is a
    /// startup configuration error, not a per-call one.
    pub fn new(descriptions: FxHashMap<ViewKind, HeapDescription>) -> Result<Self> {
        for (view_kind, description) in &descriptions {
            description.validate().map_err(|error| {
                crate::nova_error!(
                    "nova::DescriptorHeapAllocator",
                    "invalid heap description for {:?}: {}",
                    view_kind,
                    error
                );
                error
            })?;
        }
        Ok(Self {
            state: Mutex::new(HeapState {
                descriptions,
                domains: FxHashMap::default(),
            }),
        })
    }

    /// Allocate the next free index in the given domain.
    ///
    /// Scans segments in creation order and returns a free position from
    /// the first one that has any (deterministic for a fixed call
    /// sequence). When every segment is full, appends one new segment if
    /// the description allows growth and the growth budget is not
    /// exhausted; otherwise fails with `OutOfSpace`.
    ///
    /// # Errors
    ///
    /// - `UnknownDomain` if no heap description covers `view_kind`
    /// - `OutOfSpace` if the domain's capacity and growth budget are spent
    pub fn allocate(&self, view_kind: ViewKind, visibility: Visibility) -> Result<SlotIndex> {
        let domain = DescriptorDomain::new(view_kind, visibility);
        let mut state = self.lock_state();

        let description = match state.descriptions.get(&view_kind) {
            Some(description) => *description,
            None => {
                crate::nova_error!(
                    "nova::DescriptorHeapAllocator",
                    "allocate: no heap description for {:?}",
                    domain
                );
                return Err(Error::UnknownDomain(domain));
            }
        };

        let initial_capacity = description.capacity_for(visibility);
        let segments = state.domains.entry(domain).or_default();

        if segments.is_empty() {
            if initial_capacity == 0 {
                return Err(Error::OutOfSpace);
            }
            segments.push(HeapSegment::new(0, initial_capacity));
        }

        // First fit among non-full segments, lowest segment first
        for segment in segments.iter_mut() {
            if let Some(index) = segment.allocate() {
                return Ok(index);
            }
        }

        // Every segment is full: append one more if the policy permits
        if !description.allow_growth {
            return Err(Error::OutOfSpace);
        }
        let growth_iterations = segments.len() as u32 - 1;
        if growth_iterations >= description.max_growth_iterations {
            return Err(Error::OutOfSpace);
        }

        let previous = &segments[segments.len() - 1];
        let base = previous.base_index() + previous.capacity();
        let requested = (previous.capacity() as f64 * description.growth_factor as f64).round();
        // Indices must stay strictly below the invalid-index sentinel
        let available = (INVALID_SLOT_INDEX as u64).saturating_sub(base as u64);
        let capacity = if requested as u64 > available {
            crate::nova_warn!(
                "nova::DescriptorHeapAllocator",
                "growth clamped for {:?}: requested {} slots, {} available below the index limit",
                domain,
                requested,
                available
            );
            available as u32
        } else {
            (requested as u64).max(1) as u32
        };
        if capacity == 0 {
            return Err(Error::OutOfSpace);
        }

        segments.push(HeapSegment::new(base, capacity));
        crate::nova_debug!(
            "nova::DescriptorHeapAllocator",
            "{:?} grew to {} segments (new base {}, capacity {})",
            domain,
            segments.len(),
            base,
            capacity
        );

        let last = segments.len() - 1;
        match segments[last].allocate() {
            Some(index) => Ok(index),
            None => Err(Error::OutOfSpace),
        }
    }

    /// Return an index to its owning segment's free set.
    ///
    /// The owning segment is found by range containment within the
    /// domain's segment list. Releasing an index owned by no segment is a
    /// caller bug and fails with `NotFound`.
    pub fn release(&self, domain: DescriptorDomain, index: SlotIndex) -> Result<()> {
        let mut state = self.lock_state();
        if let Some(segments) = state.domains.get_mut(&domain) {
            for segment in segments.iter_mut() {
                if segment.contains(index) {
                    segment.release(index);
                    return Ok(());
                }
            }
        }
        crate::nova_error!(
            "nova::DescriptorHeapAllocator",
            "release: index {} is not owned by {:?}",
            index,
            domain
        );
        Err(Error::NotFound(index))
    }

    /// Indices still available in the domain, aggregated across segments.
    ///
    /// A domain that is exhausted but allowed to grow (or not yet
    /// materialized at all) reports its configured initial capacity as an
    /// optimistic estimate, since growth will occur on demand.
    pub fn remaining_count(&self, view_kind: ViewKind, visibility: Visibility) -> Result<u32> {
        let state = self.lock_state();
        let description = state
            .descriptions
            .get(&view_kind)
            .copied()
            .ok_or(Error::UnknownDomain(DescriptorDomain::new(
                view_kind, visibility,
            )))?;
        let domain = DescriptorDomain::new(view_kind, visibility);
        match state.domains.get(&domain) {
            None => Ok(description.capacity_for(visibility)),
            Some(segments) => {
                let remaining: u32 = segments.iter().map(|s| s.remaining()).sum();
                if remaining == 0 && description.allow_growth {
                    Ok(description.capacity_for(visibility))
                } else {
                    Ok(remaining)
                }
            }
        }
    }

    /// Indices currently allocated in the domain, aggregated across segments
    pub fn allocated_count(&self, view_kind: ViewKind, visibility: Visibility) -> Result<u32> {
        let state = self.lock_state();
        if !state.descriptions.contains_key(&view_kind) {
            return Err(Error::UnknownDomain(DescriptorDomain::new(
                view_kind, visibility,
            )));
        }
        let domain = DescriptorDomain::new(view_kind, visibility);
        Ok(state
            .domains
            .get(&domain)
            .map(|segments| segments.iter().map(|s| s.allocated_count()).sum())
            .unwrap_or(0))
    }

    /// Whether some segment of some domain owns the index's range.
    ///
    /// Domains have independent index spaces, so this is a membership
    /// probe, not an ownership lookup.
    pub fn contains(&self, index: SlotIndex) -> bool {
        let state = self.lock_state();
        state
            .domains
            .values()
            .any(|segments| segments.iter().any(|s| s.contains(index)))
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, HeapState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "heap_allocator_tests.rs"]
mod tests;
