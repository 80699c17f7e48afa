/// Timeline-gated deferred slot reclamation.
///
/// The precise sibling of the frame recycler: instead of "wait one
/// frame", a released slot waits until a caller-supplied completion
/// target is reached on an explicit execution timeline. Many independent
/// timelines are supported concurrently; each gets its own bucket map
/// and lock, so releases gated on one queue never contend with another.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::handle::{SlotIndex, VersionedHandle};
use crate::heap::DescriptorDomain;
use crate::recycle::{GenerationTable, PendingFlags, PendingFree, SlotBackend, Timeline};

#[cfg(debug_assertions)]
const STALL_WARN_INTERVAL_CAP: u32 = 64;

/// Per-timeline state: pending buckets keyed by completion target.
///
/// Buckets are naturally ordered by target value, so a sweep is a prefix
/// removal, not a full scan. The timeline itself is held weakly; a
/// destroyed timeline's queue is pruned on the next sweep.
struct TimelineQueue {
    timeline: Weak<dyn Timeline>,
    buckets: Mutex<BTreeMap<u64, Vec<PendingFree>>>,
    #[cfg(debug_assertions)]
    stall: Mutex<StallTracker>,
}

impl TimelineQueue {
    fn new(timeline: Weak<dyn Timeline>) -> Self {
        Self {
            timeline,
            buckets: Mutex::new(BTreeMap::new()),
            #[cfg(debug_assertions)]
            stall: Mutex::new(StallTracker::new()),
        }
    }

    fn lock_buckets(
        &self,
    ) -> std::sync::MutexGuard<'_, BTreeMap<u64, Vec<PendingFree>>> {
        self.buckets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Debug-only stalled-timeline detector with exponential warn backoff.
///
/// Purely observability: warns when repeated sweeps observe an unchanged
/// completed value while buckets remain pending. Never alters recycler
/// behavior, and is compiled out of release builds.
#[cfg(debug_assertions)]
struct StallTracker {
    last_completed: Option<u64>,
    stalled_sweeps: u32,
    warn_interval: u32,
}

#[cfg(debug_assertions)]
impl StallTracker {
    fn new() -> Self {
        Self {
            last_completed: None,
            stalled_sweeps: 0,
            warn_interval: 1,
        }
    }

    fn note_progress(&mut self, completed: u64) {
        self.last_completed = Some(completed);
        self.stalled_sweeps = 0;
        self.warn_interval = 1;
    }

    /// Returns true when a warning is due for this stalled sweep
    fn note_stalled(&mut self, completed: u64) -> bool {
        if self.last_completed != Some(completed) {
            self.note_progress(completed);
            return false;
        }
        self.stalled_sweeps += 1;
        if self.stalled_sweeps >= self.warn_interval {
            self.stalled_sweeps = 0;
            self.warn_interval = (self.warn_interval * 2).min(STALL_WARN_INTERVAL_CAP);
            return true;
        }
        false
    }
}

/// Defers slot reuse until an execution timeline reaches a target value.
///
/// `release` gates a slot on `timeline.completed_value() >= target`;
/// completion is polled, never awaited: the owner calls [`process`] (or
/// [`process_for`] per timeline) periodically, typically once per frame.
///
/// [`process`]: TimelineRecycler::process
/// [`process_for`]: TimelineRecycler::process_for
pub struct TimelineRecycler {
    backend: SlotBackend,
    generations: GenerationTable,
    pending: PendingFlags,
    /// Known timelines keyed by Arc data-pointer identity. Guarded by its
    /// own short-lived lock, distinct from the per-timeline bucket locks.
    timelines: Mutex<FxHashMap<usize, Arc<TimelineQueue>>>,
}

impl TimelineRecycler {
    /// Create a recycler over an injected allocate/free backend
    pub fn new(backend: SlotBackend) -> Self {
        Self {
            backend,
            generations: GenerationTable::new(),
            pending: PendingFlags::new(),
            timelines: Mutex::new(FxHashMap::default()),
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

    /// Queue a slot for reclamation once `timeline` completes
    /// `target_value`.
    ///
    /// Invalid handles, stale handles, and handles already pending
    /// release are silent no-ops; when many threads race to release the
    /// same handle, only the winner of the pending transition enqueues.
    pub fn release(
        &self,
        domain: DescriptorDomain,
        handle: VersionedHandle,
        timeline: &Arc<dyn Timeline>,
        target_value: u64,
    ) {
        if !self.is_handle_current(handle) {
            return;
        }
        self.pending.ensure_capacity(handle.index);
        if !self.pending.try_mark_pending(handle.index) {
            return;
        }
        let queue = self.queue_for(timeline);
        queue
            .lock_buckets()
            .entry(target_value)
            .or_default()
            .push(PendingFree {
                domain,
                index: handle.index,
            });
    }

    /// Release many slots gated on one (timeline, target) pair.
    ///
    /// Equivalent to calling [`release`] per item, but collects the
    /// winners locally and takes the timeline's bucket lock once, which
    /// amortizes lock overhead for end-of-frame batch teardown. Items
    /// that lose the pending race are silently skipped.
    ///
    /// [`release`]: TimelineRecycler::release
    pub fn release_batch(
        &self,
        timeline: &Arc<dyn Timeline>,
        target_value: u64,
        items: &[(DescriptorDomain, VersionedHandle)],
    ) {
        let mut winners: Vec<PendingFree> = Vec::with_capacity(items.len());
        for &(domain, handle) in items {
            if !self.is_handle_current(handle) {
                continue;
            }
            self.pending.ensure_capacity(handle.index);
            if !self.pending.try_mark_pending(handle.index) {
                continue;
            }
            winners.push(PendingFree {
                domain,
                index: handle.index,
            });
        }
        if winners.is_empty() {
            return;
        }
        let queue = self.queue_for(timeline);
        queue
            .lock_buckets()
            .entry(target_value)
            .or_default()
            .append(&mut winners);
    }

    /// Sweep one timeline: reclaim every bucket whose target is at or
    /// below the timeline's current completed value.
    ///
    /// The prefix removal happens under the timeline's bucket lock; the
    /// reclamations (generation bump, flag clear, backend free) run
    /// outside it, so a slow backend never holds up concurrent releases
    /// on the same timeline.
    pub fn process_for(&self, timeline: &Arc<dyn Timeline>) {
        let queue = {
            let timelines = self.lock_timelines();
            match timelines.get(&timeline_key(timeline)) {
                Some(queue) => queue.clone(),
                None => return,
            }
        };
        self.sweep_queue(&queue, timeline);
    }

    /// Sweep every known timeline, pruning those that no longer exist.
    ///
    /// Intended to be invoked periodically by the owner, e.g. once per
    /// frame for every active execution timeline.
    pub fn process(&self) {
        let sweeps: Vec<(Arc<TimelineQueue>, Arc<dyn Timeline>)> = {
            let mut timelines = self.lock_timelines();
            let mut live = Vec::with_capacity(timelines.len());
            timelines.retain(|key, queue| match queue.timeline.upgrade() {
                Some(timeline) => {
                    live.push((queue.clone(), timeline));
                    true
                }
                None => {
                    let leftover = queue.lock_buckets().len();
                    if leftover > 0 {
                        crate::nova_warn!(
                            "nova::TimelineRecycler",
                            "pruning destroyed timeline {:#x} with {} pending bucket(s)",
                            key,
                            leftover
                        );
                    }
                    false
                }
            });
            live
        };
        for (queue, timeline) in sweeps {
            self.sweep_queue(&queue, &timeline);
        }
    }

    /// Whether `handle` still refers to the slot's current contents
    pub fn is_handle_current(&self, handle: VersionedHandle) -> bool {
        handle.is_valid()
            && (handle.index as usize) < self.generations.len()
            && self.generations.load(handle.index) == handle.generation
    }

    /// Number of timelines currently tracked (pruned lazily by `process`)
    pub fn tracked_timeline_count(&self) -> usize {
        self.lock_timelines().len()
    }

    /// Look up or lazily register the queue for `timeline`.
    ///
    /// A dead entry under the same address means the old timeline was
    /// destroyed and the allocation reused; its queue is replaced.
    fn queue_for(&self, timeline: &Arc<dyn Timeline>) -> Arc<TimelineQueue> {
        let key = timeline_key(timeline);
        let mut timelines = self.lock_timelines();
        if let Some(existing) = timelines.get(&key) {
            if existing.timeline.upgrade().is_some() {
                return existing.clone();
            }
            let leftover = existing.lock_buckets().len();
            if leftover > 0 {
                crate::nova_warn!(
                    "nova::TimelineRecycler",
                    "timeline address {:#x} reused; dropping {} stale pending bucket(s)",
                    key,
                    leftover
                );
            }
        }
        let queue = Arc::new(TimelineQueue::new(Arc::downgrade(timeline)));
        timelines.insert(key, queue.clone());
        queue
    }

    fn sweep_queue(&self, queue: &TimelineQueue, timeline: &Arc<dyn Timeline>) {
        let completed = timeline.completed_value();
        let due: Vec<PendingFree> = {
            let mut buckets = queue.lock_buckets();
            let keep = match completed.checked_add(1) {
                Some(bound) => buckets.split_off(&bound),
                None => BTreeMap::new(),
            };
            let due_buckets = std::mem::replace(&mut *buckets, keep);

            #[cfg(debug_assertions)]
            self.check_for_stall(queue, timeline, completed, due_buckets.is_empty(), buckets.len());

            due_buckets.into_values().flatten().collect()
        };
        for entry in due {
            self.reclaim(entry.domain, entry.index);
        }
    }

    #[cfg(debug_assertions)]
    fn check_for_stall(
        &self,
        queue: &TimelineQueue,
        timeline: &Arc<dyn Timeline>,
        completed: u64,
        swept_nothing: bool,
        remaining_buckets: usize,
    ) {
        let mut stall = queue.stall.lock().unwrap_or_else(PoisonError::into_inner);
        if swept_nothing && remaining_buckets > 0 {
            if stall.note_stalled(completed) {
                crate::nova_warn!(
                    "nova::TimelineRecycler",
                    "timeline {:#x} stalled at {} with {} pending bucket(s)",
                    timeline_key(timeline),
                    completed,
                    remaining_buckets
                );
            }
        } else {
            stall.note_progress(completed);
        }
    }

    fn reclaim(&self, domain: DescriptorDomain, index: SlotIndex) {
        // Bump before free: a handle comparison racing with the free must
        // see the new generation, never a stale match.
        self.generations.bump(index);
        self.pending.clear_pending(index);
        (self.backend.free)(domain, index);
    }

    fn lock_timelines(
        &self,
    ) -> std::sync::MutexGuard<'_, FxHashMap<usize, Arc<TimelineQueue>>> {
        self.timelines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Stable identity for a timeline object: the Arc's data pointer
fn timeline_key(timeline: &Arc<dyn Timeline>) -> usize {
    Arc::as_ptr(timeline) as *const () as usize
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "timeline_recycler_tests.rs"]
mod tests;
