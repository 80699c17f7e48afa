/// Execution timeline abstraction consumed by the timeline recycler.

/// An execution timeline (a GPU queue's fence, a transfer queue's
/// semaphore, ...) exposing a monotonically increasing completed value.
///
/// The recycler consumes timelines as `Arc<dyn Timeline>` and keys its
/// per-timeline state on the `Arc`'s identity, holding only a `Weak`
/// reference so a destroyed timeline's buckets can be pruned instead of
/// pinning its lifetime.
pub trait Timeline: Send + Sync {
    /// Latest value known to have completed on this timeline
    fn completed_value(&self) -> u64;
}
