/*!
# Nova Bindless

Bindless descriptor-slot allocation and deferred reclamation.

This crate hands out small integer "slots" (indices into GPU-visible
descriptor tables) and recycles them only once no in-flight work can still
reference the old contents. Slot indices stay stable and non-overlapping
while they are live; a released slot becomes available again only after a
gating condition (a frame boundary, or an execution-timeline fence value)
proves every asynchronous consumer is done with it. All operations are safe
to call from arbitrary worker threads.

## Architecture

- **DescriptorHeapAllocator**: segmented per-domain index allocator
- **GenerationTable**: slot index → generation counter for staleness checks
- **PendingFlags**: atomic exactly-once release guard
- **FrameRecycler**: defers reuse until the next frame boundary
- **TimelineRecycler**: defers reuse until a fence value completes

The recyclers are decoupled from the heap allocator through an injected
[`recycle::SlotBackend`]; callers may plug in the segmented allocator or a
free list of their own.
*/

// Internal modules
mod error;
pub mod log;
pub mod handle;
pub mod heap;
pub mod recycle;

// Main nova namespace module
pub mod nova {
    // Error types
    pub use crate::error::{Error, Result};

    // Shared slot identity types
    pub use crate::handle::{Generation, SlotIndex, VersionedHandle, INVALID_SLOT_INDEX};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        pub use crate::log::{set_logger, reset_logger};
        // Note: nova_* macros are NOT re-exported here - they are internal only
    }

    // Descriptor heap sub-module
    pub mod heap {
        pub use crate::heap::*;
    }

    // Slot recycling sub-module
    pub mod recycle {
        pub use crate::recycle::*;
    }
}

// Re-export hash-map library at crate root (heap configuration uses it)
pub use rustc_hash;
