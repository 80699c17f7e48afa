//! Error types for the Nova bindless subsystem
//!
//! This module defines the error taxonomy used throughout the crate:
//! allocation exhaustion, releases of foreign indices, unconfigured
//! domains, and configuration problems caught at startup validation.
//!
//! Note that double-release and stale-handle races are NOT errors; they
//! are defined, silent no-ops, because they arise naturally from
//! legitimate concurrent teardown paths.

use std::fmt;

use crate::handle::SlotIndex;
use crate::heap::DescriptorDomain;

/// Result type for Nova bindless operations
pub type Result<T> = std::result::Result<T, Error>;

/// Nova bindless errors
#[derive(Debug, Clone)]
pub enum Error {
    /// A domain's configured capacity (and growth budget, if any) is
    /// exhausted. Recoverable: the caller decides to retry, fall back,
    /// or surface it as a resource-creation failure.
    OutOfSpace,

    /// An index was released or queried that no segment owns. This is a
    /// caller bug (releasing a foreign or already-reclaimed index).
    NotFound(SlotIndex),

    /// A (view kind, visibility) pair with no configured heap
    /// description. A static configuration error.
    UnknownDomain(DescriptorDomain),

    /// A heap description failed startup validation
    InvalidConfiguration(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::OutOfSpace => write!(f, "Descriptor heap out of space"),
            Error::NotFound(index) => write!(f, "Slot index {} is not owned by any segment", index),
            Error::UnknownDomain(domain) => {
                write!(f, "No heap description configured for domain {:?}", domain)
            }
            Error::InvalidConfiguration(msg) => write!(f, "Invalid heap configuration: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
