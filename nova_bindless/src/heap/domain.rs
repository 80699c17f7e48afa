/// Allocation domain keys and per-domain heap policy.
///
/// A domain is a (view kind, visibility) pair. Every domain draws slot
/// indices from its own index space; the domain key only routes calls to
/// the right per-domain state, it carries no allocation state itself.

use crate::error::{Error, Result};

/// Kind of resource view a descriptor slot refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViewKind {
    /// Sampled texture view (SRV)
    SampledTexture,
    /// Storage texture view (UAV)
    StorageTexture,
    /// Uniform buffer view (CBV)
    UniformBuffer,
    /// Storage buffer view
    StorageBuffer,
    /// Standalone sampler
    Sampler,
}

/// Which table a descriptor slot lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Visibility {
    /// Visible to shaders (bindless table)
    ShaderVisible,
    /// CPU-only staging table
    CpuOnly,
}

/// Identifies an allocation domain as (view kind, visibility)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DescriptorDomain {
    pub view_kind: ViewKind,
    pub visibility: Visibility,
}

impl DescriptorDomain {
    /// Create a domain key
    pub fn new(view_kind: ViewKind, visibility: Visibility) -> Self {
        Self {
            view_kind,
            visibility,
        }
    }
}

/// Per-view-kind heap policy.
///
/// One description covers both visibilities of a view kind; the domain's
/// visibility selects which capacity applies. Growth appends segments and
/// never resizes or moves existing ones, so previously returned indices
/// stay valid for the allocator's lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeapDescription {
    /// Initial capacity of the shader-visible table
    pub shader_visible_capacity: u32,
    /// Initial capacity of the CPU-only table
    pub cpu_visible_capacity: u32,
    /// Whether the domain may append new segments once full
    pub allow_growth: bool,
    /// Capacity multiplier for each appended segment
    pub growth_factor: f32,
    /// How many segments may be appended beyond the first
    pub max_growth_iterations: u32,
}

impl HeapDescription {
    /// Initial capacity for the given visibility
    pub fn capacity_for(&self, visibility: Visibility) -> u32 {
        match visibility {
            Visibility::ShaderVisible => self.shader_visible_capacity,
            Visibility::CpuOnly => self.cpu_visible_capacity,
        }
    }

    /// Validate the description at allocator construction.
    ///
    /// Growth math requires a finite, positive factor; a description that
    /// fails here is a static configuration error, not a runtime one.
    pub fn validate(&self) -> Result<()> {
        if self.allow_growth && (!self.growth_factor.is_finite() || self.growth_factor <= 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "growth factor must be finite and > 0, got {}",
                self.growth_factor
            )));
        }
        Ok(())
    }
}

impl Default for HeapDescription {
    fn default() -> Self {
        Self {
            shader_visible_capacity: 1024,
            cpu_visible_capacity: 256,
            allow_growth: true,
            growth_factor: 2.0,
            max_growth_iterations: 4,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "domain_tests.rs"]
mod tests;
